//! Native Association
//!
//! Form participation the way a built-in control is associated: the form
//! owner, submission value and validity live in per element
//! [`ElementInternals`], and the document drives the reset, disabled and
//! state restore callbacks. No registry entry and no validity override is
//! needed, the form already aggregates natively associated controls.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::participant::{resolve_form, ConstraintValidation};
use crate::{
    Association, DomTree, FormContext, FormControl, FormParticipant, FormValue, NodeId,
    ValidatorSet, ValidityState,
};

const FORM_ATTRIBUTE: &str = "form";

/// Why a saved state is handed back to a control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RestoreReason {
    /// Session history navigation
    Restore,
    /// Browser autofill
    Autocomplete,
}

/// Per element form association state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementInternals {
    form: Option<NodeId>,
    submission_value: Option<FormValue>,
    state: Option<FormValue>,
    validity: ValidityState,
    disabled: bool,
}

impl ElementInternals {
    /// Form owner
    pub fn form(&self) -> Option<NodeId> {
        self.form
    }

    /// Set the submission value and the state restored on navigation
    pub fn set_form_value(&mut self, value: Option<FormValue>, state: Option<FormValue>) {
        self.submission_value = value;
        self.state = state;
    }

    pub fn form_value(&self) -> Option<&FormValue> {
        self.submission_value.as_ref()
    }

    pub fn state(&self) -> Option<&FormValue> {
        self.state.as_ref()
    }

    pub fn set_validity(&mut self, validity: ValidityState) {
        self.validity = validity;
    }

    pub fn validity(&self) -> &ValidityState {
        &self.validity
    }

    pub fn validation_message(&self) -> &str {
        self.validity.validation_message()
    }

    /// Disabled by its own attribute or an ancestor fieldset
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }
}

/// Configuration of a natively associated control
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NativeOptions {
    pub interaction_triggers: Vec<String>,
}

impl Default for NativeOptions {
    fn default() -> Self {
        Self {
            interaction_triggers: vec!["input".to_string(), "blur".to_string()],
        }
    }
}

impl NativeOptions {
    pub fn with_interaction_triggers<I, S>(mut self, triggers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.interaction_triggers = triggers.into_iter().map(Into::into).collect();
        self
    }
}

/// Form participation through element internals
pub struct NativeAssociation<W> {
    host: NodeId,
    widget: W,
    options: NativeOptions,
    validation: ConstraintValidation,
    internals: ElementInternals,
}

impl<W: FormControl> NativeAssociation<W> {
    pub fn new(host: NodeId, widget: W, validators: Arc<ValidatorSet>) -> Self {
        Self {
            host,
            widget,
            options: NativeOptions::default(),
            validation: ConstraintValidation::new(validators),
            internals: ElementInternals::default(),
        }
    }

    pub fn with_options(mut self, options: NativeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn widget(&self) -> &W {
        &self.widget
    }

    pub fn widget_mut(&mut self) -> &mut W {
        &mut self.widget
    }

    pub fn options(&self) -> &NativeOptions {
        &self.options
    }

    /// Push value and validity into the internals, then publish presentation
    fn sync(&mut self, ctx: &mut FormContext<'_>) {
        let value = self.widget.value();
        self.internals.set_form_value(value.clone(), value);
        self.internals
            .set_validity(self.validation.validity(self.host, &self.widget, ctx.tree));
        self.validation.refresh(self.host, &mut self.widget, ctx);
    }

    fn clear_interaction(&self, ctx: &mut FormContext<'_>) {
        if let Some(record) = ctx.registry.interaction_mut(self.host) {
            record.reset();
        }
    }
}

impl<W: FormControl> FormParticipant for NativeAssociation<W> {
    fn host(&self) -> NodeId {
        self.host
    }

    fn association(&self) -> Association {
        Association::Native
    }

    fn control(&self) -> &dyn FormControl {
        &self.widget
    }

    fn control_mut(&mut self) -> &mut dyn FormControl {
        &mut self.widget
    }

    fn form(&self) -> Option<NodeId> {
        self.internals.form
    }

    fn observed_attributes(&self) -> &[&'static str] {
        self.validation.validators().observed_attributes()
    }

    fn internals(&self) -> Option<&ElementInternals> {
        Some(&self.internals)
    }

    fn connected(&mut self, ctx: &mut FormContext<'_>) {
        ctx.registry.track(self.host, &self.options.interaction_triggers);
        self.reset_form_owner(ctx);
        self.validation.invalidate();
        self.sync(ctx);
    }

    fn disconnected(&mut self, _ctx: &mut FormContext<'_>) {
        if let Some(form) = self.internals.form.take() {
            tracing::debug!("Control {} disassociated from form {}", self.host, form);
        }
    }

    fn attribute_changed(&mut self, name: &str, ctx: &mut FormContext<'_>) {
        if name == FORM_ATTRIBUTE {
            self.reset_form_owner(ctx);
        }
        if self.validation.observes(name) {
            self.sync(ctx);
        }
    }

    fn reset_form_owner(&mut self, ctx: &mut FormContext<'_>) {
        let form = if ctx.tree.is_connected(self.host) {
            resolve_form(ctx.tree, self.host, FORM_ATTRIBUTE)
        } else {
            None
        };
        if self.internals.form != form {
            tracing::debug!("Control {} form owner {:?} -> {:?}", self.host, self.internals.form, form);
            self.internals.form = form;
        }
    }

    fn interaction_event(&mut self, event_type: &str, ctx: &mut FormContext<'_>) {
        let record = ctx.registry.track(self.host, &self.options.interaction_triggers);
        if record.observe(event_type) {
            tracing::trace!("Control {} interacted after {:?}", self.host, event_type);
        }
        self.sync(ctx);
    }

    fn value_changed(&mut self, ctx: &mut FormContext<'_>) {
        self.sync(ctx);
    }

    fn validity(&self, tree: &DomTree) -> ValidityState {
        self.validation.validity(self.host, &self.widget, tree)
    }

    fn will_validate(&self, tree: &DomTree) -> bool {
        !self.validation.is_barred(self.host, &self.widget, tree)
    }

    fn check_validity(&mut self, ctx: &mut FormContext<'_>) -> bool {
        let valid = self.validation.check(self.host, &mut self.widget, ctx.tree);
        self.validation.publish(self.host, &mut self.widget, ctx, valid);
        valid
    }

    fn report_validity(&mut self, ctx: &mut FormContext<'_>) -> bool {
        let valid = self.validation.report(self.host, &mut self.widget, ctx);
        self.validation.publish(self.host, &mut self.widget, ctx, valid);
        valid
    }

    fn set_custom_validity(&mut self, message: &str, ctx: &mut FormContext<'_>) {
        if self.validation.set_custom_message(message) {
            self.sync(ctx);
        }
    }

    fn set_validity(&mut self, is_valid: bool, ctx: &mut FormContext<'_>) {
        self.validation.publish(self.host, &mut self.widget, ctx, is_valid);
    }

    fn update_validity(&mut self, ctx: &mut FormContext<'_>) {
        self.sync(ctx);
    }

    fn reset(&mut self, ctx: &mut FormContext<'_>) {
        let default = self.widget.default_value();
        self.widget.set_value(default);
        self.clear_interaction(ctx);
        self.sync(ctx);
    }

    fn form_disabled(&mut self, disabled: bool, ctx: &mut FormContext<'_>) {
        self.internals.disabled = disabled;
        self.sync(ctx);
    }

    fn form_state_restore(
        &mut self,
        state: FormValue,
        reason: RestoreReason,
        ctx: &mut FormContext<'_>,
    ) {
        tracing::debug!("Restoring state of {} ({:?})", self.host, reason);
        self.widget.set_value(Some(state));
        self.clear_interaction(ctx);
        self.sync(ctx);
    }
}

impl<W: std::fmt::Debug> std::fmt::Debug for NativeAssociation<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeAssociation")
            .field("host", &self.host)
            .field("widget", &self.widget)
            .field("internals", &self.internals)
            .finish()
    }
}
