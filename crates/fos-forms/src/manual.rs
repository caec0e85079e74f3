//! Manual Association
//!
//! Joins a form without native form association: the control registers
//! with the [`FormRegistry`](crate::FormRegistry), subscribes to the form's
//! lifecycle events and installs the aggregated validity entry points on
//! the form while it has registrants.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::participant::{resolve_form, ConstraintValidation};
use crate::{
    Association, ControlView, DomTree, FormContext, FormControl, FormData, FormEvent,
    FormEventKind, FormParticipant, NodeId, ValidatorSet, ValidityState,
};

/// Configuration of a manually associated control
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManualOptions {
    /// Events that must all fire before the control counts as interacted
    pub interaction_triggers: Vec<String>,
    /// Attribute holding an explicit form id
    pub form_attribute: String,
}

impl Default for ManualOptions {
    fn default() -> Self {
        Self {
            interaction_triggers: vec!["pc-input".to_string()],
            form_attribute: "form".to_string(),
        }
    }
}

impl ManualOptions {
    pub fn with_interaction_triggers<I, S>(mut self, triggers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.interaction_triggers = triggers.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_form_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.form_attribute = attribute.into().to_ascii_lowercase();
        self
    }
}

/// Form participation by composition, through the registry
pub struct ManualAssociation<W> {
    host: NodeId,
    widget: W,
    options: ManualOptions,
    validation: ConstraintValidation,
    form: Option<NodeId>,
}

impl<W: FormControl> ManualAssociation<W> {
    pub fn new(host: NodeId, widget: W, validators: Arc<ValidatorSet>) -> Self {
        Self {
            host,
            widget,
            options: ManualOptions::default(),
            validation: ConstraintValidation::new(validators),
            form: None,
        }
    }

    pub fn with_options(mut self, options: ManualOptions) -> Self {
        self.options = options;
        self
    }

    pub fn widget(&self) -> &W {
        &self.widget
    }

    pub fn widget_mut(&mut self) -> &mut W {
        &mut self.widget
    }

    pub fn options(&self) -> &ManualOptions {
        &self.options
    }

    pub fn custom_message(&self) -> &str {
        self.validation.custom_message()
    }

    fn attach(&mut self, form: Option<NodeId>, ctx: &mut FormContext<'_>) {
        if self.form == form {
            return;
        }
        self.detach(ctx);
        let Some(form) = form else {
            return;
        };

        ctx.registry.register(Some(form), self.host);
        ctx.listeners.subscribe(form, self.host);
        ctx.facade.install(form, self.host);
        self.form = Some(form);
        tracing::debug!("Control {} attached to form {}", self.host, form);
    }

    /// Leave the current form; runs whether or not the form is still connected
    fn detach(&mut self, ctx: &mut FormContext<'_>) {
        let Some(form) = self.form.take() else {
            return;
        };
        let remaining = ctx.registry.unregister(Some(form), self.host);
        ctx.listeners.unsubscribe(form, self.host);
        if remaining == 0 {
            ctx.facade.restore(form);
        }
        tracing::debug!(
            "Control {} detached from form {} ({} remaining)",
            self.host,
            form,
            remaining
        );
    }

    fn view<'a>(&'a self, tree: &'a DomTree) -> ControlView<'a> {
        ControlView::new(self.host, &self.widget, tree, self.validation.custom_message())
    }

    fn append_form_data(&self, data: &mut FormData, tree: &DomTree) {
        if !tree.is_connected(self.host) {
            return;
        }
        let view = self.view(tree);
        if view.is_disabled() || view.is_submitter() {
            return;
        }
        let (Some(name), Some(value)) = (view.name(), view.value()) else {
            return;
        };
        data.append_value(&name, &value);
    }

    fn handle_submit(&mut self, event: &mut FormEvent<'_>, ctx: &mut FormContext<'_>) {
        let Some(form) = self.form else {
            return;
        };
        for control in ctx.registry.mark_all_interacted(form) {
            ctx.request_render(control);
        }
        if event.no_validate {
            return;
        }
        if !self.report_validity(ctx) {
            tracing::debug!("Submit of form {} blocked by {}", form, self.host);
            event.prevent_default();
            event.stop_immediate_propagation();
        }
    }
}

impl<W: FormControl> FormParticipant for ManualAssociation<W> {
    fn host(&self) -> NodeId {
        self.host
    }

    fn association(&self) -> Association {
        Association::Manual
    }

    fn control(&self) -> &dyn FormControl {
        &self.widget
    }

    fn control_mut(&mut self) -> &mut dyn FormControl {
        &mut self.widget
    }

    fn form(&self) -> Option<NodeId> {
        self.form
    }

    fn observed_attributes(&self) -> &[&'static str] {
        self.validation.validators().observed_attributes()
    }

    fn connected(&mut self, ctx: &mut FormContext<'_>) {
        ctx.registry.track(self.host, &self.options.interaction_triggers);
        self.reset_form_owner(ctx);
        self.validation.invalidate();
        self.update_validity(ctx);
    }

    fn disconnected(&mut self, ctx: &mut FormContext<'_>) {
        self.detach(ctx);
    }

    fn attribute_changed(&mut self, name: &str, ctx: &mut FormContext<'_>) {
        if name == self.options.form_attribute {
            self.reset_form_owner(ctx);
        }
        if self.validation.observes(name) {
            self.update_validity(ctx);
        }
    }

    fn reset_form_owner(&mut self, ctx: &mut FormContext<'_>) {
        let form = if ctx.tree.is_connected(self.host) {
            resolve_form(ctx.tree, self.host, &self.options.form_attribute)
        } else {
            None
        };
        self.attach(form, ctx);
    }

    fn handle_form_event(&mut self, event: &mut FormEvent<'_>, ctx: &mut FormContext<'_>) {
        match event.kind {
            FormEventKind::FormData => {
                if let Some(data) = event.data() {
                    self.append_form_data(data, ctx.tree);
                }
            }
            FormEventKind::Submit => self.handle_submit(event, ctx),
            FormEventKind::Reset => self.reset(ctx),
        }
    }

    fn interaction_event(&mut self, event_type: &str, ctx: &mut FormContext<'_>) {
        let record = ctx.registry.track(self.host, &self.options.interaction_triggers);
        if record.observe(event_type) {
            tracing::trace!("Control {} interacted after {:?}", self.host, event_type);
        }
        self.update_validity(ctx);
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
            self.update_validity(ctx);
        }
    }

    fn set_validity(&mut self, is_valid: bool, ctx: &mut FormContext<'_>) {
        self.validation.publish(self.host, &mut self.widget, ctx, is_valid);
    }

    fn update_validity(&mut self, ctx: &mut FormContext<'_>) {
        self.validation.refresh(self.host, &mut self.widget, ctx);
    }

    fn reset(&mut self, ctx: &mut FormContext<'_>) {
        let default = self.widget.default_value();
        self.widget.set_value(default);
        if let Some(record) = ctx.registry.interaction_mut(self.host) {
            record.reset();
        }
        self.update_validity(ctx);
    }
}

impl<W: std::fmt::Debug> std::fmt::Debug for ManualAssociation<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualAssociation")
            .field("host", &self.host)
            .field("widget", &self.widget)
            .field("form", &self.form)
            .field("options", &self.options)
            .finish()
    }
}
