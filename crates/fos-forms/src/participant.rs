//! Form Participant
//!
//! The contract shared by both association strategies, the mutable context
//! the [`Document`](crate::Document) hands them, and the constraint
//! validation machinery they both compose.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use indexmap::IndexSet;

use crate::{
    ControlView, DomTree, ElementInternals, FormControl, FormEvent, FormListeners, FormRegistry,
    FormValidityFacade, FormValue, InvalidEvent, NodeId, RestoreReason, ValidatorSet,
    ValidityState, ValidityStates,
};

/// Shared handle to a participant owned by a [`Document`](crate::Document)
pub type ParticipantRef = Rc<RefCell<dyn FormParticipant>>;

/// How a participant joins its form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Association {
    /// Registry, form listeners and the validity facade
    Manual,
    /// Per element internals, like a built-in control
    Native,
}

/// Platform validation message surfaced for a failed report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationBubble {
    pub control: NodeId,
    pub message: String,
}

/// Document state a participant may touch during a callback
pub struct FormContext<'a> {
    pub(crate) tree: &'a mut DomTree,
    pub(crate) registry: &'a mut FormRegistry,
    pub(crate) facade: &'a mut FormValidityFacade,
    pub(crate) listeners: &'a mut FormListeners,
    pub(crate) bubbles: &'a mut Vec<ValidationBubble>,
    pub(crate) pending: &'a mut IndexSet<NodeId>,
}

impl FormContext<'_> {
    pub fn tree(&self) -> &DomTree {
        &*self.tree
    }

    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut *self.tree
    }

    pub fn registry(&self) -> &FormRegistry {
        &*self.registry
    }

    pub fn registry_mut(&mut self) -> &mut FormRegistry {
        &mut *self.registry
    }

    pub fn facade_mut(&mut self) -> &mut FormValidityFacade {
        &mut *self.facade
    }

    pub fn listeners_mut(&mut self) -> &mut FormListeners {
        &mut *self.listeners
    }

    /// Re-derive the presentation of `control` before the current operation returns
    pub fn request_render(&mut self, control: NodeId) {
        self.pending.insert(control);
    }

    /// Surface a platform validation message
    pub fn show_bubble(&mut self, control: NodeId, message: impl Into<String>) {
        self.bubbles.push(ValidationBubble {
            control,
            message: message.into(),
        });
    }
}

/// Contract every form participant fulfils, independent of how it is associated
///
/// Widgets depend only on this trait. The native callbacks at the end are
/// invoked for [`Association::Native`] participants only.
pub trait FormParticipant {
    fn host(&self) -> NodeId;

    fn association(&self) -> Association;

    fn control(&self) -> &dyn FormControl;

    fn control_mut(&mut self) -> &mut dyn FormControl;

    /// Form this participant currently belongs to
    fn form(&self) -> Option<NodeId>;

    /// Attributes whose change must re-run validation
    fn observed_attributes(&self) -> &[&'static str];

    /// Native association state, if any
    fn internals(&self) -> Option<&ElementInternals> {
        None
    }

    /// Host became connected to the document
    fn connected(&mut self, ctx: &mut FormContext<'_>);

    /// Host left the document
    fn disconnected(&mut self, ctx: &mut FormContext<'_>);

    /// An attribute on the host changed
    fn attribute_changed(&mut self, name: &str, ctx: &mut FormContext<'_>);

    /// Re-resolve the form owner after an ancestor or `id` change
    fn reset_form_owner(&mut self, ctx: &mut FormContext<'_>);

    /// Form lifecycle event delivered through the form's listener list
    fn handle_form_event(&mut self, _event: &mut FormEvent<'_>, _ctx: &mut FormContext<'_>) {}

    /// An event fired on the host (interaction tracking)
    fn interaction_event(&mut self, event_type: &str, ctx: &mut FormContext<'_>);

    /// The widget's value was changed through the document
    fn value_changed(&mut self, ctx: &mut FormContext<'_>) {
        self.update_validity(ctx);
    }

    /// Current validity, computed on demand
    fn validity(&self, tree: &DomTree) -> ValidityState;

    fn validation_message(&self, tree: &DomTree) -> String {
        self.validity(tree).validation_message().to_string()
    }

    /// Whether the control is a candidate for constraint validation
    fn will_validate(&self, tree: &DomTree) -> bool;

    fn check_validity(&mut self, ctx: &mut FormContext<'_>) -> bool;

    fn report_validity(&mut self, ctx: &mut FormContext<'_>) -> bool;

    fn set_custom_validity(&mut self, message: &str, ctx: &mut FormContext<'_>);

    /// Publish presentation flags for a validity the caller already knows
    fn set_validity(&mut self, is_valid: bool, ctx: &mut FormContext<'_>);

    /// Recompute validity and publish presentation flags
    fn update_validity(&mut self, ctx: &mut FormContext<'_>);

    /// Value back to default, interaction cleared
    fn reset(&mut self, ctx: &mut FormContext<'_>);

    fn form_reset(&mut self, ctx: &mut FormContext<'_>) {
        self.reset(ctx);
    }

    fn form_disabled(&mut self, _disabled: bool, ctx: &mut FormContext<'_>) {
        self.update_validity(ctx);
    }

    fn form_state_restore(
        &mut self,
        _state: FormValue,
        _reason: RestoreReason,
        _ctx: &mut FormContext<'_>,
    ) {
    }
}

/// Resolve the form owner of `host`
///
/// An explicit form id in `form_attribute` is looked up in the host's tree
/// scope; when it names no form the nearest ancestor form is used instead.
pub(crate) fn resolve_form(tree: &DomTree, host: NodeId, form_attribute: &str) -> Option<NodeId> {
    if let Some(form_id) = tree.attribute(host, form_attribute).filter(|id| !id.is_empty()) {
        let scope = tree.scope_root(host);
        match tree.get_element_by_id(scope, form_id) {
            Some(node) if tree.is_element_named(node, "form") => return Some(node),
            Some(node) => tracing::warn!(
                "Form id {:?} on {} names {}, which is not a form",
                form_id,
                host,
                node
            ),
            None => tracing::warn!("Form id {:?} on {} matches no element", form_id, host),
        }
    }
    tree.parent(host).and_then(|parent| tree.closest(parent, "form"))
}

/// Constraint validation shared by both strategies
///
/// Holds the widget type's validator set, the author's custom message and
/// the presentation flags last published for the host.
#[derive(Debug)]
pub struct ConstraintValidation {
    validators: Arc<ValidatorSet>,
    custom_message: String,
    published: Option<ValidityStates>,
}

impl ConstraintValidation {
    pub fn new(validators: Arc<ValidatorSet>) -> Self {
        Self {
            validators,
            custom_message: String::new(),
            published: None,
        }
    }

    pub fn validators(&self) -> &ValidatorSet {
        &self.validators
    }

    pub fn custom_message(&self) -> &str {
        &self.custom_message
    }

    /// Returns true if the message changed
    pub fn set_custom_message(&mut self, message: &str) -> bool {
        if self.custom_message == message {
            return false;
        }
        self.custom_message = message.to_string();
        true
    }

    pub fn observes(&self, attribute: &str) -> bool {
        matches!(attribute, "required" | "disabled" | "readonly") || self.validators.observes(attribute)
    }

    pub fn validity(&self, host: NodeId, control: &dyn FormControl, tree: &DomTree) -> ValidityState {
        self.validators
            .evaluate(&ControlView::new(host, control, tree, &self.custom_message))
    }

    /// Disabled and read-only controls are barred from validation
    pub fn is_barred(&self, host: NodeId, control: &dyn FormControl, tree: &DomTree) -> bool {
        ControlView::new(host, control, tree, &self.custom_message).is_disabled()
            || tree.has_attribute(host, "readonly")
    }

    /// Validity as the form sees it: barred controls always pass
    pub fn is_valid(&self, host: NodeId, control: &dyn FormControl, tree: &DomTree) -> bool {
        self.is_barred(host, control, tree) || self.validity(host, control, tree).is_valid()
    }

    /// Check validity, notifying the widget on failure
    pub fn check(&self, host: NodeId, control: &mut dyn FormControl, tree: &DomTree) -> bool {
        if self.is_barred(host, control, tree) {
            return true;
        }
        let state = self.validity(host, control, tree);
        if state.is_valid() {
            return true;
        }
        let mut event = InvalidEvent::new(state.flags(), state.validation_message());
        control.invalid(&mut event);
        false
    }

    /// Check validity and surface the failure
    ///
    /// A failing control is marked as interacted and receives the
    /// cancellable invalid notification; unless it is prevented the message
    /// is shown as a validation bubble.
    pub fn report(
        &self,
        host: NodeId,
        control: &mut dyn FormControl,
        ctx: &mut FormContext<'_>,
    ) -> bool {
        if self.is_barred(host, control, ctx.tree) {
            return true;
        }
        let state = self.validity(host, control, ctx.tree);
        if state.is_valid() {
            return true;
        }

        ctx.registry.mark_interacted(host);
        let mut event = InvalidEvent::new(state.flags(), state.validation_message());
        control.invalid(&mut event);
        if event.is_default_prevented() {
            tracing::debug!("Validation bubble for {} suppressed", host);
        } else {
            ctx.show_bubble(host, state.validation_message());
        }
        false
    }

    /// Publish presentation flags for `valid`, all states in one step
    ///
    /// The widget is asked to re-render only when the flags changed.
    pub fn publish(
        &mut self,
        host: NodeId,
        control: &mut dyn FormControl,
        ctx: &mut FormContext<'_>,
        valid: bool,
    ) -> ValidityStates {
        let required =
            ControlView::new(host, control, ctx.tree, &self.custom_message).is_required();
        let states = ValidityStates::compute(required, valid, ctx.registry.has_interacted(host));
        if self.published == Some(states) {
            return states;
        }
        if let Err(err) = states.publish(ctx.tree, host) {
            tracing::warn!("Cannot publish validity states on {}: {}", host, err);
            return states;
        }
        self.published = Some(states);
        control.request_update();
        states
    }

    /// Recompute validity and publish
    pub fn refresh(
        &mut self,
        host: NodeId,
        control: &mut dyn FormControl,
        ctx: &mut FormContext<'_>,
    ) -> ValidityStates {
        let valid = self.is_valid(host, control, ctx.tree);
        self.publish(host, control, ctx, valid)
    }

    /// Forget the published flags so the next publish always writes
    pub fn invalidate(&mut self) {
        self.published = None;
    }
}
