//! Document - High-level document API
//!
//! Owns the host tree and every form participant. Tree mutations run the
//! participants' connected, disconnected and attribute callbacks; form
//! lifecycle events are dispatched through the per form listener lists.
//! Presentation refreshes requested during an operation are flushed before
//! it returns.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use indexmap::IndexSet;

use crate::events::Listener;
use crate::{
    DomError, DomTree, FormContext, FormError, FormEvent, FormEventKind, FormListeners,
    FormParticipant, FormRegistry, FormResult, FormValidityFacade, FormValue, ListenerId, NodeId,
    ParticipantRef, RestoreReason, ValidationBubble, ValidityState, ValidityStates,
};

/// HTML Document with form participation
pub struct Document {
    /// The DOM tree
    pub(crate) tree: DomTree,
    /// Document URL
    url: String,
    /// Cached reference to <body> element
    body_element: NodeId,
    pub(crate) registry: FormRegistry,
    pub(crate) facade: FormValidityFacade,
    pub(crate) listeners: FormListeners,
    pub(crate) participants: HashMap<NodeId, ParticipantRef>,
    /// Participants last reported as disabled by attribute or fieldset
    disabled: HashSet<NodeId>,
    bubbles: Vec<ValidationBubble>,
    pub(crate) pending: IndexSet<NodeId>,
}

impl Document {
    /// Create a new document with `<html>`, `<head>` and `<body>`
    pub fn new(url: &str) -> Self {
        let mut tree = DomTree::new();

        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let body = tree.create_element("body");

        let structure = tree
            .append_child(tree.root(), html)
            .and_then(|()| tree.append_child(html, head))
            .and_then(|()| tree.append_child(html, body));
        if let Err(err) = structure {
            tracing::warn!("Cannot build document structure: {}", err);
        }

        Self {
            tree,
            url: url.to_string(),
            body_element: body,
            registry: FormRegistry::new(),
            facade: FormValidityFacade::new(),
            listeners: FormListeners::new(),
            participants: HashMap::new(),
            disabled: HashSet::new(),
            bubbles: Vec::new(),
            pending: IndexSet::new(),
        }
    }

    /// Get document URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get the <body> element
    pub fn body(&self) -> NodeId {
        self.body_element
    }

    /// Read-only access to the tree; mutate through the document so
    /// participants see the change
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    pub fn registry(&self) -> &FormRegistry {
        &self.registry
    }

    pub fn facade(&self) -> &FormValidityFacade {
        &self.facade
    }

    pub(crate) fn context(&mut self) -> FormContext<'_> {
        FormContext {
            tree: &mut self.tree,
            registry: &mut self.registry,
            facade: &mut self.facade,
            listeners: &mut self.listeners,
            bubbles: &mut self.bubbles,
            pending: &mut self.pending,
        }
    }

    /// Run `f` against the participant on `host`
    pub(crate) fn call<R>(
        &mut self,
        host: NodeId,
        f: impl FnOnce(&mut dyn FormParticipant, &mut FormContext<'_>) -> R,
    ) -> Option<R> {
        let participant = self.participants.get(&host).cloned()?;
        let mut ctx = self.context();
        let mut participant = participant.borrow_mut();
        Some(f(&mut *participant, &mut ctx))
    }

    fn call_required<R>(
        &mut self,
        host: NodeId,
        f: impl FnOnce(&mut dyn FormParticipant, &mut FormContext<'_>) -> R,
    ) -> FormResult<R> {
        let result = self.call(host, f).ok_or(FormError::NoParticipant(host))?;
        self.flush();
        Ok(result)
    }

    fn participant_ref(&self, host: NodeId) -> FormResult<&ParticipantRef> {
        self.participants
            .get(&host)
            .ok_or(FormError::NoParticipant(host))
    }

    // ------------------------------------------------------------------
    // Tree mutation
    // ------------------------------------------------------------------

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.tree.create_element(tag)
    }

    pub fn attach_shadow(&mut self, host: NodeId) -> FormResult<NodeId> {
        Ok(self.tree.attach_shadow(host)?)
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> FormResult<()> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` before `reference`; participants moving with it are
    /// disconnected from their old position and connected at the new one
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> FormResult<()> {
        let moving = self.connected_participants(child);
        self.tree.insert_before(parent, child, reference)?;
        for host in moving {
            self.call(host, |p, ctx| p.disconnected(ctx));
        }
        for host in self.connected_participants(child) {
            self.call(host, |p, ctx| p.connected(ctx));
        }
        self.after_mutation();
        Ok(())
    }

    /// Detach a node; it stays alive and may be inserted again
    pub fn remove(&mut self, node: NodeId) -> FormResult<Option<NodeId>> {
        let leaving = self.connected_participants(node);
        let parent = self.tree.remove(node)?;
        for host in leaving {
            self.call(host, |p, ctx| p.disconnected(ctx));
        }
        self.after_mutation();
        Ok(parent)
    }

    /// Detach and free a subtree, dropping every participant and side
    /// table entry that belonged to it
    pub fn destroy(&mut self, node: NodeId) -> FormResult<()> {
        if node == self.tree.root() {
            return Err(DomError::HierarchyRequest {
                parent: node,
                child: node,
            }
            .into());
        }
        let leaving = self.connected_participants(node);
        self.tree.remove(node)?;
        for host in leaving {
            self.call(host, |p, ctx| p.disconnected(ctx));
        }

        let freed = self.tree.destroy(node)?;
        for id in &freed {
            self.registry.forget(*id);
            self.facade.forget(*id);
            self.listeners.forget(*id);
            self.participants.remove(id);
            self.disabled.remove(id);
            self.pending.shift_remove(id);
        }
        tracing::debug!("Destroyed {} nodes under {}", freed.len(), node);
        self.after_mutation();
        Ok(())
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> FormResult<()> {
        let name = name.to_ascii_lowercase();
        self.tree.set_attribute(node, &name, value)?;
        self.attribute_changed(node, &name);
        Ok(())
    }

    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> FormResult<()> {
        let name = name.to_ascii_lowercase();
        if self.tree.remove_attribute(node, &name)?.is_some() {
            self.attribute_changed(node, &name);
        }
        Ok(())
    }

    fn attribute_changed(&mut self, node: NodeId, name: &str) {
        self.call(node, |p, ctx| p.attribute_changed(name, ctx));
        self.after_mutation();
    }

    /// Connected participants inside `root`, in tree order
    fn connected_participants(&self, root: NodeId) -> Vec<NodeId> {
        if !self.tree.is_connected(root) {
            return Vec::new();
        }
        self.tree
            .traverse(root)
            .into_iter()
            .filter(|id| self.participants.contains_key(id))
            .collect()
    }

    /// Re-resolve form owners and disabled state, then flush
    fn after_mutation(&mut self) {
        let connected = self.connected_participants(self.tree.root());
        for &host in &connected {
            self.call(host, |p, ctx| p.reset_form_owner(ctx));
        }
        for host in connected {
            let disabled = self.tree.has_attribute(host, "disabled")
                || self.tree.is_disabled_by_fieldset(host);
            let changed = if disabled {
                self.disabled.insert(host)
            } else {
                self.disabled.remove(&host)
            };
            if changed {
                self.call(host, |p, ctx| p.form_disabled(disabled, ctx));
            }
        }
        self.flush();
    }

    /// Refresh every control whose presentation was invalidated
    pub(crate) fn flush(&mut self) {
        while let Some(host) = self.pending.shift_remove_index(0) {
            self.call(host, |p, ctx| p.update_validity(ctx));
        }
    }

    // ------------------------------------------------------------------
    // Participants
    // ------------------------------------------------------------------

    /// Take ownership of a participant; it is connected right away when its
    /// host already is
    pub fn add_participant<P>(&mut self, participant: P) -> FormResult<Rc<RefCell<P>>>
    where
        P: FormParticipant + 'static,
    {
        let host = participant.host();
        if !self.tree.is_alive(host) {
            return Err(DomError::StaleNode(host).into());
        }
        if self.participants.contains_key(&host) {
            return Err(FormError::AlreadyParticipating(host));
        }

        let handle = Rc::new(RefCell::new(participant));
        self.participants.insert(host, handle.clone());
        tracing::debug!("Participant added on {}", host);
        if self.tree.is_connected(host) {
            self.call(host, |p, ctx| p.connected(ctx));
        }
        self.after_mutation();
        Ok(handle)
    }

    /// Disconnect and drop the participant on `host`
    pub fn remove_participant(&mut self, host: NodeId) -> FormResult<()> {
        if self.tree.is_connected(host) {
            self.call(host, |p, ctx| p.disconnected(ctx));
        }
        self.participants
            .remove(&host)
            .ok_or(FormError::NoParticipant(host))?;
        self.tree
            .replace_states(host, &ValidityStates::MANAGED, std::iter::empty())?;
        self.registry.forget(host);
        self.disabled.remove(&host);
        self.pending.shift_remove(&host);
        Ok(())
    }

    pub fn participant(&self, host: NodeId) -> Option<ParticipantRef> {
        self.participants.get(&host).cloned()
    }

    /// Fire an event on the host for interaction tracking
    pub fn dispatch_event(&mut self, host: NodeId, event_type: &str) -> FormResult<()> {
        tracing::trace!("Dispatching {:?} on {}", event_type, host);
        self.call_required(host, |p, ctx| p.interaction_event(event_type, ctx))
    }

    pub fn set_value(&mut self, host: NodeId, value: Option<FormValue>) -> FormResult<()> {
        self.call_required(host, |p, ctx| {
            p.control_mut().set_value(value);
            p.value_changed(ctx);
        })
    }

    pub fn value(&self, host: NodeId) -> FormResult<Option<FormValue>> {
        Ok(self.participant_ref(host)?.borrow().control().value())
    }

    /// Form the participant on `host` belongs to
    pub fn form_of(&self, host: NodeId) -> FormResult<Option<NodeId>> {
        Ok(self.participant_ref(host)?.borrow().form())
    }

    pub fn validity(&self, host: NodeId) -> FormResult<ValidityState> {
        Ok(self.participant_ref(host)?.borrow().validity(&self.tree))
    }

    pub fn validation_message(&self, host: NodeId) -> FormResult<String> {
        Ok(self
            .participant_ref(host)?
            .borrow()
            .validation_message(&self.tree))
    }

    pub fn will_validate(&self, host: NodeId) -> FormResult<bool> {
        Ok(self.participant_ref(host)?.borrow().will_validate(&self.tree))
    }

    pub fn check_validity(&mut self, host: NodeId) -> FormResult<bool> {
        self.call_required(host, |p, ctx| p.check_validity(ctx))
    }

    pub fn report_validity(&mut self, host: NodeId) -> FormResult<bool> {
        self.call_required(host, |p, ctx| p.report_validity(ctx))
    }

    pub fn set_custom_validity(&mut self, host: NodeId, message: &str) -> FormResult<()> {
        self.call_required(host, |p, ctx| p.set_custom_validity(message, ctx))
    }

    pub fn set_validity(&mut self, host: NodeId, is_valid: bool) -> FormResult<()> {
        self.call_required(host, |p, ctx| p.set_validity(is_valid, ctx))
    }

    pub fn update_validity(&mut self, host: NodeId) -> FormResult<()> {
        self.call_required(host, |p, ctx| p.update_validity(ctx))
    }

    /// Reset a single control without resetting its form
    pub fn reset_control(&mut self, host: NodeId) -> FormResult<()> {
        self.call_required(host, |p, ctx| p.reset(ctx))
    }

    /// Hand a value to a natively associated control as autofill
    pub fn autofill(&mut self, host: NodeId, value: FormValue) -> FormResult<()> {
        self.call_required(host, |p, ctx| {
            p.form_state_restore(value, RestoreReason::Autocomplete, ctx)
        })
    }

    pub fn has_interacted(&self, host: NodeId) -> bool {
        self.registry.has_interacted(host)
    }

    /// Presentation states currently published on `host`
    pub fn states(&self, host: NodeId) -> ValidityStates {
        ValidityStates::read(&self.tree, host)
    }

    /// Validation messages surfaced since the last call
    pub fn take_validation_bubbles(&mut self) -> Vec<ValidationBubble> {
        std::mem::take(&mut self.bubbles)
    }

    // ------------------------------------------------------------------
    // Forms
    // ------------------------------------------------------------------

    pub(crate) fn ensure_form(&self, form: NodeId) -> FormResult<()> {
        if !self.tree.is_alive(form) {
            return Err(DomError::StaleNode(form).into());
        }
        if !self.tree.is_element_named(form, "form") {
            return Err(FormError::NotAForm(form));
        }
        Ok(())
    }

    /// Natively associated controls owned by `form`, in tree order
    pub(crate) fn native_controls(&self, form: NodeId) -> Vec<NodeId> {
        self.tree
            .traverse(self.tree.root())
            .into_iter()
            .filter(|id| {
                self.participants.get(id).is_some_and(|p| {
                    p.borrow()
                        .internals()
                        .is_some_and(|internals| internals.form() == Some(form))
                })
            })
            .collect()
    }

    /// The form's "is everything valid" entry point
    ///
    /// Natively associated controls are always consulted; registered
    /// controls only while the aggregated entry points are installed. The
    /// registered controls short-circuit at the first failure.
    pub fn check_form_validity(&mut self, form: NodeId) -> FormResult<bool> {
        self.ensure_form(form)?;
        let mut valid = true;
        for host in self.native_controls(form) {
            valid &= self.call(host, |p, ctx| p.check_validity(ctx)).unwrap_or(true);
        }
        if valid && self.facade.entry_points(form).is_aggregated() {
            valid = self
                .registry
                .controls_of(form)
                .into_iter()
                .all(|host| self.call(host, |p, ctx| p.check_validity(ctx)).unwrap_or(true));
        }
        self.flush();
        Ok(valid)
    }

    /// The form's "check all and surface messages" entry point
    pub fn report_form_validity(&mut self, form: NodeId) -> FormResult<bool> {
        self.ensure_form(form)?;
        let mut valid = true;
        for host in self.native_controls(form) {
            valid &= self.call(host, |p, ctx| p.report_validity(ctx)).unwrap_or(true);
        }
        if valid && self.facade.entry_points(form).is_aggregated() {
            valid = self
                .registry
                .controls_of(form)
                .into_iter()
                .all(|host| self.call(host, |p, ctx| p.report_validity(ctx)).unwrap_or(true));
        }
        self.flush();
        Ok(valid)
    }

    /// Listen for `kind` events on `form`
    pub fn add_form_listener(
        &mut self,
        form: NodeId,
        kind: FormEventKind,
        callback: impl Fn(&mut FormEvent<'_>) + 'static,
    ) -> FormResult<ListenerId> {
        self.ensure_form(form)?;
        Ok(self.listeners.add(form, kind, Rc::new(callback)))
    }

    pub fn remove_form_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Deliver a form event to the form's listeners in order
    pub(crate) fn dispatch_form_event(&mut self, event: &mut FormEvent<'_>) {
        tracing::trace!("Dispatching {} on form {}", event.event_type(), event.form);
        for listener in self.listeners.listeners(event.form, event.kind) {
            match listener {
                Listener::Participant(host) => {
                    self.call(host, |p, ctx| p.handle_form_event(&mut *event, ctx));
                }
                Listener::Callback { callback, .. } => callback(&mut *event),
            }
            if event.is_propagation_stopped() {
                break;
            }
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("about:blank")
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("url", &self.url)
            .field("nodes", &self.tree.len())
            .field("participants", &self.participants.len())
            .finish_non_exhaustive()
    }
}
