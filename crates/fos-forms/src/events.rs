//! Form Lifecycle Events
//!
//! The three form level signals participants depend on (data collection,
//! submit and reset) and the per form listener lists they are delivered to.

use std::collections::HashMap;
use std::rc::Rc;

use crate::{FormData, NodeId};

/// Form lifecycle event types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormEventKind {
    /// Entry list construction; listeners append name/value pairs
    FormData,
    /// Submission attempt (cancellable)
    Submit,
    /// Form reset (cancellable)
    Reset,
}

impl FormEventKind {
    pub fn event_type(self) -> &'static str {
        match self {
            Self::FormData => "formdata",
            Self::Submit => "submit",
            Self::Reset => "reset",
        }
    }
}

/// Form lifecycle event
#[derive(Debug)]
pub struct FormEvent<'a> {
    pub kind: FormEventKind,
    pub form: NodeId,
    pub submitter: Option<NodeId>,
    pub cancelable: bool,
    /// Validation was skipped (`novalidate` / `formnovalidate`)
    pub no_validate: bool,
    data: Option<&'a mut FormData>,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl<'a> FormEvent<'a> {
    /// Create submit event
    pub fn submit(form: NodeId, submitter: Option<NodeId>, no_validate: bool) -> Self {
        Self {
            kind: FormEventKind::Submit,
            form,
            submitter,
            cancelable: true,
            no_validate,
            data: None,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    /// Create reset event
    pub fn reset(form: NodeId) -> Self {
        Self {
            kind: FormEventKind::Reset,
            form,
            submitter: None,
            cancelable: true,
            no_validate: false,
            data: None,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    /// Create data collection event over the entry list being built
    pub fn form_data(form: NodeId, submitter: Option<NodeId>, data: &'a mut FormData) -> Self {
        Self {
            kind: FormEventKind::FormData,
            form,
            submitter,
            cancelable: false,
            no_validate: false,
            data: Some(data),
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    pub fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    /// Entry list, only present on data collection events
    pub fn data(&mut self) -> Option<&mut FormData> {
        self.data.as_deref_mut()
    }

    /// Prevent default action
    pub fn prevent_default(&mut self) {
        if self.cancelable {
            self.default_prevented = true;
        }
    }

    /// Keep the remaining listeners from seeing this event
    pub fn stop_immediate_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Check if default was prevented
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

/// Application callback for form events
pub type FormEventCallback = Rc<dyn Fn(&mut FormEvent<'_>)>;

/// Handle returned by [`FormListeners::add`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// One entry of a form's listener list
#[derive(Clone)]
pub enum Listener {
    /// Manually associated participant on this host, receives every kind
    Participant(NodeId),
    /// Application callback for one kind
    Callback {
        id: ListenerId,
        kind: FormEventKind,
        callback: FormEventCallback,
    },
}

impl Listener {
    /// Whether this listener wants events of `kind`
    pub fn accepts(&self, kind: FormEventKind) -> bool {
        match self {
            Self::Participant(_) => true,
            Self::Callback { kind: wanted, .. } => *wanted == kind,
        }
    }
}

impl std::fmt::Debug for Listener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Participant(host) => f.debug_tuple("Participant").field(host).finish(),
            Self::Callback { id, kind, .. } => f
                .debug_struct("Callback")
                .field("id", id)
                .field("kind", kind)
                .finish_non_exhaustive(),
        }
    }
}

/// Ordered listener lists per form
#[derive(Debug, Default)]
pub struct FormListeners {
    lists: HashMap<NodeId, Vec<Listener>>,
    next_id: u64,
}

impl FormListeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a participant to `form`; subscribing twice has no effect
    pub fn subscribe(&mut self, form: NodeId, control: NodeId) -> bool {
        let list = self.lists.entry(form).or_default();
        if list.iter().any(|l| matches!(l, Listener::Participant(c) if *c == control)) {
            return false;
        }
        list.push(Listener::Participant(control));
        true
    }

    pub fn unsubscribe(&mut self, form: NodeId, control: NodeId) -> bool {
        self.remove_where(form, |l| matches!(l, Listener::Participant(c) if *c == control))
    }

    pub fn is_subscribed(&self, form: NodeId, control: NodeId) -> bool {
        self.lists.get(&form).is_some_and(|list| {
            list.iter()
                .any(|l| matches!(l, Listener::Participant(c) if *c == control))
        })
    }

    /// Add an application callback for `kind` events on `form`
    pub fn add(&mut self, form: NodeId, kind: FormEventKind, callback: FormEventCallback) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.lists
            .entry(form)
            .or_default()
            .push(Listener::Callback { id, kind, callback });
        id
    }

    /// Remove a callback added with [`add`](Self::add)
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let forms: Vec<NodeId> = self.lists.keys().copied().collect();
        forms.into_iter().any(|form| {
            self.remove_where(form, |l| matches!(l, Listener::Callback { id: other, .. } if *other == id))
        })
    }

    /// Snapshot of the listeners for `kind`, in registration order
    pub fn listeners(&self, form: NodeId, kind: FormEventKind) -> Vec<Listener> {
        self.lists
            .get(&form)
            .map(|list| list.iter().filter(|l| l.accepts(kind)).cloned().collect())
            .unwrap_or_default()
    }

    /// Drop the list of a destroyed form and any subscription of a destroyed control
    pub fn forget(&mut self, node: NodeId) {
        self.lists.remove(&node);
        for list in self.lists.values_mut() {
            list.retain(|l| !matches!(l, Listener::Participant(c) if *c == node));
        }
        self.lists.retain(|_, list| !list.is_empty());
    }

    fn remove_where(&mut self, form: NodeId, predicate: impl Fn(&Listener) -> bool) -> bool {
        let Some(list) = self.lists.get_mut(&form) else {
            return false;
        };
        let before = list.len();
        list.retain(|l| !predicate(l));
        let removed = list.len() != before;
        if list.is_empty() {
            self.lists.remove(&form);
        }
        removed
    }
}
