//! Test fixtures shared by unit tests

use indexmap::IndexSet;

use crate::{
    DomTree, FormContext, FormControl, FormListeners, FormRegistry, FormValidityFacade, FormValue,
    InvalidEvent, NodeId, ValidationBubble,
};

/// Minimal widget with public fields
#[derive(Debug, Default, Clone)]
pub struct TestControl {
    pub name: Option<String>,
    pub value: Option<FormValue>,
    pub default_value: Option<FormValue>,
    pub disabled: bool,
    pub required: bool,
    pub submitter: bool,
    pub prevent_invalid: bool,
    pub invalid_events: usize,
    pub updates: usize,
}

impl TestControl {
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.value = Some(FormValue::text(value));
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

impl FormControl for TestControl {
    fn name(&self) -> Option<String> {
        self.name.clone()
    }

    fn value(&self) -> Option<FormValue> {
        self.value.clone()
    }

    fn default_value(&self) -> Option<FormValue> {
        self.default_value.clone()
    }

    fn set_value(&mut self, value: Option<FormValue>) {
        self.value = value;
    }

    fn is_disabled(&self) -> bool {
        self.disabled
    }

    fn is_required(&self) -> bool {
        self.required
    }

    fn is_submitter(&self) -> bool {
        self.submitter
    }

    fn invalid(&mut self, event: &mut InvalidEvent) {
        self.invalid_events += 1;
        if self.prevent_invalid {
            event.prevent_default();
        }
    }

    fn request_update(&mut self) {
        self.updates += 1;
    }
}

/// Owned document state for driving a participant without a `Document`
#[derive(Default)]
pub struct TestContext {
    pub tree: DomTree,
    pub registry: FormRegistry,
    pub facade: FormValidityFacade,
    pub listeners: FormListeners,
    pub bubbles: Vec<ValidationBubble>,
    pub pending: IndexSet<NodeId>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ctx(&mut self) -> FormContext<'_> {
        FormContext {
            tree: &mut self.tree,
            registry: &mut self.registry,
            facade: &mut self.facade,
            listeners: &mut self.listeners,
            bubbles: &mut self.bubbles,
            pending: &mut self.pending,
        }
    }
}
