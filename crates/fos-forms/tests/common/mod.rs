//! Fixture widgets shared by the integration tests

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::{Arc, LazyLock};

use fos_forms::validators::{RequiredValidator, Validator};
use fos_forms::{
    Document, FormControl, FormValue, InvalidEvent, ManualAssociation, NativeAssociation, NodeId,
    ValidatorSet,
};

pub static TEXT_VALIDATORS: LazyLock<Arc<ValidatorSet>> =
    LazyLock::new(|| ValidatorSet::standard().shared());

pub static CHECKBOX_VALIDATORS: LazyLock<Arc<ValidatorSet>> = LazyLock::new(|| {
    ValidatorSet::new([
        Box::new(RequiredValidator::with_message("Please check this box.")) as Box<dyn Validator>,
    ])
    .shared()
});

pub static NO_VALIDATORS: LazyLock<Arc<ValidatorSet>> =
    LazyLock::new(|| ValidatorSet::empty().shared());

/// Counters a test keeps after handing the widget to the document
#[derive(Debug, Clone, Default)]
pub struct Signals {
    pub invalid: Rc<Cell<usize>>,
    pub updates: Rc<Cell<usize>>,
    pub prevent_invalid: Rc<Cell<bool>>,
}

impl Signals {
    fn on_invalid(&self, event: &mut InvalidEvent) {
        self.invalid.set(self.invalid.get() + 1);
        if self.prevent_invalid.get() {
            event.prevent_default();
        }
    }

    fn on_update(&self) {
        self.updates.set(self.updates.get() + 1);
    }
}

/// Single line text input
#[derive(Debug, Clone, Default)]
pub struct TextField {
    pub name: String,
    pub value: String,
    pub default_value: String,
    pub required: bool,
    pub disabled: bool,
    pub signals: Signals,
}

impl TextField {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self
    }

    pub fn with_default(mut self, value: &str) -> Self {
        self.default_value = value.to_string();
        self
    }
}

impl FormControl for TextField {
    fn name(&self) -> Option<String> {
        Some(self.name.clone())
    }

    fn value(&self) -> Option<FormValue> {
        Some(FormValue::text(self.value.clone()))
    }

    fn default_value(&self) -> Option<FormValue> {
        Some(FormValue::text(self.default_value.clone()))
    }

    fn set_value(&mut self, value: Option<FormValue>) {
        self.value = value
            .and_then(|v| v.as_text().map(str::to_string))
            .unwrap_or_default();
    }

    fn is_disabled(&self) -> bool {
        self.disabled
    }

    fn is_required(&self) -> bool {
        self.required
    }

    fn invalid(&mut self, event: &mut InvalidEvent) {
        self.signals.on_invalid(event);
    }

    fn request_update(&mut self) {
        self.signals.on_update();
    }
}

/// Checkbox submitting `value` while checked
#[derive(Debug, Clone, Default)]
pub struct Checkbox {
    pub name: String,
    pub checked: bool,
    pub default_checked: bool,
    pub required: bool,
    pub signals: Signals,
}

impl Checkbox {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }
}

impl FormControl for Checkbox {
    fn name(&self) -> Option<String> {
        Some(self.name.clone())
    }

    fn value(&self) -> Option<FormValue> {
        self.checked.then(|| FormValue::text("on"))
    }

    fn default_value(&self) -> Option<FormValue> {
        self.default_checked.then(|| FormValue::text("on"))
    }

    fn set_value(&mut self, value: Option<FormValue>) {
        self.checked = value.is_some_and(|v| !v.is_empty());
    }

    fn is_required(&self) -> bool {
        self.required
    }

    fn invalid(&mut self, event: &mut InvalidEvent) {
        self.signals.on_invalid(event);
    }
}

/// Multi-select submitting one entry per selected option
#[derive(Debug, Clone, Default)]
pub struct MultiSelect {
    pub name: String,
    pub selected: Vec<String>,
}

impl FormControl for MultiSelect {
    fn name(&self) -> Option<String> {
        Some(self.name.clone())
    }

    fn value(&self) -> Option<FormValue> {
        Some(FormValue::List(self.selected.clone()))
    }

    fn default_value(&self) -> Option<FormValue> {
        Some(FormValue::List(Vec::new()))
    }

    fn set_value(&mut self, value: Option<FormValue>) {
        self.selected = value
            .map(|v| v.iter().map(str::to_string).collect())
            .unwrap_or_default();
    }
}

/// Push button that only triggers submission
#[derive(Debug, Clone, Default)]
pub struct Button {
    pub name: String,
    pub value: String,
}

impl FormControl for Button {
    fn name(&self) -> Option<String> {
        Some(self.name.clone())
    }

    fn value(&self) -> Option<FormValue> {
        Some(FormValue::text(self.value.clone()))
    }

    fn is_submitter(&self) -> bool {
        true
    }
}

/// Widget implementing none of the accessors
#[derive(Debug, Clone, Default)]
pub struct Bare;

impl FormControl for Bare {}

/// Document with `<form>` inside `<body>`
pub fn form_fixture() -> (Document, NodeId) {
    let mut doc = Document::new("https://example.com/signup");
    let form = doc.create_element("form");
    doc.set_attribute(form, "action", "/signup").unwrap();
    doc.append_child(doc.body(), form).unwrap();
    (doc, form)
}

pub fn add_manual<W: FormControl + 'static>(
    doc: &mut Document,
    parent: NodeId,
    tag: &str,
    widget: W,
    validators: &Arc<ValidatorSet>,
) -> (NodeId, Rc<RefCell<ManualAssociation<W>>>) {
    let host = doc.create_element(tag);
    doc.append_child(parent, host).unwrap();
    let handle = doc
        .add_participant(ManualAssociation::new(host, widget, validators.clone()))
        .unwrap();
    (host, handle)
}

pub fn add_native<W: FormControl + 'static>(
    doc: &mut Document,
    parent: NodeId,
    tag: &str,
    widget: W,
    validators: &Arc<ValidatorSet>,
) -> (NodeId, Rc<RefCell<NativeAssociation<W>>>) {
    let host = doc.create_element(tag);
    doc.append_child(parent, host).unwrap();
    let handle = doc
        .add_participant(NativeAssociation::new(host, widget, validators.clone()))
        .unwrap();
    (host, handle)
}

/// Count the events of one kind a form dispatches
pub fn count_events(doc: &mut Document, form: NodeId, kind: fos_forms::FormEventKind) -> Rc<Cell<usize>> {
    let count = Rc::new(Cell::new(0));
    let counter = count.clone();
    doc.add_form_listener(form, kind, move |_| counter.set(counter.get() + 1))
        .unwrap();
    count
}
