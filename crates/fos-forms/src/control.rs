//! Control Accessors
//!
//! The accessor contract every widget implements, and the read-only view
//! validators evaluate it through.

use crate::{DomTree, FormValue, NodeId, ValidityFlags};

/// Name of the cancellable notification dispatched on a failed validity report
pub const INVALID_EVENT: &str = "pc-invalid";

/// Accessors a widget supplies to its association strategy
///
/// Every method has a degrading default: a widget that implements nothing is
/// always valid and contributes nothing to its form.
pub trait FormControl {
    /// Submission name; `None` falls back to the host's `name` attribute
    fn name(&self) -> Option<String> {
        None
    }

    /// Current value; `None` means nothing is submitted
    fn value(&self) -> Option<FormValue> {
        None
    }

    /// Value restored on form reset
    fn default_value(&self) -> Option<FormValue> {
        None
    }

    fn set_value(&mut self, _value: Option<FormValue>) {}

    fn is_disabled(&self) -> bool {
        false
    }

    fn is_required(&self) -> bool {
        false
    }

    /// Controls that only trigger submission (push buttons) never contribute data
    fn is_submitter(&self) -> bool {
        false
    }

    /// Called with the `pc-invalid` notification; prevent it to suppress the
    /// validation bubble
    fn invalid(&mut self, _event: &mut InvalidEvent) {}

    /// Presentation flags changed
    fn request_update(&mut self) {}
}

/// Cancellable `pc-invalid` notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidEvent {
    pub flags: ValidityFlags,
    pub message: String,
    default_prevented: bool,
}

impl InvalidEvent {
    pub fn new(flags: ValidityFlags, message: impl Into<String>) -> Self {
        Self {
            flags,
            message: message.into(),
            default_prevented: false,
        }
    }

    pub fn event_type(&self) -> &'static str {
        INVALID_EVENT
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Public state of a control as validators see it
///
/// Widget accessors win; host attributes fill the gaps.
#[derive(Clone, Copy)]
pub struct ControlView<'a> {
    host: NodeId,
    control: &'a dyn FormControl,
    tree: &'a DomTree,
    custom_message: &'a str,
}

impl<'a> ControlView<'a> {
    pub fn new(
        host: NodeId,
        control: &'a dyn FormControl,
        tree: &'a DomTree,
        custom_message: &'a str,
    ) -> Self {
        Self {
            host,
            control,
            tree,
            custom_message,
        }
    }

    pub fn host(&self) -> NodeId {
        self.host
    }

    pub fn value(&self) -> Option<FormValue> {
        self.control.value()
    }

    /// Widget name, else the `name` attribute; empty names count as absent
    pub fn name(&self) -> Option<String> {
        self.control
            .name()
            .or_else(|| self.attribute("name").map(str::to_string))
            .filter(|name| !name.is_empty())
    }

    pub fn is_required(&self) -> bool {
        self.control.is_required() || self.tree.has_attribute(self.host, "required")
    }

    /// Disabled by the widget, its `disabled` attribute or an ancestor fieldset
    pub fn is_disabled(&self) -> bool {
        self.control.is_disabled()
            || self.tree.has_attribute(self.host, "disabled")
            || self.tree.is_disabled_by_fieldset(self.host)
    }

    pub fn is_submitter(&self) -> bool {
        self.control.is_submitter()
    }

    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.tree.attribute(self.host, name)
    }

    /// Message set through `set_custom_validity`
    pub fn custom_message(&self) -> &'a str {
        self.custom_message
    }
}

impl std::fmt::Debug for ControlView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlView")
            .field("host", &self.host)
            .field("value", &self.value())
            .field("custom_message", &self.custom_message)
            .finish()
    }
}
