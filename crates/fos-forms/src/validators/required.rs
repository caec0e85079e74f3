//! Required constraint

use super::Validator;
use crate::{ControlView, ValidationResult, ValidityFlags};

/// Flags `valueMissing` when a required control has no value, empty text or
/// an empty selection
#[derive(Debug, Clone, Default)]
pub struct RequiredValidator {
    message: Option<String>,
}

impl RequiredValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the default message (e.g. "Please check this box." for checkboxes)
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }
}

impl Validator for RequiredValidator {
    fn check_validity(&self, control: &ControlView<'_>) -> ValidationResult {
        if !control.is_required() {
            return ValidationResult::valid();
        }
        let missing = control.value().is_none_or(|value| value.is_empty());
        if !missing {
            return ValidationResult::valid();
        }
        let message = self
            .message
            .as_deref()
            .unwrap_or(ValidityFlags::VALUE_MISSING.default_message());
        ValidationResult::invalid(ValidityFlags::VALUE_MISSING, message)
    }

    fn observed_attributes(&self) -> &'static [&'static str] {
        &["required"]
    }
}
