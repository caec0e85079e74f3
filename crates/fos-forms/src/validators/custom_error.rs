//! Author supplied custom error

use super::Validator;
use crate::{ControlView, ValidationResult, ValidityFlags};

/// Flags `customError` while a custom message is set, either through
/// `set_custom_validity` or the `custom-error` attribute
#[derive(Debug, Clone, Copy, Default)]
pub struct CustomErrorValidator;

impl Validator for CustomErrorValidator {
    fn check_validity(&self, control: &ControlView<'_>) -> ValidationResult {
        let message = Some(control.custom_message())
            .filter(|m| !m.is_empty())
            .or_else(|| control.attribute("custom-error").filter(|m| !m.is_empty()));
        match message {
            Some(message) => ValidationResult::invalid(ValidityFlags::CUSTOM_ERROR, message),
            None => ValidationResult::valid(),
        }
    }

    fn observed_attributes(&self) -> &'static [&'static str] {
        &["custom-error"]
    }
}
