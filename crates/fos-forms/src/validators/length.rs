//! Length constraints

use super::Validator;
use crate::{ControlView, ValidationResult, ValidityFlags};

/// Flags `tooShort`/`tooLong` from `minlength`/`maxlength`, counted in
/// characters; empty values are never too short
#[derive(Debug, Clone, Copy, Default)]
pub struct LengthValidator;

fn length_attribute(control: &ControlView<'_>, name: &str) -> Option<usize> {
    control.attribute(name)?.trim().parse().ok()
}

impl Validator for LengthValidator {
    fn check_validity(&self, control: &ControlView<'_>) -> ValidationResult {
        let Some(value) = control.value() else {
            return ValidationResult::valid();
        };
        let Some(text) = value.as_text() else {
            return ValidationResult::valid();
        };
        let length = text.chars().count();
        let mut result = ValidationResult::valid();

        if let Some(max) = length_attribute(control, "maxlength") {
            if length > max {
                result.fail(
                    ValidityFlags::TOO_LONG,
                    format!("Please shorten this text to {max} characters or less (you are currently using {length} characters)."),
                );
            }
        }
        if let Some(min) = length_attribute(control, "minlength") {
            if length > 0 && length < min {
                result.fail(
                    ValidityFlags::TOO_SHORT,
                    format!("Please lengthen this text to {min} characters or more (you are currently using {length} characters)."),
                );
            }
        }
        result
    }

    fn observed_attributes(&self) -> &'static [&'static str] {
        &["minlength", "maxlength"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestControl;
    use crate::DomTree;

    fn check(min: Option<&str>, max: Option<&str>, value: &str) -> ValidationResult {
        let mut tree = DomTree::new();
        let host = tree.create_element("pc-textarea");
        if let Some(min) = min {
            tree.set_attribute(host, "minlength", min).unwrap();
        }
        if let Some(max) = max {
            tree.set_attribute(host, "maxlength", max).unwrap();
        }
        let control = TestControl::default().with_value(value);
        LengthValidator.check_validity(&ControlView::new(host, &control, &tree, ""))
    }

    #[test]
    fn test_string_length() {
        assert!(check(Some("3"), Some("10"), "hello").is_valid);
        assert_eq!(check(Some("3"), None, "ab").invalid_keys, ValidityFlags::TOO_SHORT);
        assert_eq!(check(None, Some("3"), "abcd").invalid_keys, ValidityFlags::TOO_LONG);
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        assert!(check(None, Some("3"), "äöü").is_valid);
    }

    #[test]
    fn test_empty_not_too_short() {
        assert!(check(Some("3"), None, "").is_valid);
    }

    #[test]
    fn test_unparsable_attribute_ignored() {
        assert!(check(Some("lots"), None, "a").is_valid);
    }
}
