//! Type constraints for `type=email` and `type=url`

use url::Url;

use super::Validator;
use crate::{ControlView, ValidationResult, ValidityFlags};

/// Flags `typeMismatch` for malformed e-mail addresses and URLs
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeValidator;

fn is_email_local_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ".!#$%&'*+/=?^_`{|}~-".contains(ch)
}

fn is_domain_label(label: &str) -> bool {
    if label.is_empty() || label.len() > 63 {
        return false;
    }
    let bytes = label.as_bytes();
    bytes[0].is_ascii_alphanumeric()
        && bytes[bytes.len() - 1].is_ascii_alphanumeric()
        && label.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '-')
}

pub(crate) fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.trim().split_once('@') else {
        return false;
    };
    !local.is_empty()
        && local.chars().all(is_email_local_char)
        && !domain.is_empty()
        && domain.split('.').all(is_domain_label)
}

pub(crate) fn is_absolute_url(value: &str) -> bool {
    Url::parse(value.trim()).is_ok()
}

impl Validator for TypeValidator {
    fn check_validity(&self, control: &ControlView<'_>) -> ValidationResult {
        let Some(kind) = control.attribute("type") else {
            return ValidationResult::valid();
        };
        let Some(value) = control.value() else {
            return ValidationResult::valid();
        };

        let (check, message): (fn(&str) -> bool, &str) = match kind.to_ascii_lowercase().as_str() {
            "email" => (is_email, "Please enter an email address."),
            "url" => (is_absolute_url, "Please enter a URL."),
            _ => return ValidationResult::valid(),
        };

        // `multiple` e-mail fields submit a comma separated list
        let mismatch = value.iter().any(|item| {
            let item = item.trim();
            if item.is_empty() {
                return false;
            }
            if kind.eq_ignore_ascii_case("email") && control.attribute("multiple").is_some() {
                return item.split(',').any(|part| !check(part));
            }
            !check(item)
        });

        if mismatch {
            ValidationResult::invalid(ValidityFlags::TYPE_MISMATCH, message)
        } else {
            ValidationResult::valid()
        }
    }

    fn observed_attributes(&self) -> &'static [&'static str] {
        &["type", "multiple"]
    }
}
