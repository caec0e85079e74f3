//! Pattern constraint

use std::collections::HashMap;
use std::sync::Mutex;

use regex::Regex;

use super::Validator;
use crate::{ControlView, ValidationResult, ValidityFlags};

/// Flags `patternMismatch` when a non-empty value does not fully match the
/// `pattern` attribute
///
/// The pattern is anchored at both ends like the native attribute. A
/// pattern that fails to compile is ignored. Compiled patterns, and
/// compile failures, are cached per pattern string.
#[derive(Debug, Default)]
pub struct PatternValidator {
    compiled: Mutex<HashMap<String, Option<Regex>>>,
}

impl PatternValidator {
    pub fn new() -> Self {
        Self::default()
    }

    fn compile(&self, pattern: &str, control: &ControlView<'_>) -> Option<Regex> {
        let mut compiled = self
            .compiled
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(cached) = compiled.get(pattern) {
            return cached.clone();
        }
        let regex = match Regex::new(&format!("^(?:{pattern})$")) {
            Ok(regex) => Some(regex),
            Err(err) => {
                tracing::warn!("Ignoring invalid pattern {:?} on {}: {}", pattern, control.host(), err);
                None
            }
        };
        compiled.insert(pattern.to_string(), regex.clone());
        regex
    }

    /// Number of distinct patterns compiled so far
    pub fn cached(&self) -> usize {
        self.compiled
            .lock()
            .map_or_else(|poisoned| poisoned.into_inner().len(), |compiled| compiled.len())
    }
}

impl Validator for PatternValidator {
    fn check_validity(&self, control: &ControlView<'_>) -> ValidationResult {
        let Some(pattern) = control.attribute("pattern") else {
            return ValidationResult::valid();
        };
        let Some(value) = control.value() else {
            return ValidationResult::valid();
        };
        if value.is_empty() {
            return ValidationResult::valid();
        }

        let Some(regex) = self.compile(pattern, control) else {
            return ValidationResult::valid();
        };

        if value.iter().all(|item| item.is_empty() || regex.is_match(item)) {
            return ValidationResult::valid();
        }
        let message = match control.attribute("title") {
            Some(title) if !title.is_empty() => {
                format!("{} {}", ValidityFlags::PATTERN_MISMATCH.default_message(), title)
            }
            _ => ValidityFlags::PATTERN_MISMATCH.default_message().to_string(),
        };
        ValidationResult::invalid(ValidityFlags::PATTERN_MISMATCH, message)
    }

    fn observed_attributes(&self) -> &'static [&'static str] {
        &["pattern"]
    }
}
