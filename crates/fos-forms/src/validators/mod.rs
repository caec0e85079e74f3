//! Validator Plugins
//!
//! Stateless units that each compute one contribution to a control's
//! validity. Widgets compose them into a [`ValidatorSet`] once per widget
//! type; the set also unions the attributes its validators watch so a
//! participant knows which attribute changes must trigger re-validation.

mod custom_error;
mod length;
mod pattern;
mod range;
mod required;
mod type_mismatch;

pub use custom_error::CustomErrorValidator;
pub use length::LengthValidator;
pub use pattern::PatternValidator;
pub use range::RangeValidator;
pub use required::RequiredValidator;
pub use type_mismatch::TypeValidator;

use std::sync::Arc;

use indexmap::IndexSet;

use crate::{ControlView, ValidationResult, ValidityState};

/// A pure validity contribution
///
/// Implementations must not mutate the control; they only read its public state.
pub trait Validator: Send + Sync {
    /// Evaluate the control's current state
    fn check_validity(&self, control: &ControlView<'_>) -> ValidationResult;

    /// Attributes whose change should re-run this validator
    fn observed_attributes(&self) -> &'static [&'static str] {
        &[]
    }
}

/// Ordered composition of validators
///
/// The custom error validator always runs first, so an author supplied
/// message wins over computed ones.
pub struct ValidatorSet {
    validators: Vec<Box<dyn Validator>>,
    observed: Vec<&'static str>,
}

impl ValidatorSet {
    /// Compose `validators` after the custom error validator
    pub fn new(validators: impl IntoIterator<Item = Box<dyn Validator>>) -> Self {
        let validators: Vec<Box<dyn Validator>> = std::iter::once(
            Box::new(CustomErrorValidator) as Box<dyn Validator>,
        )
        .chain(validators)
        .collect();

        let observed: Vec<&'static str> = validators
            .iter()
            .flat_map(|v| v.observed_attributes().iter().copied())
            .collect::<IndexSet<_>>()
            .into_iter()
            .collect();

        Self {
            validators,
            observed,
        }
    }

    /// Only the custom error validator
    pub fn empty() -> Self {
        Self::new(std::iter::empty())
    }

    /// Every shipped constraint validator, for text-like widgets
    pub fn standard() -> Self {
        Self::new([
            Box::new(RequiredValidator::new()) as Box<dyn Validator>,
            Box::new(TypeValidator),
            Box::new(PatternValidator::new()),
            Box::new(LengthValidator),
            Box::new(RangeValidator),
        ])
    }

    /// Wrap for sharing across every instance of a widget type
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Union of the attributes watched by the composed validators
    pub fn observed_attributes(&self) -> &[&'static str] {
        &self.observed
    }

    pub fn observes(&self, attribute: &str) -> bool {
        self.observed.iter().any(|name| name.eq_ignore_ascii_case(attribute))
    }

    /// Union of every validator's flags, first non-empty message in order
    pub fn evaluate(&self, control: &ControlView<'_>) -> ValidityState {
        ValidityState::from_results(self.validators.iter().map(|v| v.check_validity(control)))
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl Default for ValidatorSet {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Debug for ValidatorSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorSet")
            .field("len", &self.validators.len())
            .field("observed", &self.observed)
            .finish()
    }
}
