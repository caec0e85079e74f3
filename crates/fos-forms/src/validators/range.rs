//! Numeric range constraints

use super::Validator;
use crate::{ControlView, ValidationResult, ValidityFlags};

const STEP_EPSILON: f64 = 1e-9;

/// Flags `rangeUnderflow`, `rangeOverflow`, `stepMismatch` and `badInput`
/// from `min`, `max` and `step`
///
/// Applies to `type=number` and `type=range` hosts, and to any host that
/// declares one of the three bounds; plain text is left alone. Two-element
/// list values are treated as a start/end pair: each bound is checked on
/// its own, and a start past the end is bad input.
#[derive(Debug, Clone, Copy, Default)]
pub struct RangeValidator;

#[derive(Debug, Clone, Copy)]
struct Bounds {
    min: Option<f64>,
    max: Option<f64>,
    step: Option<f64>,
}

impl Bounds {
    fn from_control(control: &ControlView<'_>) -> Self {
        let number = |name: &str| {
            control
                .attribute(name)
                .and_then(|raw| raw.trim().parse::<f64>().ok())
                .filter(|n| n.is_finite())
        };
        let step = match control.attribute("step") {
            Some(raw) if raw.trim().eq_ignore_ascii_case("any") => None,
            _ => number("step").filter(|s| *s > 0.0),
        };
        Self {
            min: number("min"),
            max: number("max"),
            step,
        }
    }

    fn check(&self, raw: &str, result: &mut ValidationResult) -> Option<f64> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        let Some(value) = raw.parse::<f64>().ok().filter(|n| n.is_finite()) else {
            result.fail(ValidityFlags::BAD_INPUT, "Please enter a number.");
            return None;
        };

        if let Some(min) = self.min {
            if value < min {
                result.fail(
                    ValidityFlags::RANGE_UNDERFLOW,
                    format!("Value must be greater than or equal to {min}."),
                );
            }
        }
        if let Some(max) = self.max {
            if value > max {
                result.fail(
                    ValidityFlags::RANGE_OVERFLOW,
                    format!("Value must be less than or equal to {max}."),
                );
            }
        }
        if let Some(step) = self.step {
            let base = self.min.unwrap_or(0.0);
            let steps = (value - base) / step;
            if (steps - steps.round()).abs() > STEP_EPSILON {
                let below = base + steps.floor() * step;
                result.fail(
                    ValidityFlags::STEP_MISMATCH,
                    format!(
                        "Please enter a valid value. The two nearest valid values are {} and {}.",
                        below,
                        below + step
                    ),
                );
            }
        }
        Some(value)
    }
}

fn is_numeric(control: &ControlView<'_>) -> bool {
    let numeric_type = control
        .attribute("type")
        .is_some_and(|kind| kind.eq_ignore_ascii_case("number") || kind.eq_ignore_ascii_case("range"));
    numeric_type || ["min", "max", "step"].iter().any(|name| control.attribute(name).is_some())
}

impl Validator for RangeValidator {
    fn check_validity(&self, control: &ControlView<'_>) -> ValidationResult {
        if !is_numeric(control) {
            return ValidationResult::valid();
        }
        let Some(value) = control.value() else {
            return ValidationResult::valid();
        };
        let bounds = Bounds::from_control(control);
        let mut result = ValidationResult::valid();
        let parsed: Vec<Option<f64>> = value
            .iter()
            .map(|raw| bounds.check(raw, &mut result))
            .collect();

        if let [Some(start), Some(end)] = parsed.as_slice() {
            if start > end {
                result.fail(
                    ValidityFlags::BAD_INPUT,
                    "The range start must not be greater than the range end.",
                );
            }
        }
        result
    }

    fn observed_attributes(&self) -> &'static [&'static str] {
        &["type", "min", "max", "step"]
    }
}
