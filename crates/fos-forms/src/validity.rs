//! Validity State
//!
//! Constraint validation flags, the combined state a control reports, and
//! the per-validator result they are aggregated from.

use bitflags::bitflags;

bitflags! {
    /// Constraints a control currently fails
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ValidityFlags: u16 {
        const VALUE_MISSING = 1 << 0;
        const TYPE_MISMATCH = 1 << 1;
        const PATTERN_MISMATCH = 1 << 2;
        const TOO_LONG = 1 << 3;
        const TOO_SHORT = 1 << 4;
        const RANGE_UNDERFLOW = 1 << 5;
        const RANGE_OVERFLOW = 1 << 6;
        const STEP_MISMATCH = 1 << 7;
        const BAD_INPUT = 1 << 8;
        const CUSTOM_ERROR = 1 << 9;
    }
}

impl ValidityFlags {
    /// Fallback message for the highest priority flag set
    pub fn default_message(self) -> &'static str {
        if self.contains(Self::CUSTOM_ERROR) {
            return "Invalid value.";
        }
        if self.contains(Self::VALUE_MISSING) {
            return "Please fill out this field.";
        }
        if self.contains(Self::TYPE_MISMATCH) {
            return "Please enter a valid value.";
        }
        if self.contains(Self::PATTERN_MISMATCH) {
            return "Please match the requested format.";
        }
        if self.contains(Self::TOO_LONG) {
            return "Please shorten this text.";
        }
        if self.contains(Self::TOO_SHORT) {
            return "Please lengthen this text.";
        }
        if self.contains(Self::RANGE_UNDERFLOW) {
            return "Value must be greater or equal to minimum.";
        }
        if self.contains(Self::RANGE_OVERFLOW) {
            return "Value must be less or equal to maximum.";
        }
        if self.intersects(Self::STEP_MISMATCH | Self::BAD_INPUT) {
            return "Please enter a valid value.";
        }
        ""
    }
}

/// Outcome of a single validator
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub message: String,
    pub invalid_keys: ValidityFlags,
}

impl ValidationResult {
    /// Constraint satisfied
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            message: String::new(),
            invalid_keys: ValidityFlags::empty(),
        }
    }

    /// Constraint failed with the given flags
    pub fn invalid(keys: ValidityFlags, message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            message: message.into(),
            invalid_keys: keys,
        }
    }

    /// Add a failing key, keeping the first message
    pub fn fail(&mut self, key: ValidityFlags, message: impl Into<String>) {
        self.is_valid = false;
        self.invalid_keys |= key;
        if self.message.is_empty() {
            self.message = message.into();
        }
    }
}

/// Validity state of a control
///
/// `is_valid()` holds exactly when no flag is set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidityState {
    flags: ValidityFlags,
    message: String,
}

impl ValidityState {
    /// A state with no failing constraint
    pub fn valid() -> Self {
        Self::default()
    }

    /// Build a state from flags; an empty message falls back to the flag default
    pub fn new(flags: ValidityFlags, message: impl Into<String>) -> Self {
        if flags.is_empty() {
            return Self::valid();
        }
        let mut message = message.into();
        if message.is_empty() {
            message = flags.default_message().to_string();
        }
        Self { flags, message }
    }

    /// Union of the failing flags, first non-empty message wins
    pub fn from_results<I>(results: I) -> Self
    where
        I: IntoIterator<Item = ValidationResult>,
    {
        let mut flags = ValidityFlags::empty();
        let mut message = String::new();
        for result in results {
            if result.is_valid {
                continue;
            }
            flags |= result.invalid_keys;
            if message.is_empty() {
                message = result.message;
            }
        }
        Self::new(flags, message)
    }

    pub fn is_valid(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn flags(&self) -> ValidityFlags {
        self.flags
    }

    /// Message shown to the user; empty when valid
    pub fn validation_message(&self) -> &str {
        &self.message
    }

    pub fn value_missing(&self) -> bool {
        self.flags.contains(ValidityFlags::VALUE_MISSING)
    }

    pub fn type_mismatch(&self) -> bool {
        self.flags.contains(ValidityFlags::TYPE_MISMATCH)
    }

    pub fn pattern_mismatch(&self) -> bool {
        self.flags.contains(ValidityFlags::PATTERN_MISMATCH)
    }

    pub fn too_long(&self) -> bool {
        self.flags.contains(ValidityFlags::TOO_LONG)
    }

    pub fn too_short(&self) -> bool {
        self.flags.contains(ValidityFlags::TOO_SHORT)
    }

    pub fn range_underflow(&self) -> bool {
        self.flags.contains(ValidityFlags::RANGE_UNDERFLOW)
    }

    pub fn range_overflow(&self) -> bool {
        self.flags.contains(ValidityFlags::RANGE_OVERFLOW)
    }

    pub fn step_mismatch(&self) -> bool {
        self.flags.contains(ValidityFlags::STEP_MISMATCH)
    }

    pub fn bad_input(&self) -> bool {
        self.flags.contains(ValidityFlags::BAD_INPUT)
    }

    pub fn custom_error(&self) -> bool {
        self.flags.contains(ValidityFlags::CUSTOM_ERROR)
    }
}
