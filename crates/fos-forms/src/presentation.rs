//! Validity Presentation
//!
//! The six styling states derived from `required`, validity and
//! interaction, published into the host's custom state set.

use bitflags::bitflags;

use crate::{DomResult, DomTree, NodeId};

bitflags! {
    /// Presentation states a control exposes for styling
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ValidityStates: u8 {
        const REQUIRED = 1 << 0;
        const OPTIONAL = 1 << 1;
        const INVALID = 1 << 2;
        const VALID = 1 << 3;
        const USER_INVALID = 1 << 4;
        const USER_VALID = 1 << 5;
    }
}

const STATE_NAMES: [(ValidityStates, &str); 6] = [
    (ValidityStates::REQUIRED, "required"),
    (ValidityStates::OPTIONAL, "optional"),
    (ValidityStates::INVALID, "invalid"),
    (ValidityStates::VALID, "valid"),
    (ValidityStates::USER_INVALID, "user-invalid"),
    (ValidityStates::USER_VALID, "user-valid"),
];

impl ValidityStates {
    /// Custom state names owned by form participation
    pub const MANAGED: [&'static str; 6] = [
        "required",
        "optional",
        "invalid",
        "valid",
        "user-invalid",
        "user-valid",
    ];

    /// Derive every state at once; exactly one of each pair is set
    pub fn compute(required: bool, valid: bool, has_interacted: bool) -> Self {
        let mut states = if required {
            Self::REQUIRED
        } else {
            Self::OPTIONAL
        };
        states |= if valid { Self::VALID } else { Self::INVALID };
        if has_interacted {
            states |= if valid {
                Self::USER_VALID
            } else {
                Self::USER_INVALID
            };
        }
        states
    }

    /// Custom state names for the set flags
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        STATE_NAMES
            .into_iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, name)| name)
    }

    /// Replace the managed states on `host` in one step
    pub fn publish(self, tree: &mut DomTree, host: NodeId) -> DomResult<()> {
        tree.replace_states(host, &Self::MANAGED, self.names())
    }

    /// Read the managed states currently set on `host`
    pub fn read(tree: &DomTree, host: NodeId) -> Self {
        STATE_NAMES
            .into_iter()
            .filter(|(_, name)| tree.has_state(host, name))
            .fold(Self::empty(), |acc, (flag, _)| acc | flag)
    }
}
