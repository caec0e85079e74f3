//! fOS Forms - Form participation for custom elements
//!
//! Lets opaque custom widgets behave like native form fields: they submit a
//! value, take part in constraint validation, reset with their form and
//! publish `user-valid`/`user-invalid` style state. Two association
//! strategies share one [`FormParticipant`] contract:
//!
//! - [`ManualAssociation`] registers with the enclosing form through the
//!   [`FormRegistry`] and listens to its lifecycle events.
//! - [`NativeAssociation`] routes everything through per-element
//!   [`ElementInternals`], the way a built-in `<input>` is associated.
//!
//! The [`Document`] owns the host tree and drives both.

mod document;
mod events;
mod facade;
mod interaction;
mod manual;
mod native;
mod participant;
mod presentation;
mod registry;
mod state;
mod submission;
mod tree;
mod validity;
mod value;

pub mod control;
pub mod validators;

pub use control::{ControlView, FormControl, InvalidEvent};
pub use document::Document;
pub use events::{FormEvent, FormEventCallback, FormEventKind, FormListeners, Listener, ListenerId};
pub use facade::{EntryPoints, FormValidityFacade};
pub use interaction::InteractionRecord;
pub use manual::{ManualAssociation, ManualOptions};
pub use native::{ElementInternals, NativeAssociation, NativeOptions, RestoreReason};
pub use participant::{
    Association, ConstraintValidation, FormContext, FormParticipant, ParticipantRef,
    ValidationBubble,
};
pub use presentation::ValidityStates;
pub use registry::FormRegistry;
pub use state::{FormStateSnapshot, SavedControlState};
pub use submission::{Activation, Submission, SubmitOutcome};
pub use tree::{DomError, DomResult, DomTree, ElementData, Node, NodeKind};
pub use validators::{Validator, ValidatorSet};
pub use validity::{ValidationResult, ValidityFlags, ValidityState};
pub use value::{FormData, FormEntry, FormValue};

/// Node identifier (generational index into the tree arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl NodeId {
    /// Root node ID
    pub const ROOT: NodeId = NodeId {
        index: 0,
        generation: 0,
    };

    /// Slot index in the arena
    pub fn index(self) -> u32 {
        self.index
    }

    /// Generation of the slot when this id was handed out
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// Result type for form operations
pub type FormResult<T> = Result<T, FormError>;

/// Form participation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error(transparent)]
    Dom(#[from] DomError),

    #[error("Node {0} is not a form element")]
    NotAForm(NodeId),

    #[error("Node {0} already has a form participant")]
    AlreadyParticipating(NodeId),

    #[error("Node {0} has no form participant")]
    NoParticipant(NodeId),

    #[error("Submitter {submitter} does not belong to form {form}")]
    ForeignSubmitter { form: NodeId, submitter: NodeId },
}

#[cfg(test)]
pub(crate) mod testing;
