//! Auth form state machines
//!
//! Framework-agnostic models for the login and registration forms. A form
//! moves through [`FormPhase`] as the user edits, validation runs and the
//! request is in flight; the rendering layer only reads state and calls the
//! transition methods. Validation rules are shared with the server through
//! [`crate::core::validation`], so a payload that passes here is expected to
//! pass server-side checks too (minus uniqueness).

pub mod login;
pub mod register;

pub use login::{LoginForm, LoginSubmission};
pub use register::{RegisterForm, RegisterSubmission};

/// Lifecycle of an auth form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormPhase {
    /// Untouched or being edited
    #[default]
    Idle,
    /// Client-side checks running
    Validating,
    /// Request in flight; inputs are disabled
    Submitting,
    /// Server accepted the submission
    Succeeded,
    /// Server rejected the submission; field values are retained
    Failed,
}

impl FormPhase {
    /// Whether the form should accept edits
    pub fn accepts_input(&self) -> bool {
        matches!(self, FormPhase::Idle | FormPhase::Failed)
    }

    /// Whether a submit may be started from this phase
    pub fn can_submit(&self) -> bool {
        matches!(self, FormPhase::Idle | FormPhase::Failed)
    }
}
