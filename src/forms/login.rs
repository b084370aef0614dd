//! Login form state machine

use serde::Serialize;

use crate::core::validation::{FieldError, validate_email};
use crate::forms::FormPhase;

/// Payload produced by a successfully validated login form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginSubmission {
    pub email: String,
    pub password: String,
    pub remember_me: bool,
}

/// State of the login form
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    email: String,
    password: String,
    remember_me: bool,
    phase: FormPhase,
    field_errors: Vec<FieldError>,
    submit_error: Option<String>,
}

impl LoginForm {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Edits
    // ------------------------------------------------------------------

    pub fn set_email(&mut self, value: impl Into<String>) {
        if self.phase.accepts_input() {
            self.email = value.into();
            self.clear_field_error("email");
        }
    }

    pub fn set_password(&mut self, value: impl Into<String>) {
        if self.phase.accepts_input() {
            self.password = value.into();
            self.clear_field_error("password");
        }
    }

    pub fn set_remember_me(&mut self, value: bool) {
        if self.phase.accepts_input() {
            self.remember_me = value;
        }
    }

    // ------------------------------------------------------------------
    // Submission
    // ------------------------------------------------------------------

    /// Validate the form and, if it passes, move to `Submitting` and hand
    /// back the payload for the transport layer.
    pub fn begin_submit(&mut self) -> Option<LoginSubmission> {
        if !self.phase.can_submit() {
            return None;
        }

        self.phase = FormPhase::Validating;
        self.submit_error = None;
        self.field_errors = self.run_validation();

        if !self.field_errors.is_empty() {
            self.phase = FormPhase::Failed;
            return None;
        }

        self.phase = FormPhase::Submitting;
        Some(LoginSubmission {
            email: self.email.trim().to_lowercase(),
            password: self.password.clone(),
            remember_me: self.remember_me,
        })
    }

    /// Record that the server accepted the submission
    pub fn resolve_success(&mut self) {
        if self.phase == FormPhase::Submitting {
            self.phase = FormPhase::Succeeded;
        }
    }

    /// Record a server rejection. Field values are kept so the user can
    /// correct and resubmit.
    pub fn resolve_failure(&mut self, message: impl Into<String>) {
        if self.phase == FormPhase::Submitting {
            self.phase = FormPhase::Failed;
            self.submit_error = Some(message.into());
        }
    }

    fn run_validation(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if let Err(e) = validate_email(self.email.trim()) {
            errors.push(e);
        }
        if self.password.is_empty() {
            errors.push(FieldError::new("password", "Password is required"));
        }
        errors
    }

    fn clear_field_error(&mut self, field: &str) {
        self.field_errors.retain(|e| e.field != field);
    }

    // ------------------------------------------------------------------
    // Accessors for the rendering layer
    // ------------------------------------------------------------------

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn remember_me(&self) -> bool {
        self.remember_me
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn field_errors(&self) -> &[FieldError] {
        &self.field_errors
    }

    pub fn error_for(&self, field: &str) -> Option<&str> {
        self.field_errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }
}
