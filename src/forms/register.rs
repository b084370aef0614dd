//! Registration form state machine
//!
//! Adds to the login form: first name, password confirmation, a live
//! strength indicator and the terms-of-service and privacy-policy consent
//! checkboxes, both of which must be ticked before the form submits.

use serde::Serialize;

use crate::core::validation::{
    FieldError, PasswordStrength, password_strength, validate_email, validate_first_name,
    validate_password,
};
use crate::forms::FormPhase;

/// Payload produced by a successfully validated registration form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterSubmission {
    pub email: String,
    pub password: String,
    pub first_name: String,
}

/// State of the registration form
#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    email: String,
    password: String,
    confirm_password: String,
    first_name: String,
    accepted_terms: bool,
    accepted_privacy: bool,
    phase: FormPhase,
    field_errors: Vec<FieldError>,
    submit_error: Option<String>,
}

impl RegisterForm {
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

    pub fn set_confirm_password(&mut self, value: impl Into<String>) {
        if self.phase.accepts_input() {
            self.confirm_password = value.into();
            self.clear_field_error("confirm_password");
        }
    }

    pub fn set_first_name(&mut self, value: impl Into<String>) {
        if self.phase.accepts_input() {
            self.first_name = value.into();
            self.clear_field_error("first_name");
        }
    }

    pub fn set_accepted_terms(&mut self, value: bool) {
        if self.phase.accepts_input() {
            self.accepted_terms = value;
            self.clear_field_error("terms");
        }
    }

    pub fn set_accepted_privacy(&mut self, value: bool) {
        if self.phase.accepts_input() {
            self.accepted_privacy = value;
            self.clear_field_error("privacy");
        }
    }

    /// Live strength of the password as currently typed
    pub fn strength(&self) -> PasswordStrength {
        password_strength(&self.password)
    }

    // ------------------------------------------------------------------
    // Submission
    // ------------------------------------------------------------------

    /// Validate the form and, if it passes, move to `Submitting` and hand
    /// back the payload for the transport layer.
    pub fn begin_submit(&mut self) -> Option<RegisterSubmission> {
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
        Some(RegisterSubmission {
            email: self.email.trim().to_lowercase(),
            password: self.password.clone(),
            first_name: self.first_name.trim().to_string(),
        })
    }

    /// Record that the server accepted the submission
    pub fn resolve_success(&mut self) {
        if self.phase == FormPhase::Submitting {
            self.phase = FormPhase::Succeeded;
        }
    }

    /// Record a server rejection, keeping the entered values. The message
    /// can be attached to a field (duplicate email lands on "email").
    pub fn resolve_failure(&mut self, field: Option<&'static str>, message: impl Into<String>) {
        if self.phase != FormPhase::Submitting {
            return;
        }
        self.phase = FormPhase::Failed;
        match field {
            Some(field) => self.field_errors.push(FieldError::new(field, message)),
            None => self.submit_error = Some(message.into()),
        }
    }

    fn run_validation(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        if let Err(e) = validate_email(self.email.trim()) {
            errors.push(e);
        }
        if let Err(e) = validate_first_name(self.first_name.trim()) {
            errors.push(e);
        }
        if let Err(e) = validate_password(&self.password) {
            errors.push(e);
        }
        if self.confirm_password != self.password {
            errors.push(FieldError::new("confirm_password", "Passwords do not match"));
        }
        if !self.accepted_terms {
            errors.push(FieldError::new(
                "terms",
                "You must accept the terms of service",
            ));
        }
        if !self.accepted_privacy {
            errors.push(FieldError::new(
                "privacy",
                "You must accept the privacy policy",
            ));
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

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn accepted_terms(&self) -> bool {
        self.accepted_terms
    }

    pub fn accepted_privacy(&self) -> bool {
        self.accepted_privacy
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

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_form() -> RegisterForm {
        let mut form = RegisterForm::new();
        form.set_email("test@example.com");
        form.set_password("StrongP@ss123");
        form.set_confirm_password("StrongP@ss123");
        form.set_first_name("Test");
        form.set_accepted_terms(true);
        form.set_accepted_privacy(true);
        form
    }

    #[test]
    fn test_full_registration_scenario() {
        let mut form = filled_form();

        assert_eq!(form.strength(), PasswordStrength::Strong);

        let payload = form.begin_submit().unwrap();
        assert_eq!(payload.email, "test@example.com");
        assert_eq!(payload.password, "StrongP@ss123");
        assert_eq!(payload.first_name, "Test");

        form.resolve_success();
        assert_eq!(form.phase(), FormPhase::Succeeded);
    }

    #[test]
    fn test_weak_password_blocks_submit() {
        let mut form = filled_form();
        form.set_password("password");
        form.set_confirm_password("password");

        assert!(form.begin_submit().is_none());
        assert_eq!(form.phase(), FormPhase::Failed);
        assert!(form.error_for("password").is_some());
    }

    #[test]
    fn test_password_mismatch_blocks_submit() {
        let mut form = filled_form();
        form.set_confirm_password("Different1!");

        assert!(form.begin_submit().is_none());
        assert_eq!(
            form.error_for("confirm_password"),
            Some("Passwords do not match")
        );
    }

    #[test]
    fn test_both_consents_must_be_accepted() {
        let mut form = filled_form();
        form.set_accepted_terms(false);

        assert!(form.begin_submit().is_none());
        assert!(form.error_for("terms").is_some());
        assert!(form.error_for("privacy").is_none());

        form.set_accepted_terms(true);
        form.set_accepted_privacy(false);

        assert!(form.begin_submit().is_none());
        assert!(form.error_for("privacy").is_some());
    }

    #[test]
    fn test_duplicate_email_lands_on_email_field() {
        let mut form = filled_form();
        form.begin_submit().unwrap();

        form.resolve_failure(Some("email"), "Email already registered");

        assert_eq!(form.phase(), FormPhase::Failed);
        assert_eq!(form.error_for("email"), Some("Email already registered"));
        // Values are retained for correction
        assert_eq!(form.email(), "test@example.com");
        assert_eq!(form.password(), "StrongP@ss123");
    }

    #[test]
    fn test_strength_indicator_tracks_password() {
        let mut form = RegisterForm::new();

        form.set_password("abc");
        assert_eq!(form.strength(), PasswordStrength::Weak);

        form.set_password("Password1");
        assert_eq!(form.strength(), PasswordStrength::Medium);

        form.set_password("StrongP@ss123");
        assert_eq!(form.strength(), PasswordStrength::Strong);
    }

    #[test]
    fn test_multiple_errors_reported_at_once() {
        let mut form = RegisterForm::new();
        form.set_email("bad");
        form.set_password("short");
        form.set_confirm_password("short");

        form.begin_submit();

        assert!(form.error_for("email").is_some());
        assert!(form.error_for("password").is_some());
        assert!(form.error_for("first_name").is_some());
        assert!(form.error_for("terms").is_some());
    }

    #[test]
    fn test_edits_ignored_while_submitting() {
        let mut form = filled_form();
        form.begin_submit().unwrap();

        form.set_email("other@example.com");
        assert_eq!(form.email(), "test@example.com");
    }
}
