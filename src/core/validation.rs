//! Field validation shared by the auth service and the client-side forms.
//!
//! The server re-runs every check the forms run, so the two sides must agree
//! on the rules. Password strength is scored over character classes (length,
//! case, digit, symbol).

use std::fmt;

/// Minimum password length accepted by the policy
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum first-name length accepted at registration
pub const MAX_NAME_LENGTH: usize = 50;

/// A field-scoped validation failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct FieldError {
    /// Name of the offending field ("email", "password", ...)
    pub field: &'static str,
    /// Human-readable message suitable for inline display
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Password strength bands derived from the class score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PasswordStrength {
    Weak,
    Medium,
    Strong,
}

impl fmt::Display for PasswordStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PasswordStrength::Weak => write!(f, "Weak"),
            PasswordStrength::Medium => write!(f, "Medium"),
            PasswordStrength::Strong => write!(f, "Strong"),
        }
    }
}

/// Score a password over its character classes.
///
/// One point each for: length >= 8, length >= 12, uppercase, lowercase,
/// digit, symbol. 0-2 is weak, 3-4 medium, 5-6 strong.
pub fn password_score(password: &str) -> u8 {
    let mut score = 0u8;
    let length = password.chars().count();

    if length >= MIN_PASSWORD_LENGTH {
        score += 1;
    }
    if length >= 12 {
        score += 1;
    }
    if password.chars().any(|c| c.is_uppercase()) {
        score += 1;
    }
    if password.chars().any(|c| c.is_lowercase()) {
        score += 1;
    }
    if password.chars().any(|c| c.is_ascii_digit()) {
        score += 1;
    }
    if password.chars().any(|c| !c.is_alphanumeric()) {
        score += 1;
    }

    score
}

/// Band a password score into a strength label
pub fn password_strength(password: &str) -> PasswordStrength {
    match password_score(password) {
        0..=2 => PasswordStrength::Weak,
        3..=4 => PasswordStrength::Medium,
        _ => PasswordStrength::Strong,
    }
}

/// Validate an email address structurally: local@domain with a dotted domain
pub fn validate_email(email: &str) -> Result<(), FieldError> {
    if email.is_empty() {
        return Err(FieldError::new("email", "Email is required"));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return Err(FieldError::new("email", "Please enter a valid email"));
    }

    let (local, domain) = (parts[0], parts[1]);
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(FieldError::new("email", "Please enter a valid email"));
    }

    if domain.split('.').any(|p| p.is_empty()) {
        return Err(FieldError::new("email", "Please enter a valid email"));
    }

    Ok(())
}

/// Validate a password against the policy: minimum length plus at least one
/// uppercase letter, one lowercase letter and one digit.
pub fn validate_password(password: &str) -> Result<(), FieldError> {
    if password.is_empty() {
        return Err(FieldError::new("password", "Password is required"));
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(FieldError::new(
            "password",
            format!("Password must be at least {MIN_PASSWORD_LENGTH} characters"),
        ));
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        return Err(FieldError::new(
            "password",
            "Password must contain at least one uppercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        return Err(FieldError::new(
            "password",
            "Password must contain at least one lowercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(FieldError::new(
            "password",
            "Password must contain at least one digit",
        ));
    }

    Ok(())
}

/// Validate the first name supplied at registration
pub fn validate_first_name(name: &str) -> Result<(), FieldError> {
    if name.is_empty() {
        return Err(FieldError::new("first_name", "First name is required"));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(FieldError::new(
            "first_name",
            format!("First name must be at most {MAX_NAME_LENGTH} characters"),
        ));
    }

    Ok(())
}
