//! JWT utilities for token generation and validation
//!
//! Provides JWT token creation and validation using HS256. Access tokens are
//! short-lived (15 minutes), refresh tokens are long-lived. The user's role
//! is embedded as a claim at issuance; the authorization gate trusts it
//! without a store lookup, so role changes propagate at refresh time.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::db::models::Role;

/// Default access token expiration time (15 minutes)
const ACCESS_TOKEN_EXPIRATION_MINUTES: i64 = 15;

/// Default refresh token expiration time (7 days)
const REFRESH_TOKEN_EXPIRATION_DAYS: i64 = 7;

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens
    pub secret: String,
    /// Access token expiration in minutes
    pub access_token_expiration_minutes: i64,
    /// Refresh token expiration in days
    pub refresh_token_expiration_days: i64,
    /// Token issuer
    pub issuer: String,
}

impl JwtConfig {
    /// Create a new JWT configuration
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            access_token_expiration_minutes: ACCESS_TOKEN_EXPIRATION_MINUTES,
            refresh_token_expiration_days: REFRESH_TOKEN_EXPIRATION_DAYS,
            issuer: "fluentia".to_string(),
        }
    }

    /// Create config from environment variables
    pub fn from_env() -> Result<Self, JwtError> {
        let secret = std::env::var("JWT_SECRET").map_err(|_| JwtError::MissingSecret)?;

        let access_exp = std::env::var("JWT_ACCESS_EXPIRATION_MINUTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(ACCESS_TOKEN_EXPIRATION_MINUTES);

        let refresh_exp = std::env::var("JWT_REFRESH_EXPIRATION_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(REFRESH_TOKEN_EXPIRATION_DAYS);

        let issuer = std::env::var("JWT_ISSUER").unwrap_or_else(|_| "fluentia".to_string());

        Ok(Self {
            secret,
            access_token_expiration_minutes: access_exp,
            refresh_token_expiration_days: refresh_exp,
            issuer,
        })
    }

    /// Set access token expiration
    pub fn access_token_expiration(mut self, minutes: i64) -> Self {
        self.access_token_expiration_minutes = minutes;
        self
    }

    /// Set refresh token expiration
    pub fn refresh_token_expiration(mut self, days: i64) -> Self {
        self.refresh_token_expiration_days = days;
        self
    }

    /// Set issuer
    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }
}

/// JWT errors
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT_SECRET environment variable not set")]
    MissingSecret,

    #[error("Token encoding failed: {0}")]
    EncodingError(String),

    #[error("Token decoding failed: {0}")]
    DecodingError(String),

    #[error("Token expired")]
    Expired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid token type")]
    InvalidTokenType,
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => JwtError::Expired,
            ErrorKind::InvalidToken | ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                JwtError::InvalidToken
            }
            _ => JwtError::DecodingError(err.to_string()),
        }
    }
}

/// Token type enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenType::Access => write!(f, "access"),
            TokenType::Refresh => write!(f, "refresh"),
        }
    }
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// User email
    pub email: String,
    /// Role at issuance time
    pub role: Role,
    /// Token type (access or refresh)
    pub token_type: TokenType,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issuer
    pub iss: String,
    /// JWT ID (unique identifier for this token)
    pub jti: String,
}

impl Claims {
    /// Check if this is an access token
    pub fn is_access_token(&self) -> bool {
        self.token_type == TokenType::Access
    }

    /// Check if this is a refresh token
    pub fn is_refresh_token(&self) -> bool {
        self.token_type == TokenType::Refresh
    }

    /// Get user ID as UUID
    pub fn user_id(&self) -> Result<Uuid, JwtError> {
        Uuid::parse_str(&self.sub).map_err(|_| JwtError::InvalidToken)
    }
}

/// Token pair (access + refresh)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Access token (short-lived)
    pub access_token: String,
    /// Refresh token (long-lived)
    pub refresh_token: String,
    /// Access token expiration (Unix timestamp)
    pub access_expires_at: i64,
    /// Refresh token expiration (Unix timestamp)
    pub refresh_expires_at: i64,
    /// Token type (always "Bearer")
    pub token_type: String,
}

/// JWT service for token operations
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    /// Create a new JWT service
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Create JWT service from environment variables
    pub fn from_env() -> Result<Self, JwtError> {
        let config = JwtConfig::from_env()?;
        Ok(Self::new(config))
    }

    fn generate_token(
        &self,
        user_id: Uuid,
        email: &str,
        role: Role,
        token_type: TokenType,
        validity: Duration,
    ) -> Result<(String, i64), JwtError> {
        let now = Utc::now();
        let exp = now + validity;

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            role,
            token_type,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            iss: self.config.issuer.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))?;

        Ok((token, exp.timestamp()))
    }

    /// Generate an access token
    pub fn generate_access_token(
        &self,
        user_id: Uuid,
        email: &str,
        role: Role,
    ) -> Result<(String, i64), JwtError> {
        self.generate_token(
            user_id,
            email,
            role,
            TokenType::Access,
            Duration::minutes(self.config.access_token_expiration_minutes),
        )
    }

    /// Generate a refresh token with the configured default validity
    pub fn generate_refresh_token(
        &self,
        user_id: Uuid,
        email: &str,
        role: Role,
    ) -> Result<(String, i64), JwtError> {
        self.generate_refresh_token_for_days(
            user_id,
            email,
            role,
            self.config.refresh_token_expiration_days,
        )
    }

    /// Generate a refresh token valid for an explicit number of days, so a
    /// token backing an extended (remember-me) session expires with the
    /// session row rather than before it.
    pub fn generate_refresh_token_for_days(
        &self,
        user_id: Uuid,
        email: &str,
        role: Role,
        days: i64,
    ) -> Result<(String, i64), JwtError> {
        self.generate_token(user_id, email, role, TokenType::Refresh, Duration::days(days))
    }

    /// Generate both access and refresh tokens. `refresh_days` is the
    /// lifetime of the session the refresh token backs.
    pub fn generate_token_pair(
        &self,
        user_id: Uuid,
        email: &str,
        role: Role,
        refresh_days: i64,
    ) -> Result<TokenPair, JwtError> {
        let (access_token, access_expires_at) =
            self.generate_access_token(user_id, email, role)?;
        let (refresh_token, refresh_expires_at) =
            self.generate_refresh_token_for_days(user_id, email, role, refresh_days)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            access_expires_at,
            refresh_expires_at,
            token_type: "Bearer".to_string(),
        })
    }

    /// Validate and decode a token
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.config.issuer]);
        // Strict expiration checking
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)?;

        Ok(token_data.claims)
    }

    /// Validate an access token specifically
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, JwtError> {
        let claims = self.validate_token(token)?;

        if !claims.is_access_token() {
            return Err(JwtError::InvalidTokenType);
        }

        Ok(claims)
    }

    /// Validate a refresh token specifically
    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims, JwtError> {
        let claims = self.validate_token(token)?;

        if !claims.is_refresh_token() {
            return Err(JwtError::InvalidTokenType);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_service() -> JwtService {
        let config = JwtConfig::new("test_secret_key_for_testing_only_32bytes!");
        JwtService::new(config)
    }

    // ========================================================================
    // JwtConfig Tests
    // ========================================================================

    #[test]
    fn test_jwt_config_new() {
        let config = JwtConfig::new("my_secret");

        assert_eq!(config.secret, "my_secret");
        assert_eq!(
            config.access_token_expiration_minutes,
            ACCESS_TOKEN_EXPIRATION_MINUTES
        );
        assert_eq!(
            config.refresh_token_expiration_days,
            REFRESH_TOKEN_EXPIRATION_DAYS
        );
        assert_eq!(config.issuer, "fluentia");
    }

    #[test]
    fn test_jwt_config_builder() {
        let config = JwtConfig::new("secret")
            .access_token_expiration(30)
            .refresh_token_expiration(14)
            .issuer("my_app");

        assert_eq!(config.access_token_expiration_minutes, 30);
        assert_eq!(config.refresh_token_expiration_days, 14);
        assert_eq!(config.issuer, "my_app");
    }

    // ========================================================================
    // JWT Service Tests
    // ========================================================================

    #[test]
    fn test_generate_token_pair() {
        let service = create_test_service();
        let user_id = Uuid::new_v4();

        let pair = service
            .generate_token_pair(user_id, "test@example.com", Role::User, 7)
            .unwrap();

        assert!(!pair.access_token.is_empty());
        assert!(!pair.refresh_token.is_empty());
        assert_ne!(pair.access_token, pair.refresh_token);
        assert_eq!(pair.token_type, "Bearer");
        assert!(pair.refresh_expires_at > pair.access_expires_at);
    }

    #[test]
    fn test_refresh_expiry_follows_session_duration() {
        use crate::core::db::repositories::session::SessionRepository;

        let service = create_test_service();
        let user_id = Uuid::new_v4();

        for remember_me in [false, true] {
            let days = SessionRepository::duration_days(remember_me);
            let pair = service
                .generate_token_pair(user_id, "test@example.com", Role::User, days)
                .unwrap();

            // The refresh JWT expires with the session row, not before it
            let expected = (Utc::now() + Duration::days(days)).timestamp();
            assert!(
                (pair.refresh_expires_at - expected).abs() <= 5,
                "remember_me={remember_me}: expected exp near {expected}, got {}",
                pair.refresh_expires_at
            );

            let claims = service.validate_refresh_token(&pair.refresh_token).unwrap();
            assert_eq!(claims.exp, pair.refresh_expires_at);
        }
    }

    #[test]
    fn test_remember_me_refresh_outlives_default() {
        use crate::core::db::repositories::session::{
            DEFAULT_SESSION_DURATION_DAYS, REMEMBER_ME_SESSION_DURATION_DAYS,
        };

        let service = create_test_service();
        let user_id = Uuid::new_v4();

        let default_pair = service
            .generate_token_pair(
                user_id,
                "test@example.com",
                Role::User,
                DEFAULT_SESSION_DURATION_DAYS,
            )
            .unwrap();
        let remembered_pair = service
            .generate_token_pair(
                user_id,
                "test@example.com",
                Role::User,
                REMEMBER_ME_SESSION_DURATION_DAYS,
            )
            .unwrap();

        assert!(remembered_pair.refresh_expires_at > default_pair.refresh_expires_at);
    }

    #[test]
    fn test_validate_access_token() {
        let service = create_test_service();
        let user_id = Uuid::new_v4();

        let (token, _) = service
            .generate_access_token(user_id, "test@example.com", Role::User)
            .unwrap();

        let claims = service.validate_access_token(&token).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.email, "test@example.com");
        assert_eq!(claims.role, Role::User);
        assert!(claims.is_access_token());
    }

    #[test]
    fn test_role_claim_round_trip() {
        let service = create_test_service();
        let user_id = Uuid::new_v4();

        let (token, _) = service
            .generate_access_token(user_id, "admin@example.com", Role::Admin)
            .unwrap();

        let claims = service.validate_access_token(&token).unwrap();
        assert_eq!(claims.role, Role::Admin);
    }

    #[test]
    fn test_validate_refresh_token() {
        let service = create_test_service();
        let user_id = Uuid::new_v4();

        let (token, _) = service
            .generate_refresh_token(user_id, "test@example.com", Role::User)
            .unwrap();

        let claims = service.validate_refresh_token(&token).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert!(claims.is_refresh_token());
    }

    #[test]
    fn test_validate_access_token_with_refresh_token_fails() {
        let service = create_test_service();
        let user_id = Uuid::new_v4();

        let (refresh_token, _) = service
            .generate_refresh_token(user_id, "test@example.com", Role::User)
            .unwrap();

        let result = service.validate_access_token(&refresh_token);
        assert!(matches!(result, Err(JwtError::InvalidTokenType)));
    }

    #[test]
    fn test_validate_refresh_token_with_access_token_fails() {
        let service = create_test_service();
        let user_id = Uuid::new_v4();

        let (access_token, _) = service
            .generate_access_token(user_id, "test@example.com", Role::User)
            .unwrap();

        let result = service.validate_refresh_token(&access_token);
        assert!(matches!(result, Err(JwtError::InvalidTokenType)));
    }

    #[test]
    fn test_validate_invalid_token() {
        let service = create_test_service();

        let result = service.validate_token("invalid.token.here");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_token_wrong_secret() {
        let service1 = JwtService::new(JwtConfig::new("secret_one"));
        let service2 = JwtService::new(JwtConfig::new("secret_two"));

        let user_id = Uuid::new_v4();
        let (token, _) = service1
            .generate_access_token(user_id, "test@example.com", Role::User)
            .unwrap();

        let result = service2.validate_token(&token);
        assert!(matches!(result, Err(JwtError::InvalidToken)));
    }

    #[test]
    fn test_claims_user_id() {
        let service = create_test_service();
        let user_id = Uuid::new_v4();

        let (token, _) = service
            .generate_access_token(user_id, "test@example.com", Role::User)
            .unwrap();

        let claims = service.validate_token(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), user_id);
    }

    #[test]
    fn test_token_contains_unique_jti() {
        let service = create_test_service();
        let user_id = Uuid::new_v4();

        let (token1, _) = service
            .generate_access_token(user_id, "test@example.com", Role::User)
            .unwrap();
        let (token2, _) = service
            .generate_access_token(user_id, "test@example.com", Role::User)
            .unwrap();

        let claims1 = service.validate_token(&token1).unwrap();
        let claims2 = service.validate_token(&token2).unwrap();

        assert_ne!(claims1.jti, claims2.jti);
    }

    #[test]
    fn test_expired_token() {
        // Negative expiration so the token is already expired
        let config = JwtConfig::new("test_secret").access_token_expiration(-1);
        let service = JwtService::new(config);

        let user_id = Uuid::new_v4();
        let (token, _) = service
            .generate_access_token(user_id, "test@example.com", Role::User)
            .unwrap();

        let result = service.validate_token(&token);
        assert!(
            matches!(result, Err(JwtError::Expired)),
            "Expected Expired error, got: {:?}",
            result
        );
    }

    // ========================================================================
    // Error Tests
    // ========================================================================

    #[test]
    fn test_jwt_error_display() {
        assert_eq!(
            format!("{}", JwtError::MissingSecret),
            "JWT_SECRET environment variable not set"
        );
        assert_eq!(format!("{}", JwtError::Expired), "Token expired");
        assert_eq!(format!("{}", JwtError::InvalidToken), "Invalid token");
        assert_eq!(
            format!("{}", JwtError::InvalidTokenType),
            "Invalid token type"
        );
    }

    // ========================================================================
    // TokenPair Tests
    // ========================================================================

    #[test]
    fn test_token_pair_serialization() {
        let pair = TokenPair {
            access_token: "access123".to_string(),
            refresh_token: "refresh456".to_string(),
            access_expires_at: 1234567890,
            refresh_expires_at: 1234567890 + 86400 * 7,
            token_type: "Bearer".to_string(),
        };

        let json = serde_json::to_string(&pair).unwrap();
        assert!(json.contains("access123"));
        assert!(json.contains("refresh456"));
        assert!(json.contains("Bearer"));
    }
}
