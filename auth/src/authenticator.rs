use std::sync::OnceLock;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::jwt::TokenCodec;
use crate::jwt::TokenError;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Plaintext hashed once per authenticator to build the decoy digest.
const DECOY_PASSWORD: &str = "decoy-password-never-issued";

/// Authentication coordinator combining password verification and token issuance.
///
/// Holds the signing key and token lifetime for one principal namespace.
/// Shared read-only between request workers.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    token_codec: TokenCodec,
    token_ttl: Duration,
    decoy_hash: OnceLock<String>,
}

/// Result of successful authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationResult {
    /// Signed access token
    pub access_token: String,

    /// Instant after which the token stops verifying
    pub expires_at: DateTime<Utc>,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("Token error: {0}")]
    TokenError(#[from] TokenError),
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `jwt_secret` - Secret key for token signing
    /// * `token_ttl` - Lifetime of issued tokens
    pub fn new(jwt_secret: &[u8], token_ttl: Duration) -> Self {
        Self {
            password_hasher: PasswordHasher::new(),
            token_codec: TokenCodec::new(jwt_secret),
            token_ttl,
            decoy_hash: OnceLock::new(),
        }
    }

    /// Scope issued and accepted tokens to a key id.
    pub fn with_key_id(mut self, key_id: impl Into<String>) -> Self {
        self.token_codec = self.token_codec.with_key_id(key_id);
        self
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Check a password against a stored hash. Malformed hashes never match.
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> bool {
        self.password_hasher.verify(password, stored_hash)
    }

    /// Verify credentials and issue a token for `subject`.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `TokenError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        subject: &str,
        now: DateTime<Utc>,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        if !self.verify_password(password, stored_hash) {
            return Err(AuthenticationError::InvalidCredentials);
        }

        let expires_at = now.checked_add_signed(self.token_ttl).ok_or_else(|| {
            TokenError::EncodingFailed("token lifetime out of range".to_string())
        })?;
        let access_token = self.token_codec.issue(subject, now, self.token_ttl)?;

        Ok(AuthenticationResult {
            access_token,
            expires_at,
        })
    }

    /// Reject a login attempt that has no stored hash to check against.
    ///
    /// Runs a full verification against a decoy digest first, so the caller
    /// spends the same time as on a wrong password for a known principal.
    pub fn reject(&self, password: &str) -> AuthenticationError {
        let decoy = self.decoy_hash.get_or_init(|| {
            self.password_hasher
                .hash(DECOY_PASSWORD)
                .unwrap_or_default()
        });
        let _ = self.password_hasher.verify(password, decoy);

        AuthenticationError::InvalidCredentials
    }

    /// Issue a token without password verification.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token generation failed
    pub fn generate_token(&self, subject: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        self.token_codec.issue(subject, now, self.token_ttl)
    }

    /// Validate a token and return its subject.
    ///
    /// # Errors
    /// * `Malformed`, `BadSignature`, `Expired` - see [`TokenCodec::decode`]
    pub fn validate_token(&self, token: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        self.token_codec.decode(token, now)
    }
}
