use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::principal::models::AuthorizedPrincipal;
use crate::domain::principal::models::EmailAddress;
use crate::domain::principal::models::IssuedToken;
use crate::domain::principal::models::Principal;
use crate::domain::principal::models::PrincipalKind;
use crate::domain::principal::models::RegisterCommand;
use crate::domain::principal::models::Role;
use crate::principal::errors::AuthError;
use crate::principal::errors::RegistrationError;
use crate::principal::errors::StoreError;

/// Port for credential operations on one principal namespace.
#[async_trait]
pub trait PrincipalServicePort: Send + Sync + 'static {
    /// Namespace served by this instance.
    fn kind(&self) -> PrincipalKind;

    /// Register a new principal with a freshly hashed secret.
    ///
    /// # Arguments
    /// * `command` - Validated identifier, secret and role
    ///
    /// # Returns
    /// Stored principal
    ///
    /// # Errors
    /// * `InvalidRole` - Role not available for this kind
    /// * `AlreadyExists` - Identifier already registered
    /// * `Unavailable` - Credential store unreachable
    async fn register(&self, command: RegisterCommand) -> Result<Principal, RegistrationError>;

    /// Exchange credentials for a session token.
    ///
    /// # Arguments
    /// * `identifier` - Raw identifier (email) as sent by the caller
    /// * `secret` - Plaintext secret as sent by the caller
    /// * `now` - Issuance instant
    ///
    /// # Returns
    /// Signed token bound to the principal's identifier
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown identifier, wrong secret or unusable record
    /// * `Unavailable` - Credential store unreachable
    async fn login(
        &self,
        identifier: &str,
        secret: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, AuthError>;

    /// Verify a session token without touching the store.
    ///
    /// # Returns
    /// Token subject
    ///
    /// # Errors
    /// * `InvalidCredentials` - Token malformed, forged or expired
    fn verify_token(&self, token: &str, now: DateTime<Utc>) -> Result<String, AuthError>;

    /// Verify a session token and require the subject to hold `required`.
    ///
    /// Tokens carry no role, so the subject's current role is read from the
    /// store on every call. Unlike [`verify_token`](Self::verify_token), a
    /// role change or deletion takes effect immediately, before the token
    /// expires.
    ///
    /// # Returns
    /// Subject and its current role
    ///
    /// # Errors
    /// * `InvalidCredentials` - Token rejected, principal gone or role mismatch
    /// * `Unavailable` - Credential store unreachable
    async fn authorize(
        &self,
        token: &str,
        required: Role,
        now: DateTime<Utc>,
    ) -> Result<AuthorizedPrincipal, AuthError>;
}

/// Lookup and persistence of stored credentials for one principal namespace.
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// Retrieve principal by its unique identifier.
    ///
    /// # Returns
    /// Optional principal (None if not found)
    ///
    /// # Errors
    /// * `Unavailable` - Store operation failed
    /// * `Corrupted` - Stored row cannot be mapped back to a principal
    async fn find_by_identifier(
        &self,
        identifier: &EmailAddress,
    ) -> Result<Option<Principal>, StoreError>;

    /// Persist a new principal.
    ///
    /// # Errors
    /// * `AlreadyExists` - Identifier is already registered
    /// * `Unavailable` - Store operation failed
    async fn create(&self, principal: Principal) -> Result<Principal, StoreError>;
}
