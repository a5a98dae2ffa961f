use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::principal::models::AuthorizedPrincipal;
use crate::domain::principal::models::EmailAddress;
use crate::domain::principal::models::IssuedToken;
use crate::domain::principal::models::Principal;
use crate::domain::principal::models::PrincipalId;
use crate::domain::principal::models::PrincipalKind;
use crate::domain::principal::models::RegisterCommand;
use crate::domain::principal::models::Role;
use crate::domain::principal::models::Secret;
use crate::principal::errors::AuthError;
use crate::principal::errors::RegistrationError;
use crate::principal::ports::CredentialStore;
use crate::principal::ports::PrincipalServicePort;

/// Domain service for one principal namespace.
///
/// Concrete implementation of PrincipalServicePort with dependency injection.
/// Argon2 work is moved to the blocking pool so slow verification never
/// stalls other requests.
pub struct PrincipalService<S>
where
    S: CredentialStore,
{
    kind: PrincipalKind,
    store: Arc<S>,
    authenticator: Arc<Authenticator>,
}

impl<S> PrincipalService<S>
where
    S: CredentialStore,
{
    /// Create a new principal service with injected dependencies.
    ///
    /// # Arguments
    /// * `kind` - Namespace served by this instance
    /// * `store` - Credential persistence implementation
    /// * `authenticator` - Hashing and token handling, keyed for `kind`
    pub fn new(kind: PrincipalKind, store: Arc<S>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            kind,
            store,
            authenticator,
        }
    }

    /// Burn a decoy verification, then report the uniform failure.
    async fn reject(&self, secret: &str) -> AuthError {
        let authenticator = Arc::clone(&self.authenticator);
        let secret = secret.to_owned();

        match tokio::task::spawn_blocking(move || authenticator.reject(&secret)).await {
            Ok(_) => AuthError::InvalidCredentials,
            Err(e) => AuthError::Internal(e.to_string()),
        }
    }
}

#[async_trait]
impl<S> PrincipalServicePort for PrincipalService<S>
where
    S: CredentialStore,
{
    fn kind(&self) -> PrincipalKind {
        self.kind
    }

    async fn register(&self, command: RegisterCommand) -> Result<Principal, RegistrationError> {
        let role = self.kind.admit(command.role)?;

        let authenticator = Arc::clone(&self.authenticator);
        let secret = command.secret;
        let password_hash =
            tokio::task::spawn_blocking(move || authenticator.hash_password(secret.expose()))
                .await
                .map_err(|e| RegistrationError::Internal(e.to_string()))?
                .map_err(|e| RegistrationError::Internal(e.to_string()))?;

        let principal = Principal {
            id: PrincipalId::new(),
            identifier: command.identifier,
            password_hash,
            role: role.as_str().to_string(),
            created_at: Utc::now(),
        };

        let created = self.store.create(principal).await?;

        tracing::info!(
            kind = self.kind.as_str(),
            principal_id = %created.id,
            identifier = %created.identifier,
            role = %created.role,
            "Principal registered"
        );

        Ok(created)
    }

    async fn login(
        &self,
        identifier: &str,
        secret: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, AuthError> {
        let kind = self.kind.as_str();

        let Ok(identifier) = EmailAddress::new(identifier.to_string()) else {
            tracing::warn!(kind, reason = "invalid_identifier", "Login rejected");
            return Err(self.reject(secret).await);
        };

        if secret.chars().count() > Secret::MAX_LENGTH {
            tracing::warn!(
                kind,
                identifier = %identifier,
                reason = "secret_too_long",
                "Login rejected"
            );
            return Err(AuthError::InvalidCredentials);
        }

        let principal = match self.store.find_by_identifier(&identifier).await {
            Ok(Some(principal)) => principal,
            Ok(None) => {
                tracing::warn!(
                    kind,
                    identifier = %identifier,
                    reason = "unknown_identifier",
                    "Login rejected"
                );
                return Err(self.reject(secret).await);
            }
            Err(e) => {
                tracing::error!(kind, identifier = %identifier, error = %e, "Credential lookup failed");
                return Err(AuthError::from(e));
            }
        };

        if let Err(e) = principal
            .role
            .parse::<Role>()
            .and_then(|role| self.kind.admit(role))
        {
            tracing::warn!(
                kind,
                identifier = %identifier,
                reason = "role_unassigned",
                error = %e,
                "Login rejected"
            );
            return Err(self.reject(secret).await);
        }

        let authenticator = Arc::clone(&self.authenticator);
        let secret = secret.to_owned();
        let subject = principal.identifier.as_str().to_owned();
        let password_hash = principal.password_hash;

        let outcome = tokio::task::spawn_blocking(move || {
            authenticator.authenticate(&secret, &password_hash, &subject, now)
        })
        .await
        .map_err(|e| AuthError::Internal(e.to_string()))?;

        match outcome {
            Ok(result) => {
                tracing::info!(
                    kind,
                    identifier = %identifier,
                    expires_at = %result.expires_at,
                    "Login succeeded"
                );
                Ok(IssuedToken {
                    access_token: result.access_token,
                    expires_at: result.expires_at,
                })
            }
            Err(AuthenticationError::InvalidCredentials) => {
                tracing::warn!(
                    kind,
                    identifier = %identifier,
                    reason = "secret_mismatch",
                    "Login rejected"
                );
                Err(AuthError::InvalidCredentials)
            }
            Err(e) => {
                tracing::error!(kind, identifier = %identifier, error = %e, "Token issuance failed");
                Err(AuthError::Internal(e.to_string()))
            }
        }
    }

    fn verify_token(&self, token: &str, now: DateTime<Utc>) -> Result<String, AuthError> {
        self.authenticator.validate_token(token, now).map_err(|e| {
            tracing::debug!(kind = self.kind.as_str(), error = %e, "Token rejected");
            AuthError::InvalidCredentials
        })
    }

    async fn authorize(
        &self,
        token: &str,
        required: Role,
        now: DateTime<Utc>,
    ) -> Result<AuthorizedPrincipal, AuthError> {
        let kind = self.kind.as_str();
        let subject = self.verify_token(token, now)?;

        let identifier = EmailAddress::new(subject.clone()).map_err(|e| {
            tracing::warn!(kind, error = %e, reason = "invalid_subject", "Authorization denied");
            AuthError::InvalidCredentials
        })?;

        // Claims carry no role, so the current one is read from the store.
        let principal = self
            .store
            .find_by_identifier(&identifier)
            .await?
            .ok_or_else(|| {
                tracing::warn!(
                    kind,
                    subject = %subject,
                    reason = "principal_missing",
                    "Authorization denied"
                );
                AuthError::InvalidCredentials
            })?;

        let role = principal.role.parse::<Role>().map_err(|e| {
            tracing::warn!(
                kind,
                subject = %subject,
                error = %e,
                reason = "role_unassigned",
                "Authorization denied"
            );
            AuthError::InvalidCredentials
        })?;

        if role.authority() != required.authority() {
            tracing::warn!(
                kind,
                subject = %subject,
                authority = %role.authority(),
                required = %required.authority(),
                reason = "role_mismatch",
                "Authorization denied"
            );
            return Err(AuthError::InvalidCredentials);
        }

        Ok(AuthorizedPrincipal { subject, role })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use chrono::TimeZone;
    use mockall::mock;

    use super::*;
    use crate::principal::errors::StoreError;

    const SECRET_KEY: &[u8] = b"test_secret_key_at_least_32_bytes!";

    mock! {
        pub TestCredentialStore {}

        #[async_trait]
        impl CredentialStore for TestCredentialStore {
            async fn find_by_identifier(&self, identifier: &EmailAddress) -> Result<Option<Principal>, StoreError>;
            async fn create(&self, principal: Principal) -> Result<Principal, StoreError>;
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    fn authenticator(kind: PrincipalKind) -> Arc<Authenticator> {
        Arc::new(Authenticator::new(SECRET_KEY, Duration::seconds(3600)).with_key_id(kind.as_str()))
    }

    fn service(
        kind: PrincipalKind,
        store: MockTestCredentialStore,
    ) -> PrincipalService<MockTestCredentialStore> {
        PrincipalService::new(kind, Arc::new(store), authenticator(kind))
    }

    fn stored_principal(identifier: &str, secret: &str, role: &str) -> Principal {
        Principal {
            id: PrincipalId::new(),
            identifier: EmailAddress::new(identifier.to_string()).unwrap(),
            password_hash: auth::PasswordHasher::new().hash(secret).unwrap(),
            role: role.to_string(),
            created_at: Utc::now(),
        }
    }

    fn store_with(principal: Principal) -> MockTestCredentialStore {
        let mut store = MockTestCredentialStore::new();
        store
            .expect_find_by_identifier()
            .returning(move |identifier| {
                Ok((identifier == &principal.identifier).then(|| principal.clone()))
            });
        store
    }

    #[tokio::test]
    async fn test_login_success() {
        let principal = stored_principal("a@b.com", "secret1", "USER");
        let service = service(PrincipalKind::User, store_with(principal));

        let token = service
            .login("a@b.com", "secret1", t0())
            .await
            .expect("Login failed");

        assert_eq!(token.expires_at, t0() + Duration::seconds(3600));
        assert_eq!(
            service.verify_token(&token.access_token, t0()),
            Ok("a@b.com".to_string())
        );
    }

    #[tokio::test]
    async fn test_login_failures_are_uniform() {
        let principal = stored_principal("a@b.com", "secret1", "USER");
        let service = service(PrincipalKind::User, store_with(principal));

        let wrong_secret = service.login("a@b.com", "wrong", t0()).await;
        let unknown_identifier = service.login("nouser@b.com", "x", t0()).await;

        assert_eq!(wrong_secret, Err(AuthError::InvalidCredentials));
        assert_eq!(unknown_identifier, Err(AuthError::InvalidCredentials));
        assert_eq!(
            wrong_secret.unwrap_err().to_string(),
            unknown_identifier.unwrap_err().to_string()
        );
    }

    #[tokio::test]
    async fn test_login_invalid_identifier_skips_lookup() {
        let mut store = MockTestCredentialStore::new();
        store.expect_find_by_identifier().times(0);

        let service = service(PrincipalKind::User, store);

        let result = service.login("not-an-email", "secret1", t0()).await;
        assert_eq!(result, Err(AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_login_oversized_secret_skips_lookup() {
        let mut store = MockTestCredentialStore::new();
        store.expect_find_by_identifier().times(0);

        let service = service(PrincipalKind::User, store);

        let secret = "x".repeat(Secret::MAX_LENGTH + 1);
        let result = service.login("a@b.com", &secret, t0()).await;
        assert_eq!(result, Err(AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_login_store_unavailable() {
        let mut store = MockTestCredentialStore::new();
        store
            .expect_find_by_identifier()
            .times(1)
            .returning(|_| Err(StoreError::Unavailable("connection refused".to_string())));

        let service = service(PrincipalKind::Club, store);

        let result = service.login("a@b.com", "secret1", t0()).await;
        assert_eq!(
            result,
            Err(AuthError::Unavailable("connection refused".to_string()))
        );
    }

    #[tokio::test]
    async fn test_login_without_usable_role_is_rejected() {
        for role in ["", "ROOT", "CLUB", "admin", " ADMIN "] {
            let principal = stored_principal("a@b.com", "secret1", role);
            let service = service(PrincipalKind::User, store_with(principal));

            let result = service.login("a@b.com", "secret1", t0()).await;
            assert_eq!(result, Err(AuthError::InvalidCredentials), "role {role:?}");
        }
    }

    #[tokio::test]
    async fn test_authorize_requires_exact_role_tag() {
        let token = authenticator(PrincipalKind::User)
            .generate_token("a@b.com", t0())
            .expect("Failed to generate token");

        for role in [" admin ", "admin", "Admin", "ADMIN "] {
            let principal = stored_principal("a@b.com", "secret1", role);
            let service = service(PrincipalKind::User, store_with(principal));

            assert_eq!(
                service.authorize(&token, Role::Admin, t0()).await,
                Err(AuthError::InvalidCredentials),
                "role {role:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_verify_token_is_stateless() {
        let issuer = service(
            PrincipalKind::User,
            store_with(stored_principal("a@b.com", "secret1", "USER")),
        );
        let token = issuer
            .login("a@b.com", "secret1", t0())
            .await
            .expect("Login failed");

        // No expectations: any store access would panic.
        let verifier = service(PrincipalKind::User, MockTestCredentialStore::new());

        assert_eq!(
            verifier.verify_token(&token.access_token, t0() + Duration::seconds(3599)),
            Ok("a@b.com".to_string())
        );
        assert_eq!(
            verifier.verify_token(&token.access_token, t0() + Duration::seconds(3601)),
            Err(AuthError::InvalidCredentials)
        );
        assert_eq!(
            verifier.verify_token("garbage", t0()),
            Err(AuthError::InvalidCredentials)
        );
    }

    #[tokio::test]
    async fn test_authorize_within_validity_window() {
        let principal = stored_principal("a@b.com", "secret1", "ADMIN");
        let service = service(PrincipalKind::User, store_with(principal));

        let token = service
            .login("a@b.com", "secret1", t0())
            .await
            .expect("Login failed");

        let authorized = service
            .authorize(&token.access_token, Role::Admin, t0() + Duration::seconds(3599))
            .await
            .expect("Authorization failed");
        assert_eq!(
            authorized,
            AuthorizedPrincipal {
                subject: "a@b.com".to_string(),
                role: Role::Admin,
            }
        );

        let expired = service
            .authorize(&token.access_token, Role::Admin, t0() + Duration::seconds(3601))
            .await;
        assert_eq!(expired, Err(AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_authorize_role_mismatch() {
        let principal = stored_principal("a@b.com", "secret1", "USER");
        let service = service(PrincipalKind::User, store_with(principal));

        let token = service
            .login("a@b.com", "secret1", t0())
            .await
            .expect("Login failed");

        assert!(service
            .authorize(&token.access_token, Role::User, t0())
            .await
            .is_ok());
        assert_eq!(
            service
                .authorize(&token.access_token, Role::Admin, t0())
                .await,
            Err(AuthError::InvalidCredentials)
        );
    }

    #[tokio::test]
    async fn test_authorize_deleted_principal() {
        let issuer = service(
            PrincipalKind::User,
            store_with(stored_principal("a@b.com", "secret1", "USER")),
        );
        let token = issuer
            .login("a@b.com", "secret1", t0())
            .await
            .expect("Login failed");

        let mut store = MockTestCredentialStore::new();
        store
            .expect_find_by_identifier()
            .times(1)
            .returning(|_| Ok(None));
        let service = service(PrincipalKind::User, store);

        // The bare token stays valid until expiry; role checks need the record.
        assert!(service.verify_token(&token.access_token, t0()).is_ok());
        assert_eq!(
            service
                .authorize(&token.access_token, Role::User, t0())
                .await,
            Err(AuthError::InvalidCredentials)
        );
    }

    #[tokio::test]
    async fn test_tokens_do_not_cross_namespaces() {
        let clubs = service(
            PrincipalKind::Club,
            store_with(stored_principal("a@b.com", "secret1", "CLUB")),
        );
        let users = service(
            PrincipalKind::User,
            store_with(stored_principal("a@b.com", "secret1", "USER")),
        );

        let club_token = clubs
            .login("a@b.com", "secret1", t0())
            .await
            .expect("Login failed");

        assert!(clubs.verify_token(&club_token.access_token, t0()).is_ok());
        assert_eq!(
            users.verify_token(&club_token.access_token, t0()),
            Err(AuthError::InvalidCredentials)
        );
    }

    #[tokio::test]
    async fn test_register_hashes_secret() {
        let mut store = MockTestCredentialStore::new();
        store
            .expect_create()
            .withf(|principal| {
                principal.identifier.as_str() == "a@b.com"
                    && principal.role == "ADMIN"
                    && principal.password_hash.starts_with("$argon2")
            })
            .times(1)
            .returning(Ok);

        let service = service(PrincipalKind::User, store);

        let command = RegisterCommand::new(
            EmailAddress::new("a@b.com".to_string()).unwrap(),
            Secret::new("secret1".to_string()).unwrap(),
            Role::Admin,
        );

        let principal = service.register(command).await.expect("Registration failed");
        assert!(auth::PasswordHasher::new().verify("secret1", &principal.password_hash));
        assert!(!principal.password_hash.contains("secret1"));
    }

    #[tokio::test]
    async fn test_register_rejects_foreign_role() {
        let mut store = MockTestCredentialStore::new();
        store.expect_create().times(0);

        let service = service(PrincipalKind::Club, store);

        let command = RegisterCommand::new(
            EmailAddress::new("club@b.com".to_string()).unwrap(),
            Secret::new("secret1".to_string()).unwrap(),
            Role::Admin,
        );

        let result = service.register(command).await;
        assert!(matches!(result, Err(RegistrationError::InvalidRole(_))));
    }

    #[tokio::test]
    async fn test_register_duplicate_identifier() {
        let mut store = MockTestCredentialStore::new();
        store.expect_create().times(1).returning(|principal| {
            Err(StoreError::AlreadyExists(
                principal.identifier.as_str().to_string(),
            ))
        });

        let service = service(PrincipalKind::Club, store);

        let command = RegisterCommand::new(
            EmailAddress::new("club@b.com".to_string()).unwrap(),
            Secret::new("secret1".to_string()).unwrap(),
            Role::Club,
        );

        let result = service.register(command).await;
        assert!(matches!(result, Err(RegistrationError::AlreadyExists(_))));
    }
}
