use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use super::map_sqlx_error;
use super::parse_stored_email;
use crate::domain::principal::models::EmailAddress;
use crate::domain::principal::models::Principal;
use crate::domain::principal::models::PrincipalId;
use crate::domain::principal::ports::CredentialStore;
use crate::principal::errors::StoreError;

const EMAIL_CONSTRAINT: &str = "users_email_key";

/// User credentials backed by the `users` table.
pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserCredentialRow {
    id: Uuid,
    email: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserCredentialRow> for Principal {
    type Error = StoreError;

    fn try_from(row: UserCredentialRow) -> Result<Self, Self::Error> {
        Ok(Principal {
            id: PrincipalId(row.id),
            identifier: parse_stored_email(row.email)?,
            password_hash: row.password_hash,
            role: row.role,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl CredentialStore for PostgresUserStore {
    async fn find_by_identifier(
        &self,
        identifier: &EmailAddress,
    ) -> Result<Option<Principal>, StoreError> {
        let row = sqlx::query_as::<_, UserCredentialRow>(
            r#"
            SELECT id, email, password_hash, role, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(identifier.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        row.map(Principal::try_from).transpose()
    }

    async fn create(&self, principal: Principal) -> Result<Principal, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, role, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(principal.id.0)
        .bind(principal.identifier.as_str())
        .bind(&principal.password_hash)
        .bind(&principal.role)
        .bind(principal.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e, &principal.identifier, EMAIL_CONSTRAINT))?;

        Ok(principal)
    }
}
