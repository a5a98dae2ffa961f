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
use crate::domain::principal::models::Role;
use crate::domain::principal::ports::CredentialStore;
use crate::principal::errors::StoreError;

const EMAIL_CONSTRAINT: &str = "clubs_email_key";

/// Club credentials backed by the `clubs` table.
///
/// Clubs have no role column; every club acts as `CLUB`.
pub struct PostgresClubStore {
    pool: PgPool,
}

impl PostgresClubStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ClubCredentialRow {
    id: Uuid,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ClubCredentialRow> for Principal {
    type Error = StoreError;

    fn try_from(row: ClubCredentialRow) -> Result<Self, Self::Error> {
        Ok(Principal {
            id: PrincipalId(row.id),
            identifier: parse_stored_email(row.email)?,
            password_hash: row.password_hash,
            role: Role::Club.as_str().to_string(),
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl CredentialStore for PostgresClubStore {
    async fn find_by_identifier(
        &self,
        identifier: &EmailAddress,
    ) -> Result<Option<Principal>, StoreError> {
        let row = sqlx::query_as::<_, ClubCredentialRow>(
            r#"
            SELECT id, email, password_hash, created_at
            FROM clubs
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
            INSERT INTO clubs (id, email, password_hash, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(principal.id.0)
        .bind(principal.identifier.as_str())
        .bind(&principal.password_hash)
        .bind(principal.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e, &principal.identifier, EMAIL_CONSTRAINT))?;

        Ok(principal)
    }
}
