use crate::domain::principal::models::EmailAddress;
use crate::principal::errors::StoreError;

pub mod club;
pub mod user;

pub use club::PostgresClubStore;
pub use user::PostgresUserStore;

/// Map a sqlx failure on `identifier` to a store error.
///
/// Only the email uniqueness constraint is a caller error; anything else
/// means the store could not serve the request.
fn map_sqlx_error(e: sqlx::Error, identifier: &EmailAddress, email_constraint: &str) -> StoreError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() && db_err.constraint() == Some(email_constraint) {
            return StoreError::AlreadyExists(identifier.as_str().to_string());
        }
    }
    StoreError::Unavailable(e.to_string())
}

fn parse_stored_email(email: String) -> Result<EmailAddress, StoreError> {
    EmailAddress::new(email).map_err(|e| StoreError::Corrupted(e.to_string()))
}
