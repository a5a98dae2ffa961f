use std::fmt;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::principal::models::EmailAddress;
use crate::domain::principal::models::Principal;
use crate::domain::principal::models::RegisterCommand;
use crate::domain::principal::models::Role;
use crate::domain::principal::models::Secret;
use crate::domain::principal::ports::PrincipalServicePort;
use crate::inbound::http::router::AppState;
use crate::principal::errors::RegistrationError;

pub async fn register_club(
    State(state): State<AppState>,
    Json(body): Json<RegisterClubRequest>,
) -> Result<ApiSuccess<RegisterResponseData>, ApiError> {
    state
        .clubs
        .register(body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|ref principal| ApiSuccess::new(StatusCode::CREATED, principal.into()))
}

pub async fn register_user(
    State(state): State<AppState>,
    Json(body): Json<RegisterUserRequest>,
) -> Result<ApiSuccess<RegisterResponseData>, ApiError> {
    state
        .users
        .register(body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|ref principal| ApiSuccess::new(StatusCode::CREATED, principal.into()))
}

/// HTTP request body for registering a club (raw JSON)
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterClubRequest {
    email: String,
    password: String,
}

/// HTTP request body for registering a user (raw JSON)
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterUserRequest {
    email: String,
    password: String,
    #[serde(default)]
    role: Option<String>,
}

impl RegisterClubRequest {
    fn try_into_command(self) -> Result<RegisterCommand, RegistrationError> {
        let identifier = EmailAddress::new(self.email)?;
        let secret = Secret::new(self.password)?;
        Ok(RegisterCommand::new(identifier, secret, Role::Club))
    }
}

impl RegisterUserRequest {
    fn try_into_command(self) -> Result<RegisterCommand, RegistrationError> {
        let identifier = EmailAddress::new(self.email)?;
        let secret = Secret::new(self.password)?;
        let role = match self.role {
            Some(role) => role.parse::<Role>()?,
            None => Role::User,
        };
        Ok(RegisterCommand::new(identifier, secret, role))
    }
}

impl fmt::Debug for RegisterClubRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterClubRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl fmt::Debug for RegisterUserRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterUserRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("role", &self.role)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterResponseData {
    pub id: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Principal> for RegisterResponseData {
    fn from(principal: &Principal) -> Self {
        Self {
            id: principal.id.to_string(),
            email: principal.identifier.as_str().to_string(),
            role: principal.role.clone(),
            created_at: principal.created_at,
        }
    }
}
