use std::fmt;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use super::ApiError;
use crate::domain::principal::ports::PrincipalServicePort;
use crate::inbound::http::router::AppState;

/// Exchange club credentials for a bearer token (returned as plain text).
pub async fn login_club(
    State(state): State<AppState>,
    Json(body): Json<LoginRequestBody>,
) -> Result<String, ApiError> {
    login(state.clubs.as_ref(), body).await
}

/// Exchange user credentials for a bearer token (returned as plain text).
pub async fn login_user(
    State(state): State<AppState>,
    Json(body): Json<LoginRequestBody>,
) -> Result<String, ApiError> {
    login(state.users.as_ref(), body).await
}

async fn login(
    service: &dyn PrincipalServicePort,
    body: LoginRequestBody,
) -> Result<String, ApiError> {
    service
        .login(&body.email, &body.password, Utc::now())
        .await
        .map(|token| token.access_token)
        .map_err(ApiError::from)
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequestBody {
    email: String,
    password: String,
}

impl fmt::Debug for LoginRequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequestBody")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}
