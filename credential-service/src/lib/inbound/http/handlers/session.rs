use axum::http::StatusCode;
use axum::Extension;
use serde::Serialize;

use super::ApiSuccess;
use crate::inbound::http::middleware::AuthenticatedPrincipal;

/// Describe the caller resolved by the authentication middleware.
pub async fn session(
    Extension(principal): Extension<AuthenticatedPrincipal>,
) -> ApiSuccess<SessionResponseData> {
    ApiSuccess::new(StatusCode::OK, (&principal).into())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionResponseData {
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl From<&AuthenticatedPrincipal> for SessionResponseData {
    fn from(principal: &AuthenticatedPrincipal) -> Self {
        Self {
            subject: principal.subject.clone(),
            role: principal.role.map(|role| role.to_string()),
        }
    }
}
