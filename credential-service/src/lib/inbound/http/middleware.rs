use axum::extract::Request;
use axum::extract::State;
use axum::http;
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;

use super::handlers::ApiError;
use super::handlers::INVALID_CREDENTIALS;
use crate::domain::principal::models::Role;
use crate::domain::principal::ports::PrincipalServicePort;
use crate::inbound::http::router::AppState;

/// Extension type to store the authenticated caller in request extensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedPrincipal {
    pub subject: String,
    /// Only resolved by role-checking middleware
    pub role: Option<Role>,
}

/// Middleware that validates club tokens
pub async fn authenticate_club(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    authenticate(state.clubs.as_ref(), req, next).await
}

/// Middleware that validates user tokens
pub async fn authenticate_user(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    authenticate(state.users.as_ref(), req, next).await
}

/// Middleware that requires a user token whose subject currently holds `ADMIN`
pub async fn require_admin(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token_from_header(&req)?.to_owned();

    let authorized = state
        .users
        .authorize(&token, Role::Admin, Utc::now())
        .await?;

    req.extensions_mut().insert(AuthenticatedPrincipal {
        subject: authorized.subject,
        role: Some(authorized.role),
    });

    Ok(next.run(req).await)
}

async fn authenticate(
    service: &dyn PrincipalServicePort,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token_from_header(&req)?;

    // Stateless: the subject is trusted without consulting the store.
    let subject = service.verify_token(token, Utc::now())?;

    req.extensions_mut().insert(AuthenticatedPrincipal {
        subject,
        role: None,
    });

    Ok(next.run(req).await)
}

fn extract_token_from_header(req: &Request) -> Result<&str, ApiError> {
    let reject = |reason: &'static str| {
        tracing::debug!(reason, "Authorization header rejected");
        ApiError::Unauthorized(INVALID_CREDENTIALS.to_string())
    };

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .ok_or_else(|| reject("missing_header"))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| reject("non_ascii_header"))?;

    auth_str
        .strip_prefix("Bearer ")
        .ok_or_else(|| reject("not_bearer"))
}
