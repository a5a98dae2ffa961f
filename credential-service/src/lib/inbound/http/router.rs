use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::login::login_club;
use super::handlers::login::login_user;
use super::handlers::register::register_club;
use super::handlers::register::register_user;
use super::handlers::session::session;
use super::middleware::authenticate_club;
use super::middleware::authenticate_user;
use super::middleware::require_admin;
use crate::domain::principal::ports::PrincipalServicePort;

#[derive(Clone)]
pub struct AppState {
    pub clubs: Arc<dyn PrincipalServicePort>,
    pub users: Arc<dyn PrincipalServicePort>,
}

pub fn create_router(
    clubs: Arc<dyn PrincipalServicePort>,
    users: Arc<dyn PrincipalServicePort>,
) -> Router {
    let state = AppState { clubs, users };

    let public_routes = Router::new()
        .route("/api/clubs", post(register_club))
        .route("/api/clubs/login", post(login_club))
        .route("/api/users", post(register_user))
        .route("/api/users/login", post(login_user));

    let club_routes = Router::new()
        .route("/api/clubs/session", get(session))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            authenticate_club,
        ));

    let user_routes = Router::new()
        .route("/api/users/session", get(session))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            authenticate_user,
        ));

    let admin_routes = Router::new()
        .route("/api/users/admin/session", get(session))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    // Headers are left out of the span: they carry bearer tokens.
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(club_routes)
        .merge(user_routes)
        .merge(admin_routes)
        .layer(
            ServiceBuilder::new()
                .layer(trace_layer)
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
