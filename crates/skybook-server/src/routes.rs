//! Route table and middleware wiring.

use crate::error::ApiError;
use crate::handlers::{login, register, session, user};
use crate::middleware::{auth, guard};
use crate::state::SharedState;
use axum::http::{HeaderValue, Method, header};
use axum::routing::{get, post, put};
use axum::{Json, Router, middleware};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn router(state: SharedState) -> Router {
    let admin = Router::new()
        .route("/user", post(user::create))
        .route("/user/{email}", put(user::update_roles))
        .route_layer(middleware::from_fn(|req, next| {
            guard::require_roles(guard::ADMIN_ONLY, req, next)
        }));

    let authenticated = Router::new()
        .route("/authentication/verify", get(session::verify))
        .route("/authentication/logout", get(session::logout))
        .merge(admin)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_session,
        ));

    Router::new()
        .route("/healthz", get(healthz))
        .route(
            "/authentication/register",
            get(register::options).post(register::complete),
        )
        .route(
            "/authentication/login",
            get(login::options).post(login::complete),
        )
        .merge(authenticated)
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors(&state))
        .with_state(state)
}

/// Allow the configured relying-party origin with credentials (the session
/// cookie rides along on ceremony completions).
fn cors(state: &SharedState) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);
    match state.config.relying_party.origin.parse::<HeaderValue>() {
        Ok(origin) => layer.allow_origin(origin),
        Err(e) => {
            tracing::warn!(error = %e, "relying-party origin is not a usable CORS origin");
            layer
        }
    }
}

async fn healthz() -> Json<serde_json::Value> {
    Json(json!({ "ok": true, "service": "skybook-server" }))
}

async fn not_found() -> ApiError {
    ApiError::not_found("no such route")
}
