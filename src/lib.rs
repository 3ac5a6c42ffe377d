//! Rental Assistance Intake
//!
//! A REST backend and UI-agnostic multi-step form engine for a rental
//! assistance program. The form engine (draft, step machine, validators,
//! draft persistence, location prefill) lives in [`form`] and [`geo`] and is
//! consumed by the web client; the backend exposes the submission, contact
//! and location endpoints and delivers notification email.

pub mod api;
pub mod config;
pub mod errors;
pub mod form;
pub mod geo;
pub mod models;
pub mod notify;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use geo::GeoClient;
use notify::NotificationDispatcher;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub geo: Arc<GeoClient>,
    pub notifier: Arc<NotificationDispatcher>,
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/application/submit", post(api::submit_application))
        .route("/contact", post(api::submit_contact))
        .route("/location", get(api::lookup_location));

    // Health check
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests;
