pub mod availability;
pub mod businesses;
pub mod health;

use std::sync::Arc;

use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::Router;

use crate::errors::AppError;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/businesses", post(businesses::create_business))
        .route(
            "/api/businesses/:id/staff",
            post(businesses::create_staff),
        )
        .route(
            "/api/businesses/:id/availability",
            get(availability::get_business_availability),
        )
        .route(
            "/api/businesses/:id/profile",
            post(availability::save_business_profile),
        )
        .route(
            "/api/staff/:id/availability",
            get(availability::get_staff_availability),
        )
        .route(
            "/api/staff/:id/details",
            post(availability::save_staff_details),
        )
        .route("/api/staff/:id/open", get(availability::staff_open))
        .with_state(state)
}

/// Writes require `Authorization: Bearer <API_TOKEN>`.
fn check_auth(headers: &HeaderMap, expected_token: &str) -> Result<(), AppError> {
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or("");

    if token.is_empty() || token != expected_token {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}
