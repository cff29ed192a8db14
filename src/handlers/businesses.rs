use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::check_auth;
use crate::errors::AppError;
use crate::services::availability;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct NameRequest {
    pub name: String,
}

#[derive(Serialize)]
pub struct BusinessResponse {
    id: String,
    name: String,
}

// POST /api/businesses
pub async fn create_business(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<NameRequest>,
) -> Result<(StatusCode, Json<BusinessResponse>), AppError> {
    check_auth(&headers, &state.config.api_token)?;

    let business = {
        let db = state.db()?;
        availability::create_business(&db, &req.name)?
    };

    Ok((
        StatusCode::CREATED,
        Json(BusinessResponse {
            id: business.id,
            name: business.name,
        }),
    ))
}

#[derive(Serialize)]
pub struct StaffResponse {
    id: String,
    business_id: String,
    name: String,
}

// POST /api/businesses/:id/staff
pub async fn create_staff(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(business_id): Path<String>,
    Json(req): Json<NameRequest>,
) -> Result<(StatusCode, Json<StaffResponse>), AppError> {
    check_auth(&headers, &state.config.api_token)?;

    let staff = {
        let db = state.db()?;
        availability::create_staff(&db, &business_id, &req.name)?
    };

    Ok((
        StatusCode::CREATED,
        Json(StaffResponse {
            id: staff.id,
            business_id: staff.business_id,
            name: staff.name,
        }),
    ))
}
