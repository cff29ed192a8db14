use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::check_auth;
use crate::errors::AppError;
use crate::models::{serialize_week, DayRecord};
use crate::services::availability::{self, OpenStatus};
use crate::state::AppState;

#[derive(Serialize)]
pub struct BusinessHoursResponse {
    business_hours: Vec<DayRecord>,
}

// GET /api/businesses/:id/availability
pub async fn get_business_availability(
    State(state): State<Arc<AppState>>,
    Path(business_id): Path<String>,
) -> Result<Json<BusinessHoursResponse>, AppError> {
    let week = {
        let db = state.db()?;
        availability::business_hours(&db, &business_id)?
    };

    Ok(Json(BusinessHoursResponse {
        business_hours: serialize_week(&week),
    }))
}

#[derive(Deserialize)]
pub struct BusinessProfileRequest {
    pub business_hours: Option<Vec<DayRecord>>,
}

// POST /api/businesses/:id/profile
pub async fn save_business_profile(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(business_id): Path<String>,
    Json(req): Json<BusinessProfileRequest>,
) -> Result<Json<BusinessHoursResponse>, AppError> {
    check_auth(&headers, &state.config.api_token)?;

    let week = {
        let db = state.db()?;
        availability::save_business_hours(&db, &business_id, req.business_hours.as_deref())?
    };

    Ok(Json(BusinessHoursResponse {
        business_hours: serialize_week(&week),
    }))
}

#[derive(Serialize)]
pub struct StaffAvailabilityResponse {
    staff_hours: Vec<DayRecord>,
    business_hours: Vec<DayRecord>,
}

// GET /api/staff/:id/availability
pub async fn get_staff_availability(
    State(state): State<Arc<AppState>>,
    Path(staff_id): Path<String>,
) -> Result<Json<StaffAvailabilityResponse>, AppError> {
    let found = {
        let db = state.db()?;
        availability::staff_availability(&db, &staff_id)?
    };

    Ok(Json(StaffAvailabilityResponse {
        staff_hours: serialize_week(&found.staff_hours),
        business_hours: serialize_week(&found.business_hours),
    }))
}

#[derive(Deserialize)]
pub struct StaffDetailsRequest {
    pub staff_hours: Option<Vec<DayRecord>>,
    #[serde(default)]
    pub use_business_hours: bool,
}

#[derive(Serialize)]
pub struct StaffHoursResponse {
    staff_hours: Vec<DayRecord>,
}

// POST /api/staff/:id/details
pub async fn save_staff_details(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(staff_id): Path<String>,
    Json(req): Json<StaffDetailsRequest>,
) -> Result<Json<StaffHoursResponse>, AppError> {
    check_auth(&headers, &state.config.api_token)?;

    let week = {
        let db = state.db()?;
        availability::save_staff_hours(
            &db,
            &staff_id,
            req.staff_hours.as_deref(),
            req.use_business_hours,
        )?
    };

    Ok(Json(StaffHoursResponse {
        staff_hours: serialize_week(&week),
    }))
}

#[derive(Deserialize)]
pub struct OpenQuery {
    pub at: String,
}

// GET /api/staff/:id/open?at=2025-06-16T10:00
pub async fn staff_open(
    State(state): State<Arc<AppState>>,
    Path(staff_id): Path<String>,
    Query(query): Query<OpenQuery>,
) -> Result<Json<OpenStatus>, AppError> {
    let at = parse_instant(&query.at)?;

    let status = {
        let db = state.db()?;
        availability::staff_open_at(&db, &staff_id, &at)?
    };

    Ok(Json(status))
}

fn parse_instant(s: &str) -> Result<NaiveDateTime, AppError> {
    ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .ok_or_else(|| AppError::BadRequest(format!("invalid date-time: {s}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_instant_formats() {
        let expected =
            NaiveDateTime::parse_from_str("2025-06-16 10:00", "%Y-%m-%d %H:%M").unwrap();
        assert_eq!(parse_instant("2025-06-16T10:00").unwrap(), expected);
        assert_eq!(parse_instant("2025-06-16T10:00:00").unwrap(), expected);
        assert_eq!(parse_instant("2025-06-16 10:00").unwrap(), expected);
        assert!(matches!(
            parse_instant("next tuesday"),
            Err(AppError::BadRequest(_))
        ));
    }
}
