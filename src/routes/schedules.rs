use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::db::models::{Event, EventWithCount, Schedule, ScheduleType, ScheduleWithType};
use crate::db::{EventRepository, ScheduleRepository, ScheduleTypeRepository};
use crate::error::AppError;
use crate::services::generator;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_schedules).post(create_schedule))
        .route("/types", get(list_schedule_types))
        .route(
            "/:id",
            get(get_schedule).put(update_schedule).delete(delete_schedule),
        )
        .route("/:id/generate", post(generate_schedule_events))
}

#[derive(Debug, Deserialize)]
pub struct ScheduleRequest {
    pub type_id: i64,
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ScheduleDetailResponse {
    #[serde(flatten)]
    pub schedule: ScheduleWithType,
    pub events: Vec<EventWithCount>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub message: String,
    pub events: Vec<Event>,
}

async fn list_schedule_types(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ScheduleType>>, AppError> {
    let types = ScheduleTypeRepository::list_all(&state.db).await?;
    Ok(Json(types))
}

async fn list_schedules(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ScheduleWithType>>, AppError> {
    let schedules = ScheduleRepository::list_all(&state.db).await?;
    Ok(Json(schedules))
}

async fn get_schedule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ScheduleDetailResponse>, AppError> {
    let schedule = ScheduleRepository::find_by_id_with_type(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Schedule not found".to_string()))?;

    let events = EventRepository::list_by_schedule(&state.db, id).await?;

    Ok(Json(ScheduleDetailResponse { schedule, events }))
}

async fn create_schedule(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ScheduleRequest>,
) -> Result<(http::StatusCode, Json<Schedule>), AppError> {
    validate_schedule_request(&request)?;

    ScheduleTypeRepository::find_by_id(&state.db, request.type_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("Schedule type not found".to_string()))?;

    let schedule = ScheduleRepository::create(
        &state.db,
        request.type_id,
        &request.title,
        request.start_date,
        request.end_date,
        request.status.as_deref().unwrap_or("draft"),
    )
    .await?;

    Ok((http::StatusCode::CREATED, Json(schedule)))
}

async fn update_schedule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(request): Json<ScheduleRequest>,
) -> Result<Json<Schedule>, AppError> {
    validate_schedule_request(&request)?;

    let existing = ScheduleRepository::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Schedule not found".to_string()))?;

    ScheduleTypeRepository::find_by_id(&state.db, request.type_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("Schedule type not found".to_string()))?;

    let schedule = ScheduleRepository::update(
        &state.db,
        id,
        request.type_id,
        &request.title,
        request.start_date,
        request.end_date,
        request.status.as_deref().unwrap_or(&existing.status),
    )
    .await?;

    Ok(Json(schedule))
}

async fn delete_schedule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    ScheduleRepository::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Schedule not found".to_string()))?;

    ScheduleRepository::delete_cascade(&state.db, id).await?;

    Ok(Json(
        serde_json::json!({ "message": "Schedule deleted successfully" }),
    ))
}

/// Expand the schedule's date range into concrete events. Eligibility is
/// decided by the schedule type's name; ineligible types report a distinct
/// message instead of failing.
async fn generate_schedule_events(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<GenerateResponse>, AppError> {
    let schedule = ScheduleRepository::find_by_id_with_type(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Schedule not found".to_string()))?;

    if generator::rule_for(&schedule.type_name).is_none() {
        return Ok(Json(GenerateResponse {
            message: format!(
                "Schedule type '{}' does not support automatic generation",
                schedule.type_name
            ),
            events: Vec::new(),
        }));
    }

    let inner = Schedule {
        id: schedule.id,
        type_id: schedule.type_id,
        title: schedule.title.clone(),
        start_date: schedule.start_date,
        end_date: schedule.end_date,
        status: schedule.status.clone(),
        created_at: schedule.created_at,
        updated_at: schedule.updated_at,
    };

    let events = generator::generate_events(&state.db, &inner, &schedule.type_name).await?;

    Ok(Json(GenerateResponse {
        message: "Schedule generated successfully".to_string(),
        events,
    }))
}

fn validate_schedule_request(request: &ScheduleRequest) -> Result<(), AppError> {
    if request.title.is_empty() {
        return Err(AppError::BadRequest("Title is required".to_string()));
    }
    if request.start_date > request.end_date {
        return Err(AppError::BadRequest(
            "Start date must not be after end date".to_string(),
        ));
    }
    Ok(())
}
