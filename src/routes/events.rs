use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{delete, get},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::db::models::{AssignmentWithNames, Event, EventWithCount, EventWithSchedule};
use crate::db::{
    AssignmentRepository, EventRepository, MemberRepository, RoleRepository, ScheduleRepository,
};
use crate::error::AppError;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_events).post(create_event))
        .route("/schedule/:schedule_id", get(list_by_schedule))
        .route("/:id", get(get_event).put(update_event).delete(delete_event))
        .route("/:id/assignments", axum::routing::post(create_assignment))
        .route(
            "/:event_id/assignments/:assignment_id",
            delete(delete_assignment),
        )
}

#[derive(Debug, Deserialize)]
pub struct EventRequest {
    pub schedule_id: i64,
    pub title: String,
    pub event_date: NaiveDate,
    pub event_type: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AssignmentRequest {
    pub member_id: i64,
    pub role_id: i64,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EventDetailResponse {
    #[serde(flatten)]
    pub event: Event,
    pub assignments: Vec<AssignmentWithNames>,
}

async fn list_events(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<EventWithSchedule>>, AppError> {
    let events = EventRepository::list_all(&state.db).await?;
    Ok(Json(events))
}

async fn list_by_schedule(
    State(state): State<Arc<AppState>>,
    Path(schedule_id): Path<i64>,
) -> Result<Json<Vec<EventWithCount>>, AppError> {
    let events = EventRepository::list_by_schedule(&state.db, schedule_id).await?;
    Ok(Json(events))
}

async fn get_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<EventDetailResponse>, AppError> {
    let event = EventRepository::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    let assignments = AssignmentRepository::list_by_event(&state.db, id).await?;

    Ok(Json(EventDetailResponse { event, assignments }))
}

async fn create_event(
    State(state): State<Arc<AppState>>,
    Json(request): Json<EventRequest>,
) -> Result<(http::StatusCode, Json<Event>), AppError> {
    if request.title.is_empty() {
        return Err(AppError::BadRequest("Title is required".to_string()));
    }

    ScheduleRepository::find_by_id(&state.db, request.schedule_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("Schedule not found".to_string()))?;

    let event = EventRepository::create(
        &state.db,
        request.schedule_id,
        &request.title,
        request.event_date,
        request.event_type.as_deref(),
        request.description.as_deref(),
    )
    .await?;

    Ok((http::StatusCode::CREATED, Json(event)))
}

async fn update_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(request): Json<EventRequest>,
) -> Result<Json<Event>, AppError> {
    if request.title.is_empty() {
        return Err(AppError::BadRequest("Title is required".to_string()));
    }

    EventRepository::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    ScheduleRepository::find_by_id(&state.db, request.schedule_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("Schedule not found".to_string()))?;

    let event = EventRepository::update(
        &state.db,
        id,
        request.schedule_id,
        &request.title,
        request.event_date,
        request.event_type.as_deref(),
        request.description.as_deref(),
    )
    .await?;

    Ok(Json(event))
}

async fn delete_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    EventRepository::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    EventRepository::delete_cascade(&state.db, id).await?;

    Ok(Json(
        serde_json::json!({ "message": "Event deleted successfully" }),
    ))
}

async fn create_assignment(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<i64>,
    Json(request): Json<AssignmentRequest>,
) -> Result<(http::StatusCode, Json<AssignmentWithNames>), AppError> {
    EventRepository::find_by_id(&state.db, event_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    let member = MemberRepository::find_by_id(&state.db, request.member_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("Member not found".to_string()))?;

    let role = RoleRepository::find_by_id(&state.db, request.role_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("Role not found".to_string()))?;

    if AssignmentRepository::find_duplicate(&state.db, event_id, member.id, role.id)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "Member is already assigned to this event with this role".to_string(),
        ));
    }

    let assignment = AssignmentRepository::create(
        &state.db,
        event_id,
        member.id,
        role.id,
        request.notes.as_deref(),
    )
    .await?;

    let response = AssignmentWithNames {
        id: assignment.id,
        event_id: assignment.event_id,
        member_id: assignment.member_id,
        role_id: assignment.role_id,
        notes: assignment.notes,
        member_name: member.name,
        role_name: role.name,
        created_at: assignment.created_at,
        updated_at: assignment.updated_at,
    };

    Ok((http::StatusCode::CREATED, Json(response)))
}

async fn delete_assignment(
    State(state): State<Arc<AppState>>,
    Path((event_id, assignment_id)): Path<(i64, i64)>,
) -> Result<Json<Value>, AppError> {
    AssignmentRepository::find_by_id_and_event(&state.db, assignment_id, event_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Assignment not found".to_string()))?;

    AssignmentRepository::delete(&state.db, assignment_id).await?;

    Ok(Json(
        serde_json::json!({ "message": "Assignment removed successfully" }),
    ))
}
