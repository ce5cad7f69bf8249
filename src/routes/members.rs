use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::db::{models::Member, MemberRepository};
use crate::error::AppError;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_members).post(create_member))
        .route(
            "/:id",
            get(get_member).put(update_member).delete(delete_member),
        )
        .route("/ministry/:ministry", get(list_by_ministry))
        .route("/role/:role", get(list_by_role))
}

#[derive(Debug, Deserialize)]
pub struct MemberRequest {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub ministry: Option<String>,
    pub role: Option<String>,
    pub active: Option<bool>,
}

async fn list_members(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Member>>, AppError> {
    let members = MemberRepository::list_all(&state.db).await?;
    Ok(Json(members))
}

async fn get_member(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Member>, AppError> {
    let member = MemberRepository::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;
    Ok(Json(member))
}

async fn create_member(
    State(state): State<Arc<AppState>>,
    Json(request): Json<MemberRequest>,
) -> Result<(http::StatusCode, Json<Member>), AppError> {
    if request.name.is_empty() {
        return Err(AppError::BadRequest("Name is required".to_string()));
    }

    let member = MemberRepository::create(
        &state.db,
        &request.name,
        request.email.as_deref(),
        request.phone.as_deref(),
        request.ministry.as_deref(),
        request.role.as_deref(),
        request.active.unwrap_or(true),
    )
    .await?;

    Ok((http::StatusCode::CREATED, Json(member)))
}

async fn update_member(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(request): Json<MemberRequest>,
) -> Result<Json<Member>, AppError> {
    if request.name.is_empty() {
        return Err(AppError::BadRequest("Name is required".to_string()));
    }

    let existing = MemberRepository::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;

    let member = MemberRepository::update(
        &state.db,
        id,
        &request.name,
        request.email.as_deref(),
        request.phone.as_deref(),
        request.ministry.as_deref(),
        request.role.as_deref(),
        request.active.unwrap_or(existing.active),
    )
    .await?;

    Ok(Json(member))
}

/// Members that still appear in assignments cannot be deleted; the caller
/// receives the assignment count so the dashboard can explain the refusal.
async fn delete_member(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    MemberRepository::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;

    let assignment_count = MemberRepository::assignment_count(&state.db, id).await?;
    if assignment_count > 0 {
        return Err(AppError::Conflict(format!(
            "Member is assigned to {} event(s) and cannot be deleted",
            assignment_count
        )));
    }

    MemberRepository::delete(&state.db, id).await?;

    Ok(Json(
        serde_json::json!({ "message": "Member deleted successfully" }),
    ))
}

async fn list_by_ministry(
    State(state): State<Arc<AppState>>,
    Path(ministry): Path<String>,
) -> Result<Json<Vec<Member>>, AppError> {
    let members = MemberRepository::list_by_ministry(&state.db, &ministry).await?;
    Ok(Json(members))
}

async fn list_by_role(
    State(state): State<Arc<AppState>>,
    Path(role): Path<String>,
) -> Result<Json<Vec<Member>>, AppError> {
    let members = MemberRepository::list_by_role(&state.db, &role).await?;
    Ok(Json(members))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::db::{
        AssignmentRepository, EventRepository, RoleRepository, ScheduleRepository,
        ScheduleTypeRepository,
    };
    use axum::body::Body;
    use axum::http::Request;
    use chrono::NaiveDate;
    use tower::ServiceExt;

    async fn test_app() -> (axum::Router, sqlx::SqlitePool) {
        let pool = sqlx::SqlitePool::connect("sqlite::memory:").await.unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();

        let state = Arc::new(crate::AppState {
            db: pool.clone(),
            config: Config::default(),
        });
        let app = axum::Router::new()
            .nest("/api/members", router())
            .with_state(state);
        (app, pool)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn delete_refused_while_member_is_assigned() {
        let (app, pool) = test_app().await;

        let member = MemberRepository::create(&pool, "Moisés", None, None, None, None, true)
            .await
            .unwrap();
        RoleRepository::upsert(&pool, "Violão", None, None).await.unwrap();
        let role = RoleRepository::find_by_name(&pool, "Violão")
            .await
            .unwrap()
            .unwrap();
        ScheduleTypeRepository::upsert(&pool, "Louvor", None).await.unwrap();
        let schedule_type = sqlx::query_as::<_, crate::db::models::ScheduleType>(
            "SELECT * FROM schedule_types WHERE name = 'Louvor'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        let schedule = ScheduleRepository::create(
            &pool,
            schedule_type.id,
            "Junho",
            date(2024, 6, 1),
            date(2024, 6, 30),
            "draft",
        )
        .await
        .unwrap();
        let event = EventRepository::create(&pool, schedule.id, "Culto", date(2024, 6, 2), None, None)
            .await
            .unwrap();
        let assignment = AssignmentRepository::create(&pool, event.id, member.id, role.id, None)
            .await
            .unwrap();

        let refused = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/members/{}", member.id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(refused.status(), http::StatusCode::CONFLICT);
        assert!(MemberRepository::find_by_id(&pool, member.id)
            .await
            .unwrap()
            .is_some());

        // Once the assignment is gone the delete goes through.
        AssignmentRepository::delete(&pool, assignment.id).await.unwrap();

        let allowed = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/members/{}", member.id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(allowed.status(), http::StatusCode::OK);
        assert!(MemberRepository::find_by_id(&pool, member.id)
            .await
            .unwrap()
            .is_none());
    }
}
