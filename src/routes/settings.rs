use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::db::models::Setting;
use crate::db::SettingRepository;
use crate::error::AppError;
use crate::routes::auth::{AdminUser, AuthUser};
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_settings))
        .route("/church/info", get(church_info))
        .route(
            "/:key",
            get(get_setting).put(update_setting).delete(delete_setting),
        )
}

#[derive(Debug, Deserialize)]
pub struct SettingRequest {
    pub value: String,
    pub description: Option<String>,
}

/// Contact card the public site renders. Folded from the `church_*` keys,
/// with fallbacks for keys that were never configured.
#[derive(Debug, Serialize)]
pub struct ChurchInfo {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
}

async fn list_settings(
    State(state): State<Arc<AppState>>,
    AuthUser(_user): AuthUser,
) -> Result<Json<Vec<Setting>>, AppError> {
    let settings = SettingRepository::list_all(&state.db).await?;
    Ok(Json(settings))
}

async fn get_setting(
    State(state): State<Arc<AppState>>,
    AuthUser(_user): AuthUser,
    Path(key): Path<String>,
) -> Result<Json<Setting>, AppError> {
    let setting = SettingRepository::find_by_key(&state.db, &key)
        .await?
        .ok_or_else(|| AppError::NotFound("Setting not found".to_string()))?;
    Ok(Json(setting))
}

async fn update_setting(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path(key): Path<String>,
    Json(request): Json<SettingRequest>,
) -> Result<Json<Setting>, AppError> {
    let setting = match SettingRepository::find_by_key(&state.db, &key).await? {
        Some(existing) => {
            let description = request
                .description
                .as_deref()
                .or(existing.description.as_deref());
            SettingRepository::update(&state.db, &key, &request.value, description).await?
        }
        None => {
            SettingRepository::create(
                &state.db,
                &key,
                &request.value,
                request.description.as_deref(),
            )
            .await?
        }
    };

    Ok(Json(setting))
}

async fn delete_setting(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path(key): Path<String>,
) -> Result<Json<Value>, AppError> {
    SettingRepository::find_by_key(&state.db, &key)
        .await?
        .ok_or_else(|| AppError::NotFound("Setting not found".to_string()))?;

    SettingRepository::delete(&state.db, &key).await?;

    Ok(Json(
        serde_json::json!({ "message": "Setting deleted successfully" }),
    ))
}

async fn church_info(State(state): State<Arc<AppState>>) -> Result<Json<ChurchInfo>, AppError> {
    let settings = SettingRepository::list_by_prefix(&state.db, "church_").await?;

    let value_of = |key: &str, default: &str| {
        settings
            .iter()
            .find(|s| s.key == key)
            .and_then(|s| s.value.clone())
            .unwrap_or_else(|| default.to_string())
    };

    Ok(Json(ChurchInfo {
        name: value_of("church_name", "Igreja"),
        address: value_of("church_address", ""),
        phone: value_of("church_phone", ""),
        email: value_of("church_email", ""),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn test_app() -> (axum::Router, sqlx::SqlitePool) {
        let pool = sqlx::SqlitePool::connect("sqlite::memory:").await.unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();

        let state = Arc::new(crate::AppState {
            db: pool.clone(),
            config: Config::default(),
        });
        let app = axum::Router::new()
            .nest("/api/settings", router())
            .with_state(state);
        (app, pool)
    }

    async fn fetch_church_info(app: axum::Router) -> serde_json::Value {
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/settings/church/info")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), http::StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn church_info_folds_configured_keys() {
        let (app, pool) = test_app().await;

        SettingRepository::create(&pool, "church_name", "Igreja Batista Central", None)
            .await
            .unwrap();
        SettingRepository::create(&pool, "church_phone", "(61) 99999-0000", None)
            .await
            .unwrap();

        let json = fetch_church_info(app).await;
        assert_eq!(json["name"], "Igreja Batista Central");
        assert_eq!(json["phone"], "(61) 99999-0000");
        // Unconfigured keys fall back.
        assert_eq!(json["address"], "");
        assert_eq!(json["email"], "");
    }

    #[tokio::test]
    async fn church_info_defaults_when_nothing_configured() {
        let (app, _pool) = test_app().await;

        let json = fetch_church_info(app).await;
        assert_eq!(json["name"], "Igreja");
        assert_eq!(json["address"], "");
        assert_eq!(json["phone"], "");
        assert_eq!(json["email"], "");
    }
}
