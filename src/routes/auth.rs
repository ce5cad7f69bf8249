use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::db::{MemberRepository, UserRepository};
use crate::error::AppError;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/profile", get(profile))
        .route("/change-password", put(change_password))
        .route("/users", get(list_users))
        .route("/users/:id", put(update_user).delete(delete_user))
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
    pub role: Option<String>,
    pub member_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub role: String,
    pub member_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member: Option<crate::db::models::Member>,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    /// Absent keeps the current link; an explicit `null` clears it.
    #[serde(default, deserialize_with = "double_option")]
    pub member_id: Option<Option<i64>>,
    pub password: Option<String>,
}

/// Deserializes a present-but-null field to `Some(None)` so handlers can
/// tell "not sent" apart from "sent as null".
fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<i64>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

fn user_response(user: &crate::db::models::User) -> UserResponse {
    UserResponse {
        id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
        role: user.role.clone(),
        member_id: user.member_id,
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Authenticate with username and password, returning a signed JWT.
async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    if request.username.is_empty() || request.password.is_empty() {
        return Err(AppError::BadRequest(
            "Username and password are required".to_string(),
        ));
    }

    let user = UserRepository::find_by_username(&state.db, &request.username)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !bcrypt::verify(&request.password, &user.password)? {
        return Err(AppError::Unauthorized);
    }

    let token = create_jwt(&state, &user)?;

    tracing::info!("User {} logged in", user.username);

    Ok(Json(LoginResponse {
        token,
        user: user_response(&user),
    }))
}

/// Register a new user account.
async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> Result<(http::StatusCode, Json<UserResponse>), AppError> {
    if request.username.is_empty() || request.password.is_empty() {
        return Err(AppError::BadRequest(
            "Username and password are required".to_string(),
        ));
    }

    if UserRepository::find_by_username(&state.db, &request.username)
        .await?
        .is_some()
    {
        return Err(AppError::BadRequest(
            "Username is already in use".to_string(),
        ));
    }

    if let Some(email) = request.email.as_deref() {
        if UserRepository::find_by_email(&state.db, email).await?.is_some() {
            return Err(AppError::BadRequest("Email is already in use".to_string()));
        }
    }

    let hash = bcrypt::hash(&request.password, bcrypt::DEFAULT_COST)?;
    let user = UserRepository::create(
        &state.db,
        &request.username,
        &hash,
        request.email.as_deref(),
        request.role.as_deref().unwrap_or("user"),
        request.member_id,
    )
    .await?;

    Ok((http::StatusCode::CREATED, Json(user_response(&user))))
}

/// Current user's profile, including the linked member record when present.
async fn profile(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<Json<ProfileResponse>, AppError> {
    let member = match user.member_id {
        Some(member_id) => MemberRepository::find_by_id(&state.db, member_id).await?,
        None => None,
    };

    Ok(Json(ProfileResponse {
        user: user_response(&user),
        member,
    }))
}

/// Change the current user's password after verifying the current one.
async fn change_password(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    if request.current_password.is_empty() || request.new_password.is_empty() {
        return Err(AppError::BadRequest(
            "Current and new passwords are required".to_string(),
        ));
    }

    if !bcrypt::verify(&request.current_password, &user.password)? {
        return Err(AppError::Unauthorized);
    }

    let hash = bcrypt::hash(&request.new_password, bcrypt::DEFAULT_COST)?;
    UserRepository::update_password(&state.db, user.id, &hash).await?;

    Ok(Json(
        serde_json::json!({ "message": "Password updated successfully" }),
    ))
}

/// List all users joined with their member names. Admin only.
async fn list_users(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<Vec<crate::db::models::UserWithMemberName>>, AppError> {
    let users = UserRepository::list_with_member_names(&state.db).await?;
    Ok(Json(users))
}

/// Update a user account. Admin only. Fields left out keep their current
/// value; a provided password is rehashed. `member_id` can be cleared by
/// sending an explicit `null`; `email` cannot be cleared, only replaced.
async fn update_user(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<i64>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let existing = UserRepository::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let username = request.username.unwrap_or_else(|| existing.username.clone());
    if username != existing.username
        && UserRepository::username_taken(&state.db, &username, id).await?
    {
        return Err(AppError::BadRequest(
            "Username is already in use".to_string(),
        ));
    }

    let email = request.email.or_else(|| existing.email.clone());
    let role = request.role.unwrap_or_else(|| existing.role.clone());
    let member_id = match request.member_id {
        Some(value) => value,
        None => existing.member_id,
    };

    let password_hash = match request.password {
        Some(password) => Some(bcrypt::hash(&password, bcrypt::DEFAULT_COST)?),
        None => None,
    };

    let user = UserRepository::update(
        &state.db,
        id,
        &username,
        email.as_deref(),
        &role,
        member_id,
        password_hash.as_deref(),
    )
    .await?;

    Ok(Json(user_response(&user)))
}

/// Delete a user account. Admin only; self-deletion is refused.
async fn delete_user(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    if id == admin.id {
        return Err(AppError::BadRequest(
            "Cannot delete your own account".to_string(),
        ));
    }

    UserRepository::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    UserRepository::delete(&state.db, id).await?;

    Ok(Json(
        serde_json::json!({ "message": "User deleted successfully" }),
    ))
}

// ============================================================================
// JWT helpers
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub username: String,
    pub role: String,
    pub member_id: Option<i64>,
    pub iat: usize,
    pub exp: usize,
}

/// Create a signed JWT carrying the user's identity and role.
pub fn create_jwt(state: &AppState, user: &crate::db::models::User) -> Result<String, AppError> {
    let now = Utc::now();
    let exp = now + Duration::hours(state.config.jwt.expiration_hours);
    let claims = Claims {
        sub: user.id,
        username: user.username.clone(),
        role: user.role.clone(),
        member_id: user.member_id,
        iat: now.timestamp() as usize,
        exp: exp.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.config.jwt.secret.as_bytes()),
    )?;
    Ok(token)
}

/// Decode and validate a JWT, returning the claims.
pub fn decode_jwt(state: &AppState, token: &str) -> Result<Claims, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.config.jwt.secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

/// Resolve a bearer token to the stored user record.
pub async fn get_user_from_token(
    state: &AppState,
    token: &str,
) -> Result<crate::db::models::User, AppError> {
    let claims = decode_jwt(state, token)?;
    let user = UserRepository::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or(AppError::Unauthorized)?;
    Ok(user)
}

// ============================================================================
// Auth Middleware / Extractors
// ============================================================================

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

/// Extractor for authenticated users (valid Bearer JWT).
pub struct AuthUser(pub crate::db::models::User);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                tracing::debug!("Missing or invalid Authorization header");
                AppError::Unauthorized
            })?;

        if !auth_header.to_ascii_lowercase().starts_with("bearer ") {
            tracing::debug!("Authorization header doesn't start with 'Bearer '");
            return Err(AppError::Unauthorized);
        }

        let token = auth_header[7..].trim();
        if token.is_empty() {
            return Err(AppError::Unauthorized);
        }

        let user = get_user_from_token(state, token).await?;
        Ok(AuthUser(user))
    }
}

/// Extractor for administrators; rejects authenticated non-admin users
/// with 403.
pub struct AdminUser(pub crate::db::models::User);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(AppError::Forbidden);
        }
        Ok(AdminUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn test_state() -> AppState {
        AppState {
            db: sqlx::SqlitePool::connect_lazy("sqlite::memory:").unwrap(),
            config: Config::default(),
        }
    }

    fn test_user(role: &str) -> crate::db::models::User {
        let now = Utc::now().naive_utc();
        crate::db::models::User {
            id: 42,
            username: "maria".to_string(),
            password: "hash".to_string(),
            email: None,
            role: role.to_string(),
            member_id: Some(7),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn jwt_round_trip_preserves_claims() {
        let state = test_state();
        let user = test_user("admin");

        let token = create_jwt(&state, &user).unwrap();
        let claims = decode_jwt(&state, &token).unwrap();

        assert_eq!(claims.sub, 42);
        assert_eq!(claims.username, "maria");
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.member_id, Some(7));
    }

    #[tokio::test]
    async fn jwt_rejects_wrong_secret() {
        let state = test_state();
        let user = test_user("user");
        let token = create_jwt(&state, &user).unwrap();

        let mut other = test_state();
        other.config.jwt.secret = "different-secret".to_string();
        assert!(decode_jwt(&other, &token).is_err());
    }

    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn login_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/auth/login")
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn login_verifies_password_against_stored_hash() {
        let pool = sqlx::SqlitePool::connect("sqlite::memory:").await.unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();

        // Low cost keeps the test fast; verify() does not depend on cost.
        let hash = bcrypt::hash("secret123", 4).unwrap();
        UserRepository::create(&pool, "maria", &hash, None, "user", None)
            .await
            .unwrap();

        let state = std::sync::Arc::new(crate::AppState {
            db: pool,
            config: Config::default(),
        });
        let app = axum::Router::new()
            .nest("/api/auth", router())
            .with_state(state);

        let ok = app
            .clone()
            .oneshot(login_request(
                r#"{"username":"maria","password":"secret123"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(ok.status(), http::StatusCode::OK);

        let body = ok.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(!json["token"].as_str().unwrap().is_empty());
        assert_eq!(json["user"]["username"], "maria");

        let wrong = app
            .clone()
            .oneshot(login_request(
                r#"{"username":"maria","password":"wrong-password"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(wrong.status(), http::StatusCode::UNAUTHORIZED);

        let unknown = app
            .oneshot(login_request(
                r#"{"username":"nobody","password":"secret123"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(unknown.status(), http::StatusCode::UNAUTHORIZED);
    }

    fn update_request(id: i64, token: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("PUT")
            .uri(format!("/api/auth/users/{}", id))
            .header(http::header::AUTHORIZATION, format!("Bearer {}", token))
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn update_user_distinguishes_null_from_absent_member_id() {
        let pool = sqlx::SqlitePool::connect("sqlite::memory:").await.unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();

        let member = MemberRepository::create(&pool, "Jonas", None, None, None, None, true)
            .await
            .unwrap();
        let hash = bcrypt::hash("admin123", 4).unwrap();
        let admin = UserRepository::create(&pool, "admin", &hash, None, "admin", None)
            .await
            .unwrap();
        let target = UserRepository::create(&pool, "jonas", &hash, None, "user", Some(member.id))
            .await
            .unwrap();

        let state = std::sync::Arc::new(crate::AppState {
            db: pool.clone(),
            config: Config::default(),
        });
        let token = create_jwt(&state, &admin).unwrap();
        let app = axum::Router::new()
            .nest("/api/auth", router())
            .with_state(state);

        // An update that leaves member_id out keeps the current link.
        let kept = app
            .clone()
            .oneshot(update_request(target.id, &token, r#"{"role":"user"}"#))
            .await
            .unwrap();
        assert_eq!(kept.status(), http::StatusCode::OK);
        let user = UserRepository::find_by_id(&pool, target.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.member_id, Some(member.id));

        // An explicit null clears it.
        let cleared = app
            .oneshot(update_request(target.id, &token, r#"{"member_id":null}"#))
            .await
            .unwrap();
        assert_eq!(cleared.status(), http::StatusCode::OK);
        let user = UserRepository::find_by_id(&pool, target.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.member_id, None);
    }
}
