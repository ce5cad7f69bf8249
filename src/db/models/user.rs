use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    /// Bcrypt hash. Never serialized into API responses; handlers expose
    /// `UserResponse` instead.
    #[serde(skip_serializing)]
    pub password: String,
    pub email: Option<String>,
    pub role: String,
    pub member_id: Option<i64>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

/// User row joined with the linked member's name, for the admin user list.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserWithMemberName {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub role: String,
    pub member_id: Option<i64>,
    pub member_name: Option<String>,
}
