use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Assignment {
    pub id: i64,
    pub event_id: i64,
    pub member_id: i64,
    pub role_id: i64,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Assignment joined with the member and role names, as shown on the event
/// detail view.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AssignmentWithNames {
    pub id: i64,
    pub event_id: i64,
    pub member_id: i64,
    pub role_id: i64,
    pub notes: Option<String>,
    pub member_name: String,
    pub role_name: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
