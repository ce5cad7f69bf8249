use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ============================================================================
// Schedule Models
// ============================================================================

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ScheduleType {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// A schedule is a dated container of events of one type. The invariant
/// `start_date <= end_date` is validated when the record is created or
/// updated through the API.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Schedule {
    pub id: i64,
    pub type_id: i64,
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Schedule joined with its type name, as returned by the list and detail
/// endpoints.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ScheduleWithType {
    pub id: i64,
    pub type_id: i64,
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: String,
    pub type_name: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
