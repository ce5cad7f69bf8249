use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ============================================================================
// Event Models
// ============================================================================

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub schedule_id: i64,
    pub title: String,
    pub event_date: NaiveDate,
    pub event_type: Option<String>,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Event with the number of assignments attached to it, as shown in
/// schedule and event listings.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct EventWithCount {
    pub id: i64,
    pub schedule_id: i64,
    pub title: String,
    pub event_date: NaiveDate,
    pub event_type: Option<String>,
    pub description: Option<String>,
    pub assignment_count: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Event joined with its owning schedule, for the global event listing.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct EventWithSchedule {
    pub id: i64,
    pub schedule_id: i64,
    pub title: String,
    pub event_date: NaiveDate,
    pub event_type: Option<String>,
    pub description: Option<String>,
    pub schedule_title: String,
    pub type_id: i64,
    pub assignment_count: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
