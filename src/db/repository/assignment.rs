use sqlx::SqlitePool;

use crate::db::models::{Assignment, AssignmentWithNames};
use crate::error::AppResult;

pub struct AssignmentRepository;

impl AssignmentRepository {
    pub async fn list_by_event(
        pool: &SqlitePool,
        event_id: i64,
    ) -> AppResult<Vec<AssignmentWithNames>> {
        let assignments = sqlx::query_as::<_, AssignmentWithNames>(
            r#"
            SELECT a.*, m.name AS member_name, r.name AS role_name
            FROM assignments a
            JOIN members m ON a.member_id = m.id
            JOIN roles r ON a.role_id = r.id
            WHERE a.event_id = ?
            ORDER BY r.name
            "#,
        )
        .bind(event_id)
        .fetch_all(pool)
        .await?;
        Ok(assignments)
    }

    pub async fn find_by_id_and_event(
        pool: &SqlitePool,
        id: i64,
        event_id: i64,
    ) -> AppResult<Option<Assignment>> {
        let assignment = sqlx::query_as::<_, Assignment>(
            "SELECT * FROM assignments WHERE id = ? AND event_id = ?",
        )
        .bind(id)
        .bind(event_id)
        .fetch_optional(pool)
        .await?;
        Ok(assignment)
    }

    /// An assignment is unique per (event, member, role).
    pub async fn find_duplicate(
        pool: &SqlitePool,
        event_id: i64,
        member_id: i64,
        role_id: i64,
    ) -> AppResult<Option<Assignment>> {
        let assignment = sqlx::query_as::<_, Assignment>(
            "SELECT * FROM assignments WHERE event_id = ? AND member_id = ? AND role_id = ?",
        )
        .bind(event_id)
        .bind(member_id)
        .bind(role_id)
        .fetch_optional(pool)
        .await?;
        Ok(assignment)
    }

    pub async fn create(
        pool: &SqlitePool,
        event_id: i64,
        member_id: i64,
        role_id: i64,
        notes: Option<&str>,
    ) -> AppResult<Assignment> {
        let assignment = sqlx::query_as::<_, Assignment>(
            r#"
            INSERT INTO assignments (event_id, member_id, role_id, notes)
            VALUES (?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(event_id)
        .bind(member_id)
        .bind(role_id)
        .bind(notes)
        .fetch_one(pool)
        .await?;
        Ok(assignment)
    }

    pub async fn delete(pool: &SqlitePool, id: i64) -> AppResult<()> {
        sqlx::query("DELETE FROM assignments WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
