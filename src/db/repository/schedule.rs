use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::db::models::{Schedule, ScheduleType, ScheduleWithType};
use crate::error::AppResult;

// ============================================================================
// Schedule Type Repository
// ============================================================================

pub struct ScheduleTypeRepository;

impl ScheduleTypeRepository {
    pub async fn list_all(pool: &SqlitePool) -> AppResult<Vec<ScheduleType>> {
        let types =
            sqlx::query_as::<_, ScheduleType>("SELECT * FROM schedule_types ORDER BY name")
                .fetch_all(pool)
                .await?;
        Ok(types)
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> AppResult<Option<ScheduleType>> {
        let schedule_type =
            sqlx::query_as::<_, ScheduleType>("SELECT * FROM schedule_types WHERE id = ?")
                .bind(id)
                .fetch_optional(pool)
                .await?;
        Ok(schedule_type)
    }

    /// Idempotent insert used by the startup seed.
    pub async fn upsert(
        pool: &SqlitePool,
        name: &str,
        description: Option<&str>,
    ) -> AppResult<()> {
        sqlx::query("INSERT OR IGNORE INTO schedule_types (name, description) VALUES (?, ?)")
            .bind(name)
            .bind(description)
            .execute(pool)
            .await?;
        Ok(())
    }
}

// ============================================================================
// Schedule Repository
// ============================================================================

pub struct ScheduleRepository;

impl ScheduleRepository {
    pub async fn list_all(pool: &SqlitePool) -> AppResult<Vec<ScheduleWithType>> {
        let schedules = sqlx::query_as::<_, ScheduleWithType>(
            r#"
            SELECT s.*, st.name AS type_name
            FROM schedules s
            JOIN schedule_types st ON s.type_id = st.id
            ORDER BY s.start_date DESC
            "#,
        )
        .fetch_all(pool)
        .await?;
        Ok(schedules)
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> AppResult<Option<Schedule>> {
        let schedule = sqlx::query_as::<_, Schedule>("SELECT * FROM schedules WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(schedule)
    }

    pub async fn find_by_id_with_type(
        pool: &SqlitePool,
        id: i64,
    ) -> AppResult<Option<ScheduleWithType>> {
        let schedule = sqlx::query_as::<_, ScheduleWithType>(
            r#"
            SELECT s.*, st.name AS type_name
            FROM schedules s
            JOIN schedule_types st ON s.type_id = st.id
            WHERE s.id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(schedule)
    }

    pub async fn create(
        pool: &SqlitePool,
        type_id: i64,
        title: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        status: &str,
    ) -> AppResult<Schedule> {
        let schedule = sqlx::query_as::<_, Schedule>(
            r#"
            INSERT INTO schedules (type_id, title, start_date, end_date, status)
            VALUES (?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(type_id)
        .bind(title)
        .bind(start_date)
        .bind(end_date)
        .bind(status)
        .fetch_one(pool)
        .await?;
        Ok(schedule)
    }

    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        type_id: i64,
        title: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        status: &str,
    ) -> AppResult<Schedule> {
        let schedule = sqlx::query_as::<_, Schedule>(
            r#"
            UPDATE schedules
            SET type_id = ?, title = ?, start_date = ?, end_date = ?, status = ?,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(type_id)
        .bind(title)
        .bind(start_date)
        .bind(end_date)
        .bind(status)
        .bind(id)
        .fetch_one(pool)
        .await?;
        Ok(schedule)
    }

    /// Delete a schedule together with its events and their assignments.
    /// The store has no foreign-key cascade, so the cleanup is an explicit
    /// transaction.
    pub async fn delete_cascade(pool: &SqlitePool, id: i64) -> AppResult<()> {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r#"
            DELETE FROM assignments
            WHERE event_id IN (SELECT id FROM events WHERE schedule_id = ?)
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM events WHERE schedule_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM schedules WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{AssignmentRepository, EventRepository, MemberRepository, RoleRepository};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        pool
    }

    async fn seed_schedule(pool: &SqlitePool, title: &str) -> Schedule {
        ScheduleTypeRepository::upsert(pool, "Cultos", None).await.unwrap();
        let schedule_type =
            sqlx::query_as::<_, ScheduleType>("SELECT * FROM schedule_types WHERE name = 'Cultos'")
                .fetch_one(pool)
                .await
                .unwrap();
        ScheduleRepository::create(
            pool,
            schedule_type.id,
            title,
            date(2024, 6, 1),
            date(2024, 6, 30),
            "draft",
        )
        .await
        .unwrap()
    }

    async fn seed_event_with_assignment(pool: &SqlitePool, schedule_id: i64) -> i64 {
        let member = MemberRepository::create(pool, "Jonas", None, None, None, None, true)
            .await
            .unwrap();
        RoleRepository::upsert(pool, "Baixo", None, None).await.unwrap();
        let role = RoleRepository::find_by_name(pool, "Baixo")
            .await
            .unwrap()
            .unwrap();
        let event = EventRepository::create(pool, schedule_id, "Culto", date(2024, 6, 2), None, None)
            .await
            .unwrap();
        AssignmentRepository::create(pool, event.id, member.id, role.id, None)
            .await
            .unwrap();
        event.id
    }

    #[tokio::test]
    async fn delete_cascade_removes_events_and_assignments() {
        let pool = test_pool().await;
        let doomed = seed_schedule(&pool, "Junho").await;
        let survivor = seed_schedule(&pool, "Julho").await;
        let doomed_event = seed_event_with_assignment(&pool, doomed.id).await;
        let survivor_event = seed_event_with_assignment(&pool, survivor.id).await;

        ScheduleRepository::delete_cascade(&pool, doomed.id).await.unwrap();

        assert!(ScheduleRepository::find_by_id(&pool, doomed.id)
            .await
            .unwrap()
            .is_none());
        assert!(EventRepository::find_by_id(&pool, doomed_event)
            .await
            .unwrap()
            .is_none());

        let orphaned: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM assignments WHERE event_id = ?")
                .bind(doomed_event)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(orphaned, 0);

        // The other schedule's rows are untouched.
        assert!(ScheduleRepository::find_by_id(&pool, survivor.id)
            .await
            .unwrap()
            .is_some());
        let kept = AssignmentRepository::list_by_event(&pool, survivor_event)
            .await
            .unwrap();
        assert_eq!(kept.len(), 1);
    }
}
