use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::db::models::{Event, EventWithCount, EventWithSchedule};
use crate::error::AppResult;

pub struct EventRepository;

impl EventRepository {
    pub async fn list_all(pool: &SqlitePool) -> AppResult<Vec<EventWithSchedule>> {
        let events = sqlx::query_as::<_, EventWithSchedule>(
            r#"
            SELECT e.*, s.title AS schedule_title, s.type_id,
                (SELECT COUNT(*) FROM assignments a WHERE a.event_id = e.id) AS assignment_count
            FROM events e
            JOIN schedules s ON e.schedule_id = s.id
            ORDER BY e.event_date DESC
            "#,
        )
        .fetch_all(pool)
        .await?;
        Ok(events)
    }

    pub async fn list_by_schedule(
        pool: &SqlitePool,
        schedule_id: i64,
    ) -> AppResult<Vec<EventWithCount>> {
        let events = sqlx::query_as::<_, EventWithCount>(
            r#"
            SELECT e.*,
                (SELECT COUNT(*) FROM assignments a WHERE a.event_id = e.id) AS assignment_count
            FROM events e
            WHERE e.schedule_id = ?
            ORDER BY e.event_date
            "#,
        )
        .bind(schedule_id)
        .fetch_all(pool)
        .await?;
        Ok(events)
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> AppResult<Option<Event>> {
        let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(event)
    }

    pub async fn create(
        pool: &SqlitePool,
        schedule_id: i64,
        title: &str,
        event_date: NaiveDate,
        event_type: Option<&str>,
        description: Option<&str>,
    ) -> AppResult<Event> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (schedule_id, title, event_date, event_type, description)
            VALUES (?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(schedule_id)
        .bind(title)
        .bind(event_date)
        .bind(event_type)
        .bind(description)
        .fetch_one(pool)
        .await?;
        Ok(event)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        schedule_id: i64,
        title: &str,
        event_date: NaiveDate,
        event_type: Option<&str>,
        description: Option<&str>,
    ) -> AppResult<Event> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            UPDATE events
            SET schedule_id = ?, title = ?, event_date = ?, event_type = ?, description = ?,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(schedule_id)
        .bind(title)
        .bind(event_date)
        .bind(event_type)
        .bind(description)
        .bind(id)
        .fetch_one(pool)
        .await?;
        Ok(event)
    }

    /// Delete an event together with its assignments in one transaction.
    pub async fn delete_cascade(pool: &SqlitePool, id: i64) -> AppResult<()> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM assignments WHERE event_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM events WHERE id = ?")
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
    use crate::db::{
        AssignmentRepository, MemberRepository, RoleRepository, ScheduleRepository,
        ScheduleTypeRepository,
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn delete_cascade_removes_only_this_events_assignments() {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();

        ScheduleTypeRepository::upsert(&pool, "EBD", None).await.unwrap();
        let schedule_type = sqlx::query_as::<_, crate::db::models::ScheduleType>(
            "SELECT * FROM schedule_types WHERE name = 'EBD'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        let schedule = ScheduleRepository::create(
            &pool,
            schedule_type.id,
            "EBD Junho",
            date(2024, 6, 1),
            date(2024, 6, 30),
            "draft",
        )
        .await
        .unwrap();

        let member = MemberRepository::create(&pool, "Dora", None, None, None, None, true)
            .await
            .unwrap();
        RoleRepository::upsert(&pool, "Professor Juniores", None, None)
            .await
            .unwrap();
        let role = RoleRepository::find_by_name(&pool, "Professor Juniores")
            .await
            .unwrap()
            .unwrap();

        let doomed = EventRepository::create(&pool, schedule.id, "EBD - 2024-06-02", date(2024, 6, 2), None, None)
            .await
            .unwrap();
        let survivor = EventRepository::create(&pool, schedule.id, "EBD - 2024-06-09", date(2024, 6, 9), None, None)
            .await
            .unwrap();
        AssignmentRepository::create(&pool, doomed.id, member.id, role.id, None)
            .await
            .unwrap();
        AssignmentRepository::create(&pool, survivor.id, member.id, role.id, None)
            .await
            .unwrap();

        EventRepository::delete_cascade(&pool, doomed.id).await.unwrap();

        assert!(EventRepository::find_by_id(&pool, doomed.id)
            .await
            .unwrap()
            .is_none());
        assert!(AssignmentRepository::list_by_event(&pool, doomed.id)
            .await
            .unwrap()
            .is_empty());

        // The sibling event and its assignment survive.
        assert!(EventRepository::find_by_id(&pool, survivor.id)
            .await
            .unwrap()
            .is_some());
        assert_eq!(
            AssignmentRepository::list_by_event(&pool, survivor.id)
                .await
                .unwrap()
                .len(),
            1
        );
    }
}
