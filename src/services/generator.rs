//! Automatic schedule generation.
//!
//! A schedule covers a date range; generation expands that range into
//! concrete events, one per matching weekday, according to a static rule
//! table keyed by the schedule type's name. Types without a rule are simply
//! not eligible for automatic generation and yield an empty result.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use sqlx::SqlitePool;

use crate::db::models::{Event, Schedule};
use crate::db::EventRepository;
use crate::error::AppResult;

/// Title prefix, event type tag and description applied to a generated
/// event. The full title is `"<prefix> - <ISO date>"`.
#[derive(Debug, Clone, Copy)]
pub struct EventTemplate {
    pub title_prefix: &'static str,
    pub event_type: &'static str,
    pub description: &'static str,
}

/// Maps a schedule type to the weekdays it occupies. Templates may differ
/// per weekday within the same type (Cultos holds a celebration service on
/// Sundays and a prayer service on Wednesdays).
#[derive(Debug, Clone, Copy)]
pub struct GenerationRule {
    pub schedule_type: &'static str,
    pub templates: &'static [(Weekday, EventTemplate)],
}

impl GenerationRule {
    pub fn template_for(&self, weekday: Weekday) -> Option<&EventTemplate> {
        self.templates
            .iter()
            .find(|(day, _)| *day == weekday)
            .map(|(_, template)| template)
    }
}

pub const GENERATION_RULES: &[GenerationRule] = &[
    GenerationRule {
        schedule_type: "EBD",
        templates: &[(
            Weekday::Sun,
            EventTemplate {
                title_prefix: "EBD",
                event_type: "EBD",
                description: "Aula da Escola Bíblica Dominical",
            },
        )],
    },
    GenerationRule {
        schedule_type: "Louvor",
        templates: &[(
            Weekday::Sun,
            EventTemplate {
                title_prefix: "Culto de Louvor",
                event_type: "Louvor",
                description: "Culto de Louvor e Adoração",
            },
        )],
    },
    GenerationRule {
        schedule_type: "Cultos",
        templates: &[
            (
                Weekday::Sun,
                EventTemplate {
                    title_prefix: "Culto de Celebração",
                    event_type: "Celebração",
                    description: "Culto de Celebração Dominical",
                },
            ),
            (
                Weekday::Wed,
                EventTemplate {
                    title_prefix: "Culto de Oração",
                    event_type: "Oração",
                    description: "Culto de Oração e Estudo Bíblico",
                },
            ),
        ],
    },
];

pub fn rule_for(schedule_type: &str) -> Option<&'static GenerationRule> {
    GENERATION_RULES
        .iter()
        .find(|rule| rule.schedule_type == schedule_type)
}

/// An event the generator intends to create, before persistence.
#[derive(Debug, Clone)]
pub struct PlannedEvent {
    pub date: NaiveDate,
    pub title: String,
    pub event_type: &'static str,
    pub description: &'static str,
}

/// Enumerate every day in `[start, end]` inclusive and produce one planned
/// event per day matching the rule, in date order. A range with no matching
/// weekday produces an empty plan.
pub fn plan_events(rule: &GenerationRule, start: NaiveDate, end: NaiveDate) -> Vec<PlannedEvent> {
    let mut planned = Vec::new();
    let mut day = start;
    while day <= end {
        if let Some(template) = rule.template_for(day.weekday()) {
            planned.push(PlannedEvent {
                date: day,
                title: format!("{} - {}", template.title_prefix, day.format("%Y-%m-%d")),
                event_type: template.event_type,
                description: template.description,
            });
        }
        day = match day.checked_add_days(Days::new(1)) {
            Some(next) => next,
            None => break,
        };
    }
    planned
}

/// Generate and persist events for a schedule.
///
/// Returns the created events ordered by date ascending, each with its
/// assigned row id. A type with no configured rule is not an error; it
/// yields an empty list. Individual insert failures are logged and that
/// day is skipped, so the result can be a partial set.
///
/// Repeated invocation on the same schedule creates the events again; no
/// deduplication against existing events is performed.
pub async fn generate_events(
    pool: &SqlitePool,
    schedule: &Schedule,
    type_name: &str,
) -> AppResult<Vec<Event>> {
    let rule = match rule_for(type_name) {
        Some(rule) => rule,
        None => {
            tracing::debug!(
                schedule_id = schedule.id,
                schedule_type = type_name,
                "Schedule type has no generation rule, skipping"
            );
            return Ok(Vec::new());
        }
    };

    let planned = plan_events(rule, schedule.start_date, schedule.end_date);
    let mut events = Vec::with_capacity(planned.len());

    for item in planned {
        match EventRepository::create(
            pool,
            schedule.id,
            &item.title,
            item.date,
            Some(item.event_type),
            Some(item.description),
        )
        .await
        {
            Ok(event) => events.push(event),
            Err(e) => {
                tracing::warn!(
                    schedule_id = schedule.id,
                    date = %item.date,
                    "Failed to persist generated event: {:?}",
                    e
                );
            }
        }
    }

    tracing::info!(
        schedule_id = schedule.id,
        schedule_type = type_name,
        count = events.len(),
        "Generated events for schedule"
    );

    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ScheduleRepository;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn ebd_plan_covers_every_sunday() {
        // June 2024 starts on a Saturday; Sundays are 2, 9, 16, 23, 30.
        let rule = rule_for("EBD").unwrap();
        let planned = plan_events(rule, date(2024, 6, 1), date(2024, 6, 30));

        assert_eq!(planned.len(), 5);
        let expected = [2, 9, 16, 23, 30];
        for (event, day) in planned.iter().zip(expected) {
            assert_eq!(event.date, date(2024, 6, day));
            assert_eq!(event.title, format!("EBD - 2024-06-{:02}", day));
            assert_eq!(event.event_type, "EBD");
        }
    }

    #[test]
    fn cultos_plan_mixes_sundays_and_wednesdays() {
        // June 2024: 5 Sundays, 4 Wednesdays (5, 12, 19, 26).
        let rule = rule_for("Cultos").unwrap();
        let planned = plan_events(rule, date(2024, 6, 1), date(2024, 6, 30));

        let sundays: Vec<_> = planned
            .iter()
            .filter(|e| e.event_type == "Celebração")
            .collect();
        let wednesdays: Vec<_> = planned
            .iter()
            .filter(|e| e.event_type == "Oração")
            .collect();

        assert_eq!(sundays.len(), 5);
        assert_eq!(wednesdays.len(), 4);
        assert_eq!(planned.len(), 9);
        assert_eq!(wednesdays[0].title, "Culto de Oração - 2024-06-05");

        // Plan is ordered by date, not grouped by weekday.
        for pair in planned.windows(2) {
            assert!(pair[0].date < pair[1].date);
        }
    }

    #[test]
    fn range_without_matching_weekday_is_empty() {
        // 2024-06-01 is a Saturday; EBD only matches Sundays.
        let rule = rule_for("EBD").unwrap();
        let planned = plan_events(rule, date(2024, 6, 1), date(2024, 6, 1));
        assert!(planned.is_empty());
    }

    #[test]
    fn single_matching_day_range() {
        let rule = rule_for("Louvor").unwrap();
        let planned = plan_events(rule, date(2024, 6, 2), date(2024, 6, 2));
        assert_eq!(planned.len(), 1);
        assert_eq!(planned[0].title, "Culto de Louvor - 2024-06-02");
    }

    #[test]
    fn unknown_type_has_no_rule() {
        assert!(rule_for("Limpeza").is_none());
        assert!(rule_for("ebd").is_none());
    }

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        pool
    }

    async fn ebd_schedule(pool: &SqlitePool) -> Schedule {
        crate::db::ScheduleTypeRepository::upsert(pool, "EBD", None)
            .await
            .unwrap();
        let schedule_type = sqlx::query_as::<_, crate::db::models::ScheduleType>(
            "SELECT * FROM schedule_types WHERE name = 'EBD'",
        )
        .fetch_one(pool)
        .await
        .unwrap();
        ScheduleRepository::create(
            pool,
            schedule_type.id,
            "EBD Junho",
            date(2024, 6, 1),
            date(2024, 6, 30),
            "draft",
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn generate_persists_one_event_per_sunday() {
        let pool = test_pool().await;
        let schedule = ebd_schedule(&pool).await;

        let events = generate_events(&pool, &schedule, "EBD").await.unwrap();

        assert_eq!(events.len(), 5);
        assert_eq!(events[0].title, "EBD - 2024-06-02");
        assert_eq!(events[4].title, "EBD - 2024-06-30");
        for event in &events {
            assert_eq!(event.schedule_id, schedule.id);
            assert_eq!(event.event_type.as_deref(), Some("EBD"));
        }

        let stored = EventRepository::list_by_schedule(&pool, schedule.id)
            .await
            .unwrap();
        assert_eq!(stored.len(), 5);
    }

    #[tokio::test]
    async fn generate_for_unknown_type_creates_nothing() {
        let pool = test_pool().await;
        let schedule = ebd_schedule(&pool).await;

        let events = generate_events(&pool, &schedule, "Limpeza").await.unwrap();
        assert!(events.is_empty());

        let stored = EventRepository::list_by_schedule(&pool, schedule.id)
            .await
            .unwrap();
        assert!(stored.is_empty());
    }

    #[tokio::test]
    async fn generate_twice_duplicates_events() {
        // Documents current behavior: repeated generation does not skip
        // dates that already have events, so the count doubles.
        let pool = test_pool().await;
        let schedule = ebd_schedule(&pool).await;

        generate_events(&pool, &schedule, "EBD").await.unwrap();
        generate_events(&pool, &schedule, "EBD").await.unwrap();

        let stored = EventRepository::list_by_schedule(&pool, schedule.id)
            .await
            .unwrap();
        assert_eq!(stored.len(), 10);
    }
}
