use sqlx::SqlitePool;

use crate::db::models::Ministry;
use crate::error::AppResult;

pub struct MinistryRepository;

impl MinistryRepository {
    pub async fn find_by_name(pool: &SqlitePool, name: &str) -> AppResult<Option<Ministry>> {
        let ministry = sqlx::query_as::<_, Ministry>("SELECT * FROM ministries WHERE name = ?")
            .bind(name)
            .fetch_optional(pool)
            .await?;
        Ok(ministry)
    }

    /// Idempotent insert used by the startup seed.
    pub async fn upsert(
        pool: &SqlitePool,
        name: &str,
        description: Option<&str>,
    ) -> AppResult<()> {
        sqlx::query("INSERT OR IGNORE INTO ministries (name, description) VALUES (?, ?)")
            .bind(name)
            .bind(description)
            .execute(pool)
            .await?;
        Ok(())
    }
}
