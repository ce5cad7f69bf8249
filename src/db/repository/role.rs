use sqlx::SqlitePool;

use crate::db::models::Role;
use crate::error::AppResult;

pub struct RoleRepository;

impl RoleRepository {
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> AppResult<Option<Role>> {
        let role = sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(role)
    }

    pub async fn find_by_name(pool: &SqlitePool, name: &str) -> AppResult<Option<Role>> {
        let role = sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE name = ?")
            .bind(name)
            .fetch_optional(pool)
            .await?;
        Ok(role)
    }

    /// Idempotent insert used by the startup seed. Roles are unique by name
    /// within a ministry; the seed only inserts names it has not seen.
    pub async fn upsert(
        pool: &SqlitePool,
        name: &str,
        ministry_id: Option<i64>,
        description: Option<&str>,
    ) -> AppResult<()> {
        if Self::find_by_name(pool, name).await?.is_some() {
            return Ok(());
        }
        sqlx::query("INSERT INTO roles (name, ministry_id, description) VALUES (?, ?, ?)")
            .bind(name)
            .bind(ministry_id)
            .bind(description)
            .execute(pool)
            .await?;
        Ok(())
    }
}
