use sqlx::SqlitePool;

use crate::db::models::Setting;
use crate::error::AppResult;

pub struct SettingRepository;

impl SettingRepository {
    pub async fn list_all(pool: &SqlitePool) -> AppResult<Vec<Setting>> {
        let settings = sqlx::query_as::<_, Setting>("SELECT * FROM settings ORDER BY key")
            .fetch_all(pool)
            .await?;
        Ok(settings)
    }

    pub async fn find_by_key(pool: &SqlitePool, key: &str) -> AppResult<Option<Setting>> {
        let setting = sqlx::query_as::<_, Setting>("SELECT * FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(pool)
            .await?;
        Ok(setting)
    }

    /// Settings sharing a key prefix (e.g. `church_`), for grouped lookups.
    pub async fn list_by_prefix(pool: &SqlitePool, prefix: &str) -> AppResult<Vec<Setting>> {
        let pattern = format!("{}%", prefix);
        let settings = sqlx::query_as::<_, Setting>("SELECT * FROM settings WHERE key LIKE ?")
            .bind(pattern)
            .fetch_all(pool)
            .await?;
        Ok(settings)
    }

    pub async fn create(
        pool: &SqlitePool,
        key: &str,
        value: &str,
        description: Option<&str>,
    ) -> AppResult<Setting> {
        let setting = sqlx::query_as::<_, Setting>(
            r#"
            INSERT INTO settings (key, value, description)
            VALUES (?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(description)
        .fetch_one(pool)
        .await?;
        Ok(setting)
    }

    pub async fn update(
        pool: &SqlitePool,
        key: &str,
        value: &str,
        description: Option<&str>,
    ) -> AppResult<Setting> {
        let setting = sqlx::query_as::<_, Setting>(
            r#"
            UPDATE settings
            SET value = ?, description = ?, updated_at = CURRENT_TIMESTAMP
            WHERE key = ?
            RETURNING *
            "#,
        )
        .bind(value)
        .bind(description)
        .bind(key)
        .fetch_one(pool)
        .await?;
        Ok(setting)
    }

    /// Idempotent insert used by the startup seed.
    pub async fn upsert_default(
        pool: &SqlitePool,
        key: &str,
        value: &str,
        description: Option<&str>,
    ) -> AppResult<()> {
        sqlx::query("INSERT OR IGNORE INTO settings (key, value, description) VALUES (?, ?, ?)")
            .bind(key)
            .bind(value)
            .bind(description)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn delete(pool: &SqlitePool, key: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM settings WHERE key = ?")
            .bind(key)
            .execute(pool)
            .await?;
        Ok(())
    }
}
