use sqlx::SqlitePool;

use crate::db::models::Member;
use crate::error::AppResult;

pub struct MemberRepository;

impl MemberRepository {
    pub async fn list_all(pool: &SqlitePool) -> AppResult<Vec<Member>> {
        let members = sqlx::query_as::<_, Member>("SELECT * FROM members ORDER BY name")
            .fetch_all(pool)
            .await?;
        Ok(members)
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> AppResult<Option<Member>> {
        let member = sqlx::query_as::<_, Member>("SELECT * FROM members WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(member)
    }

    pub async fn find_by_name(pool: &SqlitePool, name: &str) -> AppResult<Option<Member>> {
        let member = sqlx::query_as::<_, Member>("SELECT * FROM members WHERE name = ?")
            .bind(name)
            .fetch_optional(pool)
            .await?;
        Ok(member)
    }

    pub async fn list_by_ministry(pool: &SqlitePool, ministry: &str) -> AppResult<Vec<Member>> {
        let members =
            sqlx::query_as::<_, Member>("SELECT * FROM members WHERE ministry = ? ORDER BY name")
                .bind(ministry)
                .fetch_all(pool)
                .await?;
        Ok(members)
    }

    pub async fn list_by_role(pool: &SqlitePool, role: &str) -> AppResult<Vec<Member>> {
        let members =
            sqlx::query_as::<_, Member>("SELECT * FROM members WHERE role = ? ORDER BY name")
                .bind(role)
                .fetch_all(pool)
                .await?;
        Ok(members)
    }

    pub async fn create(
        pool: &SqlitePool,
        name: &str,
        email: Option<&str>,
        phone: Option<&str>,
        ministry: Option<&str>,
        role: Option<&str>,
        active: bool,
    ) -> AppResult<Member> {
        let member = sqlx::query_as::<_, Member>(
            r#"
            INSERT INTO members (name, email, phone, ministry, role, active)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(ministry)
        .bind(role)
        .bind(active)
        .fetch_one(pool)
        .await?;
        Ok(member)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        name: &str,
        email: Option<&str>,
        phone: Option<&str>,
        ministry: Option<&str>,
        role: Option<&str>,
        active: bool,
    ) -> AppResult<Member> {
        let member = sqlx::query_as::<_, Member>(
            r#"
            UPDATE members
            SET name = ?, email = ?, phone = ?, ministry = ?, role = ?, active = ?,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(ministry)
        .bind(role)
        .bind(active)
        .bind(id)
        .fetch_one(pool)
        .await?;
        Ok(member)
    }

    pub async fn delete(pool: &SqlitePool, id: i64) -> AppResult<()> {
        sqlx::query("DELETE FROM members WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Number of assignments referencing this member, used to refuse
    /// deletion of members that are still scheduled.
    pub async fn assignment_count(pool: &SqlitePool, id: i64) -> AppResult<i64> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM assignments WHERE member_id = ?")
                .bind(id)
                .fetch_one(pool)
                .await?;
        Ok(count.0)
    }
}
