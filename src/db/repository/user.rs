use sqlx::SqlitePool;

use crate::db::models::{User, UserWithMemberName};
use crate::error::AppResult;

pub struct UserRepository;

impl UserRepository {
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(user)
    }

    pub async fn find_by_username(pool: &SqlitePool, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(pool)
            .await?;
        Ok(user)
    }

    pub async fn find_by_email(pool: &SqlitePool, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(pool)
            .await?;
        Ok(user)
    }

    /// True when another user (different id) already holds this username.
    pub async fn username_taken(
        pool: &SqlitePool,
        username: &str,
        exclude_id: i64,
    ) -> AppResult<bool> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM users WHERE username = ? AND id != ?")
                .bind(username)
                .bind(exclude_id)
                .fetch_optional(pool)
                .await?;
        Ok(row.is_some())
    }

    pub async fn list_with_member_names(pool: &SqlitePool) -> AppResult<Vec<UserWithMemberName>> {
        let users = sqlx::query_as::<_, UserWithMemberName>(
            r#"
            SELECT u.id, u.username, u.email, u.role, u.member_id, m.name AS member_name
            FROM users u
            LEFT JOIN members m ON u.member_id = m.id
            ORDER BY u.username
            "#,
        )
        .fetch_all(pool)
        .await?;
        Ok(users)
    }

    pub async fn create(
        pool: &SqlitePool,
        username: &str,
        password_hash: &str,
        email: Option<&str>,
        role: &str,
        member_id: Option<i64>,
    ) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password, email, role, member_id)
            VALUES (?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(email)
        .bind(role)
        .bind(member_id)
        .fetch_one(pool)
        .await?;
        Ok(user)
    }

    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        username: &str,
        email: Option<&str>,
        role: &str,
        member_id: Option<i64>,
        password_hash: Option<&str>,
    ) -> AppResult<User> {
        let user = match password_hash {
            Some(hash) => {
                sqlx::query_as::<_, User>(
                    r#"
                    UPDATE users
                    SET username = ?, email = ?, role = ?, member_id = ?, password = ?,
                        updated_at = CURRENT_TIMESTAMP
                    WHERE id = ?
                    RETURNING *
                    "#,
                )
                .bind(username)
                .bind(email)
                .bind(role)
                .bind(member_id)
                .bind(hash)
                .bind(id)
                .fetch_one(pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, User>(
                    r#"
                    UPDATE users
                    SET username = ?, email = ?, role = ?, member_id = ?,
                        updated_at = CURRENT_TIMESTAMP
                    WHERE id = ?
                    RETURNING *
                    "#,
                )
                .bind(username)
                .bind(email)
                .bind(role)
                .bind(member_id)
                .bind(id)
                .fetch_one(pool)
                .await?
            }
        };
        Ok(user)
    }

    pub async fn update_password(
        pool: &SqlitePool,
        id: i64,
        password_hash: &str,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE users SET password = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
        )
        .bind(password_hash)
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn delete(pool: &SqlitePool, id: i64) -> AppResult<()> {
        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
