//! SQLite implementation of [`UserStore`].

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::user::{NewUser, StoreResult, User, UserChanges, UserStore};

const COLUMNS: &str =
    "id, username, email, password, name, created_at, updated_at, deleted_at";

/// SQLite user store.
#[derive(Clone)]
pub struct SqliteUserStore {
    pool: SqlitePool,
}

impl SqliteUserStore {
    /// Create a new [`SqliteUserStore`].
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn list(&self) -> StoreResult<Vec<User>> {
        let query =
            format!("SELECT {COLUMNS} FROM users WHERE deleted_at IS NULL ORDER BY id");

        Ok(sqlx::query_as::<_, User>(&query)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        let query =
            format!("SELECT {COLUMNS} FROM users WHERE id = ? AND deleted_at IS NULL");

        Ok(sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn insert(&self, user: &NewUser) -> StoreResult<User> {
        let now = Utc::now();
        let query = format!(
            r#"INSERT INTO users (username, email, password, name, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?)
                RETURNING {COLUMNS}"#
        );

        Ok(sqlx::query_as::<_, User>(&query)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password)
            .bind(&user.name)
            .bind(now)
            .bind(now)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update(&self, id: i64, changes: &UserChanges) -> StoreResult<Option<User>> {
        let query = format!(
            r#"UPDATE users
                SET username = ?, email = ?, password = COALESCE(?, password), name = ?, updated_at = ?
                WHERE id = ? AND deleted_at IS NULL
                RETURNING {COLUMNS}"#
        );

        Ok(sqlx::query_as::<_, User>(&query)
            .bind(&changes.username)
            .bind(&changes.email)
            .bind(&changes.password)
            .bind(&changes.name)
            .bind(Utc::now())
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn soft_delete(&self, id: i64) -> StoreResult<bool> {
        let result =
            sqlx::query("UPDATE users SET deleted_at = ? WHERE id = ? AND deleted_at IS NULL")
                .bind(Utc::now())
                .bind(id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() == 1)
    }
}
