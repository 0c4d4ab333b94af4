//! MySQL implementation of [`UserStore`].
//!
//! MySQL has no `RETURNING`, so writes re-read the row inside the same
//! transaction.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlConnection, MySqlPool};

use crate::user::{NewUser, StoreResult, User, UserChanges, UserStore};

const COLUMNS: &str =
    "id, username, email, password, name, created_at, updated_at, deleted_at";

/// MySQL user store.
#[derive(Clone)]
pub struct MySqlUserStore {
    pool: MySqlPool,
}

impl MySqlUserStore {
    /// Create a new [`MySqlUserStore`].
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

async fn select_live(conn: &mut MySqlConnection, id: i64) -> StoreResult<Option<User>> {
    let query = format!("SELECT {COLUMNS} FROM users WHERE id = ? AND deleted_at IS NULL");

    Ok(sqlx::query_as::<_, User>(&query)
        .bind(id)
        .fetch_optional(conn)
        .await?)
}

#[async_trait]
impl UserStore for MySqlUserStore {
    async fn list(&self) -> StoreResult<Vec<User>> {
        let query =
            format!("SELECT {COLUMNS} FROM users WHERE deleted_at IS NULL ORDER BY id");

        Ok(sqlx::query_as::<_, User>(&query)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        let mut conn = self.pool.acquire().await?;
        select_live(&mut conn, id).await
    }

    async fn insert(&self, user: &NewUser) -> StoreResult<User> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"INSERT INTO users (username, email, password, name, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password)
        .bind(&user.name)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let id = i64::try_from(result.last_insert_id())
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let user = select_live(&mut tx, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;
        tx.commit().await?;

        Ok(user)
    }

    async fn update(&self, id: i64, changes: &UserChanges) -> StoreResult<Option<User>> {
        let mut tx = self.pool.begin().await?;

        // The driver reports matched rows, not only changed ones.
        let result = sqlx::query(
            r#"UPDATE users
                SET username = ?, email = ?, password = COALESCE(?, password), name = ?, updated_at = ?
                WHERE id = ? AND deleted_at IS NULL"#,
        )
        .bind(&changes.username)
        .bind(&changes.email)
        .bind(&changes.password)
        .bind(&changes.name)
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        let user = select_live(&mut tx, id).await?;
        tx.commit().await?;

        Ok(user)
    }

    async fn soft_delete(&self, id: i64) -> StoreResult<bool> {
        let result =
            sqlx::query(r#"UPDATE users SET deleted_at = ? WHERE id = ? AND deleted_at IS NULL"#)
                .bind(Utc::now())
                .bind(id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() == 1)
    }
}
