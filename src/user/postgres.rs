//! PostgreSQL implementation of [`UserStore`].

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

use crate::user::{NewUser, StoreResult, User, UserChanges, UserStore};

const COLUMNS: &str =
    "id, username, email, password, name, created_at, updated_at, deleted_at";

/// PostgreSQL user store.
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Create a new [`PgUserStore`].
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn list(&self) -> StoreResult<Vec<User>> {
        let query =
            format!("SELECT {COLUMNS} FROM users WHERE deleted_at IS NULL ORDER BY id");

        Ok(sqlx::query_as::<_, User>(&query)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        let query =
            format!("SELECT {COLUMNS} FROM users WHERE id = $1 AND deleted_at IS NULL");

        Ok(sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn insert(&self, user: &NewUser) -> StoreResult<User> {
        let query = format!(
            r#"INSERT INTO users (username, email, password, name, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $5)
                RETURNING {COLUMNS}"#
        );

        Ok(sqlx::query_as::<_, User>(&query)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password)
            .bind(&user.name)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update(&self, id: i64, changes: &UserChanges) -> StoreResult<Option<User>> {
        let query = format!(
            r#"UPDATE users
                SET username = $1, email = $2, password = COALESCE($3, password), name = $4, updated_at = $5
                WHERE id = $6 AND deleted_at IS NULL
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
        let result = sqlx::query(
            r#"UPDATE users SET deleted_at = $1 WHERE id = $2 AND deleted_at IS NULL"#,
        )
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

#[cfg(test)]
mod tests {
    use sqlx::PgPool;

    use super::*;
    use crate::user::StoreError;

    fn alice() -> NewUser {
        NewUser {
            username: "alice".into(),
            email: "alice@example.com".into(),
            password: "hash".into(),
            name: Some("Alice".into()),
        }
    }

    #[sqlx::test(migrations = "./migrations/postgres")]
    #[ignore = "requires a PostgreSQL instance on DATABASE_URL"]
    async fn test_insert_then_find(pool: PgPool) {
        let store = PgUserStore::new(pool);

        let created = store.insert(&alice()).await.unwrap();
        assert!(created.id > 0);
        assert_eq!(created.created_at, created.updated_at);

        let found = store.find_by_id(created.id).await.unwrap();
        assert_eq!(found, Some(created));
    }

    #[sqlx::test(migrations = "./migrations/postgres")]
    #[ignore = "requires a PostgreSQL instance on DATABASE_URL"]
    async fn test_unique_violation_is_conflict(pool: PgPool) {
        let store = PgUserStore::new(pool);
        store.insert(&alice()).await.unwrap();

        let mut other = alice();
        other.username = "alice2".into();
        let err = store.insert(&other).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict));
    }

    #[sqlx::test(migrations = "./migrations/postgres")]
    #[ignore = "requires a PostgreSQL instance on DATABASE_URL"]
    async fn test_soft_delete_hides_row(pool: PgPool) {
        let store = PgUserStore::new(pool);
        let created = store.insert(&alice()).await.unwrap();

        assert!(store.soft_delete(created.id).await.unwrap());
        assert!(!store.soft_delete(created.id).await.unwrap());
        assert_eq!(store.find_by_id(created.id).await.unwrap(), None);
        assert!(store.list().await.unwrap().is_empty());
    }
}
