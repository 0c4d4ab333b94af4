//! Persistence port for users.

use async_trait::async_trait;

use crate::user::{NewUser, User, UserChanges};

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Failure reported by a [`UserStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// `username` or `email` is already taken.
    #[error("unique constraint violated")]
    Conflict,
    #[error(transparent)]
    Sql(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err.as_database_error() {
            Some(db) if db.is_unique_violation() => StoreError::Conflict,
            _ => StoreError::Sql(err),
        }
    }
}

/// Durable CRUD over the `users` table.
///
/// Soft-deleted rows are invisible to every method, but keep their
/// `username` and `email` reserved.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Every live user, in storage order.
    async fn list(&self) -> StoreResult<Vec<User>>;

    /// Find a live user by ID.
    async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>>;

    /// Insert a new user. `id` and timestamps are assigned here.
    async fn insert(&self, user: &NewUser) -> StoreResult<User>;

    /// Overwrite a live user. Returns `None` if there is none with this ID.
    async fn update(&self, id: i64, changes: &UserChanges) -> StoreResult<Option<User>>;

    /// Mark a live user as deleted. Returns `false` if there is none.
    async fn soft_delete(&self, id: i64) -> StoreResult<bool>;
}
