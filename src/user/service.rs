use std::sync::Arc;

use crate::crypto::PasswordManager;
use crate::error::{Result, ServerError};
use crate::user::{NewUser, StoreError, User, UserChanges, UserStore};

pub const USER_NOT_FOUND: &str = "用户不存在";
pub const USER_EXISTS: &str = "用户名或邮箱已存在";
const LIST_FAILED: &str = "查询用户列表失败";
const FIND_FAILED: &str = "查询用户失败";
const CREATE_FAILED: &str = "创建用户失败";
const UPDATE_FAILED: &str = "更新用户失败";
const DELETE_FAILED: &str = "删除用户失败";
const HASH_FAILED: &str = "密码处理失败";

/// User manager.
///
/// Translates user operations into [`UserStore`] calls and classifies
/// every failure into a [`ServerError`].
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    pwd: Arc<PasswordManager>,
}

impl UserService {
    /// Create a new [`UserService`].
    pub fn new(store: Arc<dyn UserStore>, pwd: Arc<PasswordManager>) -> Self {
        Self { store, pwd }
    }

    /// Every live user.
    pub async fn list_all(&self) -> Result<Vec<User>> {
        self.store.list().await.map_err(classify(LIST_FAILED))
    }

    /// Find a live user using its `id`.
    pub async fn get_by_id(&self, id: i64) -> Result<User> {
        self.store
            .find_by_id(id)
            .await
            .map_err(classify(FIND_FAILED))?
            .ok_or(ServerError::NotFound(USER_NOT_FOUND))
    }

    /// Create a user. `user.password` is the plain password.
    pub async fn create(&self, mut user: NewUser) -> Result<User> {
        user.password = self.hash(&user.password)?;

        let user = self
            .store
            .insert(&user)
            .await
            .map_err(classify(CREATE_FAILED))?;

        tracing::info!(user_id = user.id, username = %user.username, "user created");
        Ok(user)
    }

    /// Replace every mutable field of a live user.
    ///
    /// Never creates a row: an unknown `id` is [`ServerError::NotFound`].
    pub async fn update(&self, id: i64, mut changes: UserChanges) -> Result<User> {
        changes.password = changes
            .password
            .map(|password| self.hash(&password))
            .transpose()?;

        let user = self
            .store
            .update(id, &changes)
            .await
            .map_err(classify(UPDATE_FAILED))?
            .ok_or(ServerError::NotFound(USER_NOT_FOUND))?;

        tracing::info!(user_id = user.id, "user updated");
        Ok(user)
    }

    /// Soft-delete a live user.
    pub async fn delete(&self, id: i64) -> Result<()> {
        let deleted = self
            .store
            .soft_delete(id)
            .await
            .map_err(classify(DELETE_FAILED))?;

        if !deleted {
            return Err(ServerError::NotFound(USER_NOT_FOUND));
        }

        tracing::info!(user_id = id, "user deleted");
        Ok(())
    }

    fn hash(&self, password: &str) -> Result<String> {
        self.pwd
            .hash_password(password)
            .map_err(|err| ServerError::internal(HASH_FAILED, err))
    }
}

fn classify(details: &'static str) -> impl FnOnce(StoreError) -> ServerError {
    move |err| match err {
        StoreError::Conflict => ServerError::Conflict(USER_EXISTS),
        StoreError::Sql(err) => ServerError::internal(details, err),
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::config::Argon2;
    use crate::user::{MemoryUserStore, StoreResult};

    fn service(store: Arc<dyn UserStore>) -> UserService {
        let pwd = PasswordManager::new(Some(Argon2::light())).unwrap();
        UserService::new(store, Arc::new(pwd))
    }

    fn alice() -> NewUser {
        NewUser {
            username: "alice".into(),
            email: "alice@example.com".into(),
            password: "pw".into(),
            name: Some("Alice".into()),
        }
    }

    /// Store whose backend is always down.
    struct Unavailable;

    #[async_trait]
    impl UserStore for Unavailable {
        async fn list(&self) -> StoreResult<Vec<User>> {
            Err(StoreError::Sql(sqlx::Error::PoolTimedOut))
        }
        async fn find_by_id(&self, _: i64) -> StoreResult<Option<User>> {
            Err(StoreError::Sql(sqlx::Error::PoolTimedOut))
        }
        async fn insert(&self, _: &NewUser) -> StoreResult<User> {
            Err(StoreError::Sql(sqlx::Error::PoolTimedOut))
        }
        async fn update(&self, _: i64, _: &UserChanges) -> StoreResult<Option<User>> {
            Err(StoreError::Sql(sqlx::Error::PoolTimedOut))
        }
        async fn soft_delete(&self, _: i64) -> StoreResult<bool> {
            Err(StoreError::Sql(sqlx::Error::PoolTimedOut))
        }
    }

    #[tokio::test]
    async fn test_create_hashes_password() {
        let users = service(Arc::new(MemoryUserStore::new()));
        let created = users.create(alice()).await.unwrap();

        assert_ne!(created.password, "pw");
        assert!(created.password.starts_with("$argon2id$"));
        assert_eq!(users.get_by_id(created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_duplicate_is_conflict() {
        let users = service(Arc::new(MemoryUserStore::new()));
        users.create(alice()).await.unwrap();

        let err = users.create(alice()).await.unwrap_err();
        assert!(matches!(err, ServerError::Conflict(USER_EXISTS)));
    }

    #[tokio::test]
    async fn test_missing_user_is_not_found() {
        let users = service(Arc::new(MemoryUserStore::new()));
        let changes = UserChanges {
            username: "ghost".into(),
            email: "ghost@example.com".into(),
            password: None,
            name: None,
        };

        assert!(matches!(users.get_by_id(42).await, Err(ServerError::NotFound(_))));
        assert!(matches!(users.update(42, changes).await, Err(ServerError::NotFound(_))));
        assert!(matches!(users.delete(42).await, Err(ServerError::NotFound(_))));
        // Update never creates the row.
        assert!(users.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_password_optional() {
        let users = service(Arc::new(MemoryUserStore::new()));
        let created = users.create(alice()).await.unwrap();

        let mut changes = UserChanges {
            username: "alice".into(),
            email: "alice@example.com".into(),
            password: None,
            name: None,
        };
        let kept = users.update(created.id, changes.clone()).await.unwrap();
        assert_eq!(kept.password, created.password);
        assert_eq!(kept.name, None);

        changes.password = Some("new".into());
        let changed = users.update(created.id, changes).await.unwrap();
        assert_ne!(changed.password, created.password);
        assert!(changed.password.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn test_storage_failure_is_internal() {
        let users = service(Arc::new(Unavailable));

        let err = users.list_all().await.unwrap_err();
        assert!(matches!(err, ServerError::Internal { details: LIST_FAILED, .. }));

        let err = users.get_by_id(1).await.unwrap_err();
        assert!(matches!(err, ServerError::Internal { details: FIND_FAILED, .. }));

        let err = users.delete(1).await.unwrap_err();
        assert!(matches!(err, ServerError::Internal { details: DELETE_FAILED, .. }));
    }
}
