//! In-memory [`UserStore`], used for development and tests.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::user::{NewUser, StoreError, StoreResult, User, UserChanges, UserStore};

#[derive(Default)]
struct Table {
    rows: Vec<User>,
    last_id: i64,
}

impl Table {
    /// Same rule as the SQL unique indexes: deleted rows count too.
    fn taken(&self, username: &str, email: &str, except: Option<i64>) -> bool {
        self.rows
            .iter()
            .filter(|row| Some(row.id) != except)
            .any(|row| row.username == username || row.email == email)
    }

    fn live_mut(&mut self, id: i64) -> Option<&mut User> {
        self.rows
            .iter_mut()
            .find(|row| row.id == id && row.deleted_at.is_none())
    }
}

/// Volatile user store.
#[derive(Default)]
pub struct MemoryUserStore {
    table: RwLock<Table>,
}

impl MemoryUserStore {
    /// Create an empty [`MemoryUserStore`].
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn list(&self) -> StoreResult<Vec<User>> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .iter()
            .filter(|row| row.deleted_at.is_none())
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .iter()
            .find(|row| row.id == id && row.deleted_at.is_none())
            .cloned())
    }

    async fn insert(&self, user: &NewUser) -> StoreResult<User> {
        let mut table = self.table.write().await;
        if table.taken(&user.username, &user.email, None) {
            return Err(StoreError::Conflict);
        }

        table.last_id += 1;
        let now = Utc::now();
        let row = User {
            id: table.last_id,
            username: user.username.clone(),
            email: user.email.clone(),
            password: user.password.clone(),
            name: user.name.clone(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        table.rows.push(row.clone());

        Ok(row)
    }

    async fn update(&self, id: i64, changes: &UserChanges) -> StoreResult<Option<User>> {
        let mut table = self.table.write().await;
        if table.live_mut(id).is_none() {
            return Ok(None);
        }
        if table.taken(&changes.username, &changes.email, Some(id)) {
            return Err(StoreError::Conflict);
        }

        let Some(row) = table.live_mut(id) else {
            return Ok(None);
        };
        row.username = changes.username.clone();
        row.email = changes.email.clone();
        if let Some(password) = &changes.password {
            row.password = password.clone();
        }
        row.name = changes.name.clone();
        row.updated_at = Utc::now();

        Ok(Some(row.clone()))
    }

    async fn soft_delete(&self, id: i64) -> StoreResult<bool> {
        let mut table = self.table.write().await;
        match table.live_mut(id) {
            Some(row) => {
                row.deleted_at = Some(Utc::now());
                Ok(true)
            },
            None => Ok(false),
        }
    }
}
