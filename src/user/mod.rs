mod memory;
mod mysql;
mod postgres;
mod service;
mod sqlite;
mod store;

pub use memory::*;
pub use mysql::*;
pub use postgres::*;
pub use service::*;
pub use sqlite::*;
pub use store::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User as saved on database.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip)]
    pub password: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Fields accepted when creating a [`User`].
///
/// `password` already holds the hash once it reaches a [`UserStore`].
#[derive(Clone, Debug, PartialEq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

/// Full replacement of the mutable fields of a [`User`].
///
/// A `None` password keeps the stored hash.
#[derive(Clone, Debug, PartialEq)]
pub struct UserChanges {
    pub username: String,
    pub email: String,
    pub password: Option<String>,
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_never_serialized() {
        let now = Utc::now();
        let user = User {
            id: 1,
            username: "alice".into(),
            email: "alice@example.com".into(),
            password: "$argon2id$secret".into(),
            name: Some("Alice".into()),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["username"], "alice");
        assert!(json.get("password").is_none());
        assert!(json.get("deleted_at").is_none());
    }
}
