//! HTTP handlers and shared extractors.
pub mod status;
pub mod users;

use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::ServerError;

/// Payload listing its fields in declaration order.
///
/// When several fields fail validation, the first one listed is reported.
pub trait Fields {
    const FIELDS: &'static [&'static str];
}

/// JSON body that passed [`Validate`].
///
/// Malformed JSON and failed validation are both reported as
/// `400 Bad Request`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Valid<T>(pub T);

impl<T, S> FromRequest<S> for Valid<T>
where
    T: DeserializeOwned + Validate + Fields,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value
            .validate()
            .map_err(|errors| ServerError::validation(errors, T::FIELDS))?;
        Ok(Valid(value))
    }
}

/// Parse a non-negative integer path parameter.
///
/// Only ASCII digits are accepted, so `+1` or ` 1` are rejected.
pub fn parse_id(field: &'static str, raw: &str) -> Result<i64, ServerError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ServerError::InvalidParam(field));
    }

    raw.parse::<u64>()
        .ok()
        .and_then(|id| i64::try_from(id).ok())
        .ok_or(ServerError::InvalidParam(field))
}

/// State backed by an in-memory store.
/// MUST NEVER be used in production.
#[cfg(test)]
pub fn state() -> crate::AppState {
    use std::sync::Arc;

    use crate::config::Argon2;
    use crate::crypto::PasswordManager;
    use crate::user::{MemoryUserStore, UserService};

    let pwd = PasswordManager::new(Some(Argon2::light())).unwrap();
    crate::AppState {
        users: UserService::new(Arc::new(MemoryUserStore::new()), Arc::new(pwd)),
        metrics: None,
    }
}
