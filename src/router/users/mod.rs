//! Users-related HTTP API.
mod create;
mod delete;
mod get;
mod list;
mod update;

use axum::Router;
use axum::routing::get;
use serde::Deserialize;
use validator::Validate;

use crate::AppState;
use crate::router::Fields;

/// Path parameter holding the user ID.
const ID: &str = "id";

/// Payload shared by create and update.
///
/// Unknown fields, including `id`, are ignored.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct Body {
    #[serde(default)]
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[serde(default)]
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[validate(length(min = 1, message = "password must not be empty"))]
    pub password: Option<String>,
    pub name: Option<String>,
}

impl Fields for Body {
    const FIELDS: &'static [&'static str] = &["username", "email", "password", "name"];
}

pub fn router() -> Router<AppState> {
    Router::new()
        // `GET /users` goes to `list`, `POST /users` to `create`.
        .route("/users", get(list::handler).post(create::handler))
        // `GET|PUT|DELETE /users/{id}`.
        .route(
            "/users/{id}",
            get(get::handler)
                .put(update::handler)
                .delete(delete::handler),
        )
}
