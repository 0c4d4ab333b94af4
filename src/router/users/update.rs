//! Replace user data.

use axum::extract::{Path, State};

use crate::AppState;
use crate::error::{Result, ServerError};
use crate::response::Envelope;
use crate::router::users::Body;
use crate::router::{Valid, parse_id};
use crate::user::{User, UserChanges};

const UPDATED: &str = "更新用户成功";

/// The path `id` is checked before the body, and wins over any `id` sent in
/// the body.
pub async fn handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: std::result::Result<Valid<Body>, ServerError>,
) -> Result<Envelope<User>> {
    let id = parse_id(super::ID, &id)?;
    let Valid(body) = body?;

    let user = state
        .users
        .update(
            id,
            UserChanges {
                username: body.username,
                email: body.email,
                password: body.password,
                name: body.name,
            },
        )
        .await?;

    Ok(Envelope::ok(user, UPDATED))
}
