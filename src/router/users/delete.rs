//! Soft-delete a user.

use axum::extract::{Path, State};
use axum::http::StatusCode;

use crate::AppState;
use crate::error::Result;
use crate::response::Message;
use crate::router::parse_id;

const DELETED: &str = "删除用户成功";

pub async fn handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Message> {
    let id = parse_id(super::ID, &id)?;
    state.users.delete(id).await?;
    Ok(Message::new(StatusCode::OK, DELETED))
}
