//! List users.

use axum::extract::State;

use crate::AppState;
use crate::error::Result;
use crate::response::Envelope;
use crate::user::User;

const LISTED: &str = "获取用户列表成功";

pub async fn handler(State(state): State<AppState>) -> Result<Envelope<Vec<User>>> {
    let users = state.users.list_all().await?;
    Ok(Envelope::ok(users, LISTED))
}
