use axum::extract::State;
use validator::{ValidationError, ValidationErrors};

use crate::AppState;
use crate::error::Result;
use crate::response::Envelope;
use crate::router::Valid;
use crate::router::users::Body;
use crate::user::{NewUser, User};

const CREATED: &str = "创建用户成功";

fn missing_password() -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.add(
        "password",
        ValidationError::new("required").with_message("password is required".into()),
    );
    errors
}

/// Handler to create user.
pub async fn handler(
    State(state): State<AppState>,
    Valid(body): Valid<Body>,
) -> Result<Envelope<User>> {
    let Some(password) = body.password else {
        return Err(missing_password().into());
    };

    let user = state
        .users
        .create(NewUser {
            username: body.username,
            email: body.email,
            password,
            name: body.name,
        })
        .await?;

    Ok(Envelope::created(user, CREATED))
}
