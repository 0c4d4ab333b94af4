//! Error handler for usergate.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use validator::ValidationErrors;

use crate::response::Message;

pub type Result<T> = std::result::Result<T, ServerError>;

const INVALID_BODY: &str = "Invalid request body";

/// Enum representing server-side errors.
///
/// Each variant is one error class; the class alone selects the HTTP status.
#[derive(Debug, Error)]
pub enum ServerError {
    /// `order` lists field names by priority; unlisted fields come last.
    #[error("validation error occurred")]
    Validation {
        errors: ValidationErrors,
        order: &'static [&'static str],
    },

    #[error("invalid request body")]
    Body(#[from] JsonRejection),

    #[error("Invalid {0}")]
    InvalidParam(&'static str),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(&'static str),

    #[error("internal server error, {details}")]
    Internal {
        details: &'static str,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl From<ValidationErrors> for ServerError {
    fn from(errors: ValidationErrors) -> Self {
        Self::validation(errors, &[])
    }
}

impl ServerError {
    /// Validation failure reported in the field `order` given.
    pub fn validation(errors: ValidationErrors, order: &'static [&'static str]) -> Self {
        Self::Validation { errors, order }
    }

    /// Wrap an unexpected failure, keeping `details` as the public message.
    pub fn internal<E>(details: &'static str, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Internal {
            details,
            source: Some(Box::new(err)),
        }
    }

    /// HTTP status for this error class.
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::Validation { .. }
            | ServerError::Body(_)
            | ServerError::InvalidParam(_) => StatusCode::BAD_REQUEST,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Conflict(_) => StatusCode::CONFLICT,
            ServerError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the client.
    fn public_message(&self) -> String {
        match self {
            ServerError::Validation { errors, order } => first_validation_message(errors, order),
            ServerError::Body(_) => INVALID_BODY.to_owned(),
            ServerError::Internal { details, .. } => (*details).to_owned(),
            _ => self.to_string(),
        }
    }
}

/// Pick a deterministic message among field errors.
///
/// Fields follow `order`, then alphabetical order for the rest.
fn first_validation_message(errors: &ValidationErrors, order: &[&str]) -> String {
    let rank = |field: &str| {
        order
            .iter()
            .position(|known| *known == field)
            .unwrap_or(order.len())
    };
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|(a, _), (b, _)| {
        rank(a.as_ref())
            .cmp(&rank(b.as_ref()))
            .then_with(|| a.cmp(b))
    });

    fields
        .into_iter()
        .find_map(|(field, issues)| {
            issues.first().map(|issue| match &issue.message {
                Some(message) => message.to_string(),
                None => format!("Invalid {field}"),
            })
        })
        .unwrap_or_else(|| INVALID_BODY.to_owned())
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match &self {
            ServerError::Internal { details, source } => {
                tracing::error!(err = ?source, %details, "server returned 500 status");
            },
            ServerError::Body(rejection) => {
                tracing::debug!(%rejection, "rejected request body");
            },
            _ => (),
        }

        Message::new(self.status(), self.public_message()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use validator::ValidationError;

    async fn body(err: ServerError) -> (StatusCode, Message) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_invalid_param() {
        let (status, body) = body(ServerError::InvalidParam("id")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.code, 400);
        assert_eq!(body.msg, "Invalid id");
    }

    #[tokio::test]
    async fn test_internal_hides_source() {
        let err = ServerError::internal(
            "failed",
            std::io::Error::other("connection refused on 10.0.0.3"),
        );
        let (status, body) = body(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.msg, "failed");
    }

    #[tokio::test]
    async fn test_validation_message() {
        let mut errors = ValidationErrors::new();
        errors.add(
            "email",
            ValidationError::new("email").with_message("Invalid email".into()),
        );
        errors.add("username", ValidationError::new("length"));

        let (status, body) = body(errors.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.msg, "Invalid email");
    }

    #[tokio::test]
    async fn test_validation_follows_field_order() {
        let mut errors = ValidationErrors::new();
        errors.add(
            "email",
            ValidationError::new("email").with_message("Invalid email".into()),
        );
        errors.add(
            "username",
            ValidationError::new("length").with_message("username is required".into()),
        );

        let err = ServerError::validation(errors, &["username", "email"]);
        let (status, body) = body(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.msg, "username is required");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(ServerError::NotFound("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(ServerError::Conflict("x").status(), StatusCode::CONFLICT);
    }
}
