//! JSON envelope returned by every endpoint.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

/// Uniform `{code, data?, msg}` wrapper.
///
/// `code` always mirrors the HTTP status of the response so clients can branch
/// on either. `data` is omitted for message-only replies (errors, deletions).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub msg: String,
}

/// Envelope without payload.
pub type Message = Envelope<()>;

impl<T> Envelope<T> {
    /// `200 OK` with payload.
    pub fn ok(data: T, msg: impl Into<String>) -> Self {
        Self::with_status(StatusCode::OK, data, msg)
    }

    /// `201 Created` with payload.
    pub fn created(data: T, msg: impl Into<String>) -> Self {
        Self::with_status(StatusCode::CREATED, data, msg)
    }

    fn with_status(status: StatusCode, data: T, msg: impl Into<String>) -> Self {
        Self {
            code: status.as_u16(),
            data: Some(data),
            msg: msg.into(),
        }
    }

    /// HTTP status carried by `code`.
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl Message {
    /// Message-only envelope.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            code: status.as_u16(),
            data: None,
            msg: msg.into(),
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_has_no_data_field() {
        let body = serde_json::to_value(Message::new(StatusCode::OK, "done")).unwrap();
        assert_eq!(body, json!({ "code": 200, "msg": "done" }));
    }

    #[test]
    fn test_empty_list_is_kept() {
        let body =
            serde_json::to_value(Envelope::ok(Vec::<u8>::new(), "listed")).unwrap();
        assert_eq!(body, json!({ "code": 200, "data": [], "msg": "listed" }));
    }

    #[test]
    fn test_created_status() {
        let envelope = Envelope::created(1, "created");
        assert_eq!(envelope.status(), StatusCode::CREATED);
        assert_eq!(envelope.into_response().status(), StatusCode::CREATED);
    }
}
