//! Get a single user.

use axum::extract::{Path, State};

use crate::AppState;
use crate::error::Result;
use crate::response::Envelope;
use crate::router::parse_id;
use crate::user::User;

const FOUND: &str = "获取用户信息成功";

pub async fn handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Envelope<User>> {
    let id = parse_id(super::ID, &id)?;
    let user = state.users.get_by_id(id).await?;
    Ok(Envelope::ok(user, FOUND))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::user::USER_NOT_FOUND;
    use crate::{app, make_request, router};

    #[tokio::test]
    async fn test_get_handler() {
        let app = app(router::state());
        let user = json!({
            "username": "alice",
            "email": "alice@example.com",
            "password": "pw",
            "name": "Alice",
        });
        let (_, created) =
            make_request(app.clone(), Method::POST, "/api/v1/users", &user.to_string()).await;
        let id = created["data"]["id"].as_u64().unwrap();

        let (status, body) =
            make_request(app, Method::GET, &format!("/api/v1/users/{id}"), "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["code"], 200);
        assert_eq!(body["msg"], super::FOUND);
        assert_eq!(body["data"], created["data"]);
        assert!(body["data"].get("password").is_none());
    }

    #[tokio::test]
    async fn test_get_unknown_user() {
        let app = app(router::state());

        let (status, body) = make_request(app, Method::GET, "/api/v1/users/999999", "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "code": 404, "msg": USER_NOT_FOUND }));
    }

    #[tokio::test]
    async fn test_get_invalid_id() {
        let app = app(router::state());

        for id in ["abc", "-3"] {
            let (status, body) =
                make_request(app.clone(), Method::GET, &format!("/api/v1/users/{id}"), "").await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body, json!({ "code": 400, "msg": "Invalid id" }));
        }
    }
}
