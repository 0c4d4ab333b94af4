//! Liveness probe.

use axum::Json;
use serde::{Deserialize, Serialize};

/// Health report.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Health {
    status: String,
}

/// `GET /health`, answered without touching the database.
pub async fn health() -> Json<Health> {
    Json(Health {
        status: "ok".into(),
    })
}
