use axum::response::Response;
use chrono::Utc;
use serde::Serialize;

use crate::utils::response::success;

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
    timestamp: String,
}

pub async fn health_check() -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "campus-events-api",
        timestamp: Utc::now().to_rfc3339(),
    };

    success(payload)
}
