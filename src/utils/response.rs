use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};

/// Standard envelope: every body carries a `status` field, successes add
/// either `data` or `message`, errors carry `message`.
#[derive(Serialize)]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

pub fn success<T>(data: T) -> Response
where
    T: Serialize,
{
    let body = ApiResponse {
        status: "success",
        message: None,
        data: Some(data),
    };
    (StatusCode::OK, Json(body)).into_response()
}

pub fn success_message(message: impl Into<String>) -> Response {
    let body: ApiResponse<()> = ApiResponse {
        status: "success",
        message: Some(message.into()),
        data: None,
    };
    (StatusCode::OK, Json(body)).into_response()
}

/// Success with the payload keys spliced into the top-level object, for
/// endpoints that return several named entities side by side.
pub fn success_fields(status: StatusCode, fields: Value) -> Response {
    let mut fields = fields;
    if let Value::Object(map) = &mut fields {
        map.insert("status".to_string(), json!("success"));
    }
    (status, Json(fields)).into_response()
}

pub fn error(status: StatusCode, message: impl Into<String>) -> Response {
    let body = json!({
        "status": "error",
        "message": message.into(),
    });
    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_fields_injects_status() {
        let response = success_fields(StatusCode::CREATED, json!({"event": {"id": 1}}));
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[test]
    fn error_carries_status_code() {
        let response = error(StatusCode::BAD_REQUEST, "Invalid branch");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
