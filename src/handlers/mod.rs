pub mod admin;
pub mod auth;
pub mod health;
pub mod payment;
pub mod portal;
pub mod public;

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::utils::error::AppError;

/// Unwrap a JSON body, turning any extractor rejection into the flat 400
/// the clients expect.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|_| AppError::Validation("Invalid JSON".to_string()))
}

/// Required string field: present and non-blank after trimming, or a
/// "<field> is required" validation error.
pub(crate) fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str, AppError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation(format!("{field} is required")))
}

pub(crate) fn required_value<T: Copy>(value: Option<T>, field: &str) -> Result<T, AppError> {
    value.ok_or_else(|| AppError::Validation(format!("{field} is required")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_rejects_missing_and_blank() {
        assert!(required(&None, "title").is_err());
        assert!(required(&Some("   ".to_string()), "title").is_err());
        assert_eq!(
            required(&Some("  Tech Summit ".to_string()), "title").unwrap(),
            "Tech Summit"
        );
    }

    #[test]
    fn required_names_the_field() {
        let err = required(&None, "usn").unwrap_err();
        assert_eq!(err.to_string(), "Validation error: usn is required");
    }
}
