use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::handlers::{json_body, required, required_value};
use crate::models::student::{validate_branch, validate_semester, NewStudent};
use crate::utils::error::AppError;
use crate::utils::password;
use crate::utils::response::success_fields;
use crate::AppState;

#[derive(Deserialize)]
pub struct RegisterStudentRequest {
    pub usn: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub semester: Option<i32>,
    pub branch: Option<String>,
}

pub async fn register_student(
    State(state): State<AppState>,
    payload: Result<Json<RegisterStudentRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let body = json_body(payload)?;

    let usn = required(&body.usn, "usn")?.to_string();
    let name = required(&body.name, "name")?.to_string();
    let email = required(&body.email, "email")?.to_string();
    let raw_password = required(&body.password, "password")?;
    let semester = required_value(body.semester, "semester")?;
    let branch = required(&body.branch, "branch")?.to_string();

    validate_semester(semester)?;
    validate_branch(&branch)?;

    if state
        .store
        .student_by_usn_or_email(&usn, &email)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("USN or email already exists".to_string()));
    }

    let new = NewStudent {
        id: usn.clone(),
        name,
        email,
        phone: body.phone.unwrap_or_default(),
        usn,
        semester,
        branch,
        password_hash: password::hash(raw_password)?,
        is_active: true,
    };

    let student = state.store.insert_student(new).await?;
    info!(usn = %student.usn, "student account created");

    Ok(success_fields(
        StatusCode::CREATED,
        json!({
            "message": "Registration successful",
            "student": student,
        }),
    ))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub usn: Option<String>,
    pub password: Option<String>,
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let body = json_body(payload)?;

    let usn = body.usn.as_deref().map(str::trim).unwrap_or_default();
    let raw_password = body.password.as_deref().unwrap_or_default();
    if usn.is_empty() || raw_password.is_empty() {
        return Err(AppError::Validation(
            "USN and password are required".to_string(),
        ));
    }

    let student = state
        .store
        .student_by_usn(usn)
        .await?
        .filter(|s| password::verify(raw_password, &s.password_hash))
        .ok_or_else(|| AppError::Auth("Invalid USN or password".to_string()))?;

    if !student.is_active {
        return Err(AppError::Auth("Account is deactivated".to_string()));
    }

    Ok(success_fields(
        StatusCode::OK,
        json!({
            "message": "Login successful",
            "student": student,
        }),
    ))
}
