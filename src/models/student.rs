use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::utils::error::AppError;

pub const BRANCHES: [&str; 6] = [
    "Computer Science",
    "Computer Science and Business Systems",
    "Electronics and Communication Engineering",
    "Artificial Intelligence and Data Science",
    "Mechanical Engineering",
    "Civil Engineering",
];

pub const MIN_SEMESTER: i32 = 1;
pub const MAX_SEMESTER: i32 = 8;

/// A student account. The credential hash never leaves the server.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Student {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub usn: String,
    pub semester: i32,
    pub branch: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for account creation. The id doubles as the USN.
#[derive(Debug, Clone)]
pub struct NewStudent {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub usn: String,
    pub semester: i32,
    pub branch: String,
    pub password_hash: String,
    pub is_active: bool,
}

pub fn validate_semester(semester: i32) -> Result<(), AppError> {
    if (MIN_SEMESTER..=MAX_SEMESTER).contains(&semester) {
        Ok(())
    } else {
        Err(AppError::Validation(
            "Semester must be between 1 and 8".to_string(),
        ))
    }
}

pub fn validate_branch(branch: &str) -> Result<(), AppError> {
    if BRANCHES.contains(&branch) {
        Ok(())
    } else {
        Err(AppError::Validation("Invalid branch".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn semester_bounds() {
        assert!(validate_semester(1).is_ok());
        assert!(validate_semester(8).is_ok());
        assert!(validate_semester(0).is_err());
        assert!(validate_semester(9).is_err());
    }

    #[test]
    fn semester_error_message() {
        let err = validate_semester(9).unwrap_err();
        assert!(err.to_string().contains("Semester must be between 1 and 8"));
    }

    #[test]
    fn branch_must_be_known() {
        assert!(validate_branch("Computer Science").is_ok());
        assert!(validate_branch("Astrology").is_err());
    }
}
