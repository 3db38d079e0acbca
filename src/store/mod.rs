pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::event::{Event, EventPatch, NewEvent};
use crate::models::registration::{NewRegistration, Registration};
use crate::models::student::{NewStudent, Student};
use crate::utils::error::AppError;

pub use memory::MemStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate key: {0}")]
    Duplicate(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(message) => AppError::Conflict(message),
            StoreError::Database(e) => AppError::Database(e),
        }
    }
}

/// Outcome of the capacity-checked registration insert. Full and duplicate
/// are produced by the store itself so the check and the write commit as
/// one unit.
#[derive(Debug)]
pub enum RegistrationInsert {
    Created(Registration),
    EventFull,
    AlreadyRegistered,
}

/// Persistence boundary for events, students and registrations. Handlers
/// and the registration engine receive this by reference; all operations
/// take and return plain data.
#[async_trait]
pub trait Store: Send + Sync {
    // Events
    async fn insert_event(&self, new: NewEvent) -> Result<Event, StoreError>;
    async fn event(&self, id: i32) -> Result<Option<Event>, StoreError>;
    async fn events(&self) -> Result<Vec<Event>, StoreError>;
    async fn events_by_status(&self, status: &str) -> Result<Vec<Event>, StoreError>;
    async fn update_event(&self, id: i32, patch: EventPatch) -> Result<Option<Event>, StoreError>;
    /// Deletes the event and, by cascade, its registrations.
    async fn delete_event(&self, id: i32) -> Result<bool, StoreError>;
    async fn event_categories(&self) -> Result<Vec<String>, StoreError>;
    async fn count_events(&self) -> Result<i64, StoreError>;
    async fn count_events_after(&self, date: NaiveDate) -> Result<i64, StoreError>;
    async fn upcoming_events(
        &self,
        after: NaiveDate,
        until: NaiveDate,
        limit: i64,
    ) -> Result<Vec<Event>, StoreError>;

    // Students
    async fn insert_student(&self, new: NewStudent) -> Result<Student, StoreError>;
    async fn student(&self, id: &str) -> Result<Option<Student>, StoreError>;
    async fn student_by_usn(&self, usn: &str) -> Result<Option<Student>, StoreError>;
    async fn student_by_usn_or_email(
        &self,
        usn: &str,
        email: &str,
    ) -> Result<Option<Student>, StoreError>;
    async fn students(&self) -> Result<Vec<Student>, StoreError>;
    /// Deletes the student and, by cascade, their registrations.
    async fn delete_student(&self, id: &str) -> Result<bool, StoreError>;

    // Registrations
    /// Insert iff the event still has a free spot. The capacity check and
    /// the insert are a single atomic statement; the (event, student)
    /// unique constraint reports duplicates.
    async fn create_registration(
        &self,
        new: NewRegistration,
        capacity: i32,
    ) -> Result<RegistrationInsert, StoreError>;
    async fn registration(&self, id: &str) -> Result<Option<Registration>, StoreError>;
    async fn registrations(&self) -> Result<Vec<Registration>, StoreError>;
    async fn registrations_for_event(&self, event_id: i32)
        -> Result<Vec<Registration>, StoreError>;
    async fn registrations_for_student(
        &self,
        student_id: &str,
    ) -> Result<Vec<Registration>, StoreError>;
    async fn registration_for(
        &self,
        event_id: i32,
        student_id: &str,
    ) -> Result<Option<Registration>, StoreError>;
    async fn count_registrations(&self) -> Result<i64, StoreError>;
    async fn count_registrations_for_event(&self, event_id: i32) -> Result<i64, StoreError>;
    async fn count_registrations_for_student(&self, student_id: &str) -> Result<i64, StoreError>;
    async fn delete_registration(&self, id: &str) -> Result<bool, StoreError>;
    /// Sum of amount_paid over registrations with payment_status = paid.
    async fn paid_revenue(&self) -> Result<Decimal, StoreError>;
    async fn paid_revenue_for_event(&self, event_id: i32) -> Result<Decimal, StoreError>;
    async fn recent_registrations(
        &self,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Registration>, StoreError>;
}
