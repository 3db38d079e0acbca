use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::models::event::{Event, EventPatch, NewEvent};
use crate::models::registration::{NewRegistration, Registration};
use crate::models::student::{NewStudent, Student};
use crate::store::{RegistrationInsert, Store, StoreError};

const SQL_INSERT_EVENT: &str = r#"
INSERT INTO events (
  title, description, date, time, duration, location,
  category, capacity, price, image, organizer, status, tags
) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
RETURNING *
"#;

const SQL_UPDATE_EVENT: &str = r#"
UPDATE events SET
  title = COALESCE($2, title),
  description = COALESCE($3, description),
  date = COALESCE($4, date),
  time = COALESCE($5, time),
  duration = COALESCE($6, duration),
  location = COALESCE($7, location),
  category = COALESCE($8, category),
  capacity = COALESCE($9, capacity),
  price = COALESCE($10, price),
  image = COALESCE($11, image),
  organizer = COALESCE($12, organizer),
  status = COALESCE($13, status),
  tags = COALESCE($14, tags),
  updated_at = now()
WHERE id = $1
RETURNING *
"#;

const SQL_INSERT_STUDENT: &str = r#"
INSERT INTO students (
  id, name, email, phone, usn, semester, branch, password_hash, is_active
) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
RETURNING *
"#;

// The capacity check rides inside the insert: zero rows come back when the
// event is already at capacity, and the (event_id, student_id) unique
// constraint rejects double signups.
const SQL_INSERT_REGISTRATION: &str = r#"
INSERT INTO registrations (
  id, event_id, student_id, amount_paid, payment_status,
  payment_method, transaction_id, special_requirements
)
SELECT $1, $2, $3, $4, $5, $6, $7, $8
WHERE (SELECT COUNT(*) FROM registrations WHERE event_id = $2) < $9
RETURNING *
"#;

/// Postgres-backed store. Constraints in `migrations/` carry the
/// uniqueness and cascade rules.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn duplicate_or_db(e: sqlx::Error, message: &str) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Duplicate(message.to_string())
        }
        _ => StoreError::Database(e),
    }
}

#[async_trait]
impl Store for PgStore {
    async fn insert_event(&self, new: NewEvent) -> Result<Event, StoreError> {
        let event = sqlx::query_as::<_, Event>(SQL_INSERT_EVENT)
            .bind(&new.title)
            .bind(&new.description)
            .bind(new.date)
            .bind(new.time)
            .bind(new.duration)
            .bind(&new.location)
            .bind(&new.category)
            .bind(new.capacity)
            .bind(new.price)
            .bind(&new.image)
            .bind(&new.organizer)
            .bind(&new.status)
            .bind(&new.tags)
            .fetch_one(&self.pool)
            .await?;
        Ok(event)
    }

    async fn event(&self, id: i32) -> Result<Option<Event>, StoreError> {
        let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(event)
    }

    async fn events(&self) -> Result<Vec<Event>, StoreError> {
        let events = sqlx::query_as::<_, Event>("SELECT * FROM events ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(events)
    }

    async fn events_by_status(&self, status: &str) -> Result<Vec<Event>, StoreError> {
        let events =
            sqlx::query_as::<_, Event>("SELECT * FROM events WHERE status = $1 ORDER BY id")
                .bind(status)
                .fetch_all(&self.pool)
                .await?;
        Ok(events)
    }

    async fn update_event(&self, id: i32, patch: EventPatch) -> Result<Option<Event>, StoreError> {
        let event = sqlx::query_as::<_, Event>(SQL_UPDATE_EVENT)
            .bind(id)
            .bind(patch.title)
            .bind(patch.description)
            .bind(patch.date)
            .bind(patch.time)
            .bind(patch.duration)
            .bind(patch.location)
            .bind(patch.category)
            .bind(patch.capacity)
            .bind(patch.price)
            .bind(patch.image)
            .bind(patch.organizer)
            .bind(patch.status)
            .bind(patch.tags)
            .fetch_optional(&self.pool)
            .await?;
        Ok(event)
    }

    async fn delete_event(&self, id: i32) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn event_categories(&self) -> Result<Vec<String>, StoreError> {
        let categories =
            sqlx::query_scalar::<_, String>("SELECT DISTINCT category FROM events ORDER BY category")
                .fetch_all(&self.pool)
                .await?;
        Ok(categories)
    }

    async fn count_events(&self) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM events")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn count_events_after(&self, date: NaiveDate) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM events WHERE date > $1")
            .bind(date)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn upcoming_events(
        &self,
        after: NaiveDate,
        until: NaiveDate,
        limit: i64,
    ) -> Result<Vec<Event>, StoreError> {
        let events = sqlx::query_as::<_, Event>(
            "SELECT * FROM events WHERE date > $1 AND date <= $2 ORDER BY date LIMIT $3",
        )
        .bind(after)
        .bind(until)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(events)
    }

    async fn insert_student(&self, new: NewStudent) -> Result<Student, StoreError> {
        let student = sqlx::query_as::<_, Student>(SQL_INSERT_STUDENT)
            .bind(&new.id)
            .bind(&new.name)
            .bind(&new.email)
            .bind(&new.phone)
            .bind(&new.usn)
            .bind(new.semester)
            .bind(&new.branch)
            .bind(&new.password_hash)
            .bind(new.is_active)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| duplicate_or_db(e, "USN or email already exists"))?;
        Ok(student)
    }

    async fn student(&self, id: &str) -> Result<Option<Student>, StoreError> {
        let student = sqlx::query_as::<_, Student>("SELECT * FROM students WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(student)
    }

    async fn student_by_usn(&self, usn: &str) -> Result<Option<Student>, StoreError> {
        let student = sqlx::query_as::<_, Student>("SELECT * FROM students WHERE usn = $1")
            .bind(usn)
            .fetch_optional(&self.pool)
            .await?;
        Ok(student)
    }

    async fn student_by_usn_or_email(
        &self,
        usn: &str,
        email: &str,
    ) -> Result<Option<Student>, StoreError> {
        let student =
            sqlx::query_as::<_, Student>("SELECT * FROM students WHERE usn = $1 OR email = $2")
                .bind(usn)
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
        Ok(student)
    }

    async fn students(&self) -> Result<Vec<Student>, StoreError> {
        let students = sqlx::query_as::<_, Student>("SELECT * FROM students ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(students)
    }

    async fn delete_student(&self, id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_registration(
        &self,
        new: NewRegistration,
        capacity: i32,
    ) -> Result<RegistrationInsert, StoreError> {
        let inserted = sqlx::query_as::<_, Registration>(SQL_INSERT_REGISTRATION)
            .bind(&new.id)
            .bind(new.event_id)
            .bind(&new.student_id)
            .bind(new.amount_paid)
            .bind(&new.payment_status)
            .bind(&new.payment_method)
            .bind(&new.transaction_id)
            .bind(&new.special_requirements)
            .bind(capacity)
            .fetch_optional(&self.pool)
            .await;

        match inserted {
            Ok(Some(registration)) => Ok(RegistrationInsert::Created(registration)),
            Ok(None) => Ok(RegistrationInsert::EventFull),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Ok(RegistrationInsert::AlreadyRegistered)
            }
            Err(e) => Err(StoreError::Database(e)),
        }
    }

    async fn registration(&self, id: &str) -> Result<Option<Registration>, StoreError> {
        let registration =
            sqlx::query_as::<_, Registration>("SELECT * FROM registrations WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(registration)
    }

    async fn registrations(&self) -> Result<Vec<Registration>, StoreError> {
        let registrations =
            sqlx::query_as::<_, Registration>("SELECT * FROM registrations ORDER BY registered_at")
                .fetch_all(&self.pool)
                .await?;
        Ok(registrations)
    }

    async fn registrations_for_event(
        &self,
        event_id: i32,
    ) -> Result<Vec<Registration>, StoreError> {
        let registrations = sqlx::query_as::<_, Registration>(
            "SELECT * FROM registrations WHERE event_id = $1 ORDER BY registered_at",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(registrations)
    }

    async fn registrations_for_student(
        &self,
        student_id: &str,
    ) -> Result<Vec<Registration>, StoreError> {
        let registrations = sqlx::query_as::<_, Registration>(
            "SELECT * FROM registrations WHERE student_id = $1 ORDER BY registered_at",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(registrations)
    }

    async fn registration_for(
        &self,
        event_id: i32,
        student_id: &str,
    ) -> Result<Option<Registration>, StoreError> {
        let registration = sqlx::query_as::<_, Registration>(
            "SELECT * FROM registrations WHERE event_id = $1 AND student_id = $2",
        )
        .bind(event_id)
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(registration)
    }

    async fn count_registrations(&self) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM registrations")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn count_registrations_for_event(&self, event_id: i32) -> Result<i64, StoreError> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM registrations WHERE event_id = $1")
                .bind(event_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    async fn count_registrations_for_student(&self, student_id: &str) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM registrations WHERE student_id = $1",
        )
        .bind(student_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn delete_registration(&self, id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM registrations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn paid_revenue(&self) -> Result<Decimal, StoreError> {
        let revenue = sqlx::query_scalar::<_, Decimal>(
            "SELECT COALESCE(SUM(amount_paid), 0) FROM registrations WHERE payment_status = 'paid'",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(revenue)
    }

    async fn paid_revenue_for_event(&self, event_id: i32) -> Result<Decimal, StoreError> {
        let revenue = sqlx::query_scalar::<_, Decimal>(
            "SELECT COALESCE(SUM(amount_paid), 0) FROM registrations \
             WHERE event_id = $1 AND payment_status = 'paid'",
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(revenue)
    }

    async fn recent_registrations(
        &self,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Registration>, StoreError> {
        let registrations = sqlx::query_as::<_, Registration>(
            "SELECT * FROM registrations WHERE registered_at > $1 \
             ORDER BY registered_at DESC LIMIT $2",
        )
        .bind(since)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(registrations)
    }
}
