//! The registration engine: capacity, uniqueness and the cancellation
//! window. Handlers hand it a store reference and plain request data.

use chrono::{Duration, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::event::{Event, STATUS_ACTIVE};
use crate::models::registration::{
    NewRegistration, Registration, DEFAULT_PAYMENT_METHOD, PAYMENT_PAID,
};
use crate::models::student::Student;
use crate::services::payment;
use crate::store::{RegistrationInsert, Store};
use crate::utils::error::AppError;

pub const CANCELLATION_WINDOW_HOURS: i64 = 24;

#[derive(Debug, Clone)]
pub struct RegisterEvent {
    pub event_id: i32,
    pub student_id: String,
    pub payment_method: Option<String>,
    pub special_requirements: Option<String>,
}

#[derive(Debug)]
pub struct RegistrationOutcome {
    pub registration: Registration,
    pub event: Event,
    pub student: Student,
}

/// Sign a student up for an event. Precondition order is fixed: missing or
/// inactive event, then missing student, then duplicate signup, then
/// capacity. The store re-checks the last two atomically, so losing a race
/// still produces the right error instead of an overbooked event.
pub async fn register(
    store: &dyn Store,
    request: RegisterEvent,
) -> Result<RegistrationOutcome, AppError> {
    let event = store
        .event(request.event_id)
        .await?
        .filter(|e| e.status == STATUS_ACTIVE)
        .ok_or_else(|| AppError::NotFound("Event not found or inactive".to_string()))?;

    let student = store
        .student(&request.student_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Student not found".to_string()))?;

    if store
        .registration_for(event.id, &student.id)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "Already registered for this event".to_string(),
        ));
    }

    // Payment is simulated and settles immediately: paid events get a
    // transaction id, free events are trivially paid with no reference.
    let transaction_id = (event.price > Decimal::ZERO).then(payment::transaction_id);

    let new = NewRegistration {
        id: Uuid::new_v4().to_string(),
        event_id: event.id,
        student_id: student.id.clone(),
        amount_paid: event.price,
        payment_status: PAYMENT_PAID.to_string(),
        payment_method: request
            .payment_method
            .unwrap_or_else(|| DEFAULT_PAYMENT_METHOD.to_string()),
        transaction_id,
        special_requirements: request.special_requirements.unwrap_or_default(),
    };

    match store.create_registration(new, event.capacity).await? {
        RegistrationInsert::Created(registration) => Ok(RegistrationOutcome {
            registration,
            event,
            student,
        }),
        RegistrationInsert::EventFull => Err(AppError::Conflict("Event is full".to_string())),
        RegistrationInsert::AlreadyRegistered => Err(AppError::Conflict(
            "Already registered for this event".to_string(),
        )),
    }
}

/// Cancel a registration. Rejected inside the 24-hour window before the
/// event starts. When the parent event row is gone the window check is
/// skipped and the cancellation goes through; the original system behaves
/// this way and callers depend on it.
pub async fn cancel(store: &dyn Store, registration_id: &str) -> Result<(), AppError> {
    let registration = store
        .registration(registration_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Registration not found".to_string()))?;

    if let Some(event) = store.event(registration.event_id).await? {
        if !cancellable(event.starts_at(), Utc::now().naive_utc()) {
            return Err(AppError::Conflict(
                "Cannot cancel within 24 hours of event".to_string(),
            ));
        }
    }

    store.delete_registration(registration_id).await?;
    Ok(())
}

fn cancellable(starts_at: NaiveDateTime, now: NaiveDateTime) -> bool {
    starts_at - now >= Duration::hours(CANCELLATION_WINDOW_HOURS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    use crate::models::event::NewEvent;
    use crate::models::student::NewStudent;
    use crate::store::MemStore;

    fn event_in_days(days: i64, capacity: i32, price: Decimal) -> NewEvent {
        let date = (Utc::now() + Duration::days(days)).date_naive();
        NewEvent {
            title: "Career Fair".to_string(),
            description: "Company booths and interviews.".to_string(),
            date,
            time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            duration: 7,
            location: "Conference Center".to_string(),
            category: "Career".to_string(),
            capacity,
            price,
            image: String::new(),
            organizer: "Career Services".to_string(),
            status: STATUS_ACTIVE.to_string(),
            tags: vec!["Career".to_string()],
        }
    }

    fn student(usn: &str) -> NewStudent {
        NewStudent {
            id: usn.to_string(),
            name: "Ravi Kumar".to_string(),
            email: format!("{}@example.edu", usn.to_lowercase()),
            phone: String::new(),
            usn: usn.to_string(),
            semester: 6,
            branch: "Mechanical Engineering".to_string(),
            password_hash: "hash".to_string(),
            is_active: true,
        }
    }

    fn request(event_id: i32, student_id: &str) -> RegisterEvent {
        RegisterEvent {
            event_id,
            student_id: student_id.to_string(),
            payment_method: None,
            special_requirements: None,
        }
    }

    async fn seeded(capacity: i32, price: Decimal) -> (MemStore, i32) {
        let store = MemStore::new();
        let event = store
            .insert_event(event_in_days(10, capacity, price))
            .await
            .unwrap();
        store.insert_student(student("1RV22ME001")).await.unwrap();
        store.insert_student(student("1RV22ME002")).await.unwrap();
        (store, event.id)
    }

    #[tokio::test]
    async fn free_event_registration_is_paid_with_no_transaction() {
        let (store, event_id) = seeded(10, Decimal::ZERO).await;
        let outcome = register(&store, request(event_id, "1RV22ME001"))
            .await
            .unwrap();
        assert_eq!(outcome.registration.payment_status, PAYMENT_PAID);
        assert_eq!(outcome.registration.amount_paid, Decimal::ZERO);
        assert!(outcome.registration.transaction_id.is_none());
    }

    #[tokio::test]
    async fn paid_event_registration_carries_transaction_id() {
        let (store, event_id) = seeded(10, Decimal::from(800)).await;
        let outcome = register(&store, request(event_id, "1RV22ME001"))
            .await
            .unwrap();
        assert_eq!(outcome.registration.amount_paid, Decimal::from(800));
        let txn = outcome.registration.transaction_id.unwrap();
        assert!(txn.starts_with("TXN_"));
        assert_eq!(txn.len(), 12);
    }

    #[tokio::test]
    async fn duplicate_signup_is_rejected() {
        let (store, event_id) = seeded(10, Decimal::ZERO).await;
        register(&store, request(event_id, "1RV22ME001"))
            .await
            .unwrap();
        let err = register(&store, request(event_id, "1RV22ME001"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Already registered"));
    }

    #[tokio::test]
    async fn capacity_edge_last_spot_then_full() {
        let (store, event_id) = seeded(1, Decimal::ZERO).await;
        register(&store, request(event_id, "1RV22ME001"))
            .await
            .unwrap();
        let err = register(&store, request(event_id, "1RV22ME002"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Event is full"));
    }

    #[tokio::test]
    async fn inactive_event_reads_as_missing() {
        let (store, event_id) = seeded(10, Decimal::ZERO).await;
        store
            .update_event(
                event_id,
                crate::models::event::EventPatch {
                    status: Some("closed".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let err = register(&store, request(event_id, "1RV22ME001"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Event not found or inactive"));
    }

    #[tokio::test]
    async fn unknown_student_is_rejected() {
        let (store, event_id) = seeded(10, Decimal::ZERO).await;
        let err = register(&store, request(event_id, "1RV99XX999"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Student not found"));
    }

    #[tokio::test]
    async fn cancellation_outside_window_succeeds_and_frees_the_spot() {
        let (store, event_id) = seeded(1, Decimal::ZERO).await;
        let outcome = register(&store, request(event_id, "1RV22ME001"))
            .await
            .unwrap();
        // Second student is locked out while the event is full.
        register(&store, request(event_id, "1RV22ME002"))
            .await
            .unwrap_err();

        cancel(&store, &outcome.registration.id).await.unwrap();
        assert!(store
            .registration(&outcome.registration.id)
            .await
            .unwrap()
            .is_none());

        // The freed spot is immediately claimable.
        register(&store, request(event_id, "1RV22ME002"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn cancellation_inside_window_is_rejected() {
        let store = MemStore::new();
        let event = store
            .insert_event(event_in_days(0, 5, Decimal::ZERO))
            .await
            .unwrap();
        store.insert_student(student("1RV22ME001")).await.unwrap();
        let outcome = register(&store, request(event.id, "1RV22ME001"))
            .await
            .unwrap();

        let err = cancel(&store, &outcome.registration.id).await.unwrap_err();
        assert!(err.to_string().contains("Cannot cancel within 24 hours"));
        // Still registered.
        assert!(store
            .registration(&outcome.registration.id)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn cancelling_unknown_registration_is_not_found() {
        let store = MemStore::new();
        let err = cancel(&store, "nope").await.unwrap_err();
        assert!(err.to_string().contains("Registration not found"));
    }

    #[tokio::test]
    async fn missing_parent_event_skips_the_window_check() {
        let (store, event_id) = seeded(10, Decimal::ZERO).await;
        let outcome = register(&store, request(event_id, "1RV22ME001"))
            .await
            .unwrap();

        // Drop the parent row directly, keeping the registration around.
        {
            let registration = outcome.registration.clone();
            store.delete_event(event_id).await.unwrap();
            store
                .create_registration(
                    NewRegistration {
                        id: registration.id.clone(),
                        event_id: registration.event_id,
                        student_id: registration.student_id.clone(),
                        amount_paid: registration.amount_paid,
                        payment_status: registration.payment_status.clone(),
                        payment_method: registration.payment_method.clone(),
                        transaction_id: registration.transaction_id.clone(),
                        special_requirements: registration.special_requirements.clone(),
                    },
                    10,
                )
                .await
                .unwrap();
        }

        cancel(&store, &outcome.registration.id).await.unwrap();
    }

    #[test]
    fn window_boundary_is_24_hours() {
        let now = NaiveDate::from_ymd_opt(2030, 1, 10)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let exactly = now + Duration::hours(24);
        let just_inside = now + Duration::hours(23);
        assert!(cancellable(exactly, now));
        assert!(!cancellable(just_inside, now));
        // Events already in the past are inside the window too.
        assert!(!cancellable(now - Duration::hours(1), now));
    }
}
