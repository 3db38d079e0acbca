use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::handlers::json_body;
use crate::models::event::{Event, STATUS_ACTIVE};
use crate::models::registration::Registration;
use crate::services::projection::{available_spots, format_price, is_full};
use crate::services::registration::{self, RegisterEvent};
use crate::utils::error::AppError;
use crate::utils::response::{success, success_fields, success_message};
use crate::AppState;

#[derive(Serialize)]
struct EventWithAvailability {
    #[serde(flatten)]
    event: Event,
    available_spots: i64,
    is_full: bool,
    price_formatted: String,
}

#[derive(Serialize)]
struct RegistrationWithEvent {
    #[serde(flatten)]
    registration: Registration,
    event: Event,
}

async fn with_availability(
    state: &AppState,
    event: Event,
) -> Result<EventWithAvailability, AppError> {
    let registered = state.store.count_registrations_for_event(event.id).await?;
    Ok(EventWithAvailability {
        available_spots: available_spots(event.capacity, registered),
        is_full: is_full(event.capacity, registered),
        price_formatted: format_price(event.price),
        event,
    })
}

/// Active events with live availability, for the signup screen.
pub async fn list_events(State(state): State<AppState>) -> Result<Response, AppError> {
    let events = state.store.events_by_status(STATUS_ACTIVE).await?;
    let mut rows = Vec::with_capacity(events.len());
    for event in events {
        rows.push(with_availability(&state, event).await?);
    }
    Ok(success(rows))
}

#[derive(Deserialize)]
pub struct RegisterEventRequest {
    pub event_id: Option<i32>,
    pub student_id: Option<String>,
    pub payment_method: Option<String>,
    pub special_requirements: Option<String>,
}

pub async fn register_event(
    State(state): State<AppState>,
    payload: Result<Json<RegisterEventRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let body = json_body(payload)?;

    let (Some(event_id), Some(student_id)) = (body.event_id, body.student_id) else {
        return Err(AppError::Validation(
            "event_id and student_id are required".to_string(),
        ));
    };

    let outcome = registration::register(
        state.store.as_ref(),
        RegisterEvent {
            event_id,
            student_id,
            payment_method: body.payment_method,
            special_requirements: body.special_requirements,
        },
    )
    .await?;

    info!(
        registration_id = %outcome.registration.id,
        event_id = outcome.event.id,
        student_id = %outcome.student.id,
        "registration created"
    );

    Ok(success_fields(
        StatusCode::CREATED,
        json!({
            "registration": outcome.registration,
            "event": outcome.event,
            "student": outcome.student,
        }),
    ))
}

pub async fn student_registrations(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Result<Response, AppError> {
    let registrations = state.store.registrations_for_student(&student_id).await?;
    let mut rows = Vec::with_capacity(registrations.len());
    for registration in registrations {
        let Some(event) = state.store.event(registration.event_id).await? else {
            continue;
        };
        rows.push(RegistrationWithEvent {
            registration,
            event,
        });
    }
    Ok(success(rows))
}

pub async fn cancel_registration(
    State(state): State<AppState>,
    Path(registration_id): Path<String>,
) -> Result<Response, AppError> {
    registration::cancel(state.store.as_ref(), &registration_id).await?;
    info!(%registration_id, "registration cancelled");
    Ok(success_message("Registration cancelled"))
}
