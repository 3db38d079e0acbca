use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use chrono::{Duration, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::handlers::{json_body, required, required_value};
use crate::models::event::{
    parse_date, parse_time, Event, EventPatch, NewEvent, PriceInput, DEFAULT_DURATION_HOURS,
    DEFAULT_ORGANIZER, STATUS_ACTIVE,
};
use crate::models::registration::Registration;
use crate::models::student::Student;
use crate::services::projection::{available_spots, format_amount, format_price};
use crate::utils::error::AppError;
use crate::utils::response::{success, success_fields, success_message};
use crate::AppState;

/// Wire shape shared by event creation and the typed update patch; every
/// field is optional so the handlers decide what is required.
#[derive(Deserialize)]
pub struct EventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub duration: Option<i32>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub capacity: Option<i32>,
    pub price: Option<PriceInput>,
    pub image: Option<String>,
    pub organizer: Option<String>,
    pub status: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Serialize)]
struct EventWithStats {
    #[serde(flatten)]
    event: Event,
    registration_count: i64,
    #[serde(with = "rust_decimal::serde::float")]
    revenue: Decimal,
    price_formatted: String,
}

#[derive(Serialize)]
struct RegistrationDetail {
    #[serde(flatten)]
    registration: Registration,
    event: Event,
    student: Student,
    amount_formatted: String,
}

#[derive(Serialize)]
struct RegistrationWithStudent {
    #[serde(flatten)]
    registration: Registration,
    student: Student,
    amount_formatted: String,
}

#[derive(Serialize)]
struct StudentWithStats {
    #[serde(flatten)]
    student: Student,
    registration_count: i64,
}

#[derive(Serialize)]
struct EventDetails {
    #[serde(flatten)]
    event: Event,
    registrations: Vec<RegistrationWithStudent>,
    total_registrations: i64,
    available_spots: i64,
    price_formatted: String,
}

pub async fn list_events(State(state): State<AppState>) -> Result<Response, AppError> {
    let events = state.store.events().await?;
    let mut rows = Vec::with_capacity(events.len());
    for event in events {
        let registration_count = state.store.count_registrations_for_event(event.id).await?;
        let revenue = state.store.paid_revenue_for_event(event.id).await?;
        let price_formatted = format_price(event.price);
        rows.push(EventWithStats {
            event,
            registration_count,
            revenue,
            price_formatted,
        });
    }
    Ok(success(rows))
}

pub async fn create_event(
    State(state): State<AppState>,
    payload: Result<Json<EventRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let body = json_body(payload)?;

    // Presence first, formats second, so a missing field is reported
    // before a malformed one.
    let title = required(&body.title, "title")?.to_string();
    let description = required(&body.description, "description")?.to_string();
    let date = required(&body.date, "date")?;
    let time = required(&body.time, "time")?;
    let location = required(&body.location, "location")?.to_string();
    let category = required(&body.category, "category")?.to_string();
    let capacity = required_value(body.capacity, "capacity")?;
    let price = body
        .price
        .ok_or_else(|| AppError::Validation("price is required".to_string()))?;

    let date = parse_date(date)?;
    let time = parse_time(time)?;
    let price = price.into_decimal()?;

    if capacity < 0 {
        return Err(AppError::Validation(
            "capacity must be non-negative".to_string(),
        ));
    }

    let new = NewEvent {
        title,
        description,
        date,
        time,
        duration: body.duration.unwrap_or(DEFAULT_DURATION_HOURS),
        location,
        category,
        capacity,
        price,
        image: body.image.unwrap_or_default(),
        organizer: body
            .organizer
            .unwrap_or_else(|| DEFAULT_ORGANIZER.to_string()),
        status: STATUS_ACTIVE.to_string(),
        tags: body.tags.unwrap_or_default(),
    };

    let event = state.store.insert_event(new).await?;
    info!(event_id = event.id, title = %event.title, "event created");

    Ok(success_fields(
        StatusCode::CREATED,
        json!({ "event": event }),
    ))
}

pub async fn update_event(
    State(state): State<AppState>,
    Path(event_id): Path<i32>,
    payload: Result<Json<EventRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let body = json_body(payload)?;
    let patch = build_patch(body)?;

    let event = state
        .store
        .update_event(event_id, patch)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    Ok(success_fields(StatusCode::OK, json!({ "event": event })))
}

fn build_patch(body: EventRequest) -> Result<EventPatch, AppError> {
    let mut patch = EventPatch {
        title: body.title,
        description: body.description,
        duration: body.duration,
        location: body.location,
        category: body.category,
        image: body.image,
        organizer: body.organizer,
        status: body.status,
        tags: body.tags,
        ..Default::default()
    };

    // Blank date/time strings mean "leave unchanged", matching the admin
    // client which always submits the full form.
    if let Some(date) = body.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        patch.date = Some(parse_date(date)?);
    }
    if let Some(time) = body.time.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        patch.time = Some(parse_time(time)?);
    }
    if let Some(price) = body.price {
        patch.price = Some(price.into_decimal()?);
    }
    if let Some(capacity) = body.capacity {
        if capacity < 0 {
            return Err(AppError::Validation(
                "capacity must be non-negative".to_string(),
            ));
        }
        patch.capacity = Some(capacity);
    }

    Ok(patch)
}

pub async fn delete_event(
    State(state): State<AppState>,
    Path(event_id): Path<i32>,
) -> Result<Response, AppError> {
    if !state.store.delete_event(event_id).await? {
        return Err(AppError::NotFound("Event not found".to_string()));
    }
    info!(event_id, "event deleted");
    Ok(success_message("Event deleted"))
}

pub async fn list_registrations(State(state): State<AppState>) -> Result<Response, AppError> {
    let registrations = state.store.registrations().await?;
    let mut rows = Vec::with_capacity(registrations.len());
    for registration in registrations {
        let Some(event) = state.store.event(registration.event_id).await? else {
            continue;
        };
        let Some(student) = state.store.student(&registration.student_id).await? else {
            continue;
        };
        let amount_formatted = format_amount(registration.amount_paid);
        rows.push(RegistrationDetail {
            registration,
            event,
            student,
            amount_formatted,
        });
    }
    Ok(success(rows))
}

pub async fn dashboard(State(state): State<AppState>) -> Result<Response, AppError> {
    let today = Utc::now().date_naive();
    let total_revenue = state.store.paid_revenue().await?;
    let upcoming_events = state
        .store
        .upcoming_events(today, today + Duration::days(30), 5)
        .await?;
    let recent_registrations = state
        .store
        .recent_registrations(Utc::now() - Duration::days(7), 5)
        .await?;

    let payload = json!({
        "total_events": state.store.count_events().await?,
        "total_registrations": state.store.count_registrations().await?,
        "total_revenue": total_revenue.to_f64().unwrap_or(0.0),
        "total_revenue_formatted": format_amount(total_revenue),
        "upcoming_events_count": state.store.count_events_after(today).await?,
        "recent_registrations_count": recent_registrations.len(),
        "upcoming_events": upcoming_events,
        "recent_registrations": recent_registrations,
    });

    Ok(success(payload))
}

pub async fn list_students(State(state): State<AppState>) -> Result<Response, AppError> {
    let students = state.store.students().await?;
    let mut rows = Vec::with_capacity(students.len());
    for student in students {
        let registration_count = state
            .store
            .count_registrations_for_student(&student.id)
            .await?;
        rows.push(StudentWithStats {
            student,
            registration_count,
        });
    }
    Ok(success(rows))
}

pub async fn event_details(
    State(state): State<AppState>,
    Path(event_id): Path<i32>,
) -> Result<Response, AppError> {
    let event = state
        .store
        .event(event_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    let registrations = state.store.registrations_for_event(event_id).await?;
    let mut rows = Vec::with_capacity(registrations.len());
    for registration in registrations {
        let Some(student) = state.store.student(&registration.student_id).await? else {
            continue;
        };
        let amount_formatted = format_amount(registration.amount_paid);
        rows.push(RegistrationWithStudent {
            registration,
            student,
            amount_formatted,
        });
    }

    let total_registrations = rows.len() as i64;
    let details = EventDetails {
        available_spots: available_spots(event.capacity, total_registrations),
        price_formatted: format_price(event.price),
        event,
        registrations: rows,
        total_registrations,
    };

    Ok(success(details))
}
