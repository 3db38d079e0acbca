use axum::extract::{Path, State};
use axum::response::Response;
use serde::Serialize;

use crate::models::event::{Event, STATUS_ACTIVE};
use crate::models::student::{BRANCHES, MAX_SEMESTER, MIN_SEMESTER};
use crate::services::projection::{available_spots, format_price, is_full};
use crate::utils::error::AppError;
use crate::utils::response::success;
use crate::AppState;

#[derive(Serialize)]
struct EventListing {
    #[serde(flatten)]
    event: Event,
    price_formatted: String,
}

#[derive(Serialize)]
struct EventView {
    #[serde(flatten)]
    event: Event,
    available_spots: i64,
    is_full: bool,
    price_formatted: String,
}

pub async fn list_events(State(state): State<AppState>) -> Result<Response, AppError> {
    let events = state.store.events_by_status(STATUS_ACTIVE).await?;
    let rows: Vec<EventListing> = events
        .into_iter()
        .map(|event| EventListing {
            price_formatted: format_price(event.price),
            event,
        })
        .collect();
    Ok(success(rows))
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<i32>,
) -> Result<Response, AppError> {
    let event = state
        .store
        .event(event_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    let registered = state.store.count_registrations_for_event(event.id).await?;
    let view = EventView {
        available_spots: available_spots(event.capacity, registered),
        is_full: is_full(event.capacity, registered),
        price_formatted: format_price(event.price),
        event,
    };
    Ok(success(view))
}

pub async fn list_categories(State(state): State<AppState>) -> Result<Response, AppError> {
    let categories = state.store.event_categories().await?;
    Ok(success(categories))
}

pub async fn list_branches() -> Response {
    success(BRANCHES)
}

pub async fn list_semesters() -> Response {
    let semesters: Vec<i32> = (MIN_SEMESTER..=MAX_SEMESTER).collect();
    success(semesters)
}

pub async fn list_students(State(state): State<AppState>) -> Result<Response, AppError> {
    let students = state.store.students().await?;
    Ok(success(students))
}
