use axum::routing::{get, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, frame_options_layer, nosniff_layer};
use crate::handlers::{admin, auth, health, payment, portal, public};
use crate::AppState;

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        // Student authentication
        .route("/student/register", post(auth::register_student))
        .route("/student/login", post(auth::login))
        // Admin portal
        .route(
            "/admin/events",
            get(admin::list_events).post(admin::create_event),
        )
        .route(
            "/admin/events/:id",
            put(admin::update_event).delete(admin::delete_event),
        )
        .route("/admin/events/:id/details", get(admin::event_details))
        .route("/admin/registrations", get(admin::list_registrations))
        .route("/admin/dashboard", get(admin::dashboard))
        .route("/admin/students", get(admin::list_students))
        // Student portal
        .route("/student/events", get(portal::list_events))
        .route("/student/register-event", post(portal::register_event))
        // GET takes a student id, DELETE a registration id; the path shape
        // is shared so both live on one route.
        .route(
            "/student/registrations/:id",
            get(portal::student_registrations).delete(portal::cancel_registration),
        )
        // Public API
        .route("/events", get(public::list_events))
        .route("/events/:id", get(public::get_event))
        .route("/categories", get(public::list_categories))
        .route("/branches", get(public::list_branches))
        .route("/semesters", get(public::list_semesters))
        .route("/students", get(public::list_students))
        .route("/payment/process", post(payment::process_payment))
        .route("/health", get(health::health_check))
        .layer(TraceLayer::new_for_http())
        .layer(nosniff_layer())
        .layer(frame_options_layer())
        .layer(create_cors_layer())
        .with_state(state)
}
