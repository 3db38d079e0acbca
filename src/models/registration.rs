use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const PAYMENT_PENDING: &str = "pending";
pub const PAYMENT_PAID: &str = "paid";

pub const DEFAULT_PAYMENT_METHOD: &str = "card";

/// A confirmed signup. Immutable after creation; cancellation deletes the
/// row outright.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Registration {
    pub id: String,
    pub event_id: i32,
    pub student_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount_paid: Decimal,
    pub payment_status: String,
    pub payment_method: String,
    pub transaction_id: Option<String>,
    pub special_requirements: String,
    pub registered_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for the capacity-checked insert. Payment fields are already
/// resolved by the registration engine.
#[derive(Debug, Clone)]
pub struct NewRegistration {
    pub id: String,
    pub event_id: i32,
    pub student_id: String,
    pub amount_paid: Decimal,
    pub payment_status: String,
    pub payment_method: String,
    pub transaction_id: Option<String>,
    pub special_requirements: String,
}
