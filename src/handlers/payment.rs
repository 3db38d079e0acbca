use axum::extract::rejection::JsonRejection;
use axum::response::Response;
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::handlers::json_body;
use crate::models::event::PriceInput;
use crate::models::registration::DEFAULT_PAYMENT_METHOD;
use crate::services::payment;
use crate::utils::error::AppError;
use crate::utils::response::success;

#[derive(Deserialize)]
pub struct ProcessPaymentRequest {
    pub amount: Option<PriceInput>,
    pub payment_method: Option<String>,
}

/// Simulated gateway endpoint. No registration is touched here; the
/// registration engine settles its own payments.
pub async fn process_payment(
    payload: Result<Json<ProcessPaymentRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let body = json_body(payload)?;

    let amount = match body.amount {
        Some(input) => input.into_decimal()?,
        None => Decimal::ZERO,
    };
    let method = body
        .payment_method
        .unwrap_or_else(|| DEFAULT_PAYMENT_METHOD.to_string());

    Ok(success(payment::process(amount, &method)))
}
