use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

pub const TRANSACTION_PREFIX: &str = "TXN_";

/// Generate a simulated gateway reference: the fixed prefix plus 8
/// uppercase hex characters. Random, not checked for uniqueness; collisions
/// are vanishingly unlikely and nothing keys on this value.
pub fn transaction_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("{TRANSACTION_PREFIX}{}", hex[..8].to_uppercase())
}

#[derive(Debug, Serialize)]
pub struct PaymentReceipt {
    pub transaction_id: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub payment_method: String,
    pub processed_at: DateTime<Utc>,
}

/// Simulated payment processing: positive amounts settle instantly with a
/// fresh transaction id, zero amounts settle as free.
pub fn process(amount: Decimal, payment_method: &str) -> PaymentReceipt {
    if amount > Decimal::ZERO {
        PaymentReceipt {
            transaction_id: Some(transaction_id()),
            amount,
            payment_method: payment_method.to_string(),
            processed_at: Utc::now(),
        }
    } else {
        PaymentReceipt {
            transaction_id: None,
            amount: Decimal::ZERO,
            payment_method: "free".to_string(),
            processed_at: Utc::now(),
        }
    }
}
