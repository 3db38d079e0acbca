use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::utils::error::AppError;

pub const STATUS_ACTIVE: &str = "active";

pub const DEFAULT_DURATION_HOURS: i32 = 2;
pub const DEFAULT_ORGANIZER: &str = "Admin";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    #[serde(with = "time_hm")]
    pub time: NaiveTime,
    pub duration: i32,
    pub location: String,
    pub category: String,
    pub capacity: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub image: String,
    pub organizer: String,
    pub status: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Scheduled start, used for the cancellation window.
    pub fn starts_at(&self) -> chrono::NaiveDateTime {
        self.date.and_time(self.time)
    }
}

/// Validated input for event creation.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub duration: i32,
    pub location: String,
    pub category: String,
    pub capacity: i32,
    pub price: Decimal,
    pub image: String,
    pub organizer: String,
    pub status: String,
    pub tags: Vec<String>,
}

/// Typed patch for event updates: one optional slot per updatable field,
/// validated before it reaches the store.
#[derive(Debug, Clone, Default)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub duration: Option<i32>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub capacity: Option<i32>,
    pub price: Option<Decimal>,
    pub image: Option<String>,
    pub organizer: Option<String>,
    pub status: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Price as it arrives over the wire: a JSON number, a numeric string, or
/// the literal "free"/"Free".
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PriceInput {
    Amount(Decimal),
    Text(String),
}

impl PriceInput {
    pub fn into_decimal(self) -> Result<Decimal, AppError> {
        let amount = match self {
            PriceInput::Amount(amount) => amount,
            PriceInput::Text(text) if text.eq_ignore_ascii_case("free") => Decimal::ZERO,
            PriceInput::Text(text) => text
                .trim()
                .parse::<Decimal>()
                .map_err(|_| AppError::Validation("Invalid price format".to_string()))?,
        };
        if amount < Decimal::ZERO {
            return Err(AppError::Validation(
                "price must be non-negative".to_string(),
            ));
        }
        Ok(amount)
    }
}

pub fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::Validation("date must be in YYYY-MM-DD format".to_string()))
}

pub fn parse_time(value: &str) -> Result<NaiveTime, AppError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| AppError::Validation("time must be in HH:MM format".to_string()))
}

/// Event times serialize as `HH:MM`, matching the admin and portal clients.
pub mod time_hm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&value, FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_date() {
        assert!(parse_date("2025-03-15").is_ok());
        assert!(parse_date("15-03-2025").is_err());
        assert!(parse_date("2025-13-40").is_err());
    }

    #[test]
    fn parses_hh_mm_time() {
        assert!(parse_time("09:30").is_ok());
        assert!(parse_time("9:30 AM").is_err());
    }

    #[test]
    fn free_price_strings_become_zero() {
        assert_eq!(
            PriceInput::Text("free".to_string()).into_decimal().unwrap(),
            Decimal::ZERO
        );
        assert_eq!(
            PriceInput::Text("Free".to_string()).into_decimal().unwrap(),
            Decimal::ZERO
        );
    }

    #[test]
    fn numeric_price_strings_parse() {
        let price = PriceInput::Text("800".to_string()).into_decimal().unwrap();
        assert_eq!(price, Decimal::from(800));
    }

    #[test]
    fn garbage_price_is_rejected() {
        assert!(PriceInput::Text("lots".to_string()).into_decimal().is_err());
    }

    #[test]
    fn negative_price_is_rejected() {
        assert!(PriceInput::Amount(Decimal::from(-5)).into_decimal().is_err());
    }
}
