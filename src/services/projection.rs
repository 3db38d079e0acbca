//! Derived read-side values. Nothing here is stored; every caller
//! recomputes from the live registration count so the numbers can never
//! drift from the table.

use rust_decimal::Decimal;

pub fn available_spots(capacity: i32, registered: i64) -> i64 {
    (i64::from(capacity) - registered).max(0)
}

pub fn is_full(capacity: i32, registered: i64) -> bool {
    i64::from(capacity) - registered <= 0
}

/// `"₹{amount}"` with two decimals, or the literal `"Free"` for zero.
pub fn format_price(price: Decimal) -> String {
    if price > Decimal::ZERO {
        format!("₹{price:.2}")
    } else {
        "Free".to_string()
    }
}

/// Paid amounts always render as currency, including zero.
pub fn format_amount(amount: Decimal) -> String {
    format!("₹{amount:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn available_spots_floors_at_zero() {
        assert_eq!(available_spots(10, 3), 7);
        assert_eq!(available_spots(10, 10), 0);
        assert_eq!(available_spots(10, 15), 0);
    }

    #[test]
    fn full_once_count_reaches_capacity() {
        assert!(!is_full(2, 1));
        assert!(is_full(2, 2));
        assert!(is_full(2, 3));
        assert!(is_full(0, 0));
    }

    #[test]
    fn prices_format_with_currency_symbol() {
        assert_eq!(format_price(Decimal::new(150000, 2)), "₹1500.00");
        assert_eq!(format_price(Decimal::new(85, 1)), "₹8.50");
    }

    #[test]
    fn zero_price_formats_as_free() {
        assert_eq!(format_price(Decimal::ZERO), "Free");
        assert_eq!(format_amount(Decimal::ZERO), "₹0.00");
    }
}
