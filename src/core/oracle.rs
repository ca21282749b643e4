//! Oracle price feed normalization

use chrono::{DateTime, Utc};
use num_bigint::{BigInt, BigUint};
use num_traits::ToPrimitive;
use serde::Serialize;

/// Decimal places of a Chainlink-style USD price feed answer.
pub const ORACLE_DECIMALS: u32 = 8;

/// The tuple returned by a feed's `latestRoundData()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundData {
    pub round_id: BigUint,
    pub answer: BigInt,
    pub started_at: BigUint,
    pub updated_at: BigUint,
    pub answered_in_round: BigUint,
}

impl RoundData {
    pub fn updated_at_utc(&self) -> Option<DateTime<Utc>> {
        self.updated_at
            .to_i64()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }
}

/// Display price derived from the latest round.
///
/// `price` is only meaningful when [`OraclePrice::is_available`] holds. A reading
/// that has not arrived yet is `is_loading` with a zero price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OraclePrice {
    pub price: f64,
    pub is_loading: bool,
}

impl OraclePrice {
    pub const fn loading() -> Self {
        Self {
            price: 0.0,
            is_loading: true,
        }
    }

    pub const fn new(price: f64) -> Self {
        Self {
            price,
            is_loading: false,
        }
    }

    /// Shifts an integer mantissa by `decimals` places. Negative answers pass
    /// through unchanged.
    pub fn from_mantissa(mantissa: &BigInt, decimals: u32) -> Self {
        let raw = mantissa.to_f64().unwrap_or(f64::NAN);
        Self::new(raw / 10f64.powi(decimals as i32))
    }

    /// Whether the price can be used for conversions.
    pub fn is_available(&self) -> bool {
        !self.is_loading && self.price > 0.0
    }
}

impl Default for OraclePrice {
    fn default() -> Self {
        Self::loading()
    }
}

pub fn current_price(reading: Option<&RoundData>) -> OraclePrice {
    match reading {
        Some(round) => OraclePrice::from_mantissa(&round.answer, ORACLE_DECIMALS),
        None => OraclePrice::loading(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round(answer: i64) -> RoundData {
        RoundData {
            round_id: BigUint::from(18446744073709562301u128),
            answer: BigInt::from(answer),
            started_at: BigUint::from(1_700_000_000u64),
            updated_at: BigUint::from(1_700_000_012u64),
            answered_in_round: BigUint::from(18446744073709562301u128),
        }
    }

    #[test]
    fn test_missing_reading_is_loading() {
        let price = current_price(None);
        assert!(price.is_loading);
        assert_eq!(price.price, 0.0);
        assert!(!price.is_available());
    }

    #[test]
    fn test_mantissa_is_shifted_by_eight_places() {
        let price = current_price(Some(&round(200_012_345_678)));
        assert!(!price.is_loading);
        assert!((price.price - 2000.12345678).abs() < 1e-9);
        assert!(price.is_available());
    }

    #[test]
    fn test_negative_answer_passes_through_but_is_unavailable() {
        let price = current_price(Some(&round(-100_000_000)));
        assert_eq!(price.price, -1.0);
        assert!(!price.is_loading);
        assert!(!price.is_available());
    }

    #[test]
    fn test_zero_answer_is_unavailable() {
        assert!(!current_price(Some(&round(0))).is_available());
    }

    #[test]
    fn test_updated_at_as_datetime() {
        let updated = round(1).updated_at_utc().unwrap();
        assert_eq!(updated.timestamp(), 1_700_000_012);
    }
}
