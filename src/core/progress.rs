//! Funding progress and fiat display values

use super::oracle::OraclePrice;
use super::units::to_decimal;
use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use rust_decimal::{Decimal, RoundingStrategy, prelude::*};
use tracing::warn;

/// Shown instead of a fiat value while the amount or the price is not known.
pub const UNAVAILABLE: &str = "$....";

/// Shown when a fiat value could not be formatted.
pub const FORMAT_FALLBACK: &str = "$0.00";

/// Funded percentage of `goal`, floored and clamped to `0..=100`.
///
/// Missing readings and a zero goal report 0.
pub fn progress<'a>(
    goal: impl Into<Option<&'a BigUint>>,
    balance: impl Into<Option<&'a BigUint>>,
) -> u8 {
    let (Some(goal), Some(balance)) = (goal.into(), balance.into()) else {
        return 0;
    };
    if goal.is_zero() {
        return 0;
    }

    let percent = balance * 100u32 / goal;
    percent.to_u8().filter(|p| *p < 100).unwrap_or(100)
}

/// Fiat value of a base-unit amount at the given oracle price.
///
/// Returns [`UNAVAILABLE`] when the amount is missing or the price cannot be
/// used, and [`FORMAT_FALLBACK`] when the value cannot be rendered.
pub fn fiat_value<'a>(
    amount: impl Into<Option<&'a BigUint>>,
    decimals: u32,
    price: &OraclePrice,
) -> String {
    let Some(amount) = amount.into() else {
        return UNAVAILABLE.to_string();
    };
    if !price.is_available() {
        return UNAVAILABLE.to_string();
    }

    let tokens = to_decimal(amount, decimals);
    let tokens: f64 = match tokens.parse() {
        Ok(value) => value,
        Err(e) => {
            warn!(%tokens, error = %e, "Could not parse token amount for display");
            return FORMAT_FALLBACK.to_string();
        }
    };

    let value = tokens * price.price;
    format_currency(value).unwrap_or_else(|| {
        warn!(value, "Could not format fiat value");
        FORMAT_FALLBACK.to_string()
    })
}

/// Formats a dollar value as `$1,234.56`, rounding half away from zero.
///
/// Returns `None` for values that have no decimal representation (NaN,
/// infinities, or beyond the decimal range).
pub fn format_currency(value: f64) -> Option<String> {
    let rounded =
        Decimal::from_f64(value)?.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.2}", rounded.abs());
    let (whole, fraction) = text.split_once('.')?;
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    Some(format!("{sign}${}.{fraction}", group_thousands(whole)))
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::units::TOKEN_DECIMALS;

    fn units(s: &str) -> BigUint {
        s.parse().unwrap()
    }

    #[test]
    fn test_progress_without_goal_is_zero() {
        assert_eq!(progress(&BigUint::zero(), &units("500")), 0);
        assert_eq!(progress(None::<&BigUint>, &units("500")), 0);
        assert_eq!(progress(&units("500"), None::<&BigUint>), 0);
    }

    #[test]
    fn test_progress_is_floored() {
        assert_eq!(
            progress(
                &units("1000000000000000000"),
                &units("333333333333333333")
            ),
            33
        );
        assert_eq!(progress(&units("3"), &units("2")), 66);
        assert_eq!(progress(&units("100"), &units("0")), 0);
    }

    #[test]
    fn test_progress_is_clamped_at_one_hundred() {
        assert_eq!(progress(&units("100"), &units("250")), 100);
        assert_eq!(progress(&units("100"), &units("100")), 100);
        assert_eq!(progress(&units("1"), &units("99999999999999999999999999999")), 100);
    }

    #[test]
    fn test_fiat_value() {
        let price = OraclePrice::new(2000.0);
        assert_eq!(
            fiat_value(&units("1500000000000000000"), TOKEN_DECIMALS, &price),
            "$3,000.00"
        );
        assert_eq!(
            fiat_value(&units("50000000000000000"), TOKEN_DECIMALS, &price),
            "$100.00"
        );
        assert_eq!(fiat_value(&BigUint::zero(), TOKEN_DECIMALS, &price), "$0.00");
    }

    #[test]
    fn test_fiat_value_unavailable() {
        let amount = units("1500000000000000000");
        assert_eq!(
            fiat_value(None::<&BigUint>, TOKEN_DECIMALS, &OraclePrice::new(2000.0)),
            UNAVAILABLE
        );
        assert_eq!(
            fiat_value(&amount, TOKEN_DECIMALS, &OraclePrice::loading()),
            UNAVAILABLE
        );
        assert_eq!(
            fiat_value(&amount, TOKEN_DECIMALS, &OraclePrice::new(0.0)),
            UNAVAILABLE
        );
        assert_eq!(
            fiat_value(&amount, TOKEN_DECIMALS, &OraclePrice::new(-3.0)),
            UNAVAILABLE
        );
    }

    #[test]
    fn test_fiat_value_falls_back_when_unrepresentable() {
        let huge = BigUint::from(10u8).pow(400);
        assert_eq!(
            fiat_value(&huge, TOKEN_DECIMALS, &OraclePrice::new(2000.0)),
            FORMAT_FALLBACK
        );
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0).unwrap(), "$0.00");
        assert_eq!(format_currency(7.5).unwrap(), "$7.50");
        assert_eq!(format_currency(999.994).unwrap(), "$999.99");
        assert_eq!(format_currency(1234567.891).unwrap(), "$1,234,567.89");
        assert_eq!(format_currency(-42.1).unwrap(), "-$42.10");
        assert_eq!(format_currency(-0.001).unwrap(), "$0.00");
        assert!(format_currency(f64::NAN).is_none());
        assert!(format_currency(f64::INFINITY).is_none());
    }
}
