//! Exact conversion between token base units and decimal strings

use num_bigint::BigUint;
use num_traits::Zero;
use thiserror::Error;

/// Decimal places of the campaign token (wei per ether).
pub const TOKEN_DECIMALS: u32 = 18;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitsError {
    #[error("Empty amount")]
    Empty,
    #[error("Invalid decimal amount: '{0}'")]
    Invalid(String),
}

fn scale(decimals: u32) -> BigUint {
    BigUint::from(10u8).pow(decimals)
}

/// Renders a base-unit amount as a decimal string with `decimals` fractional places.
///
/// Trailing fractional zeros are trimmed and a whole amount has no fractional
/// part at all. A missing or zero amount renders as `"0"`. The conversion stays
/// in integer arithmetic so it is lossless for any amount.
pub fn to_decimal<'a>(amount: impl Into<Option<&'a BigUint>>, decimals: u32) -> String {
    let amount = match amount.into() {
        Some(amount) if !amount.is_zero() => amount,
        _ => return "0".to_string(),
    };

    let divisor = scale(decimals);
    let whole = amount / &divisor;
    let remainder = amount % &divisor;
    if remainder.is_zero() {
        return whole.to_string();
    }

    let width = decimals as usize;
    let fraction = format!("{:0>width$}", remainder.to_string());
    format!("{whole}.{}", fraction.trim_end_matches('0'))
}

/// Parses a decimal string into base units, the inverse of [`to_decimal`].
///
/// Digits past `decimals` fractional places are rounded half away from zero.
pub fn to_base_units(input: &str, decimals: u32) -> Result<BigUint, UnitsError> {
    let input = input.trim();
    let (whole, fraction) = input.split_once('.').unwrap_or((input, ""));
    if whole.is_empty() && fraction.is_empty() {
        return Err(UnitsError::Empty);
    }

    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !is_digits(whole) || !is_digits(fraction) {
        return Err(UnitsError::Invalid(input.to_string()));
    }

    let width = decimals as usize;
    let (kept, dropped) = if fraction.len() > width {
        fraction.split_at(width)
    } else {
        (fraction, "")
    };

    let digits = format!("{whole}{kept:0<width$}");
    let mut units = if digits.is_empty() {
        BigUint::zero()
    } else {
        BigUint::parse_bytes(digits.as_bytes(), 10)
            .ok_or_else(|| UnitsError::Invalid(input.to_string()))?
    };

    if dropped.as_bytes().first().is_some_and(|d| *d >= b'5') {
        units += 1u32;
    }
    Ok(units)
}

/// Serializes base-unit amounts as plain decimal integer strings.
pub(crate) mod as_integer_string {
    use num_bigint::BigUint;
    use serde::Serializer;

    pub fn serialize<S>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(value)
    }
}
