//! Validated construction of campaign write transactions

use super::abi::{self, Selector, Token};
use super::oracle::OraclePrice;
use super::units::{TOKEN_DECIMALS, as_integer_string, to_base_units};
use anyhow::Result;
use num_bigint::BigUint;
use num_traits::Zero;
use serde::Serialize;
use std::fmt::Display;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TierMethod {
    AddTier,
    RemoveTier,
    FundTier,
}

impl TierMethod {
    pub fn signature(&self) -> &'static str {
        match self {
            TierMethod::AddTier => "addTier(string,uint256)",
            TierMethod::RemoveTier => "removeTier(uint256)",
            TierMethod::FundTier => "fund(uint256)",
        }
    }

    pub fn selector(&self) -> Selector {
        match self {
            TierMethod::AddTier => abi::ADD_TIER,
            TierMethod::RemoveTier => abi::REMOVE_TIER,
            TierMethod::FundTier => abi::FUND,
        }
    }

    /// Only the campaign owner may call these.
    pub fn is_owner_only(&self) -> bool {
        matches!(self, TierMethod::AddTier | TierMethod::RemoveTier)
    }
}

impl Display for TierMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.signature())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CallParam {
    Text(String),
    Uint(#[serde(serialize_with = "as_integer_string::serialize")] BigUint),
}

/// A composed, not yet submitted, contract call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionRequest {
    pub method: TierMethod,
    pub params: Vec<CallParam>,
    #[serde(serialize_with = "as_integer_string::serialize")]
    pub value: BigUint,
}

impl TransactionRequest {
    pub fn calldata(&self) -> Result<Vec<u8>> {
        let tokens: Vec<Token<'_>> = self
            .params
            .iter()
            .map(|param| match param {
                CallParam::Text(text) => Token::Text(text),
                CallParam::Uint(value) => Token::Uint(value),
            })
            .collect();
        abi::encode_call(self.method.selector(), &tokens)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid amount '{0}': enter a positive number")]
    InvalidAmount(String),
    #[error("Price is not available, cannot calculate the token amount")]
    PriceUnavailable,
}

/// Builds an `addTier` call for a tier costing `fiat_amount` at `price`.
///
/// The token amount is `fiat / price` in floating point, then quantized to base
/// units rounding half away from zero.
pub fn compose_add_tier(
    name: &str,
    fiat_amount: &str,
    price: &OraclePrice,
) -> Result<TransactionRequest, ValidationError> {
    let invalid = || ValidationError::InvalidAmount(fiat_amount.to_string());

    let fiat: f64 = fiat_amount.trim().parse().map_err(|_| invalid())?;
    if !fiat.is_finite() || fiat <= 0.0 {
        return Err(invalid());
    }
    if !price.is_available() {
        return Err(ValidationError::PriceUnavailable);
    }

    let tokens = fiat / price.price;
    if !tokens.is_finite() {
        return Err(invalid());
    }
    let amount = to_base_units(&tokens.to_string(), TOKEN_DECIMALS).map_err(|_| invalid())?;
    if amount.is_zero() {
        return Err(invalid());
    }

    debug!(tier = name, fiat, price = price.price, %amount, "Composed addTier");
    Ok(TransactionRequest {
        method: TierMethod::AddTier,
        params: vec![CallParam::Text(name.to_string()), CallParam::Uint(amount)],
        value: BigUint::zero(),
    })
}

/// Builds a `removeTier` call. The index is checked by the contract, not here.
pub fn compose_remove_tier(index: usize) -> TransactionRequest {
    TransactionRequest {
        method: TierMethod::RemoveTier,
        params: vec![CallParam::Uint(BigUint::from(index))],
        value: BigUint::zero(),
    }
}

/// Builds a `fund` call carrying exactly `tier_amount` as value.
pub fn compose_fund_tier(index: usize, tier_amount: &BigUint) -> TransactionRequest {
    TransactionRequest {
        method: TierMethod::FundTier,
        params: vec![CallParam::Uint(BigUint::from(index))],
        value: tier_amount.clone(),
    }
}
