use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::chain::proto::Coin;
use crate::error::{Error, Result};

/// Price of one unit of gas, e.g. `1agli` or `0.025agli`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasPrice {
    pub denom: String,
    pub amount: Decimal,
}

impl GasPrice {
    pub fn new(amount: Decimal, denom: impl Into<String>) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }

    /// floor(price × gas_limit) in this denom
    pub fn fee_for(&self, gas_limit: u64) -> Result<Coin> {
        let total = self
            .amount
            .checked_mul(Decimal::from(gas_limit))
            .ok_or_else(|| Error::Validation(format!("fee overflow for gas limit {gas_limit}")))?
            .floor();
        let amount = total
            .to_u128()
            .ok_or_else(|| Error::Validation(format!("fee {total} is not a valid coin amount")))?;
        Ok(Coin {
            denom: self.denom.clone(),
            amount: amount.to_string(),
        })
    }
}

impl FromStr for GasPrice {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let split_pos = s
            .find(|c: char| c.is_ascii_alphabetic())
            .ok_or_else(|| Error::InvalidArgument(format!("invalid gas price {s:?}: missing denom")))?;

        let (amount_str, denom) = s.split_at(split_pos);
        let amount = Decimal::from_str(amount_str)
            .map_err(|e| Error::InvalidArgument(format!("invalid gas price {s:?}: {e}")))?;
        if amount.is_sign_negative() {
            return Err(Error::InvalidArgument(format!("gas price {s:?} is negative")));
        }
        Ok(Self::new(amount, denom))
    }
}

impl fmt::Display for GasPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount.normalize(), self.denom)
    }
}

/// ceil(gas_used × adjustment)
pub fn adjusted_gas_limit(gas_used: u64, adjustment: Decimal) -> Result<u64> {
    let limit = Decimal::from(gas_used)
        .checked_mul(adjustment)
        .ok_or_else(|| Error::Validation(format!("gas limit overflow for {gas_used} × {adjustment}")))?
        .ceil();
    limit
        .to_u64()
        .ok_or_else(|| Error::Validation(format!("gas limit {limit} out of range")))
}

/// Empty, or every coin amount zero
pub fn coins_are_zero(coins: &[Coin]) -> bool {
    coins
        .iter()
        .all(|c| c.amount.trim().is_empty() || c.amount.trim().trim_start_matches('0').is_empty())
}
