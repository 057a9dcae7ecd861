//! Token amounts in the smallest unit.
//!
//! Tallies and stakes are kept as `U256` "wei-scale" integers end to end so
//! no precision is lost. Conversion to floating point happens only for the
//! advisory quadratic power and the reputation score.

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ShieldError;

/// Decimals of the SHIELD stake token.
pub const SHIELD_DECIMALS: u8 = 18;

/// An amount of a fungible token in its smallest unit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenAmount(U256);

impl TokenAmount {
    pub const ZERO: Self = Self(U256::ZERO);

    pub fn new(raw: U256) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> U256 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Whole tokens scaled by `decimals`.
    pub fn from_whole(tokens: u64, decimals: u8) -> Self {
        Self(U256::from(tokens).saturating_mul(unit(decimals)))
    }

    /// Parse a human decimal string ("10", "0.25") into the smallest unit.
    pub fn parse_units(human: &str, decimals: u8) -> Result<Self, ShieldError> {
        let invalid = || ShieldError::InvalidAmount(human.to_string());
        let trimmed = human.trim();
        let (whole, fraction) = match trimmed.split_once('.') {
            Some((w, f)) => (w, f),
            None => (trimmed, ""),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        let digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if !digits(whole) || !digits(fraction) {
            return Err(invalid());
        }
        if fraction.len() > decimals as usize {
            return Err(invalid());
        }

        let whole = if whole.is_empty() {
            U256::ZERO
        } else {
            U256::from_str_radix(whole, 10).map_err(|_| invalid())?
        };
        let padded = format!("{fraction:0<width$}", width = decimals as usize);
        let fraction = if padded.is_empty() {
            U256::ZERO
        } else {
            U256::from_str_radix(&padded, 10).map_err(|_| invalid())?
        };

        whole
            .checked_mul(unit(decimals))
            .and_then(|w| w.checked_add(fraction))
            .map(Self)
            .ok_or_else(invalid)
    }

    /// Render in human units: at least one fractional digit, trailing zeros trimmed.
    pub fn format_units(&self, decimals: u8) -> String {
        let digits = self.0.to_string();
        let decimals = decimals as usize;
        let padded = if digits.len() <= decimals {
            format!("{digits:0>width$}", width = decimals + 1)
        } else {
            digits
        };
        let (whole, fraction) = padded.split_at(padded.len() - decimals);
        let fraction = fraction.trim_end_matches('0');
        if fraction.is_empty() {
            format!("{whole}.0")
        } else {
            format!("{whole}.{fraction}")
        }
    }

    /// The amount in human units as a float.
    pub fn to_human(&self, decimals: u8) -> f64 {
        self.format_units(decimals).parse::<f64>().unwrap_or(0.0)
    }

    /// Quadratic voting weight: `sqrt(amount in human units)`.
    pub fn quadratic_power(&self, decimals: u8) -> f64 {
        self.to_human(decimals).sqrt()
    }
}

fn unit(decimals: u8) -> U256 {
    U256::from(10u64).pow(U256::from(decimals))
}

impl From<U256> for TokenAmount {
    fn from(raw: U256) -> Self {
        Self(raw)
    }
}

impl FromStr for TokenAmount {
    type Err = ShieldError;

    /// Parse a raw smallest-unit decimal string, e.g. `"10000000000000000000"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ShieldError::InvalidAmount(s.to_string()));
        }
        U256::from_str_radix(trimmed, 10)
            .map(Self)
            .map_err(|_| ShieldError::InvalidAmount(s.to_string()))
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
