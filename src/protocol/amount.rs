// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Fixed-point token amounts
//!
//! Amounts cross the API boundary as decimal strings (`"100"`, `"12.5"`) and
//! are converted exactly once into integer smallest units for a given decimal
//! count. No floating point is involved at any stage.

use std::fmt;

use alloy_primitives::U256;

use crate::error::{Result, TransferError};

/// Decimal count of USDC on every supported network.
pub const USDC_DECIMALS: u8 = 6;

/// Largest decimal count accepted; keeps `10^decimals` well inside `U256`.
const MAX_DECIMALS: u8 = 36;

/// An integer token amount together with the decimal count it is scaled by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenAmount {
    raw: U256,
    decimals: u8,
}

impl TokenAmount {
    pub fn from_raw(raw: U256, decimals: u8) -> Self {
        Self { raw, decimals }
    }

    pub fn zero(decimals: u8) -> Self {
        Self::from_raw(U256::ZERO, decimals)
    }

    /// Parses a non-negative decimal string into smallest units.
    ///
    /// ```rust
    /// use cctp_transfer::TokenAmount;
    /// use alloy_primitives::U256;
    ///
    /// let amount = TokenAmount::parse("12.5", 6).unwrap();
    /// assert_eq!(amount.raw(), U256::from(12_500_000u64));
    /// ```
    pub fn parse(input: &str, decimals: u8) -> Result<Self> {
        let invalid = |reason: &str| TransferError::InvalidAmount {
            amount: input.to_string(),
            reason: reason.to_string(),
        };

        if decimals > MAX_DECIMALS {
            return Err(invalid("unsupported decimal count"));
        }

        let trimmed = input.trim();
        let (whole, fraction) = match trimmed.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (trimmed, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid("empty amount"));
        }
        if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalid("expected an unsigned decimal number"));
        }
        if fraction.len() > usize::from(decimals) {
            return Err(invalid(&format!("more than {decimals} decimal places")));
        }

        let scale = pow10(decimals);
        let whole = if whole.is_empty() {
            U256::ZERO
        } else {
            U256::from_str_radix(whole, 10).map_err(|_| invalid("amount too large"))?
        };
        let fraction = if fraction.is_empty() {
            U256::ZERO
        } else {
            let padding = pow10(decimals - fraction.len() as u8);
            U256::from_str_radix(fraction, 10).map_err(|_| invalid("amount too large"))? * padding
        };

        let raw = whole
            .checked_mul(scale)
            .and_then(|scaled| scaled.checked_add(fraction))
            .ok_or_else(|| invalid("amount too large"))?;

        Ok(Self { raw, decimals })
    }

    /// Amount in the token's smallest unit.
    pub fn raw(&self) -> U256 {
        self.raw
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn is_zero(&self) -> bool {
        self.raw.is_zero()
    }
}

fn pow10(exponent: u8) -> U256 {
    U256::from(10u64).pow(U256::from(exponent))
}

/// Renders with trailing zeros trimmed but at least two fractional digits,
/// e.g. `0.00`, `100.00`, `1.50`, `0.123456`.
impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.decimals == 0 {
            return write!(f, "{}", self.raw);
        }

        let scale = pow10(self.decimals);
        let whole = self.raw / scale;
        let fraction = format!(
            "{:0>width$}",
            (self.raw % scale).to_string(),
            width = usize::from(self.decimals)
        );

        let min_digits = usize::from(self.decimals.min(2));
        let trimmed = fraction.trim_end_matches('0');
        let shown = if trimmed.len() < min_digits {
            &fraction[..min_digits]
        } else {
            trimmed
        };

        write!(f, "{whole}.{shown}")
    }
}
