//! Native-unit decimal amounts ↔ wei.
//!
//! All EVM native currencies supported here use 18 decimals. Inputs with
//! more fractional digits than that are rejected, never rounded.

use std::fmt;

use alloy::primitives::U256;
use serde::{Serialize, Serializer};

use crate::error::{VaultError, VaultResult};

/// Decimal places of the native currency.
pub const NATIVE_DECIMALS: usize = 18;

const WEI_PER_UNIT: u64 = 1_000_000_000_000_000_000;

/// An exact amount of native currency, stored in wei.
///
/// `Display` renders the full-precision decimal with trailing zeros
/// trimmed and at least one fractional digit (`0.0`, `1.5`, `0.000000000000000001`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct NativeAmount(U256);

impl NativeAmount {
    pub const ZERO: Self = Self(U256::ZERO);

    pub const fn from_wei(wei: U256) -> Self {
        Self(wei)
    }

    pub const fn wei(&self) -> U256 {
        self.0
    }

    /// Parse a non-negative decimal string such as `"0.5"` or `"12"`.
    pub fn parse(input: &str) -> VaultResult<Self> {
        let s = input.trim();
        if s.is_empty() {
            return Err(VaultError::InvalidAmount("empty amount".into()));
        }
        if s.starts_with('-') {
            return Err(VaultError::InvalidAmount(format!("negative amount '{s}'")));
        }

        let (whole, fraction) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(VaultError::InvalidAmount(format!("'{s}' has no digits")));
        }
        if !whole.bytes().all(|b| b.is_ascii_digit())
            || !fraction.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(VaultError::InvalidAmount(format!("'{s}' is not a decimal number")));
        }
        if fraction.len() > NATIVE_DECIMALS {
            return Err(VaultError::InvalidAmount(format!(
                "'{s}' has more than {NATIVE_DECIMALS} decimal places"
            )));
        }

        let too_large = || VaultError::InvalidAmount(format!("'{s}' is out of range"));

        let whole_wei = if whole.is_empty() {
            U256::ZERO
        } else {
            U256::from_str_radix(whole, 10).map_err(|_| too_large())?
        };
        let fraction_wei = if fraction.is_empty() {
            U256::ZERO
        } else {
            let padded = format!("{fraction:0<width$}", width = NATIVE_DECIMALS);
            U256::from_str_radix(&padded, 10).map_err(|_| too_large())?
        };

        whole_wei
            .checked_mul(U256::from(WEI_PER_UNIT))
            .and_then(|w| w.checked_add(fraction_wei))
            .map(Self)
            .ok_or_else(too_large)
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl From<U256> for NativeAmount {
    fn from(wei: U256) -> Self {
        Self(wei)
    }
}

impl fmt::Display for NativeAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = U256::from(WEI_PER_UNIT);
        let whole = self.0 / unit;
        // Always below 10^18, fits in u64.
        let fraction = u64::try_from(self.0 % unit).unwrap_or_default();

        let digits = format!("{fraction:0width$}", width = NATIVE_DECIMALS);
        let trimmed = digits.trim_end_matches('0');
        let trimmed = if trimmed.is_empty() { "0" } else { trimmed };
        write!(f, "{whole}.{trimmed}")
    }
}

impl Serialize for NativeAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
