//! Recipient address validation.

use alloy::primitives::Address;

use crate::error::{VaultError, VaultResult};

/// Parse a `0x`-prefixed 20-byte hex address.
///
/// All-lowercase and all-uppercase inputs carry no checksum and are
/// accepted as is. Mixed-case inputs must match their EIP-55 checksum.
pub fn parse_address(input: &str) -> VaultResult<Address> {
    let s = input.trim();
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .ok_or_else(|| VaultError::InvalidAddress(format!("'{s}' is missing the 0x prefix")))?;

    if digits.len() != 40 {
        return Err(VaultError::InvalidAddress(format!(
            "'{s}' must have 40 hex digits, got {}",
            digits.len()
        )));
    }
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(VaultError::InvalidAddress(format!(
            "'{s}' contains non-hexadecimal characters"
        )));
    }

    let has_lower = digits.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = digits.bytes().any(|b| b.is_ascii_uppercase());

    if has_lower && has_upper {
        let checksummed = format!("0x{digits}");
        return Address::parse_checksummed(&checksummed, None)
            .map_err(|_| VaultError::InvalidAddress(format!("'{s}' has an invalid EIP-55 checksum")));
    }

    digits
        .parse::<Address>()
        .map_err(|e| VaultError::InvalidAddress(format!("'{s}': {e}")))
}

/// Whether [`parse_address`] accepts `input`.
pub fn is_valid_address(input: &str) -> bool {
    parse_address(input).is_ok()
}
