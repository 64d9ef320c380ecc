//! Address validation
//!
//! Externally supplied address strings are decoded strictly before anything
//! else touches them. A request containing even one bad address never
//! reaches the network.

use std::str::FromStr;

use solana_sdk::pubkey::Pubkey;

use crate::errors::TransferError;

/// Parse a base58 address string into a [`Pubkey`].
///
/// `field` names the request field being parsed so the error message points
/// at the offending input.
pub fn parse_address(raw: &str, field: &str) -> Result<Pubkey, TransferError> {
    Pubkey::from_str(raw.trim()).map_err(|_| {
        TransferError::invalid_input(format!("{field} is not a valid address: {raw:?}"))
    })
}
