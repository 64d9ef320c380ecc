//! Solana transfer gateway
//!
//! Builds unsigned SOL and SPL token transfer transactions on behalf of
//! callers who keep their keys client-side, and relays the signed result.
//! The builder, codec and resolvers are exposed here for integration and
//! testing; the HTTP surface lives in [`server`].

pub mod address;
pub mod amount;
pub mod asset;
pub mod builder;
pub mod codec;
pub mod config;
pub mod errors;
pub mod ledger;
pub mod server;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-export commonly used types
pub use builder::{build_transfer, TransferInput};
pub use errors::TransferError;
pub use ledger::{LedgerClient, RpcLedger};
