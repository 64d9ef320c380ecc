//! Asset and holding-account resolution
//!
//! Two incompatible transfer primitives live on Solana: lamport moves
//! between wallet addresses, and SPL token moves between associated token
//! accounts (ATAs). This module decides which one a request uses and, for
//! tokens, resolves the deterministic per-owner ATA and whether it already
//! exists on-chain.

use solana_sdk::pubkey::Pubkey;
use spl_associated_token_account::get_associated_token_address;

use crate::address::parse_address;
use crate::errors::TransferError;
use crate::ledger::LedgerClient;

/// Lamports per SOL, the network-defined native scale.
pub const SOL_DECIMALS: u8 = 9;

/// What the caller wants to pay with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetSelector {
    Sol,
    Token(Pubkey),
}

impl AssetSelector {
    /// Parse the request's `token` field: the native sentinel or a mint
    /// address. Both `"SOL"` and `"NATIVE"` are accepted as the sentinel.
    pub fn parse(raw: &str) -> Result<Self, TransferError> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("sol") || trimmed.eq_ignore_ascii_case("native") {
            return Ok(Self::Sol);
        }
        parse_address(trimmed, "token").map(Self::Token)
    }
}

/// A resolved asset: which primitive to use and at what precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetInfo {
    pub kind: AssetKind,
    pub decimals: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Sol,
    Token { mint: Pubkey },
}

/// Resolve a selector into transfer primitive and precision.
///
/// SOL is answered locally; a token mint requires a fresh on-chain read so
/// amounts are never scaled with an assumed or cached precision.
pub async fn resolve_asset(
    ledger: &dyn LedgerClient,
    selector: AssetSelector,
) -> Result<AssetInfo, TransferError> {
    match selector {
        AssetSelector::Sol => Ok(AssetInfo {
            kind: AssetKind::Sol,
            decimals: SOL_DECIMALS,
        }),
        AssetSelector::Token(mint) => {
            let decimals = ledger.mint_decimals(&mint).await?;
            Ok(AssetInfo {
                kind: AssetKind::Token { mint },
                decimals,
            })
        }
    }
}

/// An owner's associated token account for one mint.
#[derive(Debug, Clone, Copy)]
pub struct HoldingAccount {
    pub address: Pubkey,
    pub exists: bool,
}

/// Derive the canonical ATA for (owner, mint) and check, with a fresh read,
/// whether it exists. Called once per distinct (owner, mint) pair per
/// request - sender and every recipient.
pub async fn resolve_holding_account(
    ledger: &dyn LedgerClient,
    owner: &Pubkey,
    mint: &Pubkey,
) -> Result<HoldingAccount, TransferError> {
    let address = get_associated_token_address(owner, mint);
    let exists = ledger.account_exists(&address).await?;
    Ok(HoldingAccount { address, exists })
}
