//! Ledger collaborator boundary
//!
//! Everything that touches the chain goes through [`LedgerClient`], injected
//! into the handlers as a shared handle at construction time. Keeping the
//! boundary a trait means the builder is tested against an in-memory fake
//! instead of a live RPC node.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use solana_account_decoder::UiAccountData;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_request::TokenAccountsFilter;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::hash::Hash;
use solana_sdk::program_pack::Pack;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;
use tracing::debug;

use crate::errors::TransferError;

/// One SPL token position held by an owner, as projected for `/tokens`.
#[derive(Debug, Clone, Serialize)]
pub struct TokenHolding {
    pub mint: String,
    /// Human-readable quantity at the mint's precision
    pub amount: String,
    pub decimals: u8,
}

/// Chain operations consumed by the gateway.
///
/// All methods are fresh reads per call; nothing here caches across
/// requests, since account creation elsewhere between requests would
/// otherwise go undetected.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Decimals of an initialized SPL mint, or `AssetNotFound`.
    async fn mint_decimals(&self, mint: &Pubkey) -> Result<u8, TransferError>;

    /// Whether an account exists on-chain right now.
    async fn account_exists(&self, address: &Pubkey) -> Result<bool, TransferError>;

    /// A recent blockhash to anchor a transaction to.
    async fn latest_blockhash(&self) -> Result<Hash, TransferError>;

    /// Broadcast a fully signed transaction and wait for confirmation.
    async fn send_and_confirm(&self, tx: &Transaction) -> Result<Signature, TransferError>;

    /// Lamport balance of an account (zero if the account does not exist).
    async fn lamport_balance(&self, address: &Pubkey) -> Result<u64, TransferError>;

    /// Non-empty SPL token positions held by an owner.
    async fn token_holdings(&self, owner: &Pubkey) -> Result<Vec<TokenHolding>, TransferError>;
}

/// Production [`LedgerClient`] over the nonblocking Solana RPC client.
pub struct RpcLedger {
    client: RpcClient,
    commitment: CommitmentConfig,
}

impl RpcLedger {
    pub fn new(url: impl Into<String>, timeout: Duration, commitment: CommitmentConfig) -> Self {
        Self {
            client: RpcClient::new_with_timeout_and_commitment(url.into(), timeout, commitment),
            commitment,
        }
    }
}

#[async_trait]
impl LedgerClient for RpcLedger {
    async fn mint_decimals(&self, mint: &Pubkey) -> Result<u8, TransferError> {
        let response = self
            .client
            .get_account_with_commitment(mint, self.commitment)
            .await
            .map_err(|e| TransferError::network(format!("mint lookup failed: {e}")))?;

        let account = response
            .value
            .ok_or_else(|| TransferError::AssetNotFound(format!("mint {mint} does not exist")))?;
        if account.owner != spl_token::id() {
            return Err(TransferError::AssetNotFound(format!(
                "{mint} is not an SPL token mint"
            )));
        }
        let state = spl_token::state::Mint::unpack(&account.data).map_err(|_| {
            TransferError::AssetNotFound(format!("{mint} is not an initialized mint account"))
        })?;
        debug!(mint = %mint, decimals = state.decimals, "resolved mint");
        Ok(state.decimals)
    }

    async fn account_exists(&self, address: &Pubkey) -> Result<bool, TransferError> {
        let response = self
            .client
            .get_account_with_commitment(address, self.commitment)
            .await
            .map_err(|e| TransferError::network(format!("account lookup failed: {e}")))?;
        Ok(response.value.is_some())
    }

    async fn latest_blockhash(&self) -> Result<Hash, TransferError> {
        self.client
            .get_latest_blockhash()
            .await
            .map_err(|e| TransferError::network(format!("blockhash fetch failed: {e}")))
    }

    async fn send_and_confirm(&self, tx: &Transaction) -> Result<Signature, TransferError> {
        self.client
            .send_and_confirm_transaction(tx)
            .await
            .map_err(|e| TransferError::network(format!("broadcast failed: {e}")))
    }

    async fn lamport_balance(&self, address: &Pubkey) -> Result<u64, TransferError> {
        self.client
            .get_balance(address)
            .await
            .map_err(|e| TransferError::network(format!("balance fetch failed: {e}")))
    }

    async fn token_holdings(&self, owner: &Pubkey) -> Result<Vec<TokenHolding>, TransferError> {
        let accounts = self
            .client
            .get_token_accounts_by_owner(owner, TokenAccountsFilter::ProgramId(spl_token::id()))
            .await
            .map_err(|e| TransferError::network(format!("token account fetch failed: {e}")))?;

        let mut holdings = Vec::with_capacity(accounts.len());
        for keyed in accounts {
            let UiAccountData::Json(parsed) = keyed.account.data else {
                continue;
            };
            let info = &parsed.parsed["info"];
            let (Some(mint), Some(amount), Some(decimals)) = (
                info["mint"].as_str(),
                info["tokenAmount"]["uiAmountString"].as_str(),
                info["tokenAmount"]["decimals"].as_u64(),
            ) else {
                continue;
            };
            // Skip emptied accounts; the caller wants positions, not rent
            if info["tokenAmount"]["amount"].as_str() == Some("0") {
                continue;
            }
            holdings.push(TokenHolding {
                mint: mint.to_string(),
                amount: amount.to_string(),
                decimals: decimals as u8,
            });
        }
        Ok(holdings)
    }
}
