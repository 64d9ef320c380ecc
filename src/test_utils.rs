//! Test utilities
//!
//! In-memory [`LedgerClient`] with controllable chain state and
//! per-operation call counters, so tests can assert not just outcomes but
//! that fail-fast paths made zero network calls.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;

use crate::errors::TransferError;
use crate::ledger::{LedgerClient, TokenHolding};

/// Deterministic fake ledger. Succeeds by default; build with `failing()` to
/// make every call come back `NetworkUnavailable`.
pub struct FakeLedger {
    mints: HashMap<Pubkey, u8>,
    existing: HashSet<Pubkey>,
    balances: HashMap<Pubkey, u64>,
    holdings: HashMap<Pubkey, Vec<TokenHolding>>,
    blockhash: Hash,
    fail_network: bool,
    pub mint_calls: AtomicUsize,
    pub exists_calls: AtomicUsize,
    pub blockhash_calls: AtomicUsize,
    pub broadcast_calls: AtomicUsize,
    pub balance_calls: AtomicUsize,
    pub holdings_calls: AtomicUsize,
}

impl FakeLedger {
    pub fn new() -> Self {
        Self {
            mints: HashMap::new(),
            existing: HashSet::new(),
            balances: HashMap::new(),
            holdings: HashMap::new(),
            blockhash: Hash::new_from_array([42u8; 32]),
            fail_network: false,
            mint_calls: AtomicUsize::new(0),
            exists_calls: AtomicUsize::new(0),
            blockhash_calls: AtomicUsize::new(0),
            broadcast_calls: AtomicUsize::new(0),
            balance_calls: AtomicUsize::new(0),
            holdings_calls: AtomicUsize::new(0),
        }
    }

    /// Register an initialized mint with the given decimals.
    pub fn with_mint(mut self, mint: Pubkey, decimals: u8) -> Self {
        self.mints.insert(mint, decimals);
        self
    }

    /// Mark an account as existing on-chain.
    pub fn with_account(mut self, address: Pubkey) -> Self {
        self.existing.insert(address);
        self
    }

    pub fn with_balance(mut self, address: Pubkey, lamports: u64) -> Self {
        self.balances.insert(address, lamports);
        self
    }

    pub fn with_holdings(mut self, owner: Pubkey, holdings: Vec<TokenHolding>) -> Self {
        self.holdings.insert(owner, holdings);
        self
    }

    /// Every ledger call fails with `NetworkUnavailable`.
    pub fn failing(mut self) -> Self {
        self.fail_network = true;
        self
    }

    pub fn blockhash(&self) -> Hash {
        self.blockhash
    }

    pub fn total_calls(&self) -> usize {
        self.mint_calls.load(Ordering::SeqCst)
            + self.exists_calls.load(Ordering::SeqCst)
            + self.blockhash_calls.load(Ordering::SeqCst)
            + self.broadcast_calls.load(Ordering::SeqCst)
            + self.balance_calls.load(Ordering::SeqCst)
            + self.holdings_calls.load(Ordering::SeqCst)
    }

    fn check_network(&self) -> Result<(), TransferError> {
        if self.fail_network {
            Err(TransferError::network("fake ledger is offline"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl LedgerClient for FakeLedger {
    async fn mint_decimals(&self, mint: &Pubkey) -> Result<u8, TransferError> {
        self.mint_calls.fetch_add(1, Ordering::SeqCst);
        self.check_network()?;
        self.mints
            .get(mint)
            .copied()
            .ok_or_else(|| TransferError::AssetNotFound(format!("mint {mint} does not exist")))
    }

    async fn account_exists(&self, address: &Pubkey) -> Result<bool, TransferError> {
        self.exists_calls.fetch_add(1, Ordering::SeqCst);
        self.check_network()?;
        Ok(self.existing.contains(address))
    }

    async fn latest_blockhash(&self) -> Result<Hash, TransferError> {
        self.blockhash_calls.fetch_add(1, Ordering::SeqCst);
        self.check_network()?;
        Ok(self.blockhash)
    }

    async fn send_and_confirm(&self, _tx: &Transaction) -> Result<Signature, TransferError> {
        self.broadcast_calls.fetch_add(1, Ordering::SeqCst);
        self.check_network()?;
        Ok(Signature::from([1u8; 64]))
    }

    async fn lamport_balance(&self, address: &Pubkey) -> Result<u64, TransferError> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        self.check_network()?;
        Ok(self.balances.get(address).copied().unwrap_or(0))
    }

    async fn token_holdings(&self, owner: &Pubkey) -> Result<Vec<TokenHolding>, TransferError> {
        self.holdings_calls.fetch_add(1, Ordering::SeqCst);
        self.check_network()?;
        Ok(self.holdings.get(owner).cloned().unwrap_or_default())
    }
}
