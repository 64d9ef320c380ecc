//! Transaction builder
//!
//! Turns a validated transfer request into one atomic, unsigned, legacy
//! Solana transaction: one transfer instruction per recipient plus any
//! associated-token-account creations that must precede them, fee-payer
//! stamped with the sender, anchored to a blockhash fetched strictly after
//! every instruction-affecting resolution has completed.
//!
//! The pipeline is fail-fast: every address and amount is validated before
//! the first network call, and no partial transaction is ever returned.

use std::collections::{HashMap, HashSet};

use futures::future::try_join_all;
use serde::Deserialize;
use solana_sdk::instruction::Instruction;
use solana_sdk::message::Message;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::system_instruction;
use solana_sdk::transaction::Transaction;
use spl_associated_token_account::instruction::create_associated_token_account;
use tracing::{debug, info};

use crate::address::parse_address;
use crate::amount::Amount;
use crate::asset::{resolve_asset, resolve_holding_account, AssetKind, AssetSelector};
use crate::errors::TransferError;
use crate::ledger::LedgerClient;

/// One (recipient, amount) pair as received from the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct TransferInput {
    pub address: String,
    pub amount: Amount,
}

/// Build a single unsigned transaction moving `transfers` from `sender`.
///
/// Instruction ordering guarantees:
/// - transfer instructions appear in input order;
/// - an account-creation instruction always precedes the first instruction
///   referencing that account, and is emitted at most once per account;
/// - the sender's own holding-account creation (token path) comes before
///   any of the sender's transfer instructions.
pub async fn build_transfer(
    ledger: &dyn LedgerClient,
    sender_raw: &str,
    selector: AssetSelector,
    transfers: &[TransferInput],
) -> Result<Transaction, TransferError> {
    // Step 1: validate everything before touching the network.
    if transfers.is_empty() {
        return Err(TransferError::invalid_input("recipient list is empty"));
    }
    let sender = parse_address(sender_raw, "publicKey")?;
    let mut recipients = Vec::with_capacity(transfers.len());
    for transfer in transfers {
        recipients.push(parse_address(&transfer.address, "recipient address")?);
        transfer.amount.validate_positive()?;
    }

    // Step 2: the asset decides primitive and precision. Amounts are scaled
    // only with the resolved decimals, never an assumed value.
    let asset = resolve_asset(ledger, selector).await?;
    let mut amounts = Vec::with_capacity(transfers.len());
    for transfer in transfers {
        amounts.push(transfer.amount.to_base_units(asset.decimals)?);
    }

    let instructions = match asset.kind {
        AssetKind::Sol => build_sol_instructions(&sender, &recipients, &amounts),
        AssetKind::Token { mint } => {
            build_token_instructions(ledger, &sender, &mint, asset.decimals, &recipients, &amounts)
                .await?
        }
    };

    // Blockhash last: it has a short validity window, and resolving holding
    // accounts above already spent part of it.
    let blockhash = ledger.latest_blockhash().await?;
    let message = Message::new_with_blockhash(&instructions, Some(&sender), &blockhash);
    let tx = Transaction::new_unsigned(message);

    info!(
        sender = %sender,
        recipients = transfers.len(),
        instructions = tx.message.instructions.len(),
        asset = match asset.kind {
            AssetKind::Sol => "sol".to_string(),
            AssetKind::Token { mint } => mint.to_string(),
        },
        "built unsigned transfer transaction"
    );
    Ok(tx)
}

fn build_sol_instructions(
    sender: &Pubkey,
    recipients: &[Pubkey],
    lamports: &[u64],
) -> Vec<Instruction> {
    recipients
        .iter()
        .zip(lamports)
        .map(|(recipient, amount)| system_instruction::transfer(sender, recipient, *amount))
        .collect()
}

async fn build_token_instructions(
    ledger: &dyn LedgerClient,
    sender: &Pubkey,
    mint: &Pubkey,
    decimals: u8,
    recipients: &[Pubkey],
    amounts: &[u64],
) -> Result<Vec<Instruction>, TransferError> {
    let sender_holding = resolve_holding_account(ledger, sender, mint).await?;

    // Existence reads happen once per distinct (owner, mint) pair; the
    // sender's is already in hand, so a sender paying itself is not read
    // twice. Recipient reads are issued concurrently; the blockhash fetch
    // still happens after all of them.
    let mut holdings = HashMap::from([(*sender, sender_holding)]);
    let mut distinct: Vec<Pubkey> = Vec::new();
    for recipient in recipients {
        if !holdings.contains_key(recipient) && !distinct.contains(recipient) {
            distinct.push(*recipient);
        }
    }
    let resolved = try_join_all(
        distinct
            .iter()
            .map(|owner| resolve_holding_account(ledger, owner, mint)),
    )
    .await?;
    holdings.extend(distinct.into_iter().zip(resolved));

    let mut instructions = Vec::with_capacity(recipients.len() * 2 + 1);
    let mut created: HashSet<Pubkey> = HashSet::new();

    if !sender_holding.exists {
        debug!(ata = %sender_holding.address, "sender holding account missing, creating");
        instructions.push(create_associated_token_account(
            sender,
            sender,
            mint,
            &spl_token::id(),
        ));
        created.insert(sender_holding.address);
    }

    for (recipient, amount) in recipients.iter().zip(amounts) {
        let holding = holdings[recipient];
        if !holding.exists && !created.contains(&holding.address) {
            debug!(owner = %recipient, ata = %holding.address, "recipient holding account missing, creating");
            instructions.push(create_associated_token_account(
                sender,
                recipient,
                mint,
                &spl_token::id(),
            ));
            created.insert(holding.address);
        }
        let transfer = spl_token::instruction::transfer_checked(
            &spl_token::id(),
            &sender_holding.address,
            mint,
            &holding.address,
            sender,
            &[],
            *amount,
            decimals,
        )
        .map_err(|e| {
            TransferError::invalid_input(format!("cannot build token transfer instruction: {e}"))
        })?;
        instructions.push(transfer);
    }
    Ok(instructions)
}
