//! Transaction wire codec
//!
//! Solana's canonical transaction encoding is bincode; wallets and RPC nodes
//! both speak base64 over it. The unsigned transactions produced by the
//! builder serialize with all-zero signature slots, which signing software
//! fills in client-side. Decoding never trusts its input: truncated or
//! garbage blobs come back as `DecodeError`, and signatures are not checked
//! here - that is the network's job.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use solana_sdk::sanitize::Sanitize;
use solana_sdk::transaction::Transaction;

use crate::errors::TransferError;

/// Encode a transaction (signed or not) to base64 transport form.
pub fn encode_transaction(tx: &Transaction) -> Result<String, TransferError> {
    let bytes = bincode::serialize(tx)
        .map_err(|e| TransferError::DecodeError(format!("cannot serialize transaction: {e}")))?;
    Ok(BASE64_STANDARD.encode(bytes))
}

/// Decode a base64 transaction blob received from a client.
pub fn decode_transaction(blob: &str) -> Result<Transaction, TransferError> {
    let bytes = BASE64_STANDARD
        .decode(blob.trim())
        .map_err(|e| TransferError::DecodeError(format!("invalid base64: {e}")))?;
    let tx: Transaction = bincode::deserialize(&bytes)
        .map_err(|e| TransferError::DecodeError(format!("malformed transaction bytes: {e}")))?;
    tx.sanitize()
        .map_err(|e| TransferError::DecodeError(format!("unsanitary transaction: {e}")))?;
    Ok(tx)
}
