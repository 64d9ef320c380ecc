//! HTTP surface
//!
//! Stateless JSON endpoints over the builder and relay. All chain access
//! flows through the injected [`LedgerClient`] handle; handlers hold no
//! other state, so every request is isolated.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::address::parse_address;
use crate::asset::AssetSelector;
use crate::builder::{build_transfer, TransferInput};
use crate::codec::{decode_transaction, encode_transaction};
use crate::errors::TransferError;
use crate::ledger::{LedgerClient, TokenHolding};

/// Shared per-process state: just the ledger handle.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<dyn LedgerClient>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/send", post(handle_send))
        .route("/submit", post(handle_submit))
        .route("/balance", post(handle_balance))
        .route("/tokens", post(handle_tokens))
        .route("/health", get(handle_health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

impl IntoResponse for TransferError {
    fn into_response(self) -> Response {
        // Input and decode problems are the caller's fault; resolver and
        // network failures are ours (or the chain's).
        let status = if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        warn!(kind = self.kind(), error = %self, "request failed");
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

// ── /send ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendRequest {
    pub public_key: String,
    pub token: String,
    pub recipients: Vec<TransferInput>,
}

#[derive(Debug, Serialize)]
pub struct SendResponse {
    pub success: bool,
    /// Base64 unsigned transaction, ready for client-side signing
    pub transaction: String,
}

#[tracing::instrument(skip(state, req), level = "debug")]
async fn handle_send(
    State(state): State<AppState>,
    Json(req): Json<SendRequest>,
) -> Result<Json<SendResponse>, TransferError> {
    let selector = AssetSelector::parse(&req.token)?;
    let tx = build_transfer(state.ledger.as_ref(), &req.public_key, selector, &req.recipients)
        .await?;
    let transaction = encode_transaction(&tx)?;
    Ok(Json(SendResponse {
        success: true,
        transaction,
    }))
}

// ── /submit ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub signed_transaction: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    /// Network transaction id
    pub signature: String,
}

#[tracing::instrument(skip(state, req), level = "debug")]
async fn handle_submit(
    State(state): State<AppState>,
    Json(req): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, TransferError> {
    let blob = req
        .signed_transaction
        .ok_or_else(|| TransferError::invalid_input("signedTransaction is required"))?;
    let tx = decode_transaction(&blob)?;
    let signature = state.ledger.send_and_confirm(&tx).await?;
    info!(signature = %signature, "transaction confirmed");
    Ok(Json(SubmitResponse {
        success: true,
        signature: signature.to_string(),
    }))
}

// ── /balance ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceRequest {
    pub public_key: String,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub success: bool,
    /// Balance in SOL
    pub balance: f64,
    pub lamports: u64,
}

#[tracing::instrument(skip(state, req), level = "debug")]
async fn handle_balance(
    State(state): State<AppState>,
    Json(req): Json<BalanceRequest>,
) -> Result<Json<BalanceResponse>, TransferError> {
    let owner = parse_address(&req.public_key, "publicKey")?;
    let lamports = state.ledger.lamport_balance(&owner).await?;
    Ok(Json(BalanceResponse {
        success: true,
        balance: lamports as f64 / solana_sdk::native_token::LAMPORTS_PER_SOL as f64,
        lamports,
    }))
}

// ── /tokens ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokensRequest {
    pub public_key: String,
}

#[derive(Debug, Serialize)]
pub struct TokensResponse {
    pub success: bool,
    pub tokens: Vec<TokenHolding>,
}

#[tracing::instrument(skip(state, req), level = "debug")]
async fn handle_tokens(
    State(state): State<AppState>,
    Json(req): Json<TokensRequest>,
) -> Result<Json<TokensResponse>, TransferError> {
    let owner = parse_address(&req.public_key, "publicKey")?;
    let tokens = state.ledger.token_holdings(&owner).await?;
    Ok(Json(TokensResponse {
        success: true,
        tokens,
    }))
}

// ── /health ──────────────────────────────────────────────────────────────

async fn handle_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
