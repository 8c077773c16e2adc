use crate::constants::CHAIN_PATH;
use crate::peers::PeerAddressError;
use crate::{client, AppState};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use ledger_core::{Block, MineError, PeerChain, Transaction};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

const MISSING_VALUES: &str = "Missing values";
const NODES_REQUIRED: &str = "Error: Please supply a valid list of nodes";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/mine", get(mine))
        .route("/transactions/new", post(new_transaction))
        .route(CHAIN_PATH, get(full_chain).post(full_chain))
        .route("/nodes/register", post(register_nodes))
        .route("/nodes/resolve", get(consensus))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Error handling
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Mining(MineError),
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Mining(MineError::Cancelled) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Mining was cancelled; node is shutting down".to_string(),
            ),
            ApiError::Mining(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<MineError> for ApiError {
    fn from(err: MineError) -> Self {
        ApiError::Mining(err)
    }
}

impl From<PeerAddressError> for ApiError {
    fn from(err: PeerAddressError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

// ============================================================================
// Request / response bodies
// ============================================================================

#[derive(Serialize)]
struct Health {
    status: &'static str,
}

#[derive(Deserialize)]
pub struct TxIn {
    pub sender: String,
    pub recipient: String,
    pub amount: u64,
}

#[derive(Serialize)]
struct MessageResponse {
    message: String,
}

#[derive(Serialize)]
struct MineResponse {
    message: &'static str,
    index: u64,
    transactions: Vec<Transaction>,
    proof: u64,
    previous_hash: String,
}

#[derive(Deserialize)]
pub struct RegisterIn {
    pub nodes: Option<Vec<String>>,
}

#[derive(Serialize)]
struct RegisterResponse {
    message: &'static str,
    total_nodes: Vec<String>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum ResolveResponse {
    Replaced {
        message: &'static str,
        new_chain: Vec<Block>,
    },
    Authoritative {
        message: &'static str,
        chain: Vec<Block>,
    },
}

// ============================================================================
// Handlers
// ============================================================================

async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn mine(State(state): State<AppState>) -> Result<Json<MineResponse>, ApiError> {
    let ledger = Arc::clone(&state.ledger);
    let miner = state.miner.clone();
    let cancel = state.cancel.clone();
    let block = tokio::task::spawn_blocking(move || miner.mine(&ledger, &cancel)).await??;

    Ok(Json(MineResponse {
        message: "New Block Forged",
        index: block.index,
        transactions: block.transactions,
        proof: block.proof,
        previous_hash: block.previous_hash,
    }))
}

async fn new_transaction(
    State(state): State<AppState>,
    payload: Result<Json<TxIn>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let Json(tx) = payload.map_err(|rejection| {
        warn!(%rejection, "rejecting transaction body");
        ApiError::BadRequest(MISSING_VALUES.to_string())
    })?;
    if tx.sender.trim().is_empty() || tx.recipient.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "sender and recipient must not be empty".to_string(),
        ));
    }

    let index = state.ledger.new_transaction(tx.sender, tx.recipient, tx.amount);
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: format!("Transaction will be added to Block {index}"),
        }),
    ))
}

async fn full_chain(State(state): State<AppState>) -> Json<PeerChain> {
    Json(PeerChain::new(state.ledger.chain()))
}

async fn register_nodes(
    State(state): State<AppState>,
    payload: Result<Json<RegisterIn>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let nodes = payload
        .ok()
        .and_then(|Json(body)| body.nodes)
        .ok_or_else(|| ApiError::BadRequest(NODES_REQUIRED.to_string()))?;

    let total_nodes = {
        let mut peers = state.peers.write();
        // All-or-nothing: one bad address leaves the set unchanged.
        let mut updated = peers.clone();
        for node in &nodes {
            updated.register(node)?;
        }
        *peers = updated;
        peers.to_vec()
    };
    info!(added = nodes.len(), total = total_nodes.len(), "registered peers");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "New nodes have been added",
            total_nodes,
        }),
    ))
}

async fn consensus(State(state): State<AppState>) -> Result<Json<ResolveResponse>, ApiError> {
    let peers = state.peers.read().to_vec();
    let reports = client::fetch_all(&state.http, peers).await;

    let ledger = Arc::clone(&state.ledger);
    let resolver = state.resolver.clone();
    let resolution = tokio::task::spawn_blocking(move || resolver.resolve(&ledger, reports)).await?;

    Ok(Json(if resolution.replaced {
        ResolveResponse::Replaced {
            message: "Our chain was replaced",
            new_chain: resolution.chain,
        }
    } else {
        ResolveResponse::Authoritative {
            message: "Our chain is authoritative",
            chain: resolution.chain,
        }
    }))
}
