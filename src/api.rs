//! REST API for a proofchain node
//!
//! Exposes transaction submission, mining, chain listing, peer registration
//! and consensus resolution over HTTP/JSON.

use axum::{
    extract::{rejection::JsonRejection, Request, State},
    http::{self, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::blockchain::Block;
use crate::error::ChainError;
use crate::node::Node;
use crate::transaction::Transaction;

// ============================================================================
// API Error Handling
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    BlockchainError(ChainError),
    InvalidInput(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BlockchainError(e) => {
                let status = match e {
                    ChainError::InvalidTransaction(_) | ChainError::InvalidPeerAddress(_) => {
                        StatusCode::BAD_REQUEST
                    }
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, e.to_string())
            }
            ApiError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        if status.is_server_error() {
            tracing::error!(error = %message, "api.error");
        }

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<ChainError> for ApiError {
    fn from(err: ChainError) -> Self {
        ApiError::BlockchainError(err)
    }
}

/// Malformed or undecodable request bodies are reported as 400 with a JSON
/// error instead of axum's plain-text rejection.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidInput(rejection.body_text())
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Serialize)]
pub struct TransactionAccepted {
    pub message: String,
    pub index: u64,
}

#[derive(Serialize)]
pub struct MineResponse {
    pub message: String,
    pub block: Block,
}

#[derive(Serialize)]
pub struct ChainResponse {
    pub chain: Vec<Block>,
    pub length: usize,
}

#[derive(Deserialize)]
pub struct RegisterNodesRequest {
    #[serde(default)]
    pub nodes: Vec<String>,
}

#[derive(Serialize)]
pub struct NodesResponse {
    pub message: String,
    pub nodes: Vec<String>,
}

#[derive(Serialize)]
pub struct ResolveResponse {
    pub message: String,
    pub replaced: bool,
    pub chain: Vec<Block>,
}

// ============================================================================
// Middleware
// ============================================================================

/// Logs method, path, status and duration of every request.
async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    tracing::info!(
        method = %method,
        path = %path,
        status = %response.status().as_u16(),
        duration_ms = %start.elapsed().as_millis(),
        "api.request"
    );

    response
}

// ============================================================================
// API Server
// ============================================================================

/// Build the API router with all endpoints
pub fn build_api_router(node: Arc<Node>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(vec![
            http::Method::GET,
            http::Method::POST,
            http::Method::OPTIONS,
        ])
        .allow_headers(vec![http::header::CONTENT_TYPE]);

    Router::new()
        // Ledger endpoints
        .route("/transactions/new", post(submit_transaction))
        .route("/transactions/pending", get(get_pending_transactions))
        .route("/mine", get(mine))
        .route("/chain", get(get_chain))
        // Peer endpoints
        .route("/nodes", get(get_nodes))
        .route("/nodes/register", post(register_nodes))
        .route("/nodes/resolve", get(resolve_conflicts))
        // System endpoints
        .route("/health", get(health_check))
        .layer(middleware::from_fn(logging_middleware))
        .with_state(node)
        .layer(cors)
}

/// Serve the API on an already bound listener.
pub async fn serve(listener: tokio::net::TcpListener, node: Arc<Node>) -> Result<(), ChainError> {
    axum::serve(listener, build_api_router(node)).await?;
    Ok(())
}

/// Bind `0.0.0.0:port` and serve the API until the process exits.
pub async fn run_api_server(node: Arc<Node>, port: u16) -> Result<(), ChainError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(%addr, node_id = %node.node_id(), "API server listening");

    serve(listener, node).await
}

// ============================================================================
// Route Handlers
// ============================================================================

async fn health_check(State(node): State<Arc<Node>>) -> impl IntoResponse {
    let length = node.blockchain.read().await.len();
    Json(serde_json::json!({
        "status": "healthy",
        "node_id": node.node_id(),
        "length": length,
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn submit_transaction(
    State(node): State<Arc<Node>>,
    payload: Result<Json<Transaction>, JsonRejection>,
) -> Result<(StatusCode, Json<TransactionAccepted>), ApiError> {
    let Json(tx) =
        payload.map_err(|rejection| ChainError::InvalidTransaction(rejection.body_text()))?;
    let index = node.submit_transaction(tx).await?;

    Ok((
        StatusCode::CREATED,
        Json(TransactionAccepted {
            message: format!("Transaction will be added to Block {}", index),
            index,
        }),
    ))
}

async fn get_pending_transactions(State(node): State<Arc<Node>>) -> impl IntoResponse {
    let transactions = node.pending_transactions().await;
    Json(serde_json::json!({
        "count": transactions.len(),
        "transactions": transactions
    }))
}

async fn mine(State(node): State<Arc<Node>>) -> Result<Json<MineResponse>, ApiError> {
    let block = node.mine().await?;

    Ok(Json(MineResponse {
        message: "New Block Forged".to_string(),
        block,
    }))
}

async fn get_chain(State(node): State<Arc<Node>>) -> Json<ChainResponse> {
    let chain = node.chain().await;
    Json(ChainResponse {
        length: chain.len(),
        chain,
    })
}

async fn get_nodes(State(node): State<Arc<Node>>) -> impl IntoResponse {
    let peers = node.peers().await;
    Json(serde_json::json!({
        "count": peers.len(),
        "nodes": peers
    }))
}

async fn register_nodes(
    State(node): State<Arc<Node>>,
    payload: Result<Json<RegisterNodesRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<NodesResponse>), ApiError> {
    let Json(req) = payload?;
    if req.nodes.is_empty() {
        return Err(ApiError::InvalidInput(
            "Please supply a valid list of nodes".to_string(),
        ));
    }

    let nodes = node.register_peers(&req.nodes).await?;

    Ok((
        StatusCode::CREATED,
        Json(NodesResponse {
            message: "New nodes have been added".to_string(),
            nodes,
        }),
    ))
}

async fn resolve_conflicts(State(node): State<Arc<Node>>) -> Json<ResolveResponse> {
    let (resolution, chain) = node.resolve().await;
    let message = if resolution.replaced() {
        "Our chain was replaced"
    } else {
        "Our chain is authoritative"
    };

    Json(ResolveResponse {
        message: message.to_string(),
        replaced: resolution.replaced(),
        chain,
    })
}
