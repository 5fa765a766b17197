//! Integration tests for the proofchain HTTP API
//!
//! These tests drive every endpoint through the router and check status codes
//! and JSON shapes.

use axum_test::TestServer;
use proofchain::api::build_api_router;
use proofchain::blockchain::Blockchain;
use proofchain::miner::ProofOfWork;
use proofchain::node::Node;
use proofchain::sync::StaticChainFetcher;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

fn test_server(fetcher: StaticChainFetcher) -> (TestServer, Arc<Node>) {
    let node = Arc::new(Node::new(
        "api-test-node",
        Blockchain::new(ProofOfWork::new(2)),
        Arc::new(fetcher),
        Duration::from_secs(1),
    ));
    let server = TestServer::new(build_api_router(node.clone())).expect("Failed to create test server");
    (server, node)
}

/// Chain of `len` blocks mined by an independent node.
async fn peer_chain(len: usize) -> Vec<proofchain::blockchain::Block> {
    let peer = Node::new(
        "peer",
        Blockchain::new(ProofOfWork::new(2)),
        Arc::new(StaticChainFetcher::new()),
        Duration::from_secs(1),
    );
    while peer.chain().await.len() < len {
        peer.mine().await.expect("peer mining failed");
    }
    peer.chain().await
}

#[tokio::test]
async fn test_chain_starts_with_genesis() {
    let (server, _) = test_server(StaticChainFetcher::new());

    let response = server.get("/chain").await;
    assert_eq!(response.status_code(), 200);
    let json: Value = response.json();
    assert_eq!(json["length"], 1);
    assert_eq!(json["chain"][0]["index"], 1);
    assert_eq!(json["chain"][0]["proof"], 100);
    assert_eq!(json["chain"][0]["previous_hash"], "1");
    assert!(json["chain"][0]["transactions"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_submit_then_mine() {
    let (server, _) = test_server(StaticChainFetcher::new());

    let response = server
        .post("/transactions/new")
        .json(&json!({"sender": "alice", "recipient": "bob", "amount": 5}))
        .await;
    assert_eq!(response.status_code(), 201);
    let json: Value = response.json();
    assert_eq!(json["message"], "Transaction will be added to Block 2");
    assert_eq!(json["index"], 2);

    let response = server.get("/transactions/pending").await;
    assert_eq!(response.status_code(), 200);
    let json: Value = response.json();
    assert_eq!(json["count"], 1);

    let response = server.get("/mine").await;
    assert_eq!(response.status_code(), 200);
    let json: Value = response.json();
    assert_eq!(json["message"], "New Block Forged");
    assert_eq!(json["block"]["index"], 2);
    assert_eq!(
        json["block"]["transactions"],
        json!([
            {"sender": "alice", "recipient": "bob", "amount": 5},
            {"sender": "0", "recipient": "api-test-node", "amount": 1}
        ])
    );

    let json: Value = server.get("/transactions/pending").await.json();
    assert_eq!(json["count"], 0);

    let json: Value = server.get("/chain").await.json();
    assert_eq!(json["length"], 2);
}

#[tokio::test]
async fn test_invalid_transaction_is_rejected() {
    let (server, node) = test_server(StaticChainFetcher::new());

    let response = server
        .post("/transactions/new")
        .json(&json!({"sender": "alice", "recipient": "", "amount": 5}))
        .await;
    assert_eq!(response.status_code(), 400);
    let json: Value = response.json();
    assert!(json["error"].is_string());

    let response = server
        .post("/transactions/new")
        .json(&json!({"sender": "alice", "recipient": "bob", "amount": -1}))
        .await;
    assert_eq!(response.status_code(), 400);

    assert!(node.pending_transactions().await.is_empty());
}

#[tokio::test]
async fn test_malformed_transaction_body_is_rejected_as_json() {
    let (server, node) = test_server(StaticChainFetcher::new());

    let bodies = [
        json!({"sender": "a", "recipient": "b"}),
        json!({"sender": "a", "recipient": "b", "amount": 1.5}),
        json!({"sender": "a", "recipient": "b", "amount": "ten"}),
        json!("not an object"),
    ];
    for body in bodies {
        let response = server.post("/transactions/new").json(&body).await;
        assert_eq!(response.status_code(), 400, "body {}", body);
        let json: Value = response.json();
        let error = json["error"].as_str().expect("error should be a string");
        assert!(error.starts_with("Invalid transaction"), "{}", error);
    }

    let response = server.post("/transactions/new").text("sender=a").await;
    assert_eq!(response.status_code(), 400);
    let json: Value = response.json();
    assert!(json["error"].is_string());

    assert!(node.pending_transactions().await.is_empty());
}

#[tokio::test]
async fn test_malformed_register_body_is_rejected_as_json() {
    let (server, node) = test_server(StaticChainFetcher::new());

    let response = server
        .post("/nodes/register")
        .json(&json!({"nodes": "x"}))
        .await;
    assert_eq!(response.status_code(), 400);
    let json: Value = response.json();
    assert!(json["error"].is_string());

    assert!(node.peers().await.is_empty());
}

#[tokio::test]
async fn test_register_nodes() {
    let (server, _) = test_server(StaticChainFetcher::new());

    let response = server
        .post("/nodes/register")
        .json(&json!({"nodes": ["http://127.0.0.1:5001", "127.0.0.1:5001", "127.0.0.1:5002"]}))
        .await;
    assert_eq!(response.status_code(), 201);
    let json: Value = response.json();
    assert_eq!(json["message"], "New nodes have been added");
    assert_eq!(json["nodes"], json!(["127.0.0.1:5001", "127.0.0.1:5002"]));

    let json: Value = server.get("/nodes").await.json();
    assert_eq!(json["count"], 2);

    let response = server.post("/nodes/register").json(&json!({"nodes": []})).await;
    assert_eq!(response.status_code(), 400);

    let response = server
        .post("/nodes/register")
        .json(&json!({"nodes": ["no-port-here"]}))
        .await;
    assert_eq!(response.status_code(), 400);

    let json: Value = server.get("/nodes").await.json();
    assert_eq!(json["count"], 2);
}

#[tokio::test]
async fn test_resolve_replaces_with_longer_chain() {
    let remote = peer_chain(3).await;
    let (server, _) =
        test_server(StaticChainFetcher::new().with_chain("peer-a:5000", remote.clone()));

    server
        .post("/nodes/register")
        .json(&json!({"nodes": ["http://peer-a:5000"]}))
        .await;

    let response = server.get("/nodes/resolve").await;
    assert_eq!(response.status_code(), 200);
    let json: Value = response.json();
    assert_eq!(json["message"], "Our chain was replaced");
    assert_eq!(json["replaced"], true);
    assert_eq!(json["chain"], serde_json::to_value(&remote).unwrap());

    let json: Value = server.get("/chain").await.json();
    assert_eq!(json["length"], 3);
}

#[tokio::test]
async fn test_resolve_keeps_authoritative_chain() {
    let remote = peer_chain(2).await;
    let (server, node) =
        test_server(StaticChainFetcher::new().with_chain("peer-a:5000", remote));
    node.mine().await.unwrap();
    let before = node.chain().await;

    server
        .post("/nodes/register")
        .json(&json!({"nodes": ["peer-a:5000", "peer-b:5000"]}))
        .await;

    let response = server.get("/nodes/resolve").await;
    assert_eq!(response.status_code(), 200);
    let json: Value = response.json();
    assert_eq!(json["message"], "Our chain is authoritative");
    assert_eq!(json["replaced"], false);
    assert_eq!(node.chain().await, before);
}

#[tokio::test]
async fn test_health() {
    let (server, _) = test_server(StaticChainFetcher::new());

    let response = server.get("/health").await;
    assert_eq!(response.status_code(), 200);
    let json: Value = response.json();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["node_id"], "api-test-node");
    assert_eq!(json["length"], 1);
    assert!(json["timestamp"].is_string());
}
