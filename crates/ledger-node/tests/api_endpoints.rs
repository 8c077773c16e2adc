//! HTTP-level tests: each endpoint against an in-process router, plus
//! consensus between nodes talking over real sockets.

use axum::{routing::get, Router};
use axum_test::TestServer;
use ledger_core::{genesis_block, CancelFlag, Difficulty};
use ledger_node::{api::router, config::NodeConfig, AppState};
use serde_json::{json, Value};
use std::{net::SocketAddr, time::Duration};
use tokio::net::TcpListener;

fn node_state(node_id: &str) -> AppState {
    let config = NodeConfig {
        difficulty: Difficulty::new("0").unwrap(),
        node_id: node_id.to_string(),
        peer_timeout: Duration::from_secs(2),
        ..NodeConfig::default()
    };
    AppState::new(&config).expect("node state")
}

async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    addr
}

fn mine_blocks(state: &AppState, count: usize) {
    for _ in 0..count {
        state.miner.mine(&state.ledger, &CancelFlag::new()).unwrap();
    }
}

#[tokio::test]
async fn health_reports_ok() {
    let server = TestServer::new(router(node_state("a"))).unwrap();
    let response = server.get("/health").await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json::<Value>(), json!({ "status": "ok" }));
}

#[tokio::test]
async fn new_transaction_is_queued_for_next_block() {
    let state = node_state("a");
    let server = TestServer::new(router(state.clone())).unwrap();

    let response = server
        .post("/transactions/new")
        .json(&json!({ "sender": "alice", "recipient": "bob", "amount": 5 }))
        .await;
    assert_eq!(response.status_code(), 201);
    assert_eq!(
        response.json::<Value>()["message"],
        "Transaction will be added to Block 2"
    );
    assert_eq!(state.ledger.pending().len(), 1);
}

#[tokio::test]
async fn malformed_transactions_are_rejected() {
    let state = node_state("a");
    let server = TestServer::new(router(state.clone())).unwrap();

    for body in [
        json!({ "sender": "alice", "recipient": "bob" }),
        json!({ "sender": "alice", "recipient": "bob", "amount": -1 }),
        json!({ "sender": "alice", "recipient": "bob", "amount": "ten" }),
    ] {
        let response = server.post("/transactions/new").json(&body).await;
        assert_eq!(response.status_code(), 400);
        assert_eq!(response.json::<Value>()["error"], "Missing values");
    }

    let response = server
        .post("/transactions/new")
        .json(&json!({ "sender": " ", "recipient": "bob", "amount": 1 }))
        .await;
    assert_eq!(response.status_code(), 400);
    assert!(state.ledger.pending().is_empty());
}

#[tokio::test]
async fn mine_forges_block_with_reward() {
    let state = node_state("miner-a");
    let server = TestServer::new(router(state.clone())).unwrap();

    server
        .post("/transactions/new")
        .json(&json!({ "sender": "alice", "recipient": "bob", "amount": 5 }))
        .await;
    let response = server.get("/mine").await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["message"], "New Block Forged");
    assert_eq!(body["index"], 2);
    assert_eq!(body["previous_hash"], genesis_block().hash());
    assert_eq!(
        body["transactions"],
        json!([
            { "sender": "alice", "recipient": "bob", "amount": 5 },
            { "sender": "0", "recipient": "miner-a", "amount": 1 }
        ])
    );
    assert!(state.ledger.pending().is_empty());
}

#[tokio::test]
async fn chain_is_served_on_get_and_post() {
    let state = node_state("a");
    mine_blocks(&state, 2);
    let server = TestServer::new(router(state)).unwrap();

    for response in [server.get("/chain").await, server.post("/chain").await] {
        assert_eq!(response.status_code(), 200);
        let body: Value = response.json();
        assert_eq!(body["length"], 3);
        assert_eq!(body["chain"].as_array().unwrap().len(), 3);
        assert_eq!(body["chain"][0]["proof"], 1000);
    }
}

#[tokio::test]
async fn register_nodes_validates_input() {
    let state = node_state("a");
    let server = TestServer::new(router(state.clone())).unwrap();

    let response = server.post("/nodes/register").json(&json!({})).await;
    assert_eq!(response.status_code(), 400);
    assert_eq!(
        response.json::<Value>()["error"],
        "Error: Please supply a valid list of nodes"
    );

    let response = server
        .post("/nodes/register")
        .json(&json!({ "nodes": ["http://127.0.0.1:5001", "127.0.0.1:5002"] }))
        .await;
    assert_eq!(response.status_code(), 201);
    let body: Value = response.json();
    assert_eq!(body["message"], "New nodes have been added");
    assert_eq!(body["total_nodes"], json!(["127.0.0.1:5001", "127.0.0.1:5002"]));

    let response = server
        .post("/nodes/register")
        .json(&json!({ "nodes": ["127.0.0.1:5003", "http://"] }))
        .await;
    assert_eq!(response.status_code(), 400);
    assert_eq!(state.peers.read().len(), 2);
}

#[tokio::test]
async fn resolve_adopts_longer_peer_chain() {
    let peer = node_state("b");
    mine_blocks(&peer, 2);
    let peer_addr = serve(router(peer.clone())).await;

    let local = node_state("a");
    mine_blocks(&local, 1);
    let server = TestServer::new(router(local.clone())).unwrap();
    server
        .post("/nodes/register")
        .json(&json!({ "nodes": [format!("http://{peer_addr}")] }))
        .await;

    let response = server.get("/nodes/resolve").await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["message"], "Our chain was replaced");
    assert_eq!(body["new_chain"].as_array().unwrap().len(), 3);
    assert_eq!(local.ledger.chain(), peer.ledger.chain());
}

#[tokio::test]
async fn resolve_keeps_local_chain_against_equal_invalid_or_absent_peers() {
    let equal = node_state("equal");
    mine_blocks(&equal, 1);
    let equal_addr = serve(router(equal)).await;

    let forged = node_state("forged");
    mine_blocks(&forged, 4);
    let mut tampered = forged.ledger.chain();
    tampered[2].transactions[0].amount = 1_000;
    forged.ledger.replace_chain(tampered);
    let forged_addr = serve(router(forged)).await;

    let garbage = Router::new().route("/chain", get(|| async { "not a chain" }));
    let garbage_addr = serve(garbage).await;

    let local = node_state("a");
    mine_blocks(&local, 1);
    let before = local.ledger.chain();
    let server = TestServer::new(router(local.clone())).unwrap();
    server
        .post("/nodes/register")
        .json(&json!({
            "nodes": [
                equal_addr.to_string(),
                forged_addr.to_string(),
                garbage_addr.to_string(),
                "127.0.0.1:1",
            ]
        }))
        .await;

    let response = server.get("/nodes/resolve").await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["message"], "Our chain is authoritative");
    assert_eq!(body["chain"].as_array().unwrap().len(), 2);
    assert_eq!(local.ledger.chain(), before);
}

#[tokio::test]
async fn cancelled_node_refuses_to_mine() {
    let state = node_state("a");
    let server = TestServer::new(router(state.clone())).unwrap();
    state.cancel.cancel();

    let response = server.get("/mine").await;
    assert_eq!(response.status_code(), 503);
    assert_eq!(state.ledger.len(), 1);
}
