//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use alloy::primitives::{Address, TxHash};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use tx_sender::blockchain::{decode_signed, BlockchainError, BlockchainResult, ChainId, ChainRpc};

// Well-known test private key (Anvil's first account)
pub const TEST_PRIVATE_KEY: &str =
    "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

pub const RECIPIENT: Address = alloy::primitives::address!("70997970c51812dc3a010c7d01b50e0d17dc79c8");

#[derive(Default)]
struct NodeState {
    nonces: HashMap<Address, u64>,
    accepted: Vec<TxHash>,
    calls: Vec<&'static str>,
    rejection: Option<String>,
}

/// In-memory node that applies the nonce and chain ID rules a real node
/// enforces on `eth_sendRawTransaction`.
pub struct MockNode {
    chain_id: u64,
    state: Mutex<NodeState>,
}

impl MockNode {
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            state: Mutex::new(NodeState::default()),
        }
    }

    pub fn with_nonce(self, address: Address, nonce: u64) -> Self {
        self.state.lock().unwrap().nonces.insert(address, nonce);
        self
    }

    /// Reject every submission with `reason`, as a node does for an
    /// unfunded account.
    pub fn with_rejection(self, reason: &str) -> Self {
        self.state.lock().unwrap().rejection = Some(reason.to_string());
        self
    }

    /// Methods called so far, in order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn accepted(&self) -> Vec<TxHash> {
        self.state.lock().unwrap().accepted.clone()
    }

    fn record(&self, method: &'static str) {
        self.state.lock().unwrap().calls.push(method);
    }
}

impl ChainRpc for MockNode {
    async fn chain_id(&self) -> BlockchainResult<ChainId> {
        self.record("eth_chainId");
        Ok(ChainId(self.chain_id))
    }

    async fn pending_nonce(&self, address: Address) -> BlockchainResult<u64> {
        self.record("eth_getTransactionCount");
        Ok(self
            .state
            .lock()
            .unwrap()
            .nonces
            .get(&address)
            .copied()
            .unwrap_or(0))
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> BlockchainResult<TxHash> {
        self.record("eth_sendRawTransaction");
        if let Some(reason) = self.state.lock().unwrap().rejection.clone() {
            return Err(BlockchainError::SubmissionRejected(reason));
        }

        let signed = decode_signed(raw)
            .map_err(|e| BlockchainError::SubmissionRejected(e.to_string()))?;
        if signed.tx().chain_id != self.chain_id {
            return Err(BlockchainError::SubmissionRejected("invalid chain id".into()));
        }
        let sender = signed
            .recover_signer()
            .map_err(|_| BlockchainError::SubmissionRejected("invalid sender".into()))?;

        let mut state = self.state.lock().unwrap();
        let expected = state.nonces.get(&sender).copied().unwrap_or(0);
        let nonce = signed.tx().nonce;
        if nonce < expected {
            return Err(BlockchainError::SubmissionRejected(format!(
                "nonce too low: next nonce {}, tx nonce {}",
                expected, nonce
            )));
        }
        if nonce > expected {
            return Err(BlockchainError::SubmissionRejected(format!(
                "nonce too high: next nonce {}, tx nonce {}",
                expected, nonce
            )));
        }

        state.nonces.insert(sender, expected + 1);
        state.accepted.push(signed.hash());
        Ok(signed.hash())
    }
}

/// What the JSON-RPC test server answers.
pub enum RpcReply {
    Result(Value),
    Error { code: i64, message: String },
    Status(u16),
}

/// Start an in-process JSON-RPC server on an ephemeral port.
///
/// `f` receives the method name and params of each request.
pub async fn start_rpc_server<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String, Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = RpcReply> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    let app = Router::new().route(
        "/",
        post(move |Json(body): Json<Value>| {
            let f = f.clone();
            async move {
                let id = body.get("id").cloned().unwrap_or(Value::Null);
                let method = body
                    .get("method")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                let params = body.get("params").cloned().unwrap_or(Value::Null);

                let response: Response = match f(method, params).await {
                    RpcReply::Result(result) => {
                        Json(json!({"jsonrpc": "2.0", "id": id, "result": result})).into_response()
                    }
                    RpcReply::Error { code, message } => Json(json!({
                        "jsonrpc": "2.0",
                        "id": id,
                        "error": {"code": code, "message": message}
                    }))
                    .into_response(),
                    RpcReply::Status(status) => (
                        StatusCode::from_u16(status).unwrap(),
                        "backend unavailable",
                    )
                        .into_response(),
                };
                response
            }
        }),
    );

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    addr
}

/// An address nothing listens on.
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}
