//! Blockchain RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Connect to a single JSON-RPC endpoint
//! - Query chain state (chain ID, pending nonce)
//! - Broadcast signed transactions
//! - Map transport and node failures onto `BlockchainError`
//!
//! Every call is one attempt under a deadline. Nothing is retried.

use std::future::{Future, IntoFuture};
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, TxHash};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::transports::{RpcError, TransportError, TransportErrorKind};
use tokio::time::timeout;

use crate::blockchain::types::{BlockchainError, BlockchainResult, ChainContext, ChainId, NetworkConfig};
use crate::observability::metrics;

/// The three node operations the send pipeline depends on.
///
/// Kept narrow so the builder and signer can be exercised against an
/// in-memory node.
pub trait ChainRpc {
    /// `eth_chainId`.
    fn chain_id(&self) -> impl Future<Output = BlockchainResult<ChainId>> + Send;

    /// `eth_getTransactionCount(address, "pending")`.
    fn pending_nonce(&self, address: Address)
        -> impl Future<Output = BlockchainResult<u64>> + Send;

    /// `eth_sendRawTransaction`; returns the hash echoed by the node.
    fn send_raw_transaction(
        &self,
        raw: &[u8],
    ) -> impl Future<Output = BlockchainResult<TxHash>> + Send;
}

/// Fetch nonce and chain ID concurrently; both must succeed.
pub async fn fetch_chain_context<C: ChainRpc + Sync>(
    rpc: &C,
    address: Address,
) -> BlockchainResult<ChainContext> {
    let (chain_id, nonce) = tokio::try_join!(rpc.chain_id(), rpc.pending_nonce(address))?;

    tracing::debug!(
        address = %address,
        chain_id = chain_id.0,
        nonce = nonce,
        "Fetched chain state"
    );

    Ok(ChainContext {
        chain_id: chain_id.0,
        nonce,
    })
}

/// Whether the failed call was a read or the state-changing submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallKind {
    Query,
    Submit,
}

/// Blockchain RPC client wrapper over one HTTP endpoint.
#[derive(Clone)]
pub struct BlockchainClient {
    provider: Arc<dyn Provider + Send + Sync>,
    /// Configuration.
    config: NetworkConfig,
    /// Request timeout duration.
    timeout_duration: Duration,
}

impl BlockchainClient {
    /// Create a new blockchain client.
    ///
    /// No request is made here; an unreachable endpoint surfaces on the
    /// first call.
    pub fn new(config: NetworkConfig) -> BlockchainResult<Self> {
        let url: url::Url = config.rpc_url.parse().map_err(|e| {
            BlockchainError::InvalidParameters(format!("invalid RPC URL: {}", e))
        })?;

        let provider = Arc::new(ProviderBuilder::new().connect_http(url)) as Arc<dyn Provider + Send + Sync>;

        tracing::debug!(
            endpoint = %config.endpoint(),
            timeout_secs = config.rpc_timeout_secs,
            "Blockchain client initialized"
        );

        Ok(Self {
            provider,
            timeout_duration: Duration::from_secs(config.rpc_timeout_secs),
            config,
        })
    }

    /// Fail with `ChainMismatch` when an expected chain ID is configured and
    /// `actual` differs.
    pub fn verify_chain_id(&self, actual: u64) -> BlockchainResult<()> {
        match self.config.expected_chain_id {
            Some(expected) if expected != actual => {
                Err(BlockchainError::ChainMismatch { expected, actual })
            }
            _ => Ok(()),
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    async fn call<T, F>(&self, method: &'static str, kind: CallKind, fut: F) -> BlockchainResult<T>
    where
        F: IntoFuture<Output = Result<T, TransportError>>,
    {
        let result = match timeout(self.timeout_duration, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(scrub_endpoint(classify(e, kind), &self.config)),
            Err(_) => Err(BlockchainError::NetworkUnavailable(format!(
                "{} timed out after {} seconds",
                method, self.config.rpc_timeout_secs
            ))),
        };

        match &result {
            Ok(_) => metrics::record_rpc_call(method, "ok"),
            Err(e) => {
                tracing::warn!(method = method, error = %e, "RPC call failed");
                metrics::record_rpc_call(method, error_label(e));
            }
        }

        result
    }
}

impl ChainRpc for BlockchainClient {
    async fn chain_id(&self) -> BlockchainResult<ChainId> {
        let id = self
            .call("eth_chainId", CallKind::Query, self.provider.get_chain_id())
            .await?;
        self.verify_chain_id(id)?;
        Ok(ChainId(id))
    }

    async fn pending_nonce(&self, address: Address) -> BlockchainResult<u64> {
        self.call(
            "eth_getTransactionCount",
            CallKind::Query,
            self.provider.get_transaction_count(address).pending(),
        )
        .await
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> BlockchainResult<TxHash> {
        self.call("eth_sendRawTransaction", CallKind::Submit, async move {
            let pending = self.provider.send_raw_transaction(raw).await?;
            Ok(*pending.tx_hash())
        })
        .await
    }
}

impl std::fmt::Debug for BlockchainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockchainClient")
            .field("endpoint", &self.config.endpoint())
            .field("expected_chain_id", &self.config.expected_chain_id)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}

/// Map an alloy transport error onto the pipeline taxonomy.
fn classify(err: TransportError, kind: CallKind) -> BlockchainError {
    match err {
        RpcError::ErrorResp(payload) => match kind {
            CallKind::Submit => BlockchainError::SubmissionRejected(payload.message.to_string()),
            CallKind::Query => BlockchainError::Rpc(format!(
                "node returned error {}: {}",
                payload.code, payload.message
            )),
        },
        RpcError::Transport(TransportErrorKind::HttpError(http)) => {
            BlockchainError::Rpc(format!("HTTP {}: {}", http.status, http.body))
        }
        RpcError::Transport(kind) => BlockchainError::NetworkUnavailable(kind.to_string()),
        other => BlockchainError::Rpc(other.to_string()),
    }
}

/// Transport errors quote the request URL; keep only the redacted endpoint.
fn scrub_endpoint(err: BlockchainError, config: &NetworkConfig) -> BlockchainError {
    let endpoint = config.endpoint();
    let mut spellings = vec![config.rpc_url.clone()];
    if let Ok(url) = url::Url::parse(&config.rpc_url) {
        spellings.push(url.to_string());
    }
    spellings.retain(|s| !s.is_empty() && *s != endpoint);

    let scrub = |message: String| {
        spellings
            .iter()
            .fold(message, |acc, secret| acc.replace(secret.as_str(), &endpoint))
    };

    match err {
        BlockchainError::NetworkUnavailable(m) => BlockchainError::NetworkUnavailable(scrub(m)),
        BlockchainError::Rpc(m) => BlockchainError::Rpc(scrub(m)),
        BlockchainError::SubmissionRejected(m) => BlockchainError::SubmissionRejected(scrub(m)),
        other => other,
    }
}

fn error_label(err: &BlockchainError) -> &'static str {
    match err {
        BlockchainError::NetworkUnavailable(_) => "network_unavailable",
        BlockchainError::SubmissionRejected(_) => "rejected",
        _ => "rpc_error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::rpc::json_rpc::ErrorPayload;

    fn test_config() -> NetworkConfig {
        NetworkConfig {
            rpc_url: "http://localhost:8545".to_string(),
            rpc_timeout_secs: 5,
            expected_chain_id: Some(31337), // Anvil default
        }
    }

    #[test]
    fn test_client_creation() {
        // Creation makes no request, so it succeeds without a node
        let client = BlockchainClient::new(test_config()).unwrap();
        assert_eq!(client.config().rpc_timeout_secs, 5);
    }

    #[test]
    fn test_invalid_url_rejected() {
        let mut config = test_config();
        config.rpc_url = "not a url".to_string();
        let err = BlockchainClient::new(config).unwrap_err();
        assert!(matches!(err, BlockchainError::InvalidParameters(_)));
    }

    #[test]
    fn test_debug_does_not_leak_endpoint_secret() {
        let mut config = test_config();
        config.rpc_url = "https://sepolia.infura.io/v3/SECRETPROJECTID".to_string();
        let client = BlockchainClient::new(config).unwrap();

        let debug = format!("{:?}", client);
        assert!(debug.contains("sepolia.infura.io"));
        assert!(!debug.contains("SECRETPROJECTID"));
    }

    #[test]
    fn test_invalid_url_error_does_not_echo_input() {
        let mut config = test_config();
        config.rpc_url = "SECRETPROJECTID".to_string();
        let err = BlockchainClient::new(config).unwrap_err();
        assert!(!err.to_string().contains("SECRETPROJECTID"));
    }

    #[test]
    fn test_transport_error_text_is_scrubbed() {
        let mut config = test_config();
        config.rpc_url = "https://sepolia.infura.io/v3/SECRETPROJECTID".to_string();

        let err = scrub_endpoint(
            BlockchainError::NetworkUnavailable(
                "error sending request for url (https://sepolia.infura.io/v3/SECRETPROJECTID)"
                    .to_string(),
            ),
            &config,
        );
        assert_eq!(
            err.to_string(),
            "network unavailable: error sending request for url (https://sepolia.infura.io)"
        );

        let untouched = scrub_endpoint(BlockchainError::ChainMismatch { expected: 1, actual: 3 }, &config);
        assert!(matches!(untouched, BlockchainError::ChainMismatch { .. }));
    }

    #[test]
    fn test_error_labels() {
        assert_eq!(
            error_label(&BlockchainError::NetworkUnavailable("down".into())),
            "network_unavailable"
        );
        assert_eq!(
            error_label(&BlockchainError::SubmissionRejected("nonce too low".into())),
            "rejected"
        );
        assert_eq!(error_label(&BlockchainError::Rpc("bad".into())), "rpc_error");
    }

    #[test]
    fn test_verify_chain_id() {
        let client = BlockchainClient::new(test_config()).unwrap();
        assert!(client.verify_chain_id(31337).is_ok());
        assert!(matches!(
            client.verify_chain_id(1),
            Err(BlockchainError::ChainMismatch {
                expected: 31337,
                actual: 1
            })
        ));

        let mut config = test_config();
        config.expected_chain_id = None;
        let client = BlockchainClient::new(config).unwrap();
        assert!(client.verify_chain_id(1).is_ok());
    }

    fn error_resp(message: &'static str) -> TransportError {
        RpcError::ErrorResp(ErrorPayload {
            code: -32000,
            message: message.into(),
            data: None,
        })
    }

    #[test]
    fn test_classify_error_response() {
        match classify(error_resp("nonce too low"), CallKind::Submit) {
            BlockchainError::SubmissionRejected(reason) => assert_eq!(reason, "nonce too low"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            classify(error_resp("header not found"), CallKind::Query),
            BlockchainError::Rpc(_)
        ));
    }

    #[test]
    fn test_classify_transport_error() {
        let err = classify(TransportErrorKind::backend_gone(), CallKind::Submit);
        assert!(err.is_network());
    }

    #[test]
    fn test_classify_null_response() {
        let err = classify(RpcError::NullResp, CallKind::Query);
        assert!(matches!(err, BlockchainError::Rpc(_)));
    }
}
