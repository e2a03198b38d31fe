//! Chain-specific types and error definitions.

use serde::Serialize;
use thiserror::Error;

use alloy::primitives::{Address, Bytes, B256};

// Re-export NetworkConfig from config module to avoid duplication
pub use crate::config::schema::NetworkConfig;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

/// Chain state the builder needs, fetched fresh for every submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainContext {
    /// Chain identifier reported by the node.
    pub chain_id: u64,
    /// Next pending nonce of the sending account.
    pub nonce: u64,
}

/// Errors that can occur during blockchain operations.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// Private key is missing, malformed, zero, or not below the curve order.
    #[error("invalid private key: {0}")]
    InvalidKey(String),

    /// Recipient, value, or fee combination is unacceptable.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// Endpoint unreachable or the request deadline expired.
    #[error("network unavailable: {0}")]
    NetworkUnavailable(String),

    /// Node reachable but returned a protocol-level fault.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// Signing or envelope encoding failed.
    #[error("signing error: {0}")]
    Signing(String),

    /// Node refused the signed transaction; reason is the node's message.
    #[error("transaction rejected by node: {0}")]
    SubmissionRejected(String),

    /// Chain configuration mismatch.
    #[error("chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },
}

impl BlockchainError {
    /// True for transport-level failures (unreachable endpoint, deadline).
    pub fn is_network(&self) -> bool {
        matches!(self, BlockchainError::NetworkUnavailable(_))
    }
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// Outcome of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendReceipt {
    /// Keccak-256 of the signed EIP-2718 encoding, computed locally.
    pub tx_hash: B256,
    pub from: Address,
    pub to: Address,
    pub chain_id: u64,
    pub nonce: u64,
    /// Signed wire bytes as handed to `eth_sendRawTransaction`.
    pub raw_transaction: Bytes,
    /// False for dry runs.
    pub submitted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_id_conversion() {
        let chain_id = ChainId::from(3u64);
        assert_eq!(chain_id.0, 3);
        assert_eq!(u64::from(chain_id), 3);
    }

    #[test]
    fn test_default_network_config() {
        let config = NetworkConfig::default();
        assert_eq!(config.rpc_timeout_secs, 10);
        assert!(config.expected_chain_id.is_none());
    }

    #[test]
    fn test_error_display() {
        let err = BlockchainError::SubmissionRejected("nonce too low".to_string());
        assert_eq!(err.to_string(), "transaction rejected by node: nonce too low");

        let err = BlockchainError::ChainMismatch {
            expected: 1,
            actual: 3,
        };
        assert!(err.to_string().contains("expected 1, got 3"));
    }

    #[test]
    fn test_is_network() {
        assert!(BlockchainError::NetworkUnavailable("refused".into()).is_network());
        assert!(!BlockchainError::Rpc("bad".into()).is_network());
    }

    #[test]
    fn test_receipt_serializes_hex() {
        let receipt = SendReceipt {
            tx_hash: B256::repeat_byte(0xab),
            from: Address::repeat_byte(0x01),
            to: Address::repeat_byte(0x02),
            chain_id: 3,
            nonce: 5,
            raw_transaction: Bytes::from_static(&[0x02, 0xc0]),
            submitted: true,
        };
        let json = serde_json::to_value(&receipt).unwrap();
        assert_eq!(json["chain_id"], 3);
        assert_eq!(json["raw_transaction"], "0x02c0");
        assert!(json["tx_hash"].as_str().unwrap().starts_with("0xabab"));
    }
}
