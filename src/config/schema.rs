//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the sender.
//! All types derive Serde traits for deserialization from config files.
//! The private key is deliberately absent: it is read from the environment.

use serde::{Deserialize, Serialize};

use crate::blockchain::transaction::{parse_amount, parse_data, parse_recipient, TransferRequest};
use crate::blockchain::types::BlockchainResult;

/// Root configuration for one send.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct SenderConfig {
    /// JSON-RPC endpoint settings.
    pub network: NetworkConfig,

    /// The transfer to build and submit.
    pub transfer: TransferConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Network endpoint configuration.
#[derive(Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct NetworkConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Deadline for each RPC request in seconds.
    pub rpc_timeout_secs: u64,

    /// When set, refuse to sign if the node reports a different chain ID.
    pub expected_chain_id: Option<u64>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            rpc_timeout_secs: 10,
            expected_chain_id: None,
        }
    }
}

impl NetworkConfig {
    /// The endpoint as `scheme://host[:port]`.
    ///
    /// Hosted providers carry an API key in the path or userinfo, so this is
    /// the only form of the URL that may be logged or printed.
    pub fn endpoint(&self) -> String {
        redact_url(&self.rpc_url)
    }
}

impl std::fmt::Debug for NetworkConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkConfig")
            .field("rpc_url", &self.endpoint())
            .field("rpc_timeout_secs", &self.rpc_timeout_secs)
            .field("expected_chain_id", &self.expected_chain_id)
            .finish()
    }
}

/// Reduce a URL to its scheme, host and port.
pub fn redact_url(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(url) => {
            let host = url.host_str().unwrap_or_default();
            match url.port() {
                Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
                None => format!("{}://{}", url.scheme(), host),
            }
        }
        Err(_) => "<invalid url>".to_string(),
    }
}

/// Transfer parameters. Amounts are in wei.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct TransferConfig {
    /// Recipient address, hex.
    pub to: String,

    /// Amount as a decimal (or 0x-hex) string so it is not limited to i64.
    pub value_wei: String,

    /// Gas limit in units.
    pub gas_limit: u64,

    /// `maxPriorityFeePerGas` in wei. TOML integers are i64, so u64 covers
    /// every value a file can hold.
    pub max_priority_fee_per_gas: u64,

    /// `maxFeePerGas` in wei.
    pub max_fee_per_gas: u64,

    /// Optional call data, hex.
    pub data: String,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            to: String::new(),
            value_wei: "0".to_string(),
            gas_limit: 21_000,
            max_priority_fee_per_gas: 2_000_000_000, // 2 gwei
            max_fee_per_gas: 20_000_000_000,         // 20 gwei
            data: String::new(),
        }
    }
}

impl TransferConfig {
    /// Parse the textual fields into a [`TransferRequest`].
    pub fn to_request(&self) -> BlockchainResult<TransferRequest> {
        Ok(TransferRequest {
            to: parse_recipient(&self.to)?,
            value: parse_amount(&self.value_wei)?,
            gas_limit: self.gas_limit,
            max_priority_fee_per_gas: u128::from(self.max_priority_fee_per_gas),
            max_fee_per_gas: u128::from(self.max_fee_per_gas),
            data: parse_data(&self.data)?,
        })
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log format (pretty, json).
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}
