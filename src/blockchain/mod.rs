//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Private key (environment)
//!     → wallet.rs (identity, signing primitive)
//!     → client.rs (chain ID + pending nonce over JSON-RPC, with timeouts)
//!     → transaction.rs (validate, build unsigned EIP-1559 tx)
//!     → signer.rs (sign, EIP-2718 encode, local hash)
//!     → client.rs (broadcast)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables or caller memory
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts

pub mod client;
pub mod signer;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::{fetch_chain_context, BlockchainClient, ChainRpc};
pub use signer::{decode_signed, sign_transfer, SignedTransfer};
pub use transaction::{build_transfer, TransferRequest};
pub use types::{BlockchainError, BlockchainResult, ChainContext, ChainId, SendReceipt};
pub use wallet::Wallet;
