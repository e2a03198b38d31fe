//! Build, sign and broadcast a single EIP-1559 value transfer.

pub mod blockchain;
pub mod config;
pub mod observability;
pub mod pipeline;

pub use blockchain::{BlockchainClient, BlockchainError, ChainRpc, TransferRequest, Wallet};
pub use config::schema::SenderConfig;
pub use pipeline::{send_transfer, PipelineError, SendOptions, Stage};
