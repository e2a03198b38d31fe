//! One-shot send pipeline.
//!
//! # Data Flow
//! ```text
//! Wallet (key) ──► address
//! TransferRequest ──► validate            (no network yet)
//! ChainRpc ──► fetch_chain_context        (chain ID + pending nonce)
//!          ──► build_transfer             (TxEip1559)
//!          ──► sign_transfer              (EIP-2718 bytes, local hash)
//! ChainRpc ──► send_raw_transaction       (exactly one call)
//! ```
//!
//! Every stage returns a tagged error. Nothing is retried and nothing is
//! submitted unless every earlier stage succeeded.

use std::fmt;
use std::time::Instant;

use thiserror::Error;

use crate::blockchain::client::{fetch_chain_context, ChainRpc};
use crate::blockchain::signer::sign_transfer;
use crate::blockchain::transaction::{build_transfer, TransferRequest};
use crate::blockchain::types::{BlockchainError, SendReceipt};
use crate::blockchain::wallet::Wallet;
use crate::observability::metrics;

/// Pipeline stage, used to tag errors and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ResolveKey,
    ValidateRequest,
    FetchChainState,
    BuildTransaction,
    SignTransaction,
    SubmitTransaction,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::ResolveKey => "resolve key",
            Stage::ValidateRequest => "validate request",
            Stage::FetchChainState => "fetch chain state",
            Stage::BuildTransaction => "build transaction",
            Stage::SignTransaction => "sign transaction",
            Stage::SubmitTransaction => "submit transaction",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure tagged with the stage it happened in.
#[derive(Debug, Error)]
#[error("{stage} failed: {source}")]
pub struct PipelineError {
    pub stage: Stage,
    #[source]
    pub source: BlockchainError,
}

impl PipelineError {
    pub fn new(stage: Stage, source: BlockchainError) -> Self {
        Self { stage, source }
    }
}

/// Knobs for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SendOptions {
    /// Build and sign but do not call `eth_sendRawTransaction`.
    pub dry_run: bool,
}

fn timed<T>(
    stage: Stage,
    f: impl FnOnce() -> Result<T, BlockchainError>,
) -> Result<T, PipelineError> {
    let started = Instant::now();
    let result = f();
    metrics::record_stage_duration(stage.as_str(), started.elapsed());
    result.map_err(|e| PipelineError::new(stage, e))
}

/// Resolve, validate, fetch, build, sign and submit one transfer.
///
/// The returned hash is computed locally from the signed bytes.
pub async fn send_transfer<C: ChainRpc + Sync>(
    rpc: &C,
    wallet: &Wallet,
    request: &TransferRequest,
    options: SendOptions,
) -> Result<SendReceipt, PipelineError> {
    let result = run(rpc, wallet, request, options).await;

    let outcome = match &result {
        Ok(receipt) if receipt.submitted => "accepted",
        Ok(_) => "dry_run",
        Err(e) if matches!(e.source, BlockchainError::SubmissionRejected(_)) => "rejected",
        Err(_) => "failed",
    };
    metrics::record_submission(outcome);

    result
}

async fn run<C: ChainRpc + Sync>(
    rpc: &C,
    wallet: &Wallet,
    request: &TransferRequest,
    options: SendOptions,
) -> Result<SendReceipt, PipelineError> {
    let from = timed(Stage::ResolveKey, || Ok(wallet.address()))?;
    let to = timed(Stage::ValidateRequest, || request.validate())?;

    let started = Instant::now();
    let context = fetch_chain_context(rpc, from)
        .await
        .map_err(|e| PipelineError::new(Stage::FetchChainState, e));
    metrics::record_stage_duration(Stage::FetchChainState.as_str(), started.elapsed());
    let context = context?;

    let tx = timed(Stage::BuildTransaction, || build_transfer(&context, request))?;
    let signed = timed(Stage::SignTransaction, || sign_transfer(wallet, tx))?;

    let tx_hash = signed.hash();
    let receipt = SendReceipt {
        tx_hash,
        from,
        to,
        chain_id: context.chain_id,
        nonce: context.nonce,
        raw_transaction: signed.encoded().clone(),
        submitted: !options.dry_run,
    };

    if options.dry_run {
        tracing::info!(
            tx_hash = %tx_hash,
            nonce = context.nonce,
            chain_id = context.chain_id,
            "Dry run, transaction signed but not submitted"
        );
        return Ok(receipt);
    }

    let started = Instant::now();
    let echoed = rpc
        .send_raw_transaction(signed.encoded())
        .await
        .map_err(|e| PipelineError::new(Stage::SubmitTransaction, e));
    metrics::record_stage_duration(Stage::SubmitTransaction.as_str(), started.elapsed());
    let echoed = echoed?;

    if echoed != tx_hash {
        tracing::warn!(
            local = %tx_hash,
            node = %echoed,
            "Node echoed a different transaction hash, keeping the local one"
        );
    }

    tracing::info!(
        tx_hash = %tx_hash,
        from = %from,
        to = %to,
        nonce = context.nonce,
        chain_id = context.chain_id,
        "Transaction accepted by node"
    );

    Ok(receipt)
}
