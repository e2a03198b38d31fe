//! tx-sender
//!
//! Signs and broadcasts one EIP-1559 value transfer, then prints its hash.
//!
//! # Flow
//!
//! ```text
//!   .env ─▶ process environment (variables already set win)
//!
//!   --config file ─┐
//!   CLI flags ─────┼─▶ SenderConfig ─▶ validate ─┐
//!   defaults ──────┘                             │
//!   SENDTX_PRIVATE_KEY ─▶ Wallet ────────────────┼─▶ send_transfer ─▶ stdout: hash
//!                                                │                  stderr: logs / error
//!   BlockchainClient (JSON-RPC) ─────────────────┘
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;

use tx_sender::blockchain::{BlockchainClient, SendReceipt, Wallet};
use tx_sender::config::{read_config, validate_config, ConfigError, SenderConfig};
use tx_sender::observability::logging::init_logging;
use tx_sender::pipeline::{send_transfer, PipelineError, SendOptions, Stage};

#[derive(Parser, Debug)]
#[command(name = "tx-sender")]
#[command(about = "Sign and broadcast a single EIP-1559 value transfer", long_about = None)]
#[command(version)]
struct Cli {
    /// TOML config file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON-RPC endpoint URL
    #[arg(long, env = "SENDTX_RPC_URL")]
    rpc_url: Option<String>,

    /// Recipient address (hex)
    #[arg(long, env = "SENDTX_TO")]
    to: Option<String>,

    /// Amount in wei
    #[arg(long)]
    value: Option<String>,

    /// Gas limit in units
    #[arg(long)]
    gas_limit: Option<u64>,

    /// Max priority fee per gas (wei)
    #[arg(long)]
    priority_fee: Option<u64>,

    /// Max fee per gas (wei)
    #[arg(long)]
    max_fee: Option<u64>,

    /// Call data (hex)
    #[arg(long)]
    data: Option<String>,

    /// Refuse to sign unless the node reports this chain ID
    #[arg(long)]
    chain_id: Option<u64>,

    /// Deadline for each RPC request in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Sign but do not submit; prints the raw transaction
    #[arg(long)]
    dry_run: bool,

    /// Print the receipt as JSON
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn apply_overrides(&self, config: &mut SenderConfig) {
        if let Some(url) = &self.rpc_url {
            config.network.rpc_url = url.clone();
        }
        if let Some(secs) = self.timeout_secs {
            config.network.rpc_timeout_secs = secs;
        }
        if self.chain_id.is_some() {
            config.network.expected_chain_id = self.chain_id;
        }
        if let Some(to) = &self.to {
            config.transfer.to = to.clone();
        }
        if let Some(value) = &self.value {
            config.transfer.value_wei = value.clone();
        }
        if let Some(gas_limit) = self.gas_limit {
            config.transfer.gas_limit = gas_limit;
        }
        if let Some(fee) = self.priority_fee {
            config.transfer.max_priority_fee_per_gas = fee;
        }
        if let Some(fee) = self.max_fee {
            config.transfer.max_fee_per_gas = fee;
        }
        if let Some(data) = &self.data {
            config.transfer.data = data.clone();
        }
        if let Some(level) = &self.log_level {
            config.observability.log_level = level.clone();
        }
    }
}

const ENV_FILE: &str = ".env";

/// Load `path` into the process environment without overriding variables
/// that are already set. Returns whether a file was loaded; a missing file is
/// not an error.
fn load_env_file(path: &Path) -> Result<bool, dotenvy::Error> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(true),
        Err(e) if e.not_found() => Ok(false),
        Err(e) => Err(e),
    }
}

/// Defaults, then the config file, then flags; validated last.
fn build_config(cli: &Cli) -> Result<SenderConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => read_config(path)?,
        None => SenderConfig::default(),
    };
    cli.apply_overrides(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

async fn run(config: &SenderConfig, options: SendOptions) -> Result<SendReceipt, PipelineError> {
    let wallet = Wallet::from_env().map_err(|e| PipelineError::new(Stage::ResolveKey, e))?;
    let request = config
        .transfer
        .to_request()
        .map_err(|e| PipelineError::new(Stage::ValidateRequest, e))?;
    let client = BlockchainClient::new(config.network.clone())
        .map_err(|e| PipelineError::new(Stage::FetchChainState, e))?;

    tracing::info!(
        endpoint = %config.network.endpoint(),
        from = %wallet.address(),
        dry_run = options.dry_run,
        "Sending transfer"
    );

    send_transfer(&client, &wallet, &request, options).await
}

fn print_receipt(receipt: &SendReceipt, json: bool) -> Result<(), serde_json::Error> {
    if json {
        println!("{}", serde_json::to_string_pretty(receipt)?);
        return Ok(());
    }
    if !receipt.submitted {
        println!("Raw transaction: {}", receipt.raw_transaction);
    }
    println!("Transaction hash: {}", receipt.tx_hash);
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Before parsing so clap's env fallbacks see the file too.
    if let Err(e) = load_env_file(Path::new(ENV_FILE)) {
        eprintln!("warning: failed to load {}: {}", ENV_FILE, e);
    }

    let cli = Cli::parse();

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config.observability);

    let options = SendOptions {
        dry_run: cli.dry_run,
    };

    match run(&config, options).await {
        Ok(receipt) => match print_receipt(&receipt, cli.json) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("error: writing output: {}", e);
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            tracing::error!(stage = %e.stage, error = %e.source, "Send failed");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
