//! Key loading and identity resolution.
//!
//! # Security
//! - Private keys are loaded ONLY from environment variables or caller memory
//! - Keys are never logged or serialized
//! - `Debug` output carries the address only

use alloy::hex;
use alloy::primitives::{Address, Signature, B256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;

use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Environment variable name for the private key.
pub const PRIVATE_KEY_ENV_VAR: &str = "SENDTX_PRIVATE_KEY";

/// One in-memory secp256k1 key and the address derived from it.
#[derive(Clone)]
pub struct Wallet {
    /// The underlying signer (private key).
    signer: PrivateKeySigner,
}

impl Wallet {
    /// Create a wallet from a raw 32-byte scalar.
    ///
    /// Fails with `InvalidKey` when the scalar is zero or not below the
    /// secp256k1 group order.
    pub fn from_bytes(key: &B256) -> BlockchainResult<Self> {
        let signer = PrivateKeySigner::from_bytes(key).map_err(|_| {
            BlockchainError::InvalidKey("scalar is zero or not below the curve order".to_string())
        })?;

        tracing::debug!(address = %signer.address(), "Wallet initialized");

        Ok(Self { signer })
    }

    /// Create a wallet from a hex-encoded private key string.
    ///
    /// # Arguments
    /// * `private_key_hex` - Hex string (with or without 0x prefix)
    pub fn from_private_key(private_key_hex: &str) -> BlockchainResult<Self> {
        let trimmed = private_key_hex.trim();
        let key_hex = trimmed.strip_prefix("0x").unwrap_or(trimmed);

        // The decode error can echo input characters, so it is not forwarded.
        let bytes = hex::decode(key_hex)
            .map_err(|_| BlockchainError::InvalidKey("not a hex string".to_string()))?;
        if bytes.len() != 32 {
            return Err(BlockchainError::InvalidKey(format!(
                "expected 32 bytes, got {}",
                bytes.len()
            )));
        }

        Self::from_bytes(&B256::from_slice(&bytes))
    }

    /// Load wallet from environment variable.
    ///
    /// Reads `SENDTX_PRIVATE_KEY` from environment.
    pub fn from_env() -> BlockchainResult<Self> {
        let private_key = std::env::var(PRIVATE_KEY_ENV_VAR).map_err(|_| {
            BlockchainError::InvalidKey(format!(
                "environment variable {} not set",
                PRIVATE_KEY_ENV_VAR
            ))
        })?;

        Self::from_private_key(&private_key)
    }

    /// Get the wallet's address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Sign a 32-byte prehash (no message prefix).
    pub fn sign_hash(&self, hash: &B256) -> BlockchainResult<Signature> {
        self.signer
            .sign_hash_sync(hash)
            .map_err(|e| BlockchainError::Signing(format!("signing failed: {}", e)))
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}
