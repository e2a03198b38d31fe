//! Transaction building.
//!
//! # Responsibilities
//! - Parse caller-supplied recipient and amount text
//! - Validate the fee/gas combination before any network call
//! - Assemble the canonical unsigned EIP-1559 transaction
//!
//! Everything here is pure: no RPC, no signing.

use std::str::FromStr;

use alloy::consensus::TxEip1559;
use alloy::eips::eip2930::AccessList;
use alloy::hex;
use alloy::primitives::{Address, Bytes, TxKind, U256};

use crate::blockchain::types::{BlockchainError, BlockchainResult, ChainContext};

const ADDRESS_LEN: usize = 20;

/// Intrinsic gas cost of a plain value transfer.
pub const TRANSFER_GAS: u64 = 21_000;

/// Caller parameters for one value transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    /// Raw recipient bytes; must be exactly 20 bytes long.
    pub to: Bytes,
    /// Amount in wei.
    pub value: U256,
    /// Gas limit in units.
    pub gas_limit: u64,
    /// `maxPriorityFeePerGas` in wei.
    pub max_priority_fee_per_gas: u128,
    /// `maxFeePerGas` in wei.
    pub max_fee_per_gas: u128,
    /// Call data (empty for simple transfers).
    pub data: Bytes,
}

impl TransferRequest {
    /// Plain transfer with an empty payload.
    pub fn new(
        to: Address,
        value: U256,
        gas_limit: u64,
        max_priority_fee_per_gas: u128,
        max_fee_per_gas: u128,
    ) -> Self {
        Self {
            to: Bytes::copy_from_slice(to.as_slice()),
            value,
            gas_limit,
            max_priority_fee_per_gas,
            max_fee_per_gas,
            data: Bytes::new(),
        }
    }

    /// Check the request and return the recipient address.
    pub fn validate(&self) -> BlockchainResult<Address> {
        if self.to.len() != ADDRESS_LEN {
            return Err(BlockchainError::InvalidParameters(format!(
                "recipient must be 20 bytes, got {}",
                self.to.len()
            )));
        }

        if self.max_fee_per_gas < self.max_priority_fee_per_gas {
            return Err(BlockchainError::InvalidParameters(format!(
                "max fee per gas {} is below max priority fee per gas {}",
                self.max_fee_per_gas, self.max_priority_fee_per_gas
            )));
        }

        if self.gas_limit < TRANSFER_GAS {
            return Err(BlockchainError::InvalidParameters(format!(
                "gas limit {} is below the {} intrinsic transfer cost",
                self.gas_limit, TRANSFER_GAS
            )));
        }

        Ok(Address::from_slice(&self.to))
    }
}

/// Build the unsigned transaction for `request` against `context`.
pub fn build_transfer(
    context: &ChainContext,
    request: &TransferRequest,
) -> BlockchainResult<TxEip1559> {
    let to = request.validate()?;

    Ok(TxEip1559 {
        chain_id: context.chain_id,
        nonce: context.nonce,
        gas_limit: request.gas_limit,
        max_fee_per_gas: request.max_fee_per_gas,
        max_priority_fee_per_gas: request.max_priority_fee_per_gas,
        to: TxKind::Call(to),
        value: request.value,
        access_list: AccessList::default(),
        input: request.data.clone(),
    })
}

/// Decode a hex recipient (with or without 0x) into raw bytes.
///
/// Only the hex syntax is checked here; the length is enforced by
/// [`TransferRequest::validate`].
pub fn parse_recipient(input: &str) -> BlockchainResult<Bytes> {
    let trimmed = input.trim();
    let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    hex::decode(digits)
        .map(Bytes::from)
        .map_err(|e| BlockchainError::InvalidParameters(format!("recipient '{}': {}", input, e)))
}

/// Decode optional hex call data; an empty string yields empty bytes.
pub fn parse_data(input: &str) -> BlockchainResult<Bytes> {
    let trimmed = input.trim();
    let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    hex::decode(digits)
        .map(Bytes::from)
        .map_err(|e| BlockchainError::InvalidParameters(format!("call data: {}", e)))
}

/// Parse a non-negative integer amount in wei (decimal, or hex with 0x).
pub fn parse_amount(input: &str) -> BlockchainResult<U256> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(BlockchainError::InvalidParameters("amount is empty".to_string()));
    }
    if trimmed.starts_with('-') {
        return Err(BlockchainError::InvalidParameters(format!(
            "amount '{}' is negative",
            input
        )));
    }
    U256::from_str(trimmed)
        .map_err(|e| BlockchainError::InvalidParameters(format!("amount '{}': {}", input, e)))
}
