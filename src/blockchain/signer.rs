//! Signing and wire encoding of EIP-1559 transfers.
//!
//! The signature covers `keccak256(0x02 || rlp(unsigned_fields))`, and the
//! chain id is one of those fields, so a signature only verifies on the chain
//! it was produced for.

use alloy::consensus::{SignableTransaction, Signed, TxEip1559, TxEnvelope};
use alloy::eips::eip2718::{Decodable2718, Encodable2718};
use alloy::primitives::{keccak256, Address, Bytes, B256};

use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::blockchain::wallet::Wallet;

/// A signed transfer together with its wire bytes and identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransfer {
    inner: Signed<TxEip1559>,
    encoded: Bytes,
    hash: B256,
}

impl SignedTransfer {
    fn from_signed(inner: Signed<TxEip1559>) -> Self {
        let encoded: Bytes = TxEnvelope::from(inner.clone()).encoded_2718().into();
        let hash = keccak256(&encoded);
        Self {
            inner,
            encoded,
            hash,
        }
    }

    /// The unsigned fields.
    pub fn tx(&self) -> &TxEip1559 {
        self.inner.tx()
    }

    /// Signature over [`TxEip1559::signature_hash`].
    pub fn signature(&self) -> &alloy::primitives::Signature {
        self.inner.signature()
    }

    /// EIP-2718 wire bytes: `0x02 || rlp(fields, y_parity, r, s)`.
    pub fn encoded(&self) -> &Bytes {
        &self.encoded
    }

    /// Transaction identifier, `keccak256(encoded)`.
    pub fn hash(&self) -> B256 {
        self.hash
    }

    /// Recover the sender from the signature.
    pub fn recover_signer(&self) -> BlockchainResult<Address> {
        self.recover_for_chain(self.tx().chain_id)
    }

    /// True when the signature recovers to `signer` once the transaction is
    /// interpreted as belonging to `chain_id`.
    pub fn verify_for_chain(&self, signer: Address, chain_id: u64) -> bool {
        matches!(self.recover_for_chain(chain_id), Ok(recovered) if recovered == signer)
    }

    fn recover_for_chain(&self, chain_id: u64) -> BlockchainResult<Address> {
        let mut tx = self.tx().clone();
        tx.chain_id = chain_id;
        self.signature()
            .recover_address_from_prehash(&tx.signature_hash())
            .map_err(|e| BlockchainError::Signing(format!("signer recovery failed: {}", e)))
    }
}

/// Sign `tx` with `wallet`, binding it to `tx.chain_id`.
pub fn sign_transfer(wallet: &Wallet, tx: TxEip1559) -> BlockchainResult<SignedTransfer> {
    let signature = wallet.sign_hash(&tx.signature_hash())?;
    let signed = tx.into_signed(signature);

    Ok(SignedTransfer::from_signed(signed))
}

/// Decode EIP-2718 wire bytes back into a signed EIP-1559 transfer.
pub fn decode_signed(raw: &[u8]) -> BlockchainResult<SignedTransfer> {
    let mut buf = raw;
    let envelope = TxEnvelope::decode_2718(&mut buf)
        .map_err(|e| BlockchainError::Signing(format!("malformed transaction encoding: {}", e)))?;

    if !buf.is_empty() {
        return Err(BlockchainError::Signing(format!(
            "{} trailing bytes after transaction",
            buf.len()
        )));
    }

    let signed = envelope.as_eip1559().cloned().ok_or_else(|| {
        BlockchainError::Signing(format!(
            "expected an EIP-1559 transaction, got {:?}",
            envelope.tx_type()
        ))
    })?;

    Ok(SignedTransfer::from_signed(signed))
}
