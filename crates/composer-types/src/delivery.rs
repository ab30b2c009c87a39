//! Transaction delivery types.
//!
//! Hashes and receipts returned by the chain client once a transaction has
//! been submitted or mined.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::utils::format_hash;

/// Blockchain transaction hash representation.
///
/// Stored as raw bytes, formatted as `0x`-prefixed hex for display.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionHash(pub Vec<u8>);

impl std::fmt::Display for TransactionHash {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&format_hash(&self.0))
	}
}

/// Receipt of a mined transaction.
///
/// A receipt with `success == false` describes a transaction that was mined
/// but reverted. That is an on-chain outcome, not a delivery error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
	/// The hash of the transaction.
	pub hash: TransactionHash,
	/// The block number where the transaction was included.
	pub block_number: u64,
	/// Whether the transaction executed successfully.
	pub success: bool,
	/// Address of the contract created by this transaction, if any.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub contract_address: Option<Address>,
}
