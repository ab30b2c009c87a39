//! Transactions and caller-supplied transaction options.
//!
//! A [`Transaction`] is the chain-agnostic description of one call or contract
//! creation. [`TransactionOptions`] carries the optional overrides a caller may
//! pass (sender, gas limit, gas price, value); explicit values always take
//! precedence over defaults.

use alloy_primitives::{Address, TxKind, U256};
use alloy_rpc_types::{TransactionInput, TransactionRequest};
use serde::{Deserialize, Serialize};

/// A transaction to be signed and submitted by the chain client.
///
/// `to == None` denotes a contract creation whose `data` is the bytecode
/// followed by the encoded constructor arguments. The nonce is always
/// assigned by the chain client.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transaction {
	/// Sender. When unset, the chain client's default signer is used.
	pub from: Option<Address>,
	/// Target contract, or `None` for a contract creation.
	pub to: Option<Address>,
	/// Call data or creation code.
	pub data: Vec<u8>,
	/// Native value to transfer in wei.
	pub value: U256,
	/// Gas limit. Estimated by the chain client when unset.
	pub gas_limit: Option<u64>,
	/// Legacy gas price in wei. Filled by the chain client when unset.
	pub gas_price: Option<u128>,
}

impl Transaction {
	/// Creates a contract-creation transaction.
	pub fn create(code: Vec<u8>) -> Self {
		Self {
			data: code,
			..Default::default()
		}
	}

	/// Creates a call to `to` with the given call data.
	pub fn call(to: Address, data: Vec<u8>) -> Self {
		Self {
			to: Some(to),
			data,
			..Default::default()
		}
	}

	/// Applies caller options on top of this transaction.
	///
	/// Only fields set in `options` are written.
	pub fn with_options(mut self, options: &TransactionOptions) -> Self {
		if let Some(from) = options.from {
			self.from = Some(from);
		}
		if let Some(gas) = options.gas {
			self.gas_limit = Some(gas);
		}
		if let Some(gas_price) = options.gas_price {
			self.gas_price = Some(gas_price);
		}
		if let Some(value) = options.value {
			self.value = value;
		}
		self
	}

	/// Returns true if this transaction creates a contract.
	pub fn is_create(&self) -> bool {
		self.to.is_none()
	}
}

impl From<Transaction> for TransactionRequest {
	fn from(tx: Transaction) -> Self {
		let mut request = TransactionRequest::default();
		request.from = tx.from;
		request.to = Some(match tx.to {
			Some(address) => TxKind::Call(address),
			None => TxKind::Create,
		});
		request.input = TransactionInput::new(tx.data.into());
		request.value = Some(tx.value);
		request.gas = tx.gas_limit;
		request.gas_price = tx.gas_price;
		request
	}
}

/// Optional per-call transaction overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransactionOptions {
	/// Sender address.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub from: Option<Address>,
	/// Gas limit.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub gas: Option<u64>,
	/// Gas price in wei.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub gas_price: Option<u128>,
	/// Native value in wei.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub value: Option<U256>,
}

impl TransactionOptions {
	/// Resolves these options over `defaults`, field by field.
	///
	/// Any field set on `self` wins; unset fields fall back to `defaults`.
	pub fn or(self, defaults: TransactionOptions) -> TransactionOptions {
		TransactionOptions {
			from: self.from.or(defaults.from),
			gas: self.gas.or(defaults.gas),
			gas_price: self.gas_price.or(defaults.gas_price),
			value: self.value.or(defaults.value),
		}
	}

	/// Returns a copy with the sender replaced.
	pub fn with_from(mut self, from: Address) -> Self {
		self.from = Some(from);
		self
	}
}
