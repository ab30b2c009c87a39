//! Transaction delivery for the gateway composer toolkit.
//!
//! This crate is the chain client seam: it submits transactions, waits for
//! them to be mined and reports receipts. Signing, nonce assignment and gas
//! estimation are left to the underlying provider.

use async_trait::async_trait;
use composer_types::{
	ChainConfig, ImplementationRegistry, SecretString, Transaction, TransactionHash,
	TransactionReceipt,
};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod evm {
		pub mod alloy;
	}
}

/// Errors that can occur during transaction delivery operations.
#[derive(Debug, Error)]
pub enum DeliveryError {
	/// Error that occurs during network communication.
	#[error("Network error: {0}")]
	Network(String),
	/// The node or the signer rejected the transaction.
	#[error("Submission failed: {0}")]
	Submission(String),
	/// The transaction was not mined in time.
	#[error("Timeout waiting for {hash} after {seconds} seconds")]
	Timeout { hash: String, seconds: u64 },
	/// The delivery configuration is invalid.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Interface implemented by every chain client backend.
#[async_trait]
pub trait DeliveryInterface: Send + Sync {
	/// Signs and submits a transaction, returning its hash as soon as the node
	/// accepts it.
	async fn submit(&self, tx: Transaction) -> Result<TransactionHash, DeliveryError>;

	/// Waits until the transaction is mined with at least `confirmations`
	/// blocks (the inclusion block counts as one).
	///
	/// A reverted transaction is returned as a receipt with `success == false`.
	async fn wait_for_confirmation(
		&self,
		hash: &TransactionHash,
		confirmations: u64,
	) -> Result<TransactionReceipt, DeliveryError>;

	/// Returns the latest block number.
	async fn get_block_number(&self) -> Result<u64, DeliveryError>;
}

/// Factory signature every delivery implementation provides.
///
/// `signers` holds the private keys of every configured account; the first
/// one is the default sender.
pub type DeliveryFactory = fn(
	&toml::Value,
	&ChainConfig,
	&[SecretString],
) -> Result<Box<dyn DeliveryInterface>, DeliveryError>;

/// Registry trait for delivery implementations.
pub trait DeliveryRegistry: ImplementationRegistry<Factory = DeliveryFactory> {}

/// Returns `(name, factory)` for every available delivery implementation.
pub fn get_all_implementations() -> Vec<(&'static str, DeliveryFactory)> {
	use implementations::evm::alloy;

	vec![(alloy::Registry::NAME, alloy::Registry::factory())]
}

/// Service that wraps one delivery implementation.
pub struct DeliveryService {
	implementation: Box<dyn DeliveryInterface>,
	/// Number of confirmations awaited by [`DeliveryService::confirm`].
	min_confirmations: u64,
}

impl DeliveryService {
	/// Creates a new DeliveryService.
	pub fn new(implementation: Box<dyn DeliveryInterface>, min_confirmations: u64) -> Self {
		Self {
			implementation,
			min_confirmations: min_confirmations.max(1),
		}
	}

	/// Submits a transaction and returns its hash without waiting for mining.
	pub async fn deliver(&self, tx: Transaction) -> Result<TransactionHash, DeliveryError> {
		self.implementation.submit(tx).await
	}

	/// Waits for the configured number of confirmations.
	pub async fn confirm(&self, hash: &TransactionHash) -> Result<TransactionReceipt, DeliveryError> {
		self.implementation
			.wait_for_confirmation(hash, self.min_confirmations)
			.await
	}

	/// Submits a transaction, logs its hash, and waits until it is mined.
	pub async fn send_and_confirm(
		&self,
		tx: Transaction,
	) -> Result<TransactionReceipt, DeliveryError> {
		let hash = self.deliver(tx).await?;
		tracing::info!(tx_hash = %hash, "Transaction submitted");
		self.confirm(&hash).await
	}

	/// Returns the latest block number.
	pub async fn get_block_number(&self) -> Result<u64, DeliveryError> {
		self.implementation.get_block_number().await
	}
}
