//! Alloy-based EVM delivery.
//!
//! Submits transactions over HTTP JSON-RPC through an alloy provider with the
//! recommended fillers (nonce, gas, chain id) and a wallet holding every
//! configured signer. The transaction's `from` selects the signer; without it
//! the first signer is used.

use crate::{DeliveryError, DeliveryFactory, DeliveryInterface, DeliveryRegistry};
use alloy_network::EthereumWallet;
use alloy_primitives::B256;
use alloy_provider::{Provider, ProviderBuilder};
use alloy_rpc_types::TransactionRequest;
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use alloy_transport_http::Http;
use async_trait::async_trait;
use composer_types::{
	truncate_id, ChainConfig, ConfigSchema, Field, FieldType, ImplementationRegistry, Schema,
	SecretString, Transaction, TransactionHash, TransactionReceipt, ValidationError,
};
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_POLL_INTERVAL_SECONDS: u64 = 2;
const DEFAULT_TIMEOUT_SECONDS: u64 = 600;

type HttpProvider = Arc<dyn Provider<Http<reqwest::Client>> + Send + Sync>;

/// Alloy-based EVM delivery implementation for a single chain.
pub struct AlloyDelivery {
	provider: HttpProvider,
	chain_id: u64,
	poll_interval: Duration,
	timeout: Duration,
}

impl AlloyDelivery {
	/// Connects to `chain` with the given signers.
	///
	/// The first signer becomes the default sender.
	pub fn new(
		chain: &ChainConfig,
		signers: Vec<PrivateKeySigner>,
		poll_interval: Duration,
		timeout: Duration,
	) -> Result<Self, DeliveryError> {
		let mut signers = signers.into_iter();
		let default_signer = signers.next().ok_or_else(|| {
			DeliveryError::Configuration("At least one signer must be configured".to_string())
		})?;

		let url = chain.rpc_url.parse().map_err(|e| {
			DeliveryError::Configuration(format!("Invalid RPC URL '{}': {}", chain.rpc_url, e))
		})?;

		let mut wallet = EthereumWallet::from(default_signer.with_chain_id(Some(chain.chain_id)));
		for signer in signers {
			wallet.register_signer(signer.with_chain_id(Some(chain.chain_id)));
		}

		let provider = ProviderBuilder::new()
			.with_recommended_fillers()
			.wallet(wallet)
			.on_http(url);

		Ok(Self {
			provider: Arc::new(provider),
			chain_id: chain.chain_id,
			poll_interval,
			timeout,
		})
	}

	fn tx_hash(hash: &TransactionHash) -> Result<B256, DeliveryError> {
		B256::try_from(hash.0.as_slice()).map_err(|_| {
			DeliveryError::Network(format!("Invalid transaction hash length: {}", hash.0.len()))
		})
	}

	fn convert_receipt(receipt: &alloy_rpc_types::TransactionReceipt) -> TransactionReceipt {
		TransactionReceipt {
			hash: TransactionHash(receipt.transaction_hash.0.to_vec()),
			block_number: receipt.block_number.unwrap_or(0),
			success: receipt.status(),
			contract_address: receipt.contract_address,
		}
	}
}

/// Configuration schema for the alloy delivery implementation.
pub struct AlloyDeliverySchema;

impl ConfigSchema for AlloyDeliverySchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![],
			vec![
				Field::new(
					"poll_interval_seconds",
					FieldType::Integer {
						min: Some(1),
						max: Some(300),
					},
				),
				Field::new(
					"timeout_seconds",
					FieldType::Integer {
						min: Some(1),
						max: Some(86400),
					},
				),
			],
		);
		schema.validate(config)
	}
}

#[async_trait]
impl DeliveryInterface for AlloyDelivery {
	async fn submit(&self, tx: Transaction) -> Result<TransactionHash, DeliveryError> {
		let request: TransactionRequest = tx.into();

		let pending_tx = self
			.provider
			.send_transaction(request)
			.await
			.map_err(|e| DeliveryError::Submission(format!("Failed to send transaction: {}", e)))?;

		let tx_hash = *pending_tx.tx_hash();
		tracing::debug!(tx_hash = %tx_hash, chain_id = self.chain_id, "Accepted by node");

		Ok(TransactionHash(tx_hash.0.to_vec()))
	}

	async fn wait_for_confirmation(
		&self,
		hash: &TransactionHash,
		confirmations: u64,
	) -> Result<TransactionReceipt, DeliveryError> {
		let tx_hash = Self::tx_hash(hash)?;
		let start_time = tokio::time::Instant::now();

		tracing::debug!(
			tx_hash = %hash,
			confirmations,
			timeout_secs = self.timeout.as_secs(),
			"Waiting for transaction to be mined"
		);

		loop {
			if start_time.elapsed() >= self.timeout {
				return Err(DeliveryError::Timeout {
					hash: hash.to_string(),
					seconds: self.timeout.as_secs(),
				});
			}

			let receipt = match self.provider.get_transaction_receipt(tx_hash).await {
				Ok(Some(receipt)) => receipt,
				Ok(None) => {
					tokio::time::sleep(self.poll_interval).await;
					continue;
				},
				Err(e) => {
					return Err(DeliveryError::Network(format!(
						"Failed to get receipt: {}",
						e
					)));
				},
			};

			let current_block = self.provider.get_block_number().await.map_err(|e| {
				DeliveryError::Network(format!("Failed to get block number: {}", e))
			})?;

			let tx_block = receipt.block_number.unwrap_or(current_block);
			let current_confirmations = confirmations_at(tx_block, current_block);

			if current_confirmations >= confirmations {
				return Ok(Self::convert_receipt(&receipt));
			}

			tracing::debug!(
				tx_hash = %truncate_id(&hash.to_string()),
				"Waiting for {} more confirmations...",
				confirmations.saturating_sub(current_confirmations)
			);
			tokio::time::sleep(self.poll_interval).await;
		}
	}

	async fn get_block_number(&self) -> Result<u64, DeliveryError> {
		self.provider
			.get_block_number()
			.await
			.map_err(|e| DeliveryError::Network(format!("Failed to get block number: {}", e)))
	}
}

/// Confirmations of a transaction mined in `tx_block`; inclusion counts as one.
fn confirmations_at(tx_block: u64, current_block: u64) -> u64 {
	current_block.saturating_sub(tx_block) + 1
}

fn parse_signer(key: &SecretString) -> Result<PrivateKeySigner, DeliveryError> {
	key.with_exposed(|key| {
		composer_types::without_0x_prefix(key)
			.parse::<PrivateKeySigner>()
			.map_err(|_| DeliveryError::Configuration("Invalid private key format".to_string()))
	})
}

fn seconds(config: &toml::Value, key: &str, default: u64) -> Duration {
	let value = config
		.get(key)
		.and_then(|v| v.as_integer())
		.and_then(|v| u64::try_from(v).ok())
		.unwrap_or(default);
	Duration::from_secs(value)
}

/// Factory function to create an HTTP delivery provider from configuration.
///
/// Configuration parameters:
/// - `poll_interval_seconds` (optional, default 2): receipt polling interval
/// - `timeout_seconds` (optional, default 600): give up waiting after this long
pub fn create_http_delivery(
	config: &toml::Value,
	chain: &ChainConfig,
	signers: &[SecretString],
) -> Result<Box<dyn DeliveryInterface>, DeliveryError> {
	AlloyDeliverySchema
		.validate(config)
		.map_err(|e| DeliveryError::Configuration(format!("Invalid configuration: {}", e)))?;

	let signers = signers
		.iter()
		.map(parse_signer)
		.collect::<Result<Vec<_>, _>>()?;

	let delivery = AlloyDelivery::new(
		chain,
		signers,
		seconds(config, "poll_interval_seconds", DEFAULT_POLL_INTERVAL_SECONDS),
		seconds(config, "timeout_seconds", DEFAULT_TIMEOUT_SECONDS),
	)?;

	Ok(Box::new(delivery))
}

/// Registry for the HTTP/Alloy delivery implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "evm_alloy";
	type Factory = DeliveryFactory;

	fn factory() -> Self::Factory {
		create_http_delivery
	}
}

impl DeliveryRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;

	const ANVIL_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

	fn chain() -> ChainConfig {
		ChainConfig {
			chain_id: 1337,
			rpc_url: "http://localhost:8545".to_string(),
		}
	}

	#[test]
	fn test_schema_bounds() {
		let config: toml::Value = toml::from_str("poll_interval_seconds = 0").unwrap();
		assert!(AlloyDeliverySchema.validate(&config).is_err());

		let config: toml::Value = toml::from_str("timeout_seconds = 30").unwrap();
		assert!(AlloyDeliverySchema.validate(&config).is_ok());
	}

	#[test]
	fn test_seconds_defaults() {
		let config: toml::Value = toml::from_str("timeout_seconds = 30").unwrap();
		assert_eq!(seconds(&config, "timeout_seconds", 600), Duration::from_secs(30));
		assert_eq!(seconds(&config, "poll_interval_seconds", 2), Duration::from_secs(2));
	}

	#[tokio::test]
	async fn test_requires_a_signer() {
		let config = toml::Value::Table(Default::default());
		let result = create_http_delivery(&config, &chain(), &[]);
		assert!(matches!(result, Err(DeliveryError::Configuration(msg)) if msg.contains("signer")));
	}

	#[tokio::test]
	async fn test_rejects_invalid_key_and_url() {
		let config = toml::Value::Table(Default::default());
		let result = create_http_delivery(&config, &chain(), &[SecretString::from("0x12")]);
		assert!(matches!(result, Err(DeliveryError::Configuration(msg)) if msg.contains("private key")));

		let bad_chain = ChainConfig {
			chain_id: 1,
			rpc_url: "not a url".to_string(),
		};
		let result = create_http_delivery(&config, &bad_chain, &[SecretString::from(ANVIL_KEY)]);
		assert!(matches!(result, Err(DeliveryError::Configuration(msg)) if msg.contains("Invalid RPC URL")));
	}

	#[tokio::test]
	async fn test_builds_with_multiple_signers() {
		let config: toml::Value = toml::from_str("poll_interval_seconds = 1").unwrap();
		let second = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
		let result = create_http_delivery(
			&config,
			&chain(),
			&[SecretString::from(ANVIL_KEY), SecretString::from(second)],
		);
		assert!(result.is_ok());
	}

	fn unreachable_delivery(timeout: Duration) -> AlloyDelivery {
		let chain = ChainConfig {
			chain_id: 1337,
			rpc_url: "http://127.0.0.1:1".to_string(),
		};
		let signer = parse_signer(&SecretString::from(ANVIL_KEY)).unwrap();
		AlloyDelivery::new(&chain, vec![signer], Duration::from_millis(10), timeout).unwrap()
	}

	#[test]
	fn test_inclusion_counts_as_first_confirmation() {
		assert_eq!(confirmations_at(10, 10), 1);
		assert_eq!(confirmations_at(10, 12), 3);
		// Node head behind the receipt block
		assert_eq!(confirmations_at(10, 9), 1);
	}

	#[tokio::test]
	async fn test_wait_gives_up_after_timeout() {
		let delivery = unreachable_delivery(Duration::ZERO);
		let hash = TransactionHash(vec![0xab; 32]);

		let result = delivery.wait_for_confirmation(&hash, 1).await;
		assert!(matches!(result, Err(DeliveryError::Timeout { seconds: 0, .. })));
	}

	#[tokio::test]
	async fn test_wait_reports_unreachable_node() {
		let delivery = unreachable_delivery(Duration::from_secs(30));
		let hash = TransactionHash(vec![0xab; 32]);

		let result = delivery.wait_for_confirmation(&hash, 1).await;
		assert!(matches!(result, Err(DeliveryError::Network(msg)) if msg.contains("receipt")));
	}

	#[tokio::test]
	async fn test_wait_rejects_malformed_hash() {
		let delivery = unreachable_delivery(Duration::from_secs(30));
		let result = delivery
			.wait_for_confirmation(&TransactionHash(vec![0u8; 4]), 1)
			.await;
		assert!(matches!(result, Err(DeliveryError::Network(_))));
	}

	#[test]
	fn test_hash_length_is_checked() {
		let result = AlloyDelivery::tx_hash(&TransactionHash(vec![0u8; 4]));
		assert!(matches!(result, Err(DeliveryError::Network(_))));
		assert!(AlloyDelivery::tx_hash(&TransactionHash(vec![0u8; 32])).is_ok());
	}
}
