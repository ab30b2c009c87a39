//! Gateway composer deployment.
//!
//! The composer is deployed from its compiled artifact with the constructor
//! arguments `(owner, value_token, branded_token)`. The transaction hash is
//! logged as soon as the node accepts the transaction; the contract address
//! once it is mined.

use crate::encoding::{encode_constructor, EncodingError};
use alloy_dyn_abi::DynSolValue;
use composer_artifacts::{ArtifactError, ArtifactService};
use composer_delivery::{DeliveryError, DeliveryService};
use composer_types::{
	Address, DeploymentResult, SetupConfig, SetupError, Transaction, TransactionOptions,
};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::instrument;

/// Artifact name of the composer contract.
pub const COMPOSER_CONTRACT: &str = "GatewayComposer";

/// Gas limit used for the deployment unless the caller sets one.
pub const DEFAULT_DEPLOY_GAS_LIMIT: u64 = 7_500_000;

/// Errors that can occur while deploying the composer.
#[derive(Debug, Error)]
pub enum DeployerError {
	#[error(transparent)]
	Setup(#[from] SetupError),
	#[error("Artifact error: {0}")]
	Artifact(#[from] ArtifactError),
	#[error("Encoding error: {0}")]
	Encoding(#[from] EncodingError),
	#[error("Delivery error: {0}")]
	Delivery(#[from] DeliveryError),
	/// The creation transaction was mined but did not produce a contract.
	#[error("Deployment transaction {0} did not create a contract")]
	NoContractAddress(String),
}

/// Deploys `GatewayComposer` contracts.
pub struct ComposerDeployer {
	delivery: Arc<DeliveryService>,
	artifacts: Arc<ArtifactService>,
	/// Address of the last successful deployment.
	deployed: RwLock<Option<Address>>,
}

impl ComposerDeployer {
	pub fn new(delivery: Arc<DeliveryService>, artifacts: Arc<ArtifactService>) -> Self {
		Self {
			delivery,
			artifacts,
			deployed: RwLock::new(None),
		}
	}

	/// Checks that `config` names every address a deployment needs.
	///
	/// The first missing field, in the order `owner`, `value_token`,
	/// `branded_token`, `deployer`, is reported.
	pub fn validate_setup_config(config: &SetupConfig) -> Result<(), SetupError> {
		config.resolve().map(|_| ())
	}

	/// Returns the address of the last composer this deployer created.
	///
	/// The [`DeploymentResult`] returned by [`deploy`](Self::deploy) is the
	/// authoritative record; this is a convenience for long-lived callers.
	pub async fn deployed_address(&self) -> Option<Address> {
		*self.deployed.read().await
	}

	/// Validates `config` and deploys a composer from `config.deployer`.
	///
	/// Nothing is sent to the chain when validation fails.
	#[instrument(skip_all)]
	pub async fn setup(
		&self,
		config: &SetupConfig,
		tx_options: TransactionOptions,
	) -> Result<DeploymentResult, DeployerError> {
		let params = config.resolve()?;

		self.deploy(
			params.owner,
			params.value_token,
			params.branded_token,
			tx_options.with_from(params.deployer),
		)
		.await
	}

	/// Deploys a composer and waits for it to be mined.
	///
	/// `tx_options` are applied over a gas limit of
	/// [`DEFAULT_DEPLOY_GAS_LIMIT`]; fields set by the caller win.
	#[instrument(skip(self, tx_options))]
	pub async fn deploy(
		&self,
		owner: Address,
		value_token: Address,
		branded_token: Address,
		tx_options: TransactionOptions,
	) -> Result<DeploymentResult, DeployerError> {
		let abi = self.artifacts.get_abi(COMPOSER_CONTRACT).await?;
		let bytecode = self.artifacts.get_bin(COMPOSER_CONTRACT).await?;

		let args = encode_constructor(
			&abi,
			COMPOSER_CONTRACT,
			&[
				DynSolValue::Address(owner),
				DynSolValue::Address(value_token),
				DynSolValue::Address(branded_token),
			],
		)?;

		let mut code = bytecode.to_vec();
		code.extend_from_slice(&args);

		let options = tx_options.or(TransactionOptions {
			gas: Some(DEFAULT_DEPLOY_GAS_LIMIT),
			..Default::default()
		});
		let tx = Transaction::create(code).with_options(&options);

		let hash = match self.delivery.deliver(tx).await {
			Ok(hash) => hash,
			Err(e) => {
				tracing::error!(error = %e, "Failed to submit {} deployment", COMPOSER_CONTRACT);
				return Err(e.into());
			},
		};
		tracing::info!(tx_hash = %hash, "{} deployment submitted", COMPOSER_CONTRACT);

		let receipt = self.delivery.confirm(&hash).await.map_err(|e| {
			tracing::error!(tx_hash = %hash, error = %e, "{} deployment not confirmed", COMPOSER_CONTRACT);
			e
		})?;
		let address = match receipt.contract_address {
			Some(address) if receipt.success => address,
			_ => {
				tracing::error!(
					tx_hash = %hash,
					success = receipt.success,
					"{} deployment did not create a contract",
					COMPOSER_CONTRACT
				);
				return Err(DeployerError::NoContractAddress(hash.to_string()));
			},
		};

		tracing::info!(
			address = %address,
			block = receipt.block_number,
			"{} deployed",
			COMPOSER_CONTRACT
		);
		*self.deployed.write().await = Some(address);

		Ok(DeploymentResult { receipt, address })
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_utils::{artifact_service, word, MockDelivery, Outcome, COMPOSER_BIN};
	use alloy_primitives::address;

	const OWNER: Address = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");
	const VALUE_TOKEN: Address = address!("abcdef1234567890abcdef1234567890abcdef12");
	const BRANDED_TOKEN: Address = address!("1234567890123456789012345678901234567890");
	const DEPLOYER: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
	const COMPOSER: Address = address!("abc0000000000000000000000000000000000abc");

	fn complete_config() -> SetupConfig {
		SetupConfig {
			deployer: Some(DEPLOYER),
			owner: Some(OWNER),
			value_token: Some(VALUE_TOKEN),
			branded_token: Some(BRANDED_TOKEN),
		}
	}

	async fn deployer(mock: &MockDelivery) -> ComposerDeployer {
		ComposerDeployer::new(mock.service(), artifact_service().await)
	}

	#[tokio::test]
	async fn test_missing_fields_fail_before_any_chain_call() {
		let mock = MockDelivery::new([]);
		let deployer = deployer(&mock).await;

		let cases = [
			(SetupConfig { owner: None, ..complete_config() }, "owner"),
			(
				SetupConfig {
					owner: None,
					value_token: None,
					..complete_config()
				},
				"owner",
			),
			(SetupConfig { value_token: None, ..complete_config() }, "value_token"),
			(
				SetupConfig {
					branded_token: None,
					..complete_config()
				},
				"branded_token",
			),
		];

		for (config, field) in cases {
			let err = ComposerDeployer::validate_setup_config(&config).unwrap_err();
			assert_eq!(err, SetupError::MissingField(field));
			assert_eq!(
				err.to_string(),
				format!("Mandatory configuration \"{0}\" missing. Set config.{0} address", field)
			);

			let result = deployer.setup(&config, TransactionOptions::default()).await;
			assert!(matches!(result, Err(DeployerError::Setup(SetupError::MissingField(f))) if f == field));
		}

		assert!(mock.submitted().is_empty());
		assert!(deployer.deployed_address().await.is_none());
	}

	#[tokio::test]
	async fn test_constructor_arguments_in_order() {
		assert!(ComposerDeployer::validate_setup_config(&complete_config()).is_ok());

		let mock = MockDelivery::new([Outcome::created(COMPOSER)]);
		let deployer = deployer(&mock).await;
		deployer
			.deploy(OWNER, VALUE_TOKEN, BRANDED_TOKEN, TransactionOptions::default())
			.await
			.unwrap();

		let submitted = mock.submitted();
		assert_eq!(submitted.len(), 1);
		let tx = &submitted[0];
		assert!(tx.is_create());

		let mut expected = COMPOSER_BIN.to_vec();
		expected.extend_from_slice(&word(OWNER));
		expected.extend_from_slice(&word(VALUE_TOKEN));
		expected.extend_from_slice(&word(BRANDED_TOKEN));
		assert_eq!(tx.data, expected);
	}

	#[tokio::test]
	async fn test_gas_limit_default_and_override() {
		let mock = MockDelivery::new([Outcome::created(COMPOSER), Outcome::created(COMPOSER)]);
		let deployer = deployer(&mock).await;

		deployer
			.deploy(OWNER, VALUE_TOKEN, BRANDED_TOKEN, TransactionOptions::default())
			.await
			.unwrap();
		deployer
			.deploy(
				OWNER,
				VALUE_TOKEN,
				BRANDED_TOKEN,
				TransactionOptions {
					gas: Some(8_000_000),
					gas_price: Some(7),
					..Default::default()
				},
			)
			.await
			.unwrap();

		let submitted = mock.submitted();
		assert_eq!(submitted[0].gas_limit, Some(DEFAULT_DEPLOY_GAS_LIMIT));
		assert_eq!(submitted[0].gas_price, None);
		assert_eq!(submitted[1].gas_limit, Some(8_000_000));
		assert_eq!(submitted[1].gas_price, Some(7));
	}

	#[tokio::test]
	async fn test_deploy_records_contract_address() {
		let mock = MockDelivery::new([Outcome::created(COMPOSER)]);
		let deployer = deployer(&mock).await;

		let result = deployer
			.deploy(OWNER, VALUE_TOKEN, BRANDED_TOKEN, TransactionOptions::default())
			.await
			.unwrap();

		assert_eq!(result.address, COMPOSER);
		assert!(result.receipt.success);
		assert_eq!(deployer.deployed_address().await, Some(COMPOSER));
	}

	#[tokio::test]
	async fn test_setup_matches_validate_then_deploy() {
		let options = TransactionOptions {
			gas_price: Some(1),
			..Default::default()
		};

		let setup_mock = MockDelivery::new([Outcome::created(COMPOSER)]);
		let via_setup = deployer(&setup_mock)
			.await
			.setup(&complete_config(), options)
			.await
			.unwrap();

		let deploy_mock = MockDelivery::new([Outcome::created(COMPOSER)]);
		ComposerDeployer::validate_setup_config(&complete_config()).unwrap();
		let via_deploy = deployer(&deploy_mock)
			.await
			.deploy(
				OWNER,
				VALUE_TOKEN,
				BRANDED_TOKEN,
				options.with_from(DEPLOYER),
			)
			.await
			.unwrap();

		assert_eq!(via_setup, via_deploy);
		assert_eq!(setup_mock.submitted(), deploy_mock.submitted());
		assert_eq!(setup_mock.submitted()[0].from, Some(DEPLOYER));
	}

	#[tokio::test]
	async fn test_submission_error_propagates() {
		let mock = MockDelivery::new([Outcome::Rejected("insufficient funds".into())]);
		let deployer = deployer(&mock).await;

		let result = deployer
			.deploy(OWNER, VALUE_TOKEN, BRANDED_TOKEN, TransactionOptions::default())
			.await;

		assert!(matches!(
			result,
			Err(DeployerError::Delivery(DeliveryError::Submission(msg))) if msg == "insufficient funds"
		));
		assert_eq!(mock.submitted().len(), 1);
		assert!(deployer.deployed_address().await.is_none());
	}

	#[tokio::test]
	async fn test_confirmation_error_propagates() {
		let mock = MockDelivery::new([Outcome::Dropped]);
		let deployer = deployer(&mock).await;

		let result = deployer
			.deploy(OWNER, VALUE_TOKEN, BRANDED_TOKEN, TransactionOptions::default())
			.await;

		assert!(matches!(
			result,
			Err(DeployerError::Delivery(DeliveryError::Timeout { .. }))
		));
		assert_eq!(mock.submitted().len(), 1);
		assert!(deployer.deployed_address().await.is_none());
	}

	#[tokio::test]
	async fn test_failed_or_addressless_receipt() {
		let mock = MockDelivery::new([
			Outcome::Mined {
				success: false,
				contract_address: Some(COMPOSER),
			},
			Outcome::success(),
		]);
		let deployer = deployer(&mock).await;

		for _ in 0..2 {
			let result = deployer
				.deploy(OWNER, VALUE_TOKEN, BRANDED_TOKEN, TransactionOptions::default())
				.await;
			assert!(matches!(result, Err(DeployerError::NoContractAddress(_))));
		}
		assert!(deployer.deployed_address().await.is_none());
	}

	#[tokio::test]
	async fn test_missing_artifact() {
		let mock = MockDelivery::new([]);
		let artifacts = Arc::new(ArtifactService::new(Box::new(
			composer_artifacts::implementations::memory::MemoryArtifacts::new(),
		)));
		let deployer = ComposerDeployer::new(mock.service(), artifacts);

		let result = deployer
			.deploy(OWNER, VALUE_TOKEN, BRANDED_TOKEN, TransactionOptions::default())
			.await;

		assert!(matches!(
			result,
			Err(DeployerError::Artifact(ArtifactError::NotFound(name))) if name == COMPOSER_CONTRACT
		));
		assert!(mock.submitted().is_empty());
	}
}
