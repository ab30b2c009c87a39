//! Local private-key account.
//!
//! Holds a secp256k1 key in memory. Suited to development chains and to
//! operators who inject keys through environment variables.

use crate::{AccountError, AccountFactory, AccountInterface, AccountRegistry};
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use composer_types::{
	with_0x_prefix, without_0x_prefix, Address, ConfigSchema, Field, FieldType,
	ImplementationRegistry, Schema, SecretString, ValidationError,
};

/// Account backed by a private key held in process memory.
pub struct LocalAccount {
	signer: PrivateKeySigner,
	private_key: SecretString,
}

impl LocalAccount {
	/// Creates an account from a hex private key, with or without 0x prefix.
	pub fn new(private_key: &SecretString) -> Result<Self, AccountError> {
		let signer = private_key.with_exposed(|key| {
			without_0x_prefix(key)
				.parse::<PrivateKeySigner>()
				.map_err(|e| AccountError::InvalidKey(e.to_string()))
		})?;
		let private_key = private_key.with_exposed(|key| SecretString::new(with_0x_prefix(key)));

		Ok(Self {
			signer,
			private_key,
		})
	}
}

/// Configuration schema for [`LocalAccount`].
pub struct LocalAccountSchema;

impl ConfigSchema for LocalAccountSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![
				Field::new("private_key", FieldType::String).with_validator(|value| {
					let key = value.as_str().unwrap_or_default();
					let hex = without_0x_prefix(key);
					if hex.len() != 64 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
						return Err("private key must be 32 bytes of hex".to_string());
					}
					Ok(())
				}),
			],
			vec![Field::new("implementation", FieldType::String)],
		);
		schema.validate(config)
	}
}

#[async_trait]
impl AccountInterface for LocalAccount {
	async fn address(&self) -> Result<Address, AccountError> {
		Ok(self.signer.address())
	}

	fn get_private_key(&self) -> SecretString {
		self.private_key.clone()
	}
}

/// Factory function to create a local account from configuration.
///
/// Configuration parameters:
/// - `private_key` (required): hex-encoded secp256k1 key
pub fn create_account(config: &toml::Value) -> Result<Box<dyn AccountInterface>, AccountError> {
	LocalAccountSchema
		.validate(config)
		.map_err(|e| AccountError::Configuration(e.to_string()))?;

	let private_key = config
		.get("private_key")
		.and_then(|v| v.as_str())
		.map(SecretString::from)
		.ok_or_else(|| AccountError::Configuration("private_key is required".to_string()))?;

	Ok(Box::new(LocalAccount::new(&private_key)?))
}

/// Registry for the local account implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "local";
	type Factory = AccountFactory;

	fn factory() -> Self::Factory {
		create_account
	}
}

impl AccountRegistry for Registry {}
