//! Account management for the gateway composer toolkit.
//!
//! Accounts supply the addresses and keys used to sign transactions. The
//! deployer and the staker are usually different accounts; each is
//! configured under its own name in `[accounts.<name>]`.

use async_trait::async_trait;
use composer_types::{Address, ImplementationRegistry, SecretString};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod local;
}

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AccountError {
	/// A cryptographic key is invalid or malformed.
	#[error("Invalid key: {0}")]
	InvalidKey(String),
	/// The account configuration is invalid.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Interface implemented by every account backend.
#[async_trait]
pub trait AccountInterface: Send + Sync {
	/// Retrieves the address associated with this account.
	async fn address(&self) -> Result<Address, AccountError>;

	/// Returns the private key with 0x prefix.
	///
	/// Delivery implementations use it to build their transaction signers.
	fn get_private_key(&self) -> SecretString;
}

/// Factory signature every account implementation provides.
pub type AccountFactory = fn(&toml::Value) -> Result<Box<dyn AccountInterface>, AccountError>;

/// Registry trait for account implementations.
pub trait AccountRegistry: ImplementationRegistry<Factory = AccountFactory> {}

/// Returns `(name, factory)` for every available account implementation.
pub fn get_all_implementations() -> Vec<(&'static str, AccountFactory)> {
	use implementations::local;

	vec![(local::Registry::NAME, local::Registry::factory())]
}

/// Looks up an account factory by implementation name.
pub fn factory_for(name: &str) -> Option<AccountFactory> {
	get_all_implementations()
		.into_iter()
		.find(|(registered, _)| *registered == name)
		.map(|(_, factory)| factory)
}

/// Service that wraps one account implementation.
pub struct AccountService {
	implementation: Box<dyn AccountInterface>,
}

impl AccountService {
	/// Creates a new AccountService with the specified implementation.
	pub fn new(implementation: Box<dyn AccountInterface>) -> Self {
		Self { implementation }
	}

	/// Retrieves the address of the managed account.
	pub async fn get_address(&self) -> Result<Address, AccountError> {
		self.implementation.address().await
	}

	/// Returns the private key of the managed account.
	pub fn get_private_key(&self) -> SecretString {
		self.implementation.get_private_key()
	}
}
