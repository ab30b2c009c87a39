//! Contract artifact lookup for the gateway composer toolkit.
//!
//! Artifacts are the compiled ABI and bytecode of a contract, addressed by the
//! contract's canonical name (e.g. `GatewayComposer`). The deployer needs both
//! to build a contract-creation transaction; the staker needs the composer ABI
//! to encode `requestStake`.

use alloy_json_abi::JsonAbi;
use alloy_primitives::Bytes;
use async_trait::async_trait;
use composer_types::ImplementationRegistry;
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod file;
	pub mod memory;
}

/// Errors that can occur during artifact lookup.
#[derive(Debug, Error)]
pub enum ArtifactError {
	/// No artifact is known under the requested name.
	#[error("Artifact not found: {0}")]
	NotFound(String),
	/// The artifact exists but could not be decoded.
	#[error("Malformed artifact {name}: {message}")]
	Malformed { name: String, message: String },
	/// Error reading from the artifact backend.
	#[error("Backend error: {0}")]
	Backend(String),
	/// The artifact backend configuration is invalid.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Interface implemented by every artifact backend.
#[async_trait]
pub trait ArtifactInterface: Send + Sync {
	/// Returns the ABI of the named contract.
	async fn get_abi(&self, contract_name: &str) -> Result<JsonAbi, ArtifactError>;

	/// Returns the creation bytecode of the named contract.
	async fn get_bin(&self, contract_name: &str) -> Result<Bytes, ArtifactError>;
}

/// Factory signature every artifact implementation provides.
pub type ArtifactFactory = fn(&toml::Value) -> Result<Box<dyn ArtifactInterface>, ArtifactError>;

/// Registry trait for artifact implementations.
pub trait ArtifactRegistry: ImplementationRegistry<Factory = ArtifactFactory> {}

/// Returns `(name, factory)` for every artifact implementation selectable
/// from configuration.
///
/// [`implementations::memory::MemoryArtifacts`] is not listed; it is filled in
/// process and passed to [`ArtifactService::new`].
pub fn get_all_implementations() -> Vec<(&'static str, ArtifactFactory)> {
	use implementations::file;

	vec![(file::Registry::NAME, file::Registry::factory())]
}

/// Service wrapping the configured artifact backend.
pub struct ArtifactService {
	backend: Box<dyn ArtifactInterface>,
}

impl ArtifactService {
	/// Creates a new ArtifactService with the specified backend.
	pub fn new(backend: Box<dyn ArtifactInterface>) -> Self {
		Self { backend }
	}

	/// Builds the service from the implementation named `primary`.
	pub fn from_config(primary: &str, config: &toml::Value) -> Result<Self, ArtifactError> {
		let factory = get_all_implementations()
			.into_iter()
			.find(|(name, _)| *name == primary)
			.map(|(_, factory)| factory)
			.ok_or_else(|| {
				ArtifactError::Configuration(format!("Unknown artifact implementation '{}'", primary))
			})?;

		Ok(Self::new(factory(config)?))
	}

	/// Returns the ABI of the named contract.
	pub async fn get_abi(&self, contract_name: &str) -> Result<JsonAbi, ArtifactError> {
		self.backend.get_abi(contract_name).await
	}

	/// Returns the creation bytecode of the named contract.
	pub async fn get_bin(&self, contract_name: &str) -> Result<Bytes, ArtifactError> {
		self.backend.get_bin(contract_name).await
	}
}

/// Decodes a hex bytecode string, tolerating surrounding whitespace and a 0x prefix.
pub(crate) fn decode_bytecode(contract_name: &str, raw: &str) -> Result<Bytes, ArtifactError> {
	let trimmed = composer_types::without_0x_prefix(raw.trim());
	if trimmed.is_empty() {
		return Err(ArtifactError::Malformed {
			name: contract_name.to_string(),
			message: "bytecode is empty".to_string(),
		});
	}

	alloy_primitives::hex::decode(trimmed)
		.map(Bytes::from)
		.map_err(|e| ArtifactError::Malformed {
			name: contract_name.to_string(),
			message: format!("invalid bytecode hex: {}", e),
		})
}
