//! Configuration for the gateway composer toolkit.
//!
//! Configuration is read from TOML. `${VAR}` and `${VAR:-default}`
//! placeholders are replaced with environment variables before parsing, so
//! private keys never need to be written to disk.
//!
//! ## Modular Configuration Support
//!
//! A file may pull in others with `include = ["accounts.toml"]`. Each
//! top-level section must be defined in exactly one file.

mod loader;

use composer_types::{Address, ChainConfig, SetupConfig, StakeRequest};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

pub use loader::ConfigLoader;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// The full error embeds the whole input; keep only the message.
		ConfigError::Parse(err.message().to_string())
	}
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// The chain to talk to.
	pub chain: ChainConfig,
	/// Transaction delivery settings.
	#[serde(default)]
	pub delivery: DeliveryConfig,
	/// Named accounts, each an account implementation table.
	pub accounts: BTreeMap<String, toml::Value>,
	/// Contract artifact lookup.
	pub artifacts: ArtifactsConfig,
	/// Composer deployment inputs, used by `setup`.
	pub setup: Option<SetupConfig>,
	/// Stake request inputs, used by `request-stake`.
	pub stake: Option<StakeConfig>,
}

/// Configuration for transaction delivery.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeliveryConfig {
	/// Which implementation to use.
	#[serde(default = "default_delivery_primary")]
	pub primary: String,
	/// Number of confirmations to wait for. Defaults to 1 (mined).
	#[serde(default = "default_confirmations")]
	pub min_confirmations: u64,
	/// Map of delivery implementation names to their configurations.
	#[serde(default)]
	pub implementations: BTreeMap<String, toml::Value>,
}

impl Default for DeliveryConfig {
	fn default() -> Self {
		Self {
			primary: default_delivery_primary(),
			min_confirmations: default_confirmations(),
			implementations: BTreeMap::new(),
		}
	}
}

impl DeliveryConfig {
	/// Returns the configuration table of the primary implementation, or an
	/// empty table when none is given.
	pub fn primary_config(&self) -> toml::Value {
		self.implementations
			.get(&self.primary)
			.cloned()
			.unwrap_or_else(|| toml::Value::Table(Default::default()))
	}
}

fn default_delivery_primary() -> String {
	"evm_alloy".to_string()
}

fn default_confirmations() -> u64 {
	1
}

/// Configuration for artifact lookup.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArtifactsConfig {
	/// Which implementation to use.
	pub primary: String,
	/// Map of artifact implementation names to their configurations.
	pub implementations: BTreeMap<String, toml::Value>,
}

impl ArtifactsConfig {
	/// Returns the configuration table of the primary implementation.
	pub fn primary_config(&self) -> Option<&toml::Value> {
		self.implementations.get(&self.primary)
	}
}

/// Inputs of the two-phase stake request.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StakeConfig {
	/// EIP20 token that is staked.
	pub value_token: Address,
	/// Branded token that is minted.
	pub branded_token: Address,
	/// Deployed gateway composer.
	pub gateway_composer: Address,
	/// Artifact name of the value token, used to look up its ABI.
	#[serde(default = "default_value_token_contract")]
	pub value_token_contract: String,
	/// Stop after a reverted approval instead of requesting the stake anyway.
	#[serde(default)]
	pub halt_on_failed_approval: bool,
	/// Parameters of `requestStake`.
	pub request: StakeRequest,
}

fn default_value_token_contract() -> String {
	"EIP20Token".to_string()
}

/// Resolves environment variables in a string.
///
/// Replaces `${VAR_NAME}` with the value of `VAR_NAME`, or with `default` for
/// `${VAR_NAME:-default}` when the variable is unset.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = String::with_capacity(input.len());
	let mut last_end = 0;

	for cap in re.captures_iter(input) {
		let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};

		let value = match std::env::var(var_name.as_str()) {
			Ok(v) => v,
			Err(_) => match cap.get(2) {
				Some(default) => default.as_str().to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name.as_str()
					)));
				},
			},
		};

		result.push_str(&input[last_end..full_match.start()]);
		result.push_str(&value);
		last_end = full_match.end();
	}
	result.push_str(&input[last_end..]);

	Ok(result)
}

impl Config {
	/// Loads configuration from a file, following `include` directives.
	pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
		let file_name = path.file_name().ok_or_else(|| {
			ConfigError::Validation(format!("Invalid path: {}", path.display()))
		})?;

		let mut loader = ConfigLoader::new(base_dir);
		loader.load_config(file_name).await
	}

	/// Validates cross-field constraints that serde cannot express.
	fn validate(&self) -> Result<(), ConfigError> {
		if self.chain.rpc_url.trim().is_empty() {
			return Err(ConfigError::Validation("chain.rpc_url cannot be empty".into()));
		}

		if self.accounts.is_empty() {
			return Err(ConfigError::Validation(
				"At least one account must be configured".into(),
			));
		}

		if self.delivery.min_confirmations == 0 {
			return Err(ConfigError::Validation(
				"min_confirmations must be at least 1".into(),
			));
		}
		if self.delivery.min_confirmations > 100 {
			return Err(ConfigError::Validation(
				"min_confirmations cannot exceed 100".into(),
			));
		}
		if !self.delivery.implementations.is_empty()
			&& !self
				.delivery
				.implementations
				.contains_key(&self.delivery.primary)
		{
			return Err(ConfigError::Validation(format!(
				"Primary delivery '{}' not found in implementations",
				self.delivery.primary
			)));
		}

		if self.artifacts.primary.is_empty() {
			return Err(ConfigError::Validation(
				"Artifacts primary implementation cannot be empty".into(),
			));
		}
		if self.artifacts.primary_config().is_none() {
			return Err(ConfigError::Validation(format!(
				"Primary artifacts '{}' not found in implementations",
				self.artifacts.primary
			)));
		}

		Ok(())
	}
}

/// Parses a TOML string, resolving environment variables and validating the
/// result.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}
