//! Composer setup configuration.

use alloy_primitives::Address;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::TransactionReceipt;

/// Inputs for deploying a gateway composer.
///
/// Every field is optional at the type level so that an incomplete
/// configuration can be loaded and rejected with a precise message. An empty
/// string in the source configuration counts as missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupConfig {
	/// Account that signs the contract-creation transaction.
	#[serde(default, deserialize_with = "deserialize_optional_address")]
	pub deployer: Option<Address>,
	/// Owner of the composer, i.e. the staker on the value chain.
	#[serde(default, deserialize_with = "deserialize_optional_address")]
	pub owner: Option<Address>,
	/// EIP20 token that is staked.
	#[serde(default, deserialize_with = "deserialize_optional_address")]
	pub value_token: Option<Address>,
	/// Value-backed token that is minted.
	#[serde(default, deserialize_with = "deserialize_optional_address")]
	pub branded_token: Option<Address>,
}

/// A required setup field is missing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
	#[error("Mandatory configuration \"{0}\" missing. Set config.{0} address")]
	MissingField(&'static str),
}

/// A [`SetupConfig`] with every field present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetupParams {
	pub deployer: Address,
	pub owner: Address,
	pub value_token: Address,
	pub branded_token: Address,
}

impl SetupConfig {
	/// Checks that every field is present.
	///
	/// Fields are checked in the order `owner`, `value_token`,
	/// `branded_token`, `deployer`; the first missing one is reported.
	pub fn resolve(&self) -> Result<SetupParams, SetupError> {
		let owner = self.owner.ok_or(SetupError::MissingField("owner"))?;
		let value_token = self
			.value_token
			.ok_or(SetupError::MissingField("value_token"))?;
		let branded_token = self
			.branded_token
			.ok_or(SetupError::MissingField("branded_token"))?;
		let deployer = self.deployer.ok_or(SetupError::MissingField("deployer"))?;

		Ok(SetupParams {
			deployer,
			owner,
			value_token,
			branded_token,
		})
	}
}

/// Outcome of a mined composer deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentResult {
	/// Receipt of the contract-creation transaction.
	pub receipt: TransactionReceipt,
	/// Address of the deployed composer.
	pub address: Address,
}

/// Deserializes an address, treating an empty string as absent.
pub fn deserialize_optional_address<'de, D>(deserializer: D) -> Result<Option<Address>, D::Error>
where
	D: Deserializer<'de>,
{
	let raw: Option<String> = Option::deserialize(deserializer)?;
	match raw.as_deref().map(str::trim) {
		None | Some("") => Ok(None),
		Some(value) => value
			.parse::<Address>()
			.map(Some)
			.map_err(|e| serde::de::Error::custom(format!("Invalid address '{}': {}", value, e))),
	}
}
