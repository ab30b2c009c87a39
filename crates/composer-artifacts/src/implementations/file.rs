//! File-based artifact backend.
//!
//! Looks up artifacts in a single directory. Two layouts are understood:
//!
//! - `<Name>.abi` (JSON ABI array) next to `<Name>.bin` (hex bytecode), as
//!   produced by `solc --abi --bin`;
//! - `<Name>.json`, a compiler artifact with an `abi` array and a `bytecode`
//!   field that is either a hex string or an object with an `object` string.
//!
//! The split layout wins when both are present.

use crate::{decode_bytecode, ArtifactError, ArtifactFactory, ArtifactInterface, ArtifactRegistry};
use alloy_json_abi::JsonAbi;
use alloy_primitives::Bytes;
use async_trait::async_trait;
use composer_types::{ConfigSchema, Field, FieldType, ImplementationRegistry, Schema, ValidationError};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Artifact backend reading from a directory on disk.
pub struct FileArtifacts {
	base_path: PathBuf,
}

impl FileArtifacts {
	/// Creates a backend rooted at `base_path`.
	pub fn new(base_path: impl Into<PathBuf>) -> Self {
		Self {
			base_path: base_path.into(),
		}
	}

	fn file_path(&self, contract_name: &str, extension: &str) -> PathBuf {
		self.base_path.join(format!("{}.{}", contract_name, extension))
	}

	async fn read_optional(path: &Path) -> Result<Option<String>, ArtifactError> {
		match fs::read_to_string(path).await {
			Ok(content) => Ok(Some(content)),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
			Err(e) => Err(ArtifactError::Backend(format!(
				"Failed to read {}: {}",
				path.display(),
				e
			))),
		}
	}

	async fn read_combined(
		&self,
		contract_name: &str,
	) -> Result<Option<serde_json::Value>, ArtifactError> {
		let path = self.file_path(contract_name, "json");
		let Some(content) = Self::read_optional(&path).await? else {
			return Ok(None);
		};

		serde_json::from_str(&content)
			.map(Some)
			.map_err(|e| ArtifactError::Malformed {
				name: contract_name.to_string(),
				message: format!("{}: {}", path.display(), e),
			})
	}
}

/// Configuration schema for [`FileArtifacts`].
pub struct FileArtifactsSchema;

impl ConfigSchema for FileArtifactsSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![Field::new("path", FieldType::String).with_validator(|value| {
				match value.as_str() {
					Some(path) if !path.trim().is_empty() => Ok(()),
					_ => Err("path cannot be empty".to_string()),
				}
			})],
			vec![],
		);
		schema.validate(config)
	}
}

#[async_trait]
impl ArtifactInterface for FileArtifacts {
	async fn get_abi(&self, contract_name: &str) -> Result<JsonAbi, ArtifactError> {
		let abi_path = self.file_path(contract_name, "abi");
		if let Some(content) = Self::read_optional(&abi_path).await? {
			tracing::debug!(path = %abi_path.display(), "Loaded ABI");
			return serde_json::from_str(&content).map_err(|e| ArtifactError::Malformed {
				name: contract_name.to_string(),
				message: format!("{}: {}", abi_path.display(), e),
			});
		}

		let artifact = self
			.read_combined(contract_name)
			.await?
			.ok_or_else(|| ArtifactError::NotFound(contract_name.to_string()))?;
		let abi = artifact
			.get("abi")
			.cloned()
			.ok_or_else(|| ArtifactError::Malformed {
				name: contract_name.to_string(),
				message: "artifact has no 'abi' field".to_string(),
			})?;

		serde_json::from_value(abi).map_err(|e| ArtifactError::Malformed {
			name: contract_name.to_string(),
			message: e.to_string(),
		})
	}

	async fn get_bin(&self, contract_name: &str) -> Result<Bytes, ArtifactError> {
		let bin_path = self.file_path(contract_name, "bin");
		if let Some(content) = Self::read_optional(&bin_path).await? {
			tracing::debug!(path = %bin_path.display(), "Loaded bytecode");
			return decode_bytecode(contract_name, &content);
		}

		let artifact = self
			.read_combined(contract_name)
			.await?
			.ok_or_else(|| ArtifactError::NotFound(contract_name.to_string()))?;
		let bytecode = artifact
			.get("bytecode")
			.and_then(|b| b.as_str().or_else(|| b.get("object").and_then(|o| o.as_str())))
			.ok_or_else(|| ArtifactError::Malformed {
				name: contract_name.to_string(),
				message: "artifact has no 'bytecode' field".to_string(),
			})?;

		decode_bytecode(contract_name, bytecode)
	}
}

/// Factory function to create a file artifact backend from configuration.
///
/// Configuration parameters:
/// - `path` (required): directory holding the artifacts
pub fn create_artifacts(config: &toml::Value) -> Result<Box<dyn ArtifactInterface>, ArtifactError> {
	FileArtifactsSchema
		.validate(config)
		.map_err(|e| ArtifactError::Configuration(e.to_string()))?;

	let path = config
		.get("path")
		.and_then(|v| v.as_str())
		.ok_or_else(|| ArtifactError::Configuration("path is required".to_string()))?;

	Ok(Box::new(FileArtifacts::new(path)))
}

/// Registry for the file artifact implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "file";
	type Factory = ArtifactFactory;

	fn factory() -> Self::Factory {
		create_artifacts
	}
}

impl ArtifactRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs as std_fs;
	use tempfile::TempDir;

	const COMPOSER_ABI: &str = r#"[
		{"type":"constructor","inputs":[
			{"name":"_owner","type":"address"},
			{"name":"_valueToken","type":"address"},
			{"name":"_brandedToken","type":"address"}
		],"stateMutability":"nonpayable"}
	]"#;

	#[tokio::test]
	async fn test_split_layout() {
		let temp_dir = TempDir::new().unwrap();
		std_fs::write(temp_dir.path().join("GatewayComposer.abi"), COMPOSER_ABI).unwrap();
		std_fs::write(temp_dir.path().join("GatewayComposer.bin"), "0x60806040\n").unwrap();

		let artifacts = FileArtifacts::new(temp_dir.path());
		let abi = artifacts.get_abi("GatewayComposer").await.unwrap();
		assert_eq!(abi.constructor().unwrap().inputs.len(), 3);

		let bin = artifacts.get_bin("GatewayComposer").await.unwrap();
		assert_eq!(bin.to_vec(), vec![0x60, 0x80, 0x60, 0x40]);
	}

	#[tokio::test]
	async fn test_combined_artifact_with_bytecode_object() {
		let temp_dir = TempDir::new().unwrap();
		let artifact = format!(
			r#"{{"abi": {}, "bytecode": {{"object": "0x6080"}}}}"#,
			COMPOSER_ABI
		);
		std_fs::write(temp_dir.path().join("GatewayComposer.json"), artifact).unwrap();

		let config: toml::Value =
			toml::from_str(&format!("path = {:?}", temp_dir.path().display().to_string())).unwrap();
		let artifacts = create_artifacts(&config).unwrap();

		assert!(artifacts.get_abi("GatewayComposer").await.unwrap().constructor().is_some());
		assert_eq!(
			artifacts.get_bin("GatewayComposer").await.unwrap().to_vec(),
			vec![0x60, 0x80]
		);
	}

	#[tokio::test]
	async fn test_missing_artifact() {
		let temp_dir = TempDir::new().unwrap();
		let artifacts = FileArtifacts::new(temp_dir.path());

		let result = artifacts.get_abi("EIP20Token").await;
		assert!(matches!(result, Err(ArtifactError::NotFound(name)) if name == "EIP20Token"));

		let result = artifacts.get_bin("EIP20Token").await;
		assert!(matches!(result, Err(ArtifactError::NotFound(_))));
	}

	#[tokio::test]
	async fn test_malformed_abi() {
		let temp_dir = TempDir::new().unwrap();
		std_fs::write(temp_dir.path().join("Broken.abi"), "{not json").unwrap();

		let artifacts = FileArtifacts::new(temp_dir.path());
		let result = artifacts.get_abi("Broken").await;
		assert!(matches!(result, Err(ArtifactError::Malformed { .. })));
	}

	#[test]
	fn test_empty_path_rejected() {
		let config: toml::Value = toml::from_str(r#"path = "  ""#).unwrap();
		let result = create_artifacts(&config);
		assert!(matches!(result, Err(ArtifactError::Configuration(msg)) if msg.contains("path cannot be empty")));
	}
}
