//! In-memory artifact backend.
//!
//! Artifacts are registered in process by the embedding program (or a test)
//! and handed to [`crate::ArtifactService::new`]. There is no configuration
//! entry for this backend: a store built from a config file would be empty.

use crate::{ArtifactError, ArtifactInterface};
use alloy_json_abi::JsonAbi;
use alloy_primitives::Bytes;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone)]
struct Artifact {
	abi: JsonAbi,
	bin: Option<Bytes>,
}

/// In-memory artifact store.
#[derive(Clone, Default)]
pub struct MemoryArtifacts {
	store: Arc<RwLock<HashMap<String, Artifact>>>,
}

impl MemoryArtifacts {
	/// Creates an empty store.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a deployable contract.
	pub async fn insert(&self, contract_name: impl Into<String>, abi: JsonAbi, bin: Bytes) {
		let mut store = self.store.write().await;
		store.insert(contract_name.into(), Artifact { abi, bin: Some(bin) });
	}

	/// Registers an interface-only contract (ABI without bytecode).
	pub async fn insert_abi(&self, contract_name: impl Into<String>, abi: JsonAbi) {
		let mut store = self.store.write().await;
		store.insert(contract_name.into(), Artifact { abi, bin: None });
	}
}

#[async_trait]
impl ArtifactInterface for MemoryArtifacts {
	async fn get_abi(&self, contract_name: &str) -> Result<JsonAbi, ArtifactError> {
		let store = self.store.read().await;
		store
			.get(contract_name)
			.map(|artifact| artifact.abi.clone())
			.ok_or_else(|| ArtifactError::NotFound(contract_name.to_string()))
	}

	async fn get_bin(&self, contract_name: &str) -> Result<Bytes, ArtifactError> {
		let store = self.store.read().await;
		let artifact = store
			.get(contract_name)
			.ok_or_else(|| ArtifactError::NotFound(contract_name.to_string()))?;

		artifact.bin.clone().ok_or_else(|| ArtifactError::Malformed {
			name: contract_name.to_string(),
			message: "no bytecode registered".to_string(),
		})
	}
}
