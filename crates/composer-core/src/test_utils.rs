//! Shared fixtures: a scripted chain client and contract ABIs.

use alloy_json_abi::JsonAbi;
use alloy_primitives::{Address, Bytes};
use async_trait::async_trait;
use composer_artifacts::implementations::memory::MemoryArtifacts;
use composer_artifacts::ArtifactService;
use composer_delivery::{DeliveryError, DeliveryInterface, DeliveryService};
use composer_types::{Transaction, TransactionHash, TransactionReceipt};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

pub(crate) const COMPOSER_ABI: &str = r#"[
	{"type":"constructor","stateMutability":"nonpayable","inputs":[
		{"name":"_owner","type":"address"},
		{"name":"_valueToken","type":"address"},
		{"name":"_brandedToken","type":"address"}
	]},
	{"type":"function","name":"requestStake","stateMutability":"nonpayable","inputs":[
		{"name":"_stakeVT","type":"uint256"},
		{"name":"_mintBT","type":"uint256"},
		{"name":"_gateway","type":"address"},
		{"name":"_gasPrice","type":"uint256"},
		{"name":"_gasLimit","type":"uint256"},
		{"name":"_beneficiary","type":"address"},
		{"name":"_stakerNonce","type":"uint256"}
	],"outputs":[{"name":"stakeRequestHash_","type":"bytes32"}]}
]"#;

pub(crate) const EIP20_ABI: &str = r#"[
	{"type":"function","name":"approve","stateMutability":"nonpayable","inputs":[
		{"name":"_spender","type":"address"},
		{"name":"_value","type":"uint256"}
	],"outputs":[{"name":"success","type":"bool"}]}
]"#;

pub(crate) const COMPOSER_BIN: [u8; 4] = [0x60, 0x80, 0x60, 0x40];

pub(crate) fn composer_abi() -> JsonAbi {
	serde_json::from_str(COMPOSER_ABI).unwrap()
}

pub(crate) fn eip20_abi() -> JsonAbi {
	serde_json::from_str(EIP20_ABI).unwrap()
}

/// Left-pads an address to a 32-byte ABI word.
pub(crate) fn word(address: Address) -> [u8; 32] {
	let mut word = [0u8; 32];
	word[12..].copy_from_slice(address.as_slice());
	word
}

/// Artifact service holding the composer contract.
pub(crate) async fn artifact_service() -> Arc<ArtifactService> {
	let artifacts = MemoryArtifacts::new();
	artifacts
		.insert("GatewayComposer", composer_abi(), Bytes::from(COMPOSER_BIN.to_vec()))
		.await;
	artifacts.insert_abi("EIP20Token", eip20_abi()).await;
	Arc::new(ArtifactService::new(Box::new(artifacts)))
}

/// What the mock chain does with the next submitted transaction.
#[derive(Debug, Clone)]
pub(crate) enum Outcome {
	Mined {
		success: bool,
		contract_address: Option<Address>,
	},
	/// Accepted by the node but never mined.
	Dropped,
	Rejected(String),
}

impl Outcome {
	pub(crate) fn success() -> Self {
		Outcome::Mined {
			success: true,
			contract_address: None,
		}
	}

	pub(crate) fn reverted() -> Self {
		Outcome::Mined {
			success: false,
			contract_address: None,
		}
	}

	pub(crate) fn created(address: Address) -> Self {
		Outcome::Mined {
			success: true,
			contract_address: Some(address),
		}
	}
}

/// Chain client that answers submissions from a script and records them.
#[derive(Clone, Default)]
pub(crate) struct MockDelivery {
	outcomes: Arc<Mutex<VecDeque<Outcome>>>,
	submitted: Arc<Mutex<Vec<Transaction>>>,
	receipts: Arc<Mutex<HashMap<Vec<u8>, TransactionReceipt>>>,
}

impl MockDelivery {
	pub(crate) fn new(outcomes: impl IntoIterator<Item = Outcome>) -> Self {
		Self {
			outcomes: Arc::new(Mutex::new(outcomes.into_iter().collect())),
			..Default::default()
		}
	}

	/// Every transaction handed to `submit`, including rejected ones.
	pub(crate) fn submitted(&self) -> Vec<Transaction> {
		self.submitted.lock().unwrap().clone()
	}

	pub(crate) fn service(&self) -> Arc<DeliveryService> {
		Arc::new(DeliveryService::new(Box::new(self.clone()), 1))
	}
}

#[async_trait]
impl DeliveryInterface for MockDelivery {
	async fn submit(&self, tx: Transaction) -> Result<TransactionHash, DeliveryError> {
		let index = {
			let mut submitted = self.submitted.lock().unwrap();
			submitted.push(tx);
			submitted.len()
		};
		let outcome = self
			.outcomes
			.lock()
			.unwrap()
			.pop_front()
			.unwrap_or_else(Outcome::success);

		match outcome {
			Outcome::Rejected(reason) => Err(DeliveryError::Submission(reason)),
			Outcome::Dropped => Ok(TransactionHash(vec![index as u8; 32])),
			Outcome::Mined {
				success,
				contract_address,
			} => {
				let hash = TransactionHash(vec![index as u8; 32]);
				let receipt = TransactionReceipt {
					hash: hash.clone(),
					block_number: index as u64,
					success,
					contract_address,
				};
				self.receipts
					.lock()
					.unwrap()
					.insert(hash.0.clone(), receipt);
				Ok(hash)
			},
		}
	}

	async fn wait_for_confirmation(
		&self,
		hash: &TransactionHash,
		_confirmations: u64,
	) -> Result<TransactionReceipt, DeliveryError> {
		self.receipts
			.lock()
			.unwrap()
			.get(&hash.0)
			.cloned()
			.ok_or_else(|| DeliveryError::Timeout {
				hash: hash.to_string(),
				seconds: 600,
			})
	}

	async fn get_block_number(&self) -> Result<u64, DeliveryError> {
		Ok(self.submitted.lock().unwrap().len() as u64)
	}
}
