//! Two-phase stake request through a gateway composer.
//!
//! The staker first approves the composer to spend `stake_amount` of the
//! value token, then asks the composer to `requestStake` with the gateway.
//! The second phase runs even if the approval reverted, unless
//! [`StakePolicy::halt_on_failed_approval`] is set; mined statuses are
//! returned to the caller as they are. A submission or transport error in
//! either phase aborts the sequence. Nothing already mined is undone.

use crate::deployer::COMPOSER_CONTRACT;
use crate::encoding::{encode_call, EncodingError};
use alloy_dyn_abi::DynSolValue;
use alloy_json_abi::JsonAbi;
use composer_artifacts::{ArtifactError, ArtifactService};
use composer_delivery::{DeliveryError, DeliveryService};
use composer_types::{
	Address, StakeRequest, StakeRequestResult, Transaction, TransactionOptions,
	TransactionReceipt,
};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::instrument;

/// Progress of a single stake request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StakePhase {
	Start,
	Approving,
	Approved,
	RequestingStake,
	Done,
	Aborted,
}

impl fmt::Display for StakePhase {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			StakePhase::Start => "start",
			StakePhase::Approving => "approving",
			StakePhase::Approved => "approved",
			StakePhase::RequestingStake => "requesting stake",
			StakePhase::Done => "done",
			StakePhase::Aborted => "aborted",
		};
		f.write_str(name)
	}
}

/// Errors that can occur during a stake request.
#[derive(Debug, Error)]
pub enum StakeError {
	#[error("Artifact error: {0}")]
	Artifact(#[from] ArtifactError),
	#[error("Encoding error: {0}")]
	Encoding(#[from] EncodingError),
	/// Submitting or confirming a transaction failed.
	#[error("Delivery failed while {phase}: {source}")]
	Delivery {
		phase: StakePhase,
		#[source]
		source: DeliveryError,
	},
	/// The approval reverted and the policy forbids continuing.
	#[error("Approval transaction {} reverted", .0.hash)]
	ApprovalReverted(TransactionReceipt),
}

impl StakeError {
	/// Last phase the request reached before it was aborted.
	///
	/// The request itself always ends in [`StakePhase::Aborted`]; this is the
	/// phase logged next to that state.
	pub fn phase(&self) -> StakePhase {
		match self {
			StakeError::Artifact(_) | StakeError::Encoding(_) => StakePhase::Start,
			StakeError::Delivery { phase, .. } => *phase,
			StakeError::ApprovalReverted(_) => StakePhase::Approved,
		}
	}
}

/// Behaviour switches for [`Staker::request_stake`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StakePolicy {
	/// Stop with [`StakeError::ApprovalReverted`] instead of requesting the
	/// stake after a reverted approval.
	pub halt_on_failed_approval: bool,
}

/// Requests stakes through one deployed composer.
pub struct Staker {
	delivery: Arc<DeliveryService>,
	artifacts: Arc<ArtifactService>,
	value_token: Address,
	branded_token: Address,
	gateway_composer: Address,
	policy: StakePolicy,
}

impl Staker {
	pub fn new(
		delivery: Arc<DeliveryService>,
		artifacts: Arc<ArtifactService>,
		value_token: Address,
		branded_token: Address,
		gateway_composer: Address,
	) -> Self {
		Self {
			delivery,
			artifacts,
			value_token,
			branded_token,
			gateway_composer,
			policy: StakePolicy::default(),
		}
	}

	pub fn with_policy(mut self, policy: StakePolicy) -> Self {
		self.policy = policy;
		self
	}

	/// Approves the composer for `stake_amount` and requests the stake.
	///
	/// `value_token_abi` is used to encode `approve`; the composer ABI comes
	/// from the artifact service. The approval is sent with `tx_options` as
	/// given, the stake request with the sender replaced by `request.owner`.
	#[instrument(skip_all, fields(
		composer = %self.gateway_composer,
		branded_token = %self.branded_token,
		owner = %request.owner,
	))]
	pub async fn request_stake(
		&self,
		value_token_abi: &JsonAbi,
		request: &StakeRequest,
		tx_options: TransactionOptions,
	) -> Result<StakeRequestResult, StakeError> {
		let approve_data = encode_call(
			value_token_abi,
			"value token",
			"approve",
			&[
				DynSolValue::Address(self.gateway_composer),
				DynSolValue::Uint(request.stake_amount, 256),
			],
		)?;

		let composer_abi = self.artifacts.get_abi(COMPOSER_CONTRACT).await?;
		let request_stake_data = encode_call(
			&composer_abi,
			COMPOSER_CONTRACT,
			"requestStake",
			&[
				DynSolValue::Uint(request.stake_amount, 256),
				DynSolValue::Uint(request.mint_amount, 256),
				DynSolValue::Address(request.gateway),
				DynSolValue::Uint(request.gas_price, 256),
				DynSolValue::Uint(request.gas_limit, 256),
				DynSolValue::Address(request.beneficiary),
				DynSolValue::Uint(request.staker_nonce, 256),
			],
		)?;

		let approve_tx = Transaction::call(self.value_token, approve_data).with_options(&tx_options);
		let approve = self.send(StakePhase::Approving, approve_tx).await?;
		tracing::info!(
			tx_hash = %approve.hash,
			status = approve.success,
			"Approve receipt"
		);

		if !approve.success && self.policy.halt_on_failed_approval {
			return Err(abort(StakeError::ApprovalReverted(approve)));
		}
		tracing::debug!(phase = %StakePhase::Approved);

		let stake_tx = Transaction::call(self.gateway_composer, request_stake_data)
			.with_options(&tx_options.with_from(request.owner));
		let request_stake = self.send(StakePhase::RequestingStake, stake_tx).await?;
		tracing::info!(
			tx_hash = %request_stake.hash,
			status = request_stake.success,
			"RequestStake receipt"
		);
		tracing::debug!(phase = %StakePhase::Done);

		Ok(StakeRequestResult {
			approve,
			request_stake,
		})
	}

	async fn send(
		&self,
		phase: StakePhase,
		tx: Transaction,
	) -> Result<TransactionReceipt, StakeError> {
		tracing::debug!(phase = %phase);
		self.delivery
			.send_and_confirm(tx)
			.await
			.map_err(|source| abort(StakeError::Delivery { phase, source }))
	}
}

fn abort(err: StakeError) -> StakeError {
	tracing::warn!(
		state = %StakePhase::Aborted,
		phase = %err.phase(),
		error = %err,
		"Stake request aborted"
	);
	err
}
