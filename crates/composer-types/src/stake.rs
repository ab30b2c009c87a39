//! Stake request inputs and results.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::TransactionReceipt;

/// Parameters of `GatewayComposer.requestStake`.
///
/// Amounts are in wei of the respective token. In TOML they are written as
/// decimal or `0x`-prefixed hex strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeRequest {
	/// Owner of the composer; the stake request is sent from this account.
	pub owner: Address,
	/// Value token amount that is staked.
	pub stake_amount: U256,
	/// Branded token amount that will be minted.
	pub mint_amount: U256,
	/// Gateway contract that consumes the stake request.
	pub gateway: Address,
	/// Gas price the staker pays for the stake and mint process.
	pub gas_price: U256,
	/// Gas limit the staker pays for.
	pub gas_limit: U256,
	/// Address on the auxiliary chain where utility tokens are minted.
	pub beneficiary: Address,
	/// Nonce of the staker as stored in the gateway.
	pub staker_nonce: U256,
}

/// Receipts of both phases of a stake request.
///
/// Statuses are reported as mined; a failed approval does not by itself
/// prevent the stake request phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeRequestResult {
	/// Receipt of the value token `approve` transaction.
	pub approve: TransactionReceipt,
	/// Receipt of the composer `requestStake` transaction.
	pub request_stake: TransactionReceipt,
}
