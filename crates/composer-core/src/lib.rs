//! Gateway composer deployment and staking.
//!
//! [`ComposerDeployer`] deploys a `GatewayComposer` contract for an owner and
//! a value/branded token pair. [`Staker`] drives the two-phase stake request
//! against a deployed composer: an EIP20 `approve` of the composer followed by
//! `requestStake`.
//!
//! Both talk to the chain through a shared
//! [`DeliveryService`](composer_delivery::DeliveryService) and look up
//! contract ABIs and bytecode through an
//! [`ArtifactService`](composer_artifacts::ArtifactService).

pub mod deployer;
mod encoding;
pub mod staker;

#[cfg(test)]
pub(crate) mod test_utils;

pub use deployer::{ComposerDeployer, DeployerError, COMPOSER_CONTRACT, DEFAULT_DEPLOY_GAS_LIMIT};
pub use encoding::EncodingError;
pub use staker::{StakeError, StakePhase, StakePolicy, Staker};
