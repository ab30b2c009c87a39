//! Common types for the gateway composer toolkit.
//!
//! This crate defines the data types shared by the deployer, the staker and
//! the service binary: addresses, transactions and their options, receipts,
//! setup and stake inputs, and the configuration validation framework.

/// Chain connection settings.
pub mod chain;
/// Transaction delivery types (hashes and receipts).
pub mod delivery;
/// Implementation registry trait used by pluggable backends.
pub mod registry;
/// Secure string type for private keys.
pub mod secret_string;
/// Composer setup configuration.
pub mod setup;
/// Stake request inputs and results.
pub mod stake;
/// Transactions and caller-supplied transaction options.
pub mod transaction;
/// Utility functions for hex formatting.
pub mod utils;
/// Configuration validation types for implementation-specific TOML.
pub mod validation;

pub use alloy_primitives::{Address, Bytes, U256};
pub use chain::ChainConfig;
pub use delivery::*;
pub use registry::ImplementationRegistry;
pub use secret_string::SecretString;
pub use setup::*;
pub use stake::*;
pub use transaction::*;
pub use utils::{format_hash, truncate_id, with_0x_prefix, without_0x_prefix};
pub use validation::*;
