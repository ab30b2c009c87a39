//! Chain connection settings.

use serde::{Deserialize, Serialize};

/// The single EVM chain the toolkit talks to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChainConfig {
	/// Chain ID used when signing.
	pub chain_id: u64,
	/// HTTP(S) JSON-RPC endpoint.
	pub rpc_url: String,
}
