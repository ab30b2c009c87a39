//! ABI encoding of constructor arguments and calls from runtime ABIs.

use alloy_dyn_abi::{DynSolValue, JsonAbiExt};
use alloy_json_abi::JsonAbi;
use thiserror::Error;

/// Errors raised while encoding against a contract ABI.
#[derive(Debug, Error)]
pub enum EncodingError {
	#[error("{0} ABI has no constructor")]
	MissingConstructor(String),
	#[error("{contract} ABI has no function {function} taking {arity} arguments")]
	MissingFunction {
		contract: String,
		function: String,
		arity: usize,
	},
	#[error("Failed to encode {target}: {message}")]
	Abi { target: String, message: String },
}

/// Encodes constructor arguments, without the bytecode.
pub(crate) fn encode_constructor(
	abi: &JsonAbi,
	contract: &str,
	args: &[DynSolValue],
) -> Result<Vec<u8>, EncodingError> {
	let constructor = abi
		.constructor()
		.ok_or_else(|| EncodingError::MissingConstructor(contract.to_string()))?;

	constructor
		.abi_encode_input(args)
		.map_err(|e| EncodingError::Abi {
			target: format!("{} constructor", contract),
			message: e.to_string(),
		})
}

/// Encodes a call to `function`, selector included.
///
/// Overloads are told apart by argument count.
pub(crate) fn encode_call(
	abi: &JsonAbi,
	contract: &str,
	function: &str,
	args: &[DynSolValue],
) -> Result<Vec<u8>, EncodingError> {
	let func = abi
		.function(function)
		.and_then(|overloads| overloads.iter().find(|f| f.inputs.len() == args.len()))
		.ok_or_else(|| EncodingError::MissingFunction {
			contract: contract.to_string(),
			function: function.to_string(),
			arity: args.len(),
		})?;

	func.abi_encode_input(args).map_err(|e| EncodingError::Abi {
		target: format!("{}.{}", contract, function),
		message: e.to_string(),
	})
}
