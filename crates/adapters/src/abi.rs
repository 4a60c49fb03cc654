//! Contract bindings for the Uniswap V3 quoter, the swap router and ERC-20 approvals

use alloy_primitives::aliases::{U160, U24};
use alloy_primitives::{hex, Address, U256};
use alloy_sol_types::{sol, SolCall};
use thiserror::Error;
use ttv_types::models::parse_address;

sol! {
	struct ExactInputSingleParams {
		address tokenIn;
		address tokenOut;
		uint24 fee;
		address recipient;
		uint256 deadline;
		uint256 amountIn;
		uint256 amountOutMinimum;
		uint160 sqrtPriceLimitX96;
	}

	/// Uniswap QuoterV1
	function quoteExactInputSingle(
		address tokenIn,
		address tokenOut,
		uint24 fee,
		uint256 amountIn,
		uint160 sqrtPriceLimitX96
	) external returns (uint256 amountOut);

	/// Uniswap SwapRouter
	function exactInputSingle(ExactInputSingleParams params) external payable returns (uint256 amountOut);

	function approve(address spender, uint256 amount) external returns (bool);
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AbiError {
	#[error("Invalid address: {address}")]
	InvalidAddress { address: String },

	#[error("Invalid unsigned integer: {value}")]
	InvalidUint { value: String },

	#[error("Fee tier {fee} does not fit in uint24")]
	InvalidFeeTier { fee: u32 },

	#[error("Cannot decode return data: {reason}")]
	Decode { reason: String },
}

pub fn address(value: &str) -> Result<Address, AbiError> {
	parse_address(value).ok_or_else(|| AbiError::InvalidAddress {
		address: value.to_string(),
	})
}

/// Parse a decimal base-unit amount
pub fn uint(value: &str) -> Result<U256, AbiError> {
	U256::from_str_radix(value, 10).map_err(|_| AbiError::InvalidUint {
		value: value.to_string(),
	})
}

pub fn fee_tier(fee: u32) -> Result<U24, AbiError> {
	if fee >= 1 << 24 {
		return Err(AbiError::InvalidFeeTier { fee });
	}
	Ok(U24::from(fee))
}

fn encode<C: SolCall>(call: &C) -> String {
	hex::encode_prefixed(call.abi_encode())
}

/// Calldata for QuoterV1 `quoteExactInputSingle` with no price limit
pub fn encode_quote_exact_input_single(
	token_in: &str,
	token_out: &str,
	fee: u32,
	amount_in: &str,
) -> Result<String, AbiError> {
	Ok(encode(&quoteExactInputSingleCall {
		tokenIn: address(token_in)?,
		tokenOut: address(token_out)?,
		fee: fee_tier(fee)?,
		amountIn: uint(amount_in)?,
		sqrtPriceLimitX96: U160::ZERO,
	}))
}

/// Decode the quoted output amount from `quoteExactInputSingle` return data
pub fn decode_quote_exact_input_single(data: &str) -> Result<U256, AbiError> {
	let bytes = hex::decode(data).map_err(|e| AbiError::Decode {
		reason: e.to_string(),
	})?;
	quoteExactInputSingleCall::abi_decode_returns(&bytes, true)
		.map(|ret| ret.amountOut)
		.map_err(|e| AbiError::Decode {
			reason: e.to_string(),
		})
}

/// Calldata for SwapRouter `exactInputSingle`
pub fn encode_exact_input_single(params: ExactInputSingleParams) -> String {
	encode(&exactInputSingleCall { params })
}

/// Calldata for ERC-20 `approve(spender, amount)`
pub fn encode_approve(spender: &str, amount: &str) -> Result<String, AbiError> {
	Ok(encode(&approveCall {
		spender: address(spender)?,
		amount: uint(amount)?,
	}))
}
