//! Thin JSON-RPC client for `eth_call` and `eth_gasPrice`

use crate::abi::AbiError;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use ttv_types::{PriceError, ProviderError};

#[derive(Error, Debug)]
pub enum RpcError {
	#[error("RPC transport failed: {0}")]
	Http(#[from] reqwest::Error),

	#[error("RPC endpoint returned HTTP {status_code}")]
	Status { status_code: u16 },

	#[error("RPC error {code}: {message}")]
	Rpc { code: i64, message: String },

	#[error("Invalid RPC response: {reason}")]
	InvalidResponse { reason: String },
}

impl From<AbiError> for RpcError {
	fn from(err: AbiError) -> Self {
		RpcError::InvalidResponse {
			reason: err.to_string(),
		}
	}
}

impl From<RpcError> for ProviderError {
	fn from(err: RpcError) -> Self {
		match err {
			RpcError::Http(e) => ProviderError::HttpError(e),
			RpcError::Status { status_code } => ProviderError::from_http_failure(status_code),
			// Reverts from the quoter mean the pool cannot fill the trade
			RpcError::Rpc { code, message } => ProviderError::NoLiquidity {
				reason: format!("eth_call reverted ({}): {}", code, message),
			},
			RpcError::InvalidResponse { reason } => ProviderError::InvalidResponse { reason },
		}
	}
}

impl From<RpcError> for PriceError {
	fn from(err: RpcError) -> Self {
		match err {
			RpcError::Http(e) => PriceError::HttpError(e),
			other => PriceError::InvalidResponse {
				reason: other.to_string(),
			},
		}
	}
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
	code: i64,
	message: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
	#[serde(default)]
	result: Option<Value>,
	#[serde(default)]
	error: Option<RpcErrorBody>,
}

async fn request(
	client: &Client,
	url: &str,
	method: &str,
	params: Value,
	timeout: Duration,
) -> Result<String, RpcError> {
	let body = json!({
		"jsonrpc": "2.0",
		"id": 1,
		"method": method,
		"params": params,
	});

	debug!("RPC {} -> {}", method, url);
	let response = client.post(url).json(&body).timeout(timeout).send().await?;
	let status = response.status();
	if !status.is_success() {
		return Err(RpcError::Status {
			status_code: status.as_u16(),
		});
	}

	let parsed: RpcResponse = response.json().await?;
	if let Some(error) = parsed.error {
		return Err(RpcError::Rpc {
			code: error.code,
			message: error.message,
		});
	}

	match parsed.result {
		Some(Value::String(result)) => Ok(result),
		other => Err(RpcError::InvalidResponse {
			reason: format!("expected hex string result, got {:?}", other),
		}),
	}
}

/// `eth_call` against the latest block, returning the raw hex result
pub async fn eth_call(
	client: &Client,
	url: &str,
	to: &str,
	data: &str,
	timeout: Duration,
) -> Result<String, RpcError> {
	request(
		client,
		url,
		"eth_call",
		json!([{ "to": to, "data": data }, "latest"]),
		timeout,
	)
	.await
}

/// Current gas price in wei
pub async fn gas_price(client: &Client, url: &str, timeout: Duration) -> Result<u128, RpcError> {
	let result = request(client, url, "eth_gasPrice", json!([]), timeout).await?;
	parse_hex_quantity(&result)
}

/// Parse a JSON-RPC hex quantity such as `0x3b9aca00`
pub fn parse_hex_quantity(value: &str) -> Result<u128, RpcError> {
	let hex = value
		.strip_prefix("0x")
		.ok_or_else(|| RpcError::InvalidResponse {
			reason: format!("quantity '{}' lacks 0x prefix", value),
		})?;
	if hex.is_empty() {
		return Ok(0);
	}
	u128::from_str_radix(hex, 16).map_err(|e| RpcError::InvalidResponse {
		reason: format!("invalid quantity '{}': {}", value, e),
	})
}
