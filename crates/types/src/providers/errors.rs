//! Error types for provider operations

use thiserror::Error;

/// Failure of a single provider call. Captured per provider by the gateway
/// and never fatal to sibling calls.
#[derive(Error, Debug)]
pub enum ProviderError {
	#[error("HTTP request failed: {0}")]
	HttpError(#[from] reqwest::Error),

	#[error("HTTP {status_code}: {reason}")]
	HttpStatusError { status_code: u16, reason: String },

	#[error("Timeout occurred after {timeout_ms}ms")]
	Timeout { timeout_ms: u64 },

	#[error("Invalid response format: {reason}")]
	InvalidResponse { reason: String },

	#[error("No pool or liquidity for pair: {reason}")]
	NoLiquidity { reason: String },

	#[error("Chain not supported: {chain_id} by provider {provider_id}")]
	ChainNotSupported { chain_id: u64, provider_id: String },

	#[error("Configuration error: {reason}")]
	ConfigError { reason: String },

	#[error("Provider not found: {provider_id}")]
	NotFound { provider_id: String },

	#[error("Adapter not registered: {adapter_id}")]
	AdapterNotRegistered { adapter_id: String },

	#[error("Serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}

impl ProviderError {
	/// Extract HTTP status code from the error if available
	pub fn status_code(&self) -> Option<u16> {
		match self {
			ProviderError::HttpStatusError { status_code, .. } => Some(*status_code),
			ProviderError::HttpError(reqwest_error) => {
				reqwest_error.status().map(|status| status.as_u16())
			},
			_ => None,
		}
	}

	pub fn http_failure(status_code: u16, reason: impl Into<String>) -> Self {
		Self::HttpStatusError {
			status_code,
			reason: reason.into(),
		}
	}

	/// Create an HTTP failure error from response status with default reason
	pub fn from_http_failure(status_code: u16) -> Self {
		let reason = match status_code {
			400 => "Bad Request".to_string(),
			401 => "Unauthorized".to_string(),
			403 => "Forbidden".to_string(),
			404 => "Not Found".to_string(),
			408 => "Request Timeout".to_string(),
			429 => "Too Many Requests".to_string(),
			500 => "Internal Server Error".to_string(),
			502 => "Bad Gateway".to_string(),
			503 => "Service Unavailable".to_string(),
			504 => "Gateway Timeout".to_string(),
			_ => format!("HTTP Error {}", status_code),
		};

		Self::HttpStatusError {
			status_code,
			reason,
		}
	}

	/// Stable tag used in logs and failure summaries
	pub fn tag(&self) -> &'static str {
		match self {
			ProviderError::HttpError(e) if e.is_timeout() => "timeout",
			ProviderError::HttpError(_) => "http",
			ProviderError::HttpStatusError { .. } => "http_status",
			ProviderError::Timeout { .. } => "timeout",
			ProviderError::InvalidResponse { .. } | ProviderError::Serialization(_) => {
				"invalid_response"
			},
			ProviderError::NoLiquidity { .. } => "no_liquidity",
			ProviderError::ChainNotSupported { .. } => "unsupported_chain",
			ProviderError::ConfigError { .. } => "config",
			ProviderError::NotFound { .. } | ProviderError::AdapterNotRegistered { .. } => {
				"not_found"
			},
		}
	}
}
