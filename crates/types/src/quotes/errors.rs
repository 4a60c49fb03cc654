//! Error types for quote operations

use crate::fees::FeeError;
use crate::prices::PriceError;
use crate::providers::ProviderError;
use crate::risk::RiskError;
use serde::Serialize;
use thiserror::Error;

/// Validation errors for quote requests. Never retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QuoteValidationError {
	#[error("Invalid amount: {reason}")]
	InvalidAmount { reason: String },

	#[error("Amount ${amount_usd:.2} is below the minimum of ${min_usd:.2}")]
	AmountBelowMinimum { amount_usd: f64, min_usd: f64 },

	#[error("Amount ${amount_usd:.2} exceeds the maximum of ${max_usd:.2}")]
	AmountAboveMaximum { amount_usd: f64, max_usd: f64 },

	#[error("Invalid slippage tolerance: {value} bps (must be between {min} and {max})")]
	InvalidSlippage { value: u16, min: u16, max: u16 },

	#[error("Input and output token are the same: {token}")]
	SameToken { token: String },

	#[error("Unsupported token {token} on chain {chain_id}")]
	UnsupportedToken { chain_id: u64, token: String },

	#[error("Unsupported chain: {chain_id}")]
	UnsupportedChain { chain_id: u64 },

	#[error("Invalid address for {field}: {address}")]
	InvalidAddress { field: String, address: String },

	#[error("Missing required field: {field}")]
	MissingRequiredField { field: String },
}

/// One provider that failed during a fan-out
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderFailure {
	pub provider_id: String,
	pub tag: String,
	pub message: String,
}

impl ProviderFailure {
	pub fn new(provider_id: &str, error: &ProviderError) -> Self {
		Self {
			provider_id: provider_id.to_string(),
			tag: error.tag().to_string(),
			message: error.to_string(),
		}
	}
}

/// Errors that fail a whole quote request
#[derive(Error, Debug)]
pub enum QuoteError {
	#[error("Quote validation failed: {0}")]
	Validation(#[from] QuoteValidationError),

	#[error("No quotes available ({} provider failures)", failures.len())]
	NoQuotesAvailable { failures: Vec<ProviderFailure> },

	#[error("Price data unusable: {0}")]
	StalePrice(#[from] PriceError),

	#[error("Fee calculation failed: {0}")]
	Fee(#[from] FeeError),

	#[error("Risk assessment failed: {0}")]
	Risk(#[from] RiskError),

	#[error("Quote pipeline timed out after {timeout_ms}ms")]
	Timeout { timeout_ms: u64 },

	#[error("Quote {quote_id} has expired")]
	Expired { quote_id: String },

	#[error("Quote not found: {quote_id}")]
	NotFound { quote_id: String },

	#[error("Quote processing failed: {reason}")]
	ProcessingFailed { reason: String },
}
