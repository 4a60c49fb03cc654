//! Executable transaction payloads built from an issued quote

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExecutionError {
	#[error("Quote not found: {quote_id}")]
	QuoteNotFound { quote_id: String },

	#[error("Quote {quote_id} expired at {expired_at}")]
	QuoteExpired {
		quote_id: String,
		expired_at: DateTime<Utc>,
	},

	#[error("Quote {quote_id} is blocked by the risk gate (score {risk_score})")]
	RiskBlocked { quote_id: String, risk_score: u8 },

	#[error("Quote {quote_id} was issued without a trader; request a new quote with one")]
	MissingTrader { quote_id: String },

	#[error("Quote {quote_id} was built for {quoted}, not {requested}")]
	TraderMismatch {
		quote_id: String,
		quoted: String,
		requested: String,
	},

	#[error("Route from {provider_id} carries no call data")]
	MissingCallData { provider_id: String },

	#[error("Invalid address for {field}: {address}")]
	InvalidAddress { field: String, address: String },

	#[error("Encoding failed: {reason}")]
	Encoding { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPayload {
	pub chain_id: u64,
	pub from: String,
	pub to: String,
	pub data: String,
	pub value: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub gas_limit: Option<u64>,
}

/// Approve and swap transactions for one quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionPlan {
	pub quote_id: String,
	pub provider_id: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub approve_tx: Option<TransactionPayload>,
	pub swap_tx: TransactionPayload,
	#[serde(with = "chrono::serde::ts_milliseconds")]
	pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildTransactionRequest {
	pub quote_id: String,
	#[serde(alias = "userAddress")]
	pub trader: String,
}
