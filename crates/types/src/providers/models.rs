//! Provider request and response models

use crate::models::TokenInfo;
use serde::{Deserialize, Serialize};

/// Request handed to a provider adapter. Amounts are integer base units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderQuoteRequest {
	pub chain_id: u64,
	pub token_in: TokenInfo,
	pub token_out: TokenInfo,
	pub amount_in: String,
	pub slippage_bps: u16,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub taker: Option<String>,
}

/// Fee data as reported by the provider itself
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderFees {
	/// Pool fee actually used for the route (Uniswap fee tier in bps)
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub lp_fee_bps: Option<u32>,
	/// Protocol fee charged in the native asset, in wei
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub protocol_fee_wei: Option<String>,
}

/// Quote returned by one provider
///
/// Immutable once returned. A risk-blocked quote is surfaced through
/// [`ProviderQuote::without_call_data`], which produces a non-executable copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderQuote {
	pub provider_id: String,
	pub provider_name: String,
	/// Output amount in base units of the output token
	pub amount_out: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub call_data: Option<String>,
	/// Target contract of the swap transaction
	pub to: String,
	/// Native value to attach, in wei
	pub value: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub allowance_target: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub estimated_gas: Option<u64>,
	#[serde(default)]
	pub fees: ProviderFees,
}

impl ProviderQuote {
	pub fn is_executable(&self) -> bool {
		self.call_data.as_deref().is_some_and(|d| !d.is_empty())
	}

	pub fn without_call_data(&self) -> Self {
		Self {
			call_data: None,
			..self.clone()
		}
	}
}
