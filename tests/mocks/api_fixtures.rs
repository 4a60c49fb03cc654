//! Request bodies shared by the API tests

#![allow(dead_code)]

use ttv_aggregator::serde_json::{json, Value};

pub const TRADER: &str = "0x1234567890123456789012345678901234567890";

pub struct ApiFixtures;

impl ApiFixtures {
	/// USDC to USDT on Ethereum
	pub fn quote_request(amount: &str) -> Value {
		json!({
			"chainId": 1,
			"fromToken": "USDC",
			"toToken": "USDT",
			"amount": amount,
			"slippageBps": 50,
			"trader": TRADER
		})
	}

	pub fn quote_request_for(chain_id: u64, from: &str, to: &str, amount: &str) -> Value {
		json!({
			"chainId": chain_id,
			"fromToken": from,
			"toToken": to,
			"amount": amount,
			"slippageBps": 50
		})
	}

	pub fn build_request(quote_id: &str) -> Value {
		json!({
			"quoteId": quote_id,
			"trader": TRADER
		})
	}

	pub fn flat_fee(amount_usd: f64) -> Value {
		json!({ "amountUsd": amount_usd, "mode": "flat" })
	}

	pub fn savings_fee(amount_usd: f64, savings_usd: f64) -> Value {
		json!({ "amountUsd": amount_usd, "mode": "savings", "savingsUsd": savings_usd })
	}

	pub fn partner(partner_id: &str, name: &str) -> Value {
		json!({ "partnerId": partner_id, "name": name })
	}

	pub fn transaction(partner_id: Option<&str>, volume_usd: f64, fee_usd: f64) -> Value {
		json!({
			"trader": TRADER,
			"partnerId": partner_id,
			"chainId": 1,
			"fromToken": "USDC",
			"toToken": "USDT",
			"amountIn": "1000",
			"amountOut": "999",
			"volumeUsd": volume_usd,
			"feeUsd": fee_usd,
			"ttvUsd": 1.25
		})
	}
}

/// Sum of every cost component of a serialized breakdown
pub fn components_total(breakdown: &Value) -> f64 {
	[
		"gasCostUsd",
		"protocolFeeUsd",
		"aggregatorFeeUsd",
		"lpFeeUsd",
		"slippageUsd",
		"serviceFeeUsd",
	]
	.iter()
	.map(|field| breakdown[*field].as_f64().unwrap())
	.sum()
}
