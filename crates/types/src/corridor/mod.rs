//! Direct-vs-hub corridor comparison result

use serde::{Deserialize, Serialize};

/// One hop of the hub path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HubLeg {
	pub from_token: String,
	pub to_token: String,
	pub provider_id: String,
	pub amount_in: String,
	pub amount_out: String,
	pub total_cost_usd: f64,
}

/// Advisory comparison of a direct corridor swap against the hub path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorridorComparison {
	pub hub_token: String,
	pub direct_cost_usd: f64,
	pub hub_cost_usd: f64,
	pub is_direct_better: bool,
	pub savings_usd: f64,
	pub savings_percent: f64,
	pub recommendation: String,
	pub hub_legs: Vec<HubLeg>,
}
