//! Normalized cost breakdown and ranked route models

use crate::providers::{ProviderKind, ProviderQuote};
use serde::{Deserialize, Serialize};

/// Every cost dimension of a route, in USD
///
/// `total_cost_usd` is always recomputed from the components in one fixed
/// order, so it is the exact sum of what is shown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
	pub gas_cost_usd: f64,
	pub protocol_fee_usd: f64,
	pub aggregator_fee_usd: f64,
	pub lp_fee_usd: f64,
	pub slippage_usd: f64,
	pub service_fee_usd: f64,
	pub total_cost_usd: f64,
	pub amount_in_usd: f64,
	pub amount_out_usd: f64,
	pub net_amount_out_usd: f64,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub savings_usd: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub savings_percent: Option<f64>,
}

impl CostBreakdown {
	/// Market-cost breakdown with no service fee attached
	pub fn market(
		amount_in_usd: f64,
		amount_out_usd: f64,
		gas_cost_usd: f64,
		protocol_fee_usd: f64,
		aggregator_fee_usd: f64,
		lp_fee_usd: f64,
		slippage_usd: f64,
	) -> Self {
		let mut breakdown = Self {
			gas_cost_usd,
			protocol_fee_usd,
			aggregator_fee_usd,
			lp_fee_usd,
			slippage_usd,
			amount_in_usd,
			amount_out_usd,
			..Self::default()
		};
		breakdown.refresh_totals();
		breakdown
	}

	/// Sum of the market components, excluding the service fee
	pub fn market_cost_usd(&self) -> f64 {
		self.gas_cost_usd
			+ self.protocol_fee_usd
			+ self.aggregator_fee_usd
			+ self.lp_fee_usd
			+ self.slippage_usd
	}

	/// Sum of every component
	pub fn components_total(&self) -> f64 {
		self.market_cost_usd() + self.service_fee_usd
	}

	pub fn with_service_fee(mut self, service_fee_usd: f64) -> Self {
		self.service_fee_usd = service_fee_usd;
		self.refresh_totals();
		self
	}

	pub fn is_consistent(&self) -> bool {
		self.total_cost_usd == self.components_total()
			&& self.net_amount_out_usd == self.amount_out_usd - self.total_cost_usd
	}

	fn refresh_totals(&mut self) {
		self.total_cost_usd = self.components_total();
		self.net_amount_out_usd = self.amount_out_usd - self.total_cost_usd;
	}
}

/// A provider quote together with its normalized costs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteInfo {
	pub provider_id: String,
	pub provider_name: String,
	pub kind: ProviderKind,
	pub quote: ProviderQuote,
	/// Output amount in human units of the output token
	pub amount_out: String,
	pub gas_estimate: u64,
	pub breakdown: CostBreakdown,
	/// Both tokens belong to the configured direct corridor
	pub is_corridor: bool,
}

impl RouteInfo {
	pub fn total_cost_usd(&self) -> f64 {
		self.breakdown.total_cost_usd
	}

	/// Non-executable copy with the swap call data removed
	pub fn without_call_data(&self) -> Self {
		Self {
			quote: self.quote.without_call_data(),
			..self.clone()
		}
	}
}
