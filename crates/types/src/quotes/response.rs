//! Quote response returned by the lifecycle manager

use crate::corridor::CorridorComparison;
use crate::fees::FeeCalculation;
use crate::models::TokenInfo;
use crate::risk::RiskAssessment;
use crate::routes::{CostBreakdown, RouteInfo};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
	pub quote_id: String,
	pub chain_id: u64,
	pub from_token: TokenInfo,
	pub to_token: TokenInfo,
	pub amount_in: String,
	pub slippage_bps: u16,
	pub best_route: RouteInfo,
	/// Ranked by ascending total cost, truncated to the configured count
	pub alternatives: Vec<RouteInfo>,
	/// Breakdown of the best route, service fee included
	pub breakdown: CostBreakdown,
	pub fee: FeeCalculation,
	pub risk: RiskAssessment,
	/// False when the risk gate blocked the trade; call data is then absent
	pub executable: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub corridor: Option<CorridorComparison>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub trader: Option<String>,
	#[serde(with = "chrono::serde::ts_milliseconds")]
	pub issued_at: DateTime<Utc>,
	#[serde(with = "chrono::serde::ts_milliseconds")]
	pub expires_at: DateTime<Utc>,
}

impl QuoteResponse {
	pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
		now >= self.expires_at
	}

	pub fn is_expired(&self) -> bool {
		self.is_expired_at(Utc::now())
	}

	/// Seconds left before expiry, zero once expired
	pub fn remaining_secs_at(&self, now: DateTime<Utc>) -> u64 {
		(self.expires_at - now).num_seconds().max(0) as u64
	}
}
