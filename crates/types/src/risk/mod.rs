//! Risk assessment models

use crate::prices::PriceError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RiskError {
	#[error("Unsupported token {token} on chain {chain_id}")]
	UnknownToken { chain_id: u64, token: String },

	#[error("Token {symbol} has no peg to check")]
	NotPegged { symbol: String },

	#[error("Invalid amount: {reason}")]
	InvalidAmount { reason: String },

	#[error("Price unavailable: {0}")]
	Price(#[from] PriceError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactorType {
	Depeg,
	LowLiquidity,
	HighSlippage,
	Blacklist,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
	Low,
	Medium,
	Warning,
	High,
	Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
	Low,
	Medium,
	High,
	Critical,
}

impl RiskLevel {
	/// Bucket a 0-100 score
	pub fn from_score(score: u8) -> Self {
		match score {
			0..=24 => RiskLevel::Low,
			25..=49 => RiskLevel::Medium,
			50..=74 => RiskLevel::High,
			_ => RiskLevel::Critical,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskFactor {
	#[serde(rename = "type")]
	pub factor_type: RiskFactorType,
	pub severity: Severity,
	pub description: String,
	/// Points this factor adds to the overall score
	pub contribution: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
	pub risk_score: u8,
	pub risk_level: RiskLevel,
	pub factors: Vec<RiskFactor>,
	pub warnings: Vec<String>,
	pub recommendations: Vec<String>,
	pub can_proceed: bool,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub alternative_routes: Vec<String>,
	pub assessed_at: DateTime<Utc>,
}

impl RiskAssessment {
	pub fn has_factor(&self, factor_type: RiskFactorType) -> bool {
		self.factors.iter().any(|f| f.factor_type == factor_type)
	}
}

/// Per-category risk limits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskThresholds {
	pub depeg_threshold_bps: u32,
	pub min_tvl_usd: f64,
	pub max_slippage_bps: u32,
}

impl RiskThresholds {
	/// Limits for general-purpose stablecoins
	pub const fn standard() -> Self {
		Self {
			depeg_threshold_bps: 200,
			min_tvl_usd: 1_000_000.0,
			max_slippage_bps: 500,
		}
	}

	/// Tighter depeg and slippage limits for corridor tokens
	pub const fn corridor() -> Self {
		Self {
			depeg_threshold_bps: 50,
			min_tvl_usd: 100_000.0,
			max_slippage_bps: 100,
		}
	}
}

impl Default for RiskThresholds {
	fn default() -> Self {
		Self::standard()
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepegSeverity {
	Warning,
	Critical,
}

impl From<DepegSeverity> for Severity {
	fn from(value: DepegSeverity) -> Self {
		match value {
			DepegSeverity::Warning => Severity::Warning,
			DepegSeverity::Critical => Severity::Critical,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepegAlert {
	pub chain_id: u64,
	pub token: String,
	pub symbol: String,
	pub current_price: f64,
	pub target_price: f64,
	pub deviation_bps: f64,
	pub threshold_bps: u32,
	pub severity: DepegSeverity,
	pub timestamp: DateTime<Utc>,
}

/// Blacklist/whitelist status of a token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRiskProfile {
	pub chain_id: u64,
	pub token: String,
	pub symbol: String,
	pub is_blacklisted: bool,
	pub is_whitelisted: bool,
	pub checked_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_risk_level_buckets() {
		assert_eq!(RiskLevel::from_score(0), RiskLevel::Low);
		assert_eq!(RiskLevel::from_score(24), RiskLevel::Low);
		assert_eq!(RiskLevel::from_score(25), RiskLevel::Medium);
		assert_eq!(RiskLevel::from_score(49), RiskLevel::Medium);
		assert_eq!(RiskLevel::from_score(50), RiskLevel::High);
		assert_eq!(RiskLevel::from_score(74), RiskLevel::High);
		assert_eq!(RiskLevel::from_score(75), RiskLevel::Critical);
		assert_eq!(RiskLevel::from_score(100), RiskLevel::Critical);
	}

	#[test]
	fn test_factor_serializes_type_tag() {
		let factor = RiskFactor {
			factor_type: RiskFactorType::LowLiquidity,
			severity: Severity::High,
			description: "Low liquidity".to_string(),
			contribution: 30,
		};
		let json = serde_json::to_value(&factor).unwrap();
		assert_eq!(json["type"], "low_liquidity");
		assert_eq!(json["severity"], "high");
	}
}
