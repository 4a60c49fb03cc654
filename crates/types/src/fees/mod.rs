//! Fee structure, fee quotes, partner ledger and transaction records

pub mod errors;

pub use errors::FeeError;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type FeeResult<T> = Result<T, FeeError>;

/// How the platform fee is computed for a request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeMode {
	#[default]
	Flat,
	#[serde(alias = "savings-based", alias = "savings_based")]
	Savings,
}

/// Trailing-volume threshold and the discount it unlocks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeDiscountTier {
	pub volume_usd: f64,
	pub discount_bps: u32,
}

impl VolumeDiscountTier {
	pub const fn new(volume_usd: f64, discount_bps: u32) -> Self {
		Self {
			volume_usd,
			discount_bps,
		}
	}
}

/// Highest tier whose threshold is at or below `volume_usd`
pub fn tier_discount_bps(tiers: &[VolumeDiscountTier], volume_usd: f64) -> u32 {
	tiers
		.iter()
		.rev()
		.find(|tier| tier.volume_usd <= volume_usd)
		.map(|tier| tier.discount_bps)
		.unwrap_or(0)
}

fn check_tiers_ascending(name: &str, tiers: &[VolumeDiscountTier]) -> FeeResult<()> {
	if tiers.windows(2).any(|w| w[0].volume_usd >= w[1].volume_usd) {
		return Err(FeeError::InvalidStructure {
			reason: format!("{} must be sorted ascending by volume", name),
		});
	}
	if tiers.iter().any(|t| !t.volume_usd.is_finite() || t.volume_usd < 0.0) {
		return Err(FeeError::InvalidStructure {
			reason: format!("{} volumes must be non-negative", name),
		});
	}
	Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeStructure {
	pub service_fee_bps: u32,
	pub min_fee_usd: f64,
	pub max_fee_usd: f64,
	pub partner_share_percent: f64,
	pub volume_discounts: Vec<VolumeDiscountTier>,
}

impl Default for FeeStructure {
	fn default() -> Self {
		Self {
			service_fee_bps: 5,
			min_fee_usd: 0.01,
			max_fee_usd: 10.0,
			partner_share_percent: 30.0,
			volume_discounts: vec![
				VolumeDiscountTier::new(10_000.0, 0),
				VolumeDiscountTier::new(50_000.0, 10),
				VolumeDiscountTier::new(100_000.0, 20),
				VolumeDiscountTier::new(500_000.0, 30),
				VolumeDiscountTier::new(1_000_000.0, 50),
			],
		}
	}
}

impl FeeStructure {
	pub fn validate(&self) -> FeeResult<()> {
		if !(self.min_fee_usd >= 0.0 && self.min_fee_usd <= self.max_fee_usd) {
			return Err(FeeError::InvalidStructure {
				reason: format!(
					"min fee {} must be non-negative and not exceed max fee {}",
					self.min_fee_usd, self.max_fee_usd
				),
			});
		}
		if !(0.0..=100.0).contains(&self.partner_share_percent) {
			return Err(FeeError::InvalidShare {
				value: self.partner_share_percent,
			});
		}
		check_tiers_ascending("volume discount tiers", &self.volume_discounts)
	}

	pub fn volume_discount_bps(&self, trailing_volume_usd: f64) -> u32 {
		tier_discount_bps(&self.volume_discounts, trailing_volume_usd)
	}

	pub fn clamp(&self, fee_usd: f64) -> f64 {
		fee_usd.clamp(self.min_fee_usd, self.max_fee_usd)
	}
}

/// Share of measured savings charged in savings-based mode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsShare {
	pub share_percent: f64,
	pub max_share_percent: f64,
}

impl Default for SavingsShare {
	fn default() -> Self {
		Self {
			share_percent: 30.0,
			max_share_percent: 50.0,
		}
	}
}

impl SavingsShare {
	pub fn validate(&self) -> FeeResult<()> {
		for value in [self.share_percent, self.max_share_percent] {
			if !(0.0..=100.0).contains(&value) {
				return Err(FeeError::InvalidShare { value });
			}
		}
		Ok(())
	}
}

/// Partner discount thresholds on cumulative partner volume
pub fn default_partner_discounts() -> Vec<VolumeDiscountTier> {
	vec![
		VolumeDiscountTier::new(500_000.0, 5),
		VolumeDiscountTier::new(1_000_000.0, 10),
	]
}

pub fn validate_partner_discounts(tiers: &[VolumeDiscountTier]) -> FeeResult<()> {
	check_tiers_ascending("partner discount tiers", tiers)
}

/// Which bound, if any, the fee was clamped to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeClamp {
	Min,
	Max,
}

/// Result of a fee computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeCalculation {
	pub mode: FeeMode,
	pub amount_usd: f64,
	pub base_fee_bps: u32,
	pub volume_discount_bps: u32,
	pub partner_discount_bps: u32,
	pub effective_fee_bps: u32,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub savings_usd: Option<f64>,
	pub fee_usd: f64,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub clamped: Option<FeeClamp>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub partner_id: Option<String>,
	pub partner_revenue_usd: f64,
	pub platform_revenue_usd: f64,
}

/// Cumulative revenue ledger entry for one partner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerRevenueRecord {
	pub partner_id: String,
	pub name: String,
	pub share_percent: f64,
	pub cumulative_volume_usd: f64,
	pub cumulative_revenue_usd: f64,
	pub transaction_count: u64,
	pub active: bool,
	pub created_at: DateTime<Utc>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub last_transaction_at: Option<DateTime<Utc>>,
}

impl PartnerRevenueRecord {
	pub fn new(partner_id: &str, name: &str, share_percent: f64) -> Self {
		Self {
			partner_id: partner_id.to_string(),
			name: name.to_string(),
			share_percent,
			cumulative_volume_usd: 0.0,
			cumulative_revenue_usd: 0.0,
			transaction_count: 0,
			active: true,
			created_at: Utc::now(),
			last_transaction_at: None,
		}
	}
}

/// Inputs for recording a completed transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordTransactionRequest {
	pub trader: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub partner_id: Option<String>,
	pub chain_id: u64,
	pub from_token: String,
	pub to_token: String,
	pub amount_in: String,
	pub amount_out: String,
	/// Trade size in USD, added to trailing and partner volume
	pub volume_usd: f64,
	pub fee_usd: f64,
	/// Total transaction cost of the executed route
	pub ttv_usd: f64,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub savings_usd: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tx_hash: Option<String>,
}

/// Transaction record handed to the external store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
	pub id: Uuid,
	pub recorded_at: DateTime<Utc>,
	pub trader: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub partner_id: Option<String>,
	pub chain_id: u64,
	pub from_token: String,
	pub to_token: String,
	pub amount_in: String,
	pub amount_out: String,
	pub volume_usd: f64,
	pub fee_usd: f64,
	pub partner_revenue_usd: f64,
	pub platform_revenue_usd: f64,
	pub ttv_usd: f64,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub savings_usd: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tx_hash: Option<String>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default_structure_is_valid() {
		let structure = FeeStructure::default();
		assert!(structure.validate().is_ok());
		assert_eq!(structure.service_fee_bps, 5);
	}

	#[test]
	fn test_tier_lookup_picks_highest_reached() {
		let structure = FeeStructure::default();
		assert_eq!(structure.volume_discount_bps(0.0), 0);
		assert_eq!(structure.volume_discount_bps(49_999.0), 0);
		assert_eq!(structure.volume_discount_bps(50_000.0), 10);
		assert_eq!(structure.volume_discount_bps(750_000.0), 30);
		assert_eq!(structure.volume_discount_bps(5_000_000.0), 50);
	}

	#[test]
	fn test_unsorted_tiers_rejected() {
		let structure = FeeStructure {
			volume_discounts: vec![
				VolumeDiscountTier::new(100_000.0, 20),
				VolumeDiscountTier::new(50_000.0, 10),
			],
			..FeeStructure::default()
		};
		assert!(matches!(
			structure.validate(),
			Err(FeeError::InvalidStructure { .. })
		));
	}

	#[test]
	fn test_min_above_max_rejected() {
		let structure = FeeStructure {
			min_fee_usd: 20.0,
			..FeeStructure::default()
		};
		assert!(structure.validate().is_err());
	}

	#[test]
	fn test_fee_mode_serde() {
		assert_eq!(
			serde_json::from_str::<FeeMode>("\"savings\"").unwrap(),
			FeeMode::Savings
		);
		assert_eq!(
			serde_json::from_str::<FeeMode>("\"savings-based\"").unwrap(),
			FeeMode::Savings
		);
		assert_eq!(serde_json::to_string(&FeeMode::Flat).unwrap(), "\"flat\"");
	}
}
