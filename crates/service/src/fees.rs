//! Fee engine: service fee quotes, partner ledger and trailing volume
//!
//! Partner records and trader volume are the only state shared across
//! requests. Each map entry is locked on its own: the partner guard is
//! released before the trader entry is taken, so no two entry locks are
//! ever held at once.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use ttv_config::FeeSettings;
use ttv_types::constants::limits::{
	BPS_DENOMINATOR, REVENUE_DECIMALS, TRAILING_VOLUME_WINDOW_DAYS,
};
use ttv_types::fees::{tier_discount_bps, validate_partner_discounts};
use ttv_types::{
	FeeCalculation, FeeClamp, FeeError, FeeMode, FeeResult, FeeStructure, PartnerRevenueRecord,
	RecordTransactionRequest, SavingsShare, TransactionRecord, VolumeDiscountTier,
};
use uuid::Uuid;

/// Inputs for one fee quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeRequest {
	pub amount_usd: f64,
	#[serde(default)]
	pub mode: FeeMode,
	#[serde(default, alias = "userAddress", skip_serializing_if = "Option::is_none")]
	pub trader: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub partner_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub savings_usd: Option<f64>,
}

impl FeeRequest {
	pub fn flat(amount_usd: f64) -> Self {
		Self {
			amount_usd,
			mode: FeeMode::Flat,
			trader: None,
			partner_id: None,
			savings_usd: None,
		}
	}

	pub fn savings(amount_usd: f64, savings_usd: f64) -> Self {
		Self {
			mode: FeeMode::Savings,
			savings_usd: Some(savings_usd),
			..Self::flat(amount_usd)
		}
	}

	pub fn with_trader(mut self, trader: &str) -> Self {
		self.trader = Some(trader.to_string());
		self
	}

	pub fn with_partner(mut self, partner_id: &str) -> Self {
		self.partner_id = Some(partner_id.to_string());
		self
	}
}

/// Shortest decimal representation of a float
fn to_decimal(value: f64) -> Decimal {
	value
		.to_string()
		.parse::<Decimal>()
		.ok()
		.or_else(|| Decimal::from_f64(value))
		.unwrap_or_default()
}

/// Split a fee by partner share, rounding half to even at six decimals
pub fn split_revenue(fee_usd: f64, share_percent: f64) -> (f64, f64) {
	let fee = to_decimal(fee_usd);
	let share = to_decimal(share_percent);
	let partner = (fee * share / Decimal::ONE_HUNDRED)
		.round_dp_with_strategy(REVENUE_DECIMALS, RoundingStrategy::MidpointNearestEven);
	let platform = fee - partner;
	(
		partner.to_f64().unwrap_or_default(),
		platform.to_f64().unwrap_or_default(),
	)
}

fn check_amount(name: &str, value: f64) -> FeeResult<()> {
	if value.is_finite() && value >= 0.0 {
		Ok(())
	} else {
		Err(FeeError::InvalidAmount {
			reason: format!("{} must be a non-negative number, got {}", name, value),
		})
	}
}

fn check_share(share_percent: f64) -> FeeResult<()> {
	if (0.0..=100.0).contains(&share_percent) {
		Ok(())
	} else {
		Err(FeeError::InvalidShare {
			value: share_percent,
		})
	}
}

#[derive(Debug)]
pub struct FeeEngine {
	structure: RwLock<FeeStructure>,
	savings: SavingsShare,
	partner_discounts: Vec<VolumeDiscountTier>,
	partners: Arc<DashMap<String, PartnerRevenueRecord>>,
	/// Timestamped volume per lowercased trader address, oldest first
	trader_volume: Arc<DashMap<String, Vec<(DateTime<Utc>, f64)>>>,
}

fn volume_window_start(now: DateTime<Utc>) -> DateTime<Utc> {
	now - Duration::days(TRAILING_VOLUME_WINDOW_DAYS)
}

impl FeeEngine {
	pub fn new(
		structure: FeeStructure,
		savings: SavingsShare,
		partner_discounts: Vec<VolumeDiscountTier>,
	) -> FeeResult<Self> {
		structure.validate()?;
		savings.validate()?;
		validate_partner_discounts(&partner_discounts)?;

		Ok(Self {
			structure: RwLock::new(structure),
			savings,
			partner_discounts,
			partners: Arc::new(DashMap::new()),
			trader_volume: Arc::new(DashMap::new()),
		})
	}

	pub fn from_settings(settings: &FeeSettings) -> FeeResult<Self> {
		Self::new(
			settings.structure.clone(),
			settings.savings,
			settings.partner_discounts.clone(),
		)
	}

	pub async fn fee_structure(&self) -> FeeStructure {
		self.structure.read().await.clone()
	}

	/// Replace the fee structure after validating it
	pub async fn update_fee_structure(&self, structure: FeeStructure) -> FeeResult<FeeStructure> {
		structure.validate()?;
		*self.structure.write().await = structure.clone();
		info!(
			"Fee structure updated: {} bps, ${}..${}",
			structure.service_fee_bps, structure.min_fee_usd, structure.max_fee_usd
		);
		Ok(structure)
	}

	pub fn savings_share(&self) -> SavingsShare {
		self.savings
	}

	/// Volume recorded for `trader` over the last 30 days
	pub fn trailing_volume_usd(&self, trader: &str) -> f64 {
		self.trailing_volume_at(trader, Utc::now())
	}

	fn trailing_volume_at(&self, trader: &str, now: DateTime<Utc>) -> f64 {
		let start = volume_window_start(now);
		self.trader_volume
			.get(&trader.to_lowercase())
			.map(|entries| {
				entries
					.iter()
					.filter(|(at, _)| *at > start)
					.map(|(_, volume)| volume)
					.sum()
			})
			.unwrap_or(0.0)
	}

	/// Append volume for `trader` and prune entries that left the window
	fn add_trader_volume(&self, trader: &str, volume_usd: f64, at: DateTime<Utc>) {
		let start = volume_window_start(at);
		let mut entries = self.trader_volume.entry(trader.to_lowercase()).or_default();
		entries.retain(|(recorded_at, _)| *recorded_at > start);
		entries.push((at, volume_usd));
	}

	/// Register a partner; the default share applies when none is given
	pub async fn register_partner(
		&self,
		partner_id: &str,
		name: &str,
		share_percent: Option<f64>,
	) -> FeeResult<PartnerRevenueRecord> {
		let share_percent = match share_percent {
			Some(share) => share,
			None => self.structure.read().await.partner_share_percent,
		};
		check_share(share_percent)?;

		match self.partners.entry(partner_id.to_string()) {
			dashmap::mapref::entry::Entry::Occupied(_) => Err(FeeError::PartnerExists {
				partner_id: partner_id.to_string(),
			}),
			dashmap::mapref::entry::Entry::Vacant(entry) => {
				let record = PartnerRevenueRecord::new(partner_id, name, share_percent);
				entry.insert(record.clone());
				info!("Registered partner {} ({}% share)", partner_id, share_percent);
				Ok(record)
			},
		}
	}

	pub fn get_partner(&self, partner_id: &str) -> FeeResult<PartnerRevenueRecord> {
		self.partners
			.get(partner_id)
			.map(|record| record.clone())
			.ok_or_else(|| FeeError::PartnerNotFound {
				partner_id: partner_id.to_string(),
			})
	}

	/// All partners ordered by id
	pub fn list_partners(&self) -> Vec<PartnerRevenueRecord> {
		let mut partners: Vec<_> = self.partners.iter().map(|entry| entry.value().clone()).collect();
		partners.sort_by(|a, b| a.partner_id.cmp(&b.partner_id));
		partners
	}

	pub fn set_partner_active(&self, partner_id: &str, active: bool) -> FeeResult<()> {
		let mut record = self
			.partners
			.get_mut(partner_id)
			.ok_or_else(|| FeeError::PartnerNotFound {
				partner_id: partner_id.to_string(),
			})?;
		record.active = active;
		Ok(())
	}

	/// Compute the service fee for a trade
	pub async fn calculate(&self, request: &FeeRequest) -> FeeResult<FeeCalculation> {
		check_amount("amount_usd", request.amount_usd)?;
		let structure = self.fee_structure().await;
		let partner = request
			.partner_id
			.as_deref()
			.map(|id| self.get_partner(id))
			.transpose()?;

		let mut calculation = FeeCalculation {
			mode: request.mode,
			amount_usd: request.amount_usd,
			base_fee_bps: structure.service_fee_bps,
			volume_discount_bps: 0,
			partner_discount_bps: 0,
			effective_fee_bps: 0,
			savings_usd: None,
			fee_usd: 0.0,
			clamped: None,
			partner_id: partner.as_ref().map(|p| p.partner_id.clone()),
			partner_revenue_usd: 0.0,
			platform_revenue_usd: 0.0,
		};

		let raw_fee_usd = match request.mode {
			FeeMode::Flat => {
				let volume_discount_bps = request
					.trader
					.as_deref()
					.map(|trader| structure.volume_discount_bps(self.trailing_volume_usd(trader)))
					.unwrap_or(0);
				let partner_discount_bps = partner
					.as_ref()
					.filter(|p| p.active)
					.map(|p| tier_discount_bps(&self.partner_discounts, p.cumulative_volume_usd))
					.unwrap_or(0);
				let effective_fee_bps = structure
					.service_fee_bps
					.saturating_sub(volume_discount_bps)
					.saturating_sub(partner_discount_bps);

				calculation.volume_discount_bps = volume_discount_bps;
				calculation.partner_discount_bps = partner_discount_bps;
				calculation.effective_fee_bps = effective_fee_bps;
				request.amount_usd * f64::from(effective_fee_bps) / BPS_DENOMINATOR
			},
			FeeMode::Savings => {
				let savings_usd = request.savings_usd.ok_or(FeeError::SavingsRequired)?;
				if !savings_usd.is_finite() || savings_usd < 0.0 {
					return Err(FeeError::NegativeSavings { savings_usd });
				}
				calculation.savings_usd = Some(savings_usd);
				let share = savings_usd * self.savings.share_percent / 100.0;
				let cap = savings_usd * self.savings.max_share_percent / 100.0;
				share.min(cap)
			},
		};

		let fee_usd = structure.clamp(raw_fee_usd);
		calculation.clamped = if raw_fee_usd < structure.min_fee_usd {
			Some(FeeClamp::Min)
		} else if raw_fee_usd > structure.max_fee_usd {
			Some(FeeClamp::Max)
		} else {
			None
		};
		calculation.fee_usd = fee_usd;

		let share_percent = partner
			.as_ref()
			.filter(|p| p.active)
			.map(|p| p.share_percent)
			.unwrap_or(0.0);
		let (partner_revenue_usd, platform_revenue_usd) = split_revenue(fee_usd, share_percent);
		calculation.partner_revenue_usd = partner_revenue_usd;
		calculation.platform_revenue_usd = platform_revenue_usd;

		debug!(
			"Fee for ${:.2} ({:?}): ${:.6} (raw ${:.6})",
			request.amount_usd, request.mode, fee_usd, raw_fee_usd
		);
		Ok(calculation)
	}

	/// Record a completed transaction against the partner ledger and trader volume
	///
	/// Validation and the partner lookup happen before anything is written,
	/// so a rejected transaction moves neither counter.
	pub fn record_transaction(&self, request: RecordTransactionRequest) -> FeeResult<TransactionRecord> {
		check_amount("volume_usd", request.volume_usd)?;
		check_amount("fee_usd", request.fee_usd)?;
		if let Some(savings_usd) = request.savings_usd {
			check_amount("savings_usd", savings_usd)?;
		}
		if request.trader.trim().is_empty() {
			return Err(FeeError::InvalidAmount {
				reason: "trader is required".to_string(),
			});
		}

		let now = Utc::now();
		// The partner guard drops at the end of this block
		let (partner_revenue_usd, platform_revenue_usd) = match request.partner_id.as_deref() {
			Some(id) => {
				let mut partner = self.partners.get_mut(id).ok_or_else(|| FeeError::PartnerNotFound {
					partner_id: id.to_string(),
				})?;
				let share_percent = if partner.active { partner.share_percent } else { 0.0 };
				let split = split_revenue(request.fee_usd, share_percent);
				partner.cumulative_volume_usd += request.volume_usd;
				partner.cumulative_revenue_usd += split.0;
				partner.transaction_count += 1;
				partner.last_transaction_at = Some(now);
				split
			},
			None => split_revenue(request.fee_usd, 0.0),
		};
		self.add_trader_volume(&request.trader, request.volume_usd, now);

		let record = TransactionRecord {
			id: Uuid::new_v4(),
			recorded_at: now,
			trader: request.trader,
			partner_id: request.partner_id,
			chain_id: request.chain_id,
			from_token: request.from_token,
			to_token: request.to_token,
			amount_in: request.amount_in,
			amount_out: request.amount_out,
			volume_usd: request.volume_usd,
			fee_usd: request.fee_usd,
			partner_revenue_usd,
			platform_revenue_usd,
			ttv_usd: request.ttv_usd,
			savings_usd: request.savings_usd,
			tx_hash: request.tx_hash,
		};
		info!(
			"Recorded transaction {} for {} (${:.2} volume, ${:.6} fee)",
			record.id, record.trader, record.volume_usd, record.fee_usd
		);
		Ok(record)
	}
}
