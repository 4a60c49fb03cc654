//! Risk gate: depeg, liquidity, slippage and blacklist checks
//!
//! One assessment runs in a single pass: collect factors, score them,
//! bucket the score and decide. A blocked assessment is a normal result
//! with `can_proceed = false`, never an error.

use crate::price_cache::PriceCache;
use crate::ttl_cache::TtlCache;
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use ttv_config::RiskSettings;
use ttv_types::constants::limits::{
	BPS_DENOMINATOR, LARGE_TRADE_USD, MAX_RISK_SCORE, RISK_BLOCK_SCORE,
};
use ttv_types::{
	DepegAlert, DepegSeverity, RiskAssessment, RiskError, RiskFactor, RiskFactorType, RiskLevel,
	RiskThresholds, Severity, TokenInfo, TokenRiskProfile,
};

/// Stable tokens suggested when a trade is blocked
const ALTERNATIVE_STABLES: [&str; 3] = ["USDC", "USDT", "DAI"];

/// Source of pool depth for a token
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LiquiditySource: Send + Sync + Debug {
	/// Deepest known pool TVL for the token, in USD
	async fn pool_tvl_usd(&self, token: &TokenInfo) -> Option<f64>;
}

/// Pool TVL from a static table keyed by address or symbol
#[derive(Debug, Clone)]
pub struct StaticLiquiditySource {
	tvl_usd: HashMap<String, f64>,
	default_tvl_usd: f64,
}

impl StaticLiquiditySource {
	pub fn new(tvl_usd: HashMap<String, f64>, default_tvl_usd: f64) -> Self {
		let tvl_usd = tvl_usd
			.into_iter()
			.map(|(key, tvl)| (key.to_lowercase(), tvl))
			.collect();
		Self {
			tvl_usd,
			default_tvl_usd,
		}
	}
}

#[async_trait]
impl LiquiditySource for StaticLiquiditySource {
	async fn pool_tvl_usd(&self, token: &TokenInfo) -> Option<f64> {
		self.tvl_usd
			.get(&token.address.to_lowercase())
			.or_else(|| self.tvl_usd.get(&token.symbol.to_lowercase()))
			.copied()
			.or(Some(self.default_tvl_usd))
	}
}

#[derive(Debug, Clone)]
pub struct RiskConfig {
	pub default_thresholds: RiskThresholds,
	pub corridor_thresholds: RiskThresholds,
	pub blacklist: Vec<String>,
	pub whitelist: Vec<String>,
	pub usd_krw_rate: f64,
	pub profile_ttl: Duration,
}

impl From<&RiskSettings> for RiskConfig {
	fn from(settings: &RiskSettings) -> Self {
		Self {
			default_thresholds: settings.default_thresholds,
			corridor_thresholds: settings.corridor_thresholds,
			blacklist: settings.blacklist.clone(),
			whitelist: settings.whitelist.clone(),
			usd_krw_rate: settings.usd_krw_rate,
			profile_ttl: Duration::from_secs(settings.profile_ttl_secs),
		}
	}
}

#[derive(Debug)]
pub struct RiskGate {
	prices: Arc<PriceCache>,
	liquidity: Arc<dyn LiquiditySource>,
	config: RiskConfig,
	corridor_tokens: Vec<TokenInfo>,
	profiles: TtlCache<String, TokenRiskProfile>,
	depeg_alerts: DashMap<String, DepegAlert>,
}

fn listed(list: &[String], token: &TokenInfo) -> bool {
	list.iter().any(|entry| token.matches(entry))
}

impl RiskGate {
	pub fn new(
		prices: Arc<PriceCache>,
		liquidity: Arc<dyn LiquiditySource>,
		config: RiskConfig,
		corridor_tokens: Vec<TokenInfo>,
	) -> Self {
		let profiles = TtlCache::new(config.profile_ttl);
		Self {
			prices,
			liquidity,
			config,
			corridor_tokens,
			profiles,
			depeg_alerts: DashMap::new(),
		}
	}

	/// Corridor tokens get the tighter threshold set
	pub fn thresholds_for(&self, token: &TokenInfo) -> RiskThresholds {
		if self.corridor_tokens.iter().any(|t| t.same_token(token)) {
			self.config.corridor_thresholds
		} else {
			self.config.default_thresholds
		}
	}

	/// Blacklist and whitelist status, cached per token
	pub fn profile(&self, token: &TokenInfo) -> TokenRiskProfile {
		let key = token.cache_key();
		if let Some(profile) = self.profiles.get(&key) {
			return profile;
		}
		let profile = TokenRiskProfile {
			chain_id: token.chain_id,
			token: token.address.clone(),
			symbol: token.symbol.clone(),
			is_blacklisted: listed(&self.config.blacklist, token),
			is_whitelisted: listed(&self.config.whitelist, token),
			checked_at: Utc::now(),
		};
		self.profiles.insert(key, profile.clone());
		profile
	}

	/// Check one token against its peg and retain the latest alert
	///
	/// The stored alert for the token is replaced, or cleared when the
	/// token is back within its threshold.
	pub async fn check_depeg(&self, token: &TokenInfo) -> Result<Option<DepegAlert>, RiskError> {
		let peg = token.peg.ok_or_else(|| RiskError::NotPegged {
			symbol: token.symbol.clone(),
		})?;
		let target_price = peg.target_usd(self.config.usd_krw_rate);
		if target_price <= 0.0 {
			return Err(RiskError::NotPegged {
				symbol: token.symbol.clone(),
			});
		}

		let current_price = self.prices.token_price(token).await?;
		let threshold_bps = self.thresholds_for(token).depeg_threshold_bps;
		let alert = depeg_alert(token, current_price, target_price, threshold_bps);

		let key = token.cache_key();
		match &alert {
			Some(alert) => {
				warn!(
					"Depeg detected for {}: {:.1}bps off peg ({:?})",
					token.symbol, alert.deviation_bps, alert.severity
				);
				self.depeg_alerts.insert(key, alert.clone());
			},
			None => {
				self.depeg_alerts.remove(&key);
			},
		}
		Ok(alert)
	}

	/// Latest alert per token, newest first
	pub fn depeg_alerts(&self) -> Vec<DepegAlert> {
		let mut alerts: Vec<DepegAlert> =
			self.depeg_alerts.iter().map(|entry| entry.value().clone()).collect();
		alerts.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
		alerts
	}

	async fn token_factors(&self, token: &TokenInfo, amount_usd: f64) -> Result<TokenFactors, RiskError> {
		let mut factors = TokenFactors::default();
		let thresholds = self.thresholds_for(token);

		if token.peg.is_some() {
			if let Some(alert) = self.check_depeg(token).await? {
				let critical = alert.severity == DepegSeverity::Critical;
				factors.critical_depeg |= critical;
				factors.items.push(RiskFactor {
					factor_type: RiskFactorType::Depeg,
					severity: alert.severity.into(),
					description: format!(
						"{} depeg detected: {:.0}bps deviation",
						token.symbol, alert.deviation_bps
					),
					contribution: if critical { MAX_RISK_SCORE } else { 20 },
				});
			}
		}

		// Slippage here is estimated from trade size over pool TVL, not taken
		// from the slippage tolerance on the quote
		if let Some(tvl) = self.liquidity.pool_tvl_usd(token).await.filter(|t| *t > 0.0) {
			let impact_percent = amount_usd / tvl * 100.0;
			if tvl < thresholds.min_tvl_usd {
				let high = impact_percent > 5.0;
				factors.items.push(RiskFactor {
					factor_type: RiskFactorType::LowLiquidity,
					severity: if high { Severity::High } else { Severity::Medium },
					description: format!(
						"Low liquidity for {}: {:.2}% price impact",
						token.symbol, impact_percent
					),
					contribution: if high { 30 } else { 15 },
				});
			}

			let max_slippage_percent = f64::from(thresholds.max_slippage_bps) / 100.0;
			if impact_percent > max_slippage_percent {
				let high = impact_percent > 3.0;
				factors.items.push(RiskFactor {
					factor_type: RiskFactorType::HighSlippage,
					severity: if high { Severity::High } else { Severity::Medium },
					description: format!(
						"High slippage for {}: {:.2}% expected",
						token.symbol, impact_percent
					),
					contribution: if high { 25 } else { 10 },
				});
			}
		}

		if self.profile(token).is_blacklisted {
			factors.blacklisted = true;
			factors.items.push(RiskFactor {
				factor_type: RiskFactorType::Blacklist,
				severity: Severity::Critical,
				description: format!("{} is blacklisted", token.symbol),
				contribution: MAX_RISK_SCORE,
			});
		}

		Ok(factors)
	}

	/// Assess a single token for a trade of `amount_usd`
	pub async fn assess(&self, token: &TokenInfo, amount_usd: f64) -> Result<RiskAssessment, RiskError> {
		self.assess_tokens(&[token], amount_usd).await
	}

	/// Assess both sides of a swap
	pub async fn assess_pair(
		&self,
		token_in: &TokenInfo,
		token_out: &TokenInfo,
		amount_usd: f64,
	) -> Result<RiskAssessment, RiskError> {
		self.assess_tokens(&[token_in, token_out], amount_usd).await
	}

	async fn assess_tokens(
		&self,
		tokens: &[&TokenInfo],
		amount_usd: f64,
	) -> Result<RiskAssessment, RiskError> {
		if !amount_usd.is_finite() || amount_usd < 0.0 {
			return Err(RiskError::InvalidAmount {
				reason: format!("{} is not a valid USD amount", amount_usd),
			});
		}

		let mut combined = TokenFactors::default();
		for token in tokens {
			let factors = self.token_factors(token, amount_usd).await?;
			combined.critical_depeg |= factors.critical_depeg;
			combined.blacklisted |= factors.blacklisted;
			combined.items.extend(factors.items);
		}

		let assessment = decide(combined, amount_usd, tokens);
		if !assessment.can_proceed {
			info!(
				"Risk gate blocked trade of ${:.2} (score {})",
				amount_usd, assessment.risk_score
			);
		}
		Ok(assessment)
	}
}

#[derive(Debug, Default)]
struct TokenFactors {
	items: Vec<RiskFactor>,
	critical_depeg: bool,
	blacklisted: bool,
}

fn depeg_alert(
	token: &TokenInfo,
	current_price: f64,
	target_price: f64,
	threshold_bps: u32,
) -> Option<DepegAlert> {
	let deviation_bps = (current_price - target_price).abs() / target_price * BPS_DENOMINATOR;
	if deviation_bps <= f64::from(threshold_bps) {
		return None;
	}
	let severity = if deviation_bps > f64::from(threshold_bps) * 2.0 {
		DepegSeverity::Critical
	} else {
		DepegSeverity::Warning
	};
	Some(DepegAlert {
		chain_id: token.chain_id,
		token: token.address.clone(),
		symbol: token.symbol.clone(),
		current_price,
		target_price,
		deviation_bps,
		threshold_bps,
		severity,
		timestamp: Utc::now(),
	})
}

fn decide(factors: TokenFactors, amount_usd: f64, tokens: &[&TokenInfo]) -> RiskAssessment {
	let summed: u32 = factors.items.iter().map(|f| u32::from(f.contribution)).sum();
	let risk_score = if factors.critical_depeg || factors.blacklisted {
		MAX_RISK_SCORE
	} else {
		summed.min(u32::from(MAX_RISK_SCORE)) as u8
	};
	let can_proceed = risk_score < RISK_BLOCK_SCORE && !factors.blacklisted;

	let has = |factor_type: RiskFactorType| factors.items.iter().any(|f| f.factor_type == factor_type);

	let mut warnings = Vec::new();
	if risk_score > 70 {
		warnings.push("High risk transaction - consider alternative routes".to_string());
	}
	if factors.critical_depeg {
		warnings.push("Critical depeg detected - transaction blocked".to_string());
	}
	if factors.blacklisted {
		warnings.push("Token is blacklisted - transaction blocked".to_string());
	}

	let mut recommendations = Vec::new();
	if has(RiskFactorType::Depeg) {
		recommendations.push("Consider waiting for price stabilization".to_string());
	}
	if has(RiskFactorType::LowLiquidity) {
		recommendations.push("Split transaction into smaller amounts".to_string());
	}
	if has(RiskFactorType::HighSlippage) {
		recommendations.push("Use limit order or wait for better liquidity".to_string());
	}
	if amount_usd > LARGE_TRADE_USD {
		recommendations.push("Consider using RFQ for large amounts".to_string());
	}

	let alternative_routes = if can_proceed {
		Vec::new()
	} else {
		ALTERNATIVE_STABLES
			.iter()
			.filter(|symbol| !tokens.iter().any(|t| t.symbol.eq_ignore_ascii_case(symbol)))
			.map(|symbol| symbol.to_string())
			.collect()
	};

	RiskAssessment {
		risk_score,
		risk_level: RiskLevel::from_score(risk_score),
		factors: factors.items,
		warnings,
		recommendations,
		can_proceed,
		alternative_routes,
		assessed_at: Utc::now(),
	}
}
