//! Direct corridor versus hub route comparison
//!
//! A corridor is a set of tokens pegged to the same regional currency. For a
//! swap between two corridor members the optimizer prices the two-hop path
//! through the hub token and compares it with the cost of the best direct
//! route. The result is advisory and never reorders the direct ranking.

use crate::gateway::ProviderGateway;
use crate::normalizer::{CostNormalizer, NormalizationInput};
use crate::price_cache::PriceCache;
use crate::route_selector::RouteSelector;
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::{debug, warn};
use ttv_config::CorridorSettings;
use ttv_types::models::to_base_units;
use ttv_types::{
	CorridorComparison, GasSnapshot, HubLeg, ProviderQuoteRequest, QuoteError, QuoteResult,
	QuoteValidationError, RouteInfo, TokenInfo, TokenRegistry,
};

/// Collaborators needed to price one hub leg
#[derive(Clone, Copy)]
pub struct LegPricing<'a> {
	pub gateway: &'a ProviderGateway,
	pub normalizer: &'a CostNormalizer,
	pub selector: &'a RouteSelector,
	pub prices: &'a PriceCache,
	pub gas: &'a GasSnapshot,
}

#[derive(Debug, Clone)]
pub struct CorridorOptimizer {
	enabled: bool,
	chain_id: u64,
	members: Vec<TokenInfo>,
	hub: Option<TokenInfo>,
}

impl CorridorOptimizer {
	pub fn new(enabled: bool, chain_id: u64, members: Vec<TokenInfo>, hub: Option<TokenInfo>) -> Self {
		Self {
			enabled,
			chain_id,
			members,
			hub,
		}
	}

	/// Resolve member and hub tokens from settings; unresolvable entries are skipped
	pub fn from_settings(settings: &CorridorSettings, registry: &TokenRegistry) -> Self {
		let members = settings
			.tokens
			.iter()
			.filter_map(|token| {
				let resolved = registry.resolve(settings.chain_id, token).cloned();
				if resolved.is_none() {
					warn!("Corridor token {} is not registered on chain {}", token, settings.chain_id);
				}
				resolved
			})
			.collect();
		let hub = registry.resolve(settings.chain_id, &settings.hub_token).cloned();

		Self::new(settings.enabled, settings.chain_id, members, hub)
	}

	pub fn is_enabled(&self) -> bool {
		self.enabled && self.hub.is_some() && self.members.len() >= 2
	}

	pub fn chain_id(&self) -> u64 {
		self.chain_id
	}

	pub fn hub(&self) -> Option<&TokenInfo> {
		self.hub.as_ref()
	}

	pub fn members(&self) -> &[TokenInfo] {
		&self.members
	}

	pub fn is_member(&self, token: &TokenInfo) -> bool {
		token.chain_id == self.chain_id && self.members.iter().any(|m| m.same_token(token))
	}

	/// Both sides are distinct corridor members
	pub fn applies(&self, token_in: &TokenInfo, token_out: &TokenInfo) -> bool {
		self.is_enabled()
			&& !token_in.same_token(token_out)
			&& self.is_member(token_in)
			&& self.is_member(token_out)
	}

	/// Compare the direct cost against the summed hub legs
	pub fn compare(hub_symbol: &str, direct_cost_usd: f64, hub_legs: Vec<HubLeg>) -> CorridorComparison {
		let hub_cost_usd: f64 = hub_legs.iter().map(|leg| leg.total_cost_usd).sum();
		let is_direct_better = direct_cost_usd <= hub_cost_usd;
		let savings_usd = (hub_cost_usd - direct_cost_usd).abs();
		let reference = direct_cost_usd.max(hub_cost_usd);
		let savings_percent = if reference > 0.0 {
			savings_usd / reference * 100.0
		} else {
			0.0
		};

		let recommendation = if is_direct_better {
			format!(
				"Direct corridor swap is {:.2} USD ({:.1}%) cheaper than routing via {}",
				savings_usd, savings_percent, hub_symbol
			)
		} else {
			format!(
				"Hub route via {} is {:.2} USD ({:.1}%) cheaper than the direct swap",
				hub_symbol, savings_usd, savings_percent
			)
		};

		CorridorComparison {
			hub_token: hub_symbol.to_string(),
			direct_cost_usd,
			hub_cost_usd,
			is_direct_better,
			savings_usd,
			savings_percent,
			recommendation,
			hub_legs,
		}
	}

	/// Price the hub path and compare it with the best direct route
	///
	/// Leg two is quoted with the output of leg one, so the hub path is
	/// priced on the amount that would actually arrive at the hub. Both
	/// paths are compared on market cost; the service fee is charged once
	/// whichever path executes, so it is left out of the direct side.
	pub async fn evaluate(
		&self,
		pricing: LegPricing<'_>,
		token_in: &TokenInfo,
		token_out: &TokenInfo,
		amount_in: Decimal,
		slippage_bps: u16,
		direct: &RouteInfo,
	) -> QuoteResult<CorridorComparison> {
		let hub = self.hub.as_ref().ok_or_else(|| QuoteError::ProcessingFailed {
			reason: "corridor hub token is not configured".to_string(),
		})?;

		let first = best_leg(pricing, token_in, hub, amount_in, slippage_bps).await?;
		let hub_amount = Decimal::from_str(&first.amount_out).map_err(|e| {
			QuoteError::ProcessingFailed {
				reason: format!("hub leg output {} is not a decimal: {}", first.amount_out, e),
			}
		})?;
		let second = best_leg(pricing, hub, token_out, hub_amount, slippage_bps).await?;

		let legs = vec![
			hub_leg(token_in, hub, amount_in, &first),
			hub_leg(hub, token_out, hub_amount, &second),
		];
		let comparison = Self::compare(&hub.symbol, direct.breakdown.market_cost_usd(), legs);
		debug!(
			"Corridor {} -> {}: direct ${:.4} vs hub ${:.4}",
			token_in.symbol, token_out.symbol, comparison.direct_cost_usd, comparison.hub_cost_usd
		);
		Ok(comparison)
	}
}

fn hub_leg(from: &TokenInfo, to: &TokenInfo, amount_in: Decimal, route: &RouteInfo) -> HubLeg {
	HubLeg {
		from_token: from.symbol.clone(),
		to_token: to.symbol.clone(),
		provider_id: route.provider_id.clone(),
		amount_in: amount_in.normalize().to_string(),
		amount_out: route.amount_out.clone(),
		total_cost_usd: route.total_cost_usd(),
	}
}

async fn best_leg(
	pricing: LegPricing<'_>,
	token_in: &TokenInfo,
	token_out: &TokenInfo,
	amount_in: Decimal,
	slippage_bps: u16,
) -> QuoteResult<RouteInfo> {
	let amount_base = to_base_units(&amount_in.normalize().to_string(), token_in.decimals)
		.map_err(|e| QuoteValidationError::InvalidAmount {
			reason: e.to_string(),
		})?;
	let request = ProviderQuoteRequest {
		chain_id: token_in.chain_id,
		token_in: token_in.clone(),
		token_out: token_out.clone(),
		amount_in: amount_base,
		slippage_bps,
		taker: None,
	};

	let result = pricing.gateway.quote(&request).await?;
	let snapshot = pricing.prices.snapshot(&[token_in, token_out]).await?;
	let input = NormalizationInput {
		token_in,
		token_out,
		amount_in,
		slippage_bps,
		is_corridor: false,
	};
	let quotes = result
		.quotes
		.into_iter()
		.map(|quote| {
			let kind = pricing.gateway.provider_kind(&quote.provider_id);
			(quote, kind)
		})
		.collect();
	let (routes, _) = pricing
		.normalizer
		.normalize_all(quotes, &input, pricing.gas, &snapshot);

	Ok(pricing.selector.select(routes)?.best)
}
