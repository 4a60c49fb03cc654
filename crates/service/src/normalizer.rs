//! Cost normalizer: turns a raw provider quote into a USD cost breakdown
//!
//! Pure with respect to its inputs: the same quote, gas snapshot and price
//! snapshot always produce the same breakdown. The service fee is left at
//! zero here and attached after ranking.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::HashMap;
use thiserror::Error;
use tracing::warn;
use ttv_config::ProviderFeeConfig;
use ttv_types::constants::limits::BPS_DENOMINATOR;
use ttv_types::models::from_base_units;
use ttv_types::{
	CostBreakdown, GasSnapshot, PriceError, PriceSnapshot, ProviderKind, ProviderQuote,
	RouteInfo, TokenInfo,
};

#[derive(Error, Debug)]
pub enum NormalizeError {
	#[error(transparent)]
	Price(#[from] PriceError),

	#[error("Provider {provider_id} returned an unusable amount: {reason}")]
	InvalidAmount { provider_id: String, reason: String },
}

/// The request-side facts a quote is normalized against
#[derive(Debug, Clone, Copy)]
pub struct NormalizationInput<'a> {
	pub token_in: &'a TokenInfo,
	pub token_out: &'a TokenInfo,
	/// Input amount in whole token units
	pub amount_in: Decimal,
	pub slippage_bps: u16,
	pub is_corridor: bool,
}

#[derive(Debug, Clone)]
pub struct NormalizerConfig {
	pub gas_buffer_bps: u32,
	pub default_gas_limit: u64,
	pub corridor_gas_limit: u64,
	/// Fee table per provider id
	pub fee_tables: HashMap<String, ProviderFeeConfig>,
}

impl Default for NormalizerConfig {
	fn default() -> Self {
		Self {
			gas_buffer_bps: 1_000,
			default_gas_limit: 200_000,
			corridor_gas_limit: 150_000,
			fee_tables: HashMap::new(),
		}
	}
}

#[derive(Debug, Clone)]
pub struct CostNormalizer {
	config: NormalizerConfig,
}

fn bps_of(amount_usd: f64, bps: u32) -> f64 {
	amount_usd * f64::from(bps) / BPS_DENOMINATOR
}

fn to_f64(value: Decimal, provider_id: &str) -> Result<f64, NormalizeError> {
	value.to_f64().ok_or_else(|| NormalizeError::InvalidAmount {
		provider_id: provider_id.to_string(),
		reason: format!("{} does not fit a float", value),
	})
}

impl CostNormalizer {
	pub fn new(config: NormalizerConfig) -> Self {
		Self { config }
	}

	pub fn fee_table(&self, provider_id: &str) -> ProviderFeeConfig {
		self.config
			.fee_tables
			.get(provider_id)
			.cloned()
			.unwrap_or_default()
	}

	/// Gas limit charged for a quote: the provider estimate, else the configured default
	pub fn gas_limit(&self, quote: &ProviderQuote, is_corridor: bool) -> u64 {
		quote.estimated_gas.filter(|gas| *gas > 0).unwrap_or(if is_corridor {
			self.config.corridor_gas_limit
		} else {
			self.config.default_gas_limit
		})
	}

	/// Output amount of a quote in whole units of the output token
	pub fn amount_out(
		&self,
		quote: &ProviderQuote,
		token_out: &TokenInfo,
	) -> Result<Decimal, NormalizeError> {
		from_base_units(&quote.amount_out, token_out.decimals).map_err(|e| {
			NormalizeError::InvalidAmount {
				provider_id: quote.provider_id.clone(),
				reason: e.to_string(),
			}
		})
	}

	pub fn normalize(
		&self,
		quote: &ProviderQuote,
		input: &NormalizationInput<'_>,
		gas: &GasSnapshot,
		prices: &PriceSnapshot,
	) -> Result<CostBreakdown, NormalizeError> {
		let price_in = prices.price_of(input.token_in)?;
		let price_out = prices.price_of(input.token_out)?;
		if !(gas.native_price_usd.is_finite() && gas.native_price_usd > 0.0) {
			return Err(PriceError::InvalidPrice {
				asset: format!("native:{}", gas.chain_id),
				price: gas.native_price_usd,
			}
			.into());
		}

		let amount_in_usd = to_f64(input.amount_in, &quote.provider_id)? * price_in;
		let amount_out_usd =
			to_f64(self.amount_out(quote, input.token_out)?, &quote.provider_id)? * price_out;

		let gas_limit = self.gas_limit(quote, input.is_corridor);
		let gas_cost_usd = gas.gas_cost_usd(gas_limit)
			* (1.0 + f64::from(self.config.gas_buffer_bps) / BPS_DENOMINATOR);

		let table = self.fee_table(&quote.provider_id);
		let reported_protocol_fee_usd = quote
			.fees
			.protocol_fee_wei
			.as_deref()
			.and_then(|wei| wei.parse::<u128>().ok())
			.map(|wei| wei as f64 / 1e18 * gas.native_price_usd)
			.unwrap_or(0.0);
		let protocol_fee_usd = bps_of(amount_in_usd, table.protocol_fee_bps) + reported_protocol_fee_usd;
		let aggregator_fee_usd = bps_of(amount_in_usd, table.aggregator_fee_bps);
		// The pool fee the provider actually routed through wins over the configured default
		let lp_fee_bps = quote.fees.lp_fee_bps.unwrap_or(table.lp_fee_bps);
		let lp_fee_usd = bps_of(amount_in_usd, lp_fee_bps);

		let slippage_usd = bps_of(amount_out_usd, u32::from(input.slippage_bps));

		Ok(CostBreakdown::market(
			amount_in_usd,
			amount_out_usd,
			gas_cost_usd,
			protocol_fee_usd,
			aggregator_fee_usd,
			lp_fee_usd,
			slippage_usd,
		))
	}

	/// Normalize and wrap into a route
	pub fn to_route(
		&self,
		quote: ProviderQuote,
		kind: ProviderKind,
		input: &NormalizationInput<'_>,
		gas: &GasSnapshot,
		prices: &PriceSnapshot,
	) -> Result<RouteInfo, NormalizeError> {
		let breakdown = self.normalize(&quote, input, gas, prices)?;
		let amount_out = self.amount_out(&quote, input.token_out)?.normalize().to_string();

		Ok(RouteInfo {
			provider_id: quote.provider_id.clone(),
			provider_name: quote.provider_name.clone(),
			kind,
			gas_estimate: self.gas_limit(&quote, input.is_corridor),
			amount_out,
			breakdown,
			is_corridor: input.is_corridor,
			quote,
		})
	}
}

impl CostNormalizer {
	/// Normalize every quote, dropping (and logging) the ones that cannot be priced
	pub fn normalize_all(
		&self,
		quotes: Vec<(ProviderQuote, ProviderKind)>,
		input: &NormalizationInput<'_>,
		gas: &GasSnapshot,
		prices: &PriceSnapshot,
	) -> (Vec<RouteInfo>, Vec<NormalizeError>) {
		let mut routes = Vec::with_capacity(quotes.len());
		let mut errors = Vec::new();
		for (quote, kind) in quotes {
			let provider_id = quote.provider_id.clone();
			match self.to_route(quote, kind, input, gas, prices) {
				Ok(route) => routes.push(route),
				Err(e) => {
					warn!("Dropping quote from {}: {}", provider_id, e);
					errors.push(e);
				},
			}
		}
		(routes, errors)
	}
}
