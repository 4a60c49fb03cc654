//! Quote lifecycle: the request pipeline, issued quotes and execution
//!
//! A quote request is validated, fanned out to every provider, normalized,
//! ranked, risk gated and priced before it is issued with a fixed lifetime.
//! The whole pipeline runs under one deadline; when it fires, every
//! in-flight provider call is dropped with it.

use crate::corridor::{CorridorOptimizer, LegPricing};
use crate::execution::ExecutionPlanner;
use crate::fees::{FeeEngine, FeeRequest};
use crate::gateway::ProviderGateway;
use crate::normalizer::{CostNormalizer, NormalizationInput, NormalizeError};
use crate::price_cache::PriceCache;
use crate::risk::RiskGate;
use crate::route_selector::{annotate_savings, RouteSelector};
use crate::ttl_cache::TtlCache;
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use ttv_config::Settings;
use ttv_types::constants::limits::{DEFAULT_PIPELINE_TIMEOUT_MS, MAX_SLIPPAGE_BPS, QUOTE_TTL_SECS};
use ttv_types::models::to_base_units;
use ttv_types::quotes::validate_usd_bounds;
use ttv_types::{
	BuildTransactionRequest, ExecutionError, ExecutionPlan, ProviderQuoteRequest, QuoteError,
	QuoteRequest, QuoteResponse, QuoteResult, QuoteValidationError, RouteInfo, TokenRegistry,
};
use uuid::Uuid;

/// Issued quotes stay readable this long past expiry so late lookups
/// report `Expired` instead of `NotFound`
const EXPIRED_QUOTE_GRACE_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct QuoteServiceConfig {
	pub ttl_secs: i64,
	pub pipeline_timeout_ms: u64,
	pub min_amount_usd: f64,
	pub max_amount_usd: f64,
	pub max_slippage_bps: u16,
	pub expired_grace: Duration,
}

impl Default for QuoteServiceConfig {
	fn default() -> Self {
		Self {
			ttl_secs: QUOTE_TTL_SECS,
			pipeline_timeout_ms: DEFAULT_PIPELINE_TIMEOUT_MS,
			min_amount_usd: 1.0,
			max_amount_usd: 10_000_000.0,
			max_slippage_bps: MAX_SLIPPAGE_BPS,
			expired_grace: Duration::from_secs(EXPIRED_QUOTE_GRACE_SECS),
		}
	}
}

impl From<&Settings> for QuoteServiceConfig {
	fn from(settings: &Settings) -> Self {
		Self {
			ttl_secs: settings.quote.ttl_secs,
			pipeline_timeout_ms: settings.timeouts.global_ms,
			min_amount_usd: settings.quote.min_amount_usd,
			max_amount_usd: settings.quote.max_amount_usd,
			max_slippage_bps: settings.quote.max_slippage_bps,
			expired_grace: Duration::from_secs(EXPIRED_QUOTE_GRACE_SECS),
		}
	}
}

/// Collaborators the quote pipeline is wired from
pub struct QuoteServiceParts {
	pub gateway: Arc<ProviderGateway>,
	pub normalizer: Arc<CostNormalizer>,
	pub selector: Arc<RouteSelector>,
	pub prices: Arc<PriceCache>,
	pub risk: Arc<RiskGate>,
	pub fees: Arc<FeeEngine>,
	pub corridor: Arc<CorridorOptimizer>,
	pub tokens: Arc<TokenRegistry>,
}

/// Trait for quote lifecycle operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuoteServiceTrait: Send + Sync {
	/// Run the full pipeline and issue a quote
	async fn get_quote(&self, request: QuoteRequest) -> QuoteResult<QuoteResponse>;

	/// Look up an issued quote that has not yet expired
	async fn get_issued(&self, quote_id: &str) -> QuoteResult<QuoteResponse>;

	/// Build approve and swap transactions for an issued quote
	async fn build_transaction(
		&self,
		request: BuildTransactionRequest,
	) -> Result<ExecutionPlan, ExecutionError>;
}

pub struct QuoteService {
	config: QuoteServiceConfig,
	gateway: Arc<ProviderGateway>,
	normalizer: Arc<CostNormalizer>,
	selector: Arc<RouteSelector>,
	prices: Arc<PriceCache>,
	risk: Arc<RiskGate>,
	fees: Arc<FeeEngine>,
	corridor: Arc<CorridorOptimizer>,
	tokens: Arc<TokenRegistry>,
	planner: ExecutionPlanner,
	issued: TtlCache<String, QuoteResponse>,
}

impl QuoteService {
	pub fn new(parts: QuoteServiceParts, config: QuoteServiceConfig) -> Self {
		let retention = Duration::from_secs(config.ttl_secs.max(0) as u64) + config.expired_grace;
		Self {
			config,
			gateway: parts.gateway,
			normalizer: parts.normalizer,
			selector: parts.selector,
			prices: parts.prices,
			risk: parts.risk,
			fees: parts.fees,
			corridor: parts.corridor,
			tokens: parts.tokens,
			planner: ExecutionPlanner::new(),
			issued: TtlCache::new(retention),
		}
	}

	pub fn config(&self) -> &QuoteServiceConfig {
		&self.config
	}

	/// Number of issued quotes still held, expired ones within grace included
	pub fn issued_count(&self) -> usize {
		self.issued.len()
	}

	/// Drop quotes past their grace period
	pub fn purge_expired(&self) -> usize {
		self.issued.purge_expired()
	}

	/// Periodically drop issued quotes past their grace period
	pub fn spawn_purger(&self, period: Duration) -> tokio::task::JoinHandle<()> {
		self.issued.spawn_cleanup(period)
	}

	async fn run_pipeline(&self, request: QuoteRequest) -> QuoteResult<QuoteResponse> {
		let amount = request.validate(self.config.max_slippage_bps)?;

		if self.gateway.chain(request.chain_id).is_none() {
			return Err(QuoteValidationError::UnsupportedChain {
				chain_id: request.chain_id,
			}
			.into());
		}
		let token_in = self.resolve_token(request.chain_id, &request.from_token)?;
		let token_out = self.resolve_token(request.chain_id, &request.to_token)?;
		if token_in.same_token(&token_out) {
			return Err(QuoteValidationError::SameToken {
				token: token_in.symbol.clone(),
			}
			.into());
		}

		let price_in = self.prices.token_price(&token_in).await?;
		let amount_usd = usd_value(amount, price_in)?;
		validate_usd_bounds(
			amount_usd,
			self.config.min_amount_usd,
			self.config.max_amount_usd,
		)?;

		let gas = self.prices.gas_snapshot(request.chain_id).await?;
		let amount_base = to_base_units(&amount.normalize().to_string(), token_in.decimals)
			.map_err(|e| QuoteValidationError::InvalidAmount {
				reason: e.to_string(),
			})?;

		let provider_request = ProviderQuoteRequest {
			chain_id: request.chain_id,
			token_in: token_in.clone(),
			token_out: token_out.clone(),
			amount_in: amount_base,
			slippage_bps: request.slippage_bps,
			taker: request.trader.clone(),
		};
		let fan_out = self.gateway.quote(&provider_request).await?;

		let snapshot = self.prices.snapshot(&[&token_in, &token_out]).await?;
		let input = NormalizationInput {
			token_in: &token_in,
			token_out: &token_out,
			amount_in: amount,
			slippage_bps: request.slippage_bps,
			is_corridor: self.corridor.applies(&token_in, &token_out),
		};
		let quotes = fan_out
			.quotes
			.into_iter()
			.map(|quote| {
				let kind = self.gateway.provider_kind(&quote.provider_id);
				(quote, kind)
			})
			.collect();
		let (routes, errors) = self.normalizer.normalize_all(quotes, &input, &gas, &snapshot);
		if routes.is_empty() {
			return Err(no_routes_error(errors));
		}

		let ranked = self.selector.select(routes)?;
		let risk = self
			.risk
			.assess_pair(&token_in, &token_out, amount_usd)
			.await?;

		let fee = self
			.fees
			.calculate(&FeeRequest {
				amount_usd,
				mode: request.fee_mode,
				trader: request.trader.clone(),
				partner_id: request.partner_id.clone(),
				savings_usd: Some(ranked.savings_vs_next_usd),
			})
			.await?;

		let mut best = ranked.best;
		let mut alternatives = ranked.alternatives;
		attach_service_fee(&mut best, fee.fee_usd);
		for route in alternatives.iter_mut() {
			attach_service_fee(route, fee.fee_usd);
		}
		annotate_savings(&mut best, &mut alternatives);

		let corridor = if input.is_corridor && self.corridor.is_enabled() {
			let pricing = LegPricing {
				gateway: &self.gateway,
				normalizer: &self.normalizer,
				selector: &self.selector,
				prices: &self.prices,
				gas: &gas,
			};
			match self
				.corridor
				.evaluate(
					pricing,
					&token_in,
					&token_out,
					amount,
					request.slippage_bps,
					&best,
				)
				.await
			{
				Ok(comparison) => Some(comparison),
				Err(e) => {
					warn!(
						"Corridor comparison for {} -> {} unavailable: {}",
						token_in.symbol, token_out.symbol, e
					);
					None
				},
			}
		} else {
			None
		};

		// Without a trader the route has no recipient to execute for
		let executable =
			risk.can_proceed && best.quote.is_executable() && request.trader.is_some();
		if !risk.can_proceed {
			best = best.without_call_data();
			alternatives = alternatives
				.iter()
				.map(RouteInfo::without_call_data)
				.collect();
		}

		let issued_at = Utc::now();
		let response = QuoteResponse {
			quote_id: Uuid::new_v4().to_string(),
			chain_id: request.chain_id,
			from_token: token_in,
			to_token: token_out,
			amount_in: amount.normalize().to_string(),
			slippage_bps: request.slippage_bps,
			breakdown: best.breakdown.clone(),
			best_route: best,
			alternatives,
			fee,
			risk,
			executable,
			corridor,
			trader: request.trader,
			issued_at,
			expires_at: issued_at + ChronoDuration::seconds(self.config.ttl_secs),
		};

		info!(
			"Issued quote {} via {}: total cost ${:.4}, risk {} ({})",
			response.quote_id,
			response.best_route.provider_id,
			response.breakdown.total_cost_usd,
			response.risk.risk_score,
			if response.executable { "executable" } else { "blocked" }
		);

		self.issued
			.insert(response.quote_id.clone(), response.clone());
		Ok(response)
	}

	fn resolve_token(
		&self,
		chain_id: u64,
		token: &str,
	) -> Result<ttv_types::TokenInfo, QuoteValidationError> {
		self.tokens
			.resolve(chain_id, token)
			.cloned()
			.ok_or_else(|| QuoteValidationError::UnsupportedToken {
				chain_id,
				token: token.to_string(),
			})
	}
}

/// USD value of a human-unit amount at `price_usd`
fn usd_value(amount: Decimal, price_usd: f64) -> Result<f64, QuoteValidationError> {
	amount
		.to_f64()
		.map(|amount| amount * price_usd)
		.filter(|usd| usd.is_finite())
		.ok_or_else(|| QuoteValidationError::InvalidAmount {
			reason: format!("cannot value {} at ${} per token", amount, price_usd),
		})
}

fn attach_service_fee(route: &mut RouteInfo, fee_usd: f64) {
	route.breakdown = route.breakdown.clone().with_service_fee(fee_usd);
}

/// Every quote was dropped during normalization
fn no_routes_error(errors: Vec<NormalizeError>) -> QuoteError {
	let mut reasons = Vec::with_capacity(errors.len());
	for error in errors {
		match error {
			NormalizeError::Price(price) => return QuoteError::StalePrice(price),
			other => reasons.push(other.to_string()),
		}
	}
	QuoteError::ProcessingFailed {
		reason: format!("no provider quote could be normalized: {}", reasons.join("; ")),
	}
}

#[async_trait]
impl QuoteServiceTrait for QuoteService {
	async fn get_quote(&self, request: QuoteRequest) -> QuoteResult<QuoteResponse> {
		let timeout_ms = self.config.pipeline_timeout_ms;
		debug!(
			"Quote request {} -> {} on chain {} (amount {})",
			request.from_token, request.to_token, request.chain_id, request.amount
		);
		match tokio::time::timeout(Duration::from_millis(timeout_ms), self.run_pipeline(request))
			.await
		{
			Ok(result) => result,
			Err(_) => {
				warn!("Quote pipeline exceeded {}ms", timeout_ms);
				Err(QuoteError::Timeout { timeout_ms })
			},
		}
	}

	async fn get_issued(&self, quote_id: &str) -> QuoteResult<QuoteResponse> {
		let quote = self
			.issued
			.get(&quote_id.to_string())
			.ok_or_else(|| QuoteError::NotFound {
				quote_id: quote_id.to_string(),
			})?;
		if quote.is_expired() {
			return Err(QuoteError::Expired {
				quote_id: quote_id.to_string(),
			});
		}
		Ok(quote)
	}

	async fn build_transaction(
		&self,
		request: BuildTransactionRequest,
	) -> Result<ExecutionPlan, ExecutionError> {
		let quote = self
			.issued
			.get(&request.quote_id)
			.ok_or_else(|| ExecutionError::QuoteNotFound {
				quote_id: request.quote_id.clone(),
			})?;
		self.planner.plan(&quote, &request.trader, Utc::now())
	}
}
