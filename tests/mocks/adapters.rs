//! Mock provider adapters
//!
//! The adapter prices a swap from a fixed USD table, so outputs stay
//! consistent with the price feed the server normalizes against.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ttv_aggregator::async_trait::async_trait;
use ttv_aggregator::models::{
	AdapterInfo, ProviderAdapter, ProviderError, ProviderFees, ProviderKind, ProviderQuote,
	ProviderQuoteRequest, ProviderResult, ProviderRuntimeConfig,
};

pub const ROUTER: &str = "0xDef1C0ded9bec7F1a1670819833240f027b25EfF";

/// Adapter quoting at the USD price ratio minus an optional haircut
#[derive(Debug, Clone)]
pub struct MockProviderAdapter {
	info: AdapterInfo,
	prices_usd: HashMap<String, f64>,
	/// Fraction of the fair output that is delivered
	efficiency: f64,
	lp_fee_bps: Option<u32>,
	delay: Duration,
	should_fail: bool,
	call_tracker: Arc<AtomicUsize>,
}

impl MockProviderAdapter {
	pub fn new(adapter_id: &str) -> Self {
		Self {
			info: AdapterInfo::new(adapter_id, adapter_id, ProviderKind::Aggregator),
			prices_usd: super::feeds::default_symbol_prices(),
			efficiency: 0.999,
			lp_fee_bps: None,
			delay: Duration::ZERO,
			should_fail: false,
			call_tracker: Arc::new(AtomicUsize::new(0)),
		}
	}

	pub fn amm(adapter_id: &str) -> Self {
		let mut adapter = Self::new(adapter_id);
		adapter.info = AdapterInfo::new(adapter_id, adapter_id, ProviderKind::Amm);
		adapter
	}

	/// Adapter that fails every quote with a 503
	pub fn failing(adapter_id: &str) -> Self {
		Self {
			should_fail: true,
			..Self::new(adapter_id)
		}
	}

	/// Adapter that answers only after `delay`
	pub fn slow(adapter_id: &str, delay: Duration) -> Self {
		Self {
			delay,
			..Self::new(adapter_id)
		}
	}

	pub fn with_lp_fee_bps(mut self, bps: u32) -> Self {
		self.lp_fee_bps = Some(bps);
		self
	}

	pub fn with_price(mut self, symbol: &str, price_usd: f64) -> Self {
		self.prices_usd.insert(symbol.to_string(), price_usd);
		self
	}

	pub fn call_count(&self) -> usize {
		self.call_tracker.load(Ordering::SeqCst)
	}

	fn amount_out(&self, request: &ProviderQuoteRequest) -> ProviderResult<String> {
		let price = |symbol: &str| {
			self.prices_usd
				.get(symbol)
				.copied()
				.ok_or_else(|| ProviderError::NoLiquidity {
					reason: format!("no market for {}", symbol),
				})
		};
		let price_in = price(&request.token_in.symbol)?;
		let price_out = price(&request.token_out.symbol)?;
		let amount_in: f64 = request
			.amount_in
			.parse()
			.map_err(|_| ProviderError::InvalidResponse {
				reason: format!("bad amount {}", request.amount_in),
			})?;

		let whole_in = amount_in / 10f64.powi(i32::from(request.token_in.decimals));
		let whole_out = whole_in * price_in / price_out * self.efficiency;
		let base_out = whole_out * 10f64.powi(i32::from(request.token_out.decimals));
		Ok(format!("{:.0}", base_out.floor()))
	}
}

#[async_trait]
impl ProviderAdapter for MockProviderAdapter {
	fn adapter_info(&self) -> &AdapterInfo {
		&self.info
	}

	async fn get_quote(
		&self,
		request: &ProviderQuoteRequest,
		config: &ProviderRuntimeConfig,
	) -> ProviderResult<ProviderQuote> {
		self.call_tracker.fetch_add(1, Ordering::SeqCst);
		if !self.delay.is_zero() {
			tokio::time::sleep(self.delay).await;
		}
		if self.should_fail {
			return Err(ProviderError::from_http_failure(503));
		}

		Ok(ProviderQuote {
			provider_id: config.provider_id.clone(),
			provider_name: self.info.name.clone(),
			amount_out: self.amount_out(request)?,
			call_data: Some("0x12aa3caf".to_string()),
			to: ROUTER.to_string(),
			value: "0".to_string(),
			allowance_target: Some(ROUTER.to_string()),
			estimated_gas: Some(150_000),
			fees: ProviderFees {
				lp_fee_bps: self.lp_fee_bps,
				protocol_fee_wei: None,
			},
		})
	}

	async fn health_check(&self, _config: &ProviderRuntimeConfig) -> ProviderResult<bool> {
		Ok(!self.should_fail)
	}
}
