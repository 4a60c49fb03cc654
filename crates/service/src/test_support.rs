//! Test doubles shared by the service unit tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use ttv_adapters::ProviderRegistry;
use ttv_types::{
	AdapterInfo, ChainInfo, CostBreakdown, PriceError, PriceFeed, PriceResult, Provider,
	ProviderAdapter, ProviderError, ProviderFees, ProviderKind, ProviderQuote,
	ProviderQuoteRequest, ProviderResult, ProviderRuntimeConfig, RouteInfo, TokenInfo,
};

pub const USDC: &str = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48";
pub const USDT: &str = "0xdAC17F958D2ee523a2206206994597C13D831ec7";
pub const DAI: &str = "0x6B175474E89094C44Da98b954EedeAC495271d0F";
pub const TRADER: &str = "0x1234567890123456789012345678901234567890";

pub fn usdc() -> TokenInfo {
	TokenInfo::new(1, USDC, "USDC", 6)
}

pub fn usdt() -> TokenInfo {
	TokenInfo::new(1, USDT, "USDT", 6)
}

pub fn dai() -> TokenInfo {
	TokenInfo::new(1, DAI, "DAI", 18)
}

pub fn chain(chain_id: u64) -> ChainInfo {
	ChainInfo {
		chain_id,
		name: format!("chain-{}", chain_id),
		rpc_url: "http://localhost:8545".to_string(),
		native_symbol: "ETH".to_string(),
		price_platform: "ethereum".to_string(),
		native_coin_id: "ethereum".to_string(),
	}
}

/// Executable route with the given breakdown
pub fn route(provider_id: &str, breakdown: CostBreakdown) -> RouteInfo {
	RouteInfo {
		provider_id: provider_id.to_string(),
		provider_name: provider_id.to_string(),
		kind: ProviderKind::Aggregator,
		quote: ProviderQuote {
			provider_id: provider_id.to_string(),
			provider_name: provider_id.to_string(),
			amount_out: "999000000".to_string(),
			call_data: Some("0xdeadbeef".to_string()),
			to: "0xDef1C0ded9bec7F1a1670819833240f027b25EfF".to_string(),
			value: "0".to_string(),
			allowance_target: Some("0xDef1C0ded9bec7F1a1670819833240f027b25EfF".to_string()),
			estimated_gas: Some(150_000),
			fees: ProviderFees::default(),
		},
		amount_out: "999".to_string(),
		gas_estimate: 150_000,
		breakdown,
		is_corridor: false,
	}
}

#[derive(Debug, Clone, Copy)]
pub enum Failure {
	Status(u16),
	NoLiquidity,
}

impl Failure {
	fn to_error(self) -> ProviderError {
		match self {
			Failure::Status(code) => ProviderError::from_http_failure(code),
			Failure::NoLiquidity => ProviderError::NoLiquidity {
				reason: "no pool".to_string(),
			},
		}
	}
}

/// Adapter returning a fixed outcome, optionally after a delay
#[derive(Debug)]
pub struct StaticAdapter {
	info: AdapterInfo,
	amount_out: Option<String>,
	failure: Option<Failure>,
	gas: Option<u64>,
	fees: ProviderFees,
	delay: Duration,
	/// Output multiplier applied per requested amount, in parts per million
	rate_ppm: Option<u128>,
}

impl StaticAdapter {
	pub fn ok(adapter_id: &str, amount_out: &str) -> Self {
		Self {
			info: AdapterInfo::new(adapter_id, adapter_id, ProviderKind::Aggregator),
			amount_out: Some(amount_out.to_string()),
			failure: None,
			gas: Some(150_000),
			fees: ProviderFees::default(),
			delay: Duration::ZERO,
			rate_ppm: None,
		}
	}

	/// Output proportional to the input amount
	pub fn rate(adapter_id: &str, rate_ppm: u128) -> Self {
		Self {
			amount_out: None,
			rate_ppm: Some(rate_ppm),
			..Self::ok(adapter_id, "0")
		}
	}

	pub fn failing(adapter_id: &str, failure: Failure) -> Self {
		Self {
			amount_out: None,
			failure: Some(failure),
			..Self::ok(adapter_id, "0")
		}
	}

	pub fn with_delay(mut self, delay: Duration) -> Self {
		self.delay = delay;
		self
	}

	pub fn with_gas(mut self, gas: Option<u64>) -> Self {
		self.gas = gas;
		self
	}

	pub fn with_lp_fee_bps(mut self, bps: u32) -> Self {
		self.fees.lp_fee_bps = Some(bps);
		self
	}
}

#[async_trait]
impl ProviderAdapter for StaticAdapter {
	fn adapter_info(&self) -> &AdapterInfo {
		&self.info
	}

	async fn get_quote(
		&self,
		request: &ProviderQuoteRequest,
		config: &ProviderRuntimeConfig,
	) -> ProviderResult<ProviderQuote> {
		if !self.delay.is_zero() {
			tokio::time::sleep(self.delay).await;
		}
		if let Some(failure) = self.failure {
			return Err(failure.to_error());
		}
		let amount_out = match (self.rate_ppm, &self.amount_out) {
			(Some(rate), _) => {
				let amount_in: u128 = request.amount_in.parse().unwrap_or_default();
				(amount_in * rate / 1_000_000).to_string()
			},
			(None, Some(amount)) => amount.clone(),
			(None, None) => return Err(Failure::NoLiquidity.to_error()),
		};
		Ok(ProviderQuote {
			provider_id: config.provider_id.clone(),
			provider_name: self.info.name.clone(),
			amount_out,
			call_data: Some("0xdeadbeef".to_string()),
			to: "0xDef1C0ded9bec7F1a1670819833240f027b25EfF".to_string(),
			value: "0".to_string(),
			allowance_target: Some("0xDef1C0ded9bec7F1a1670819833240f027b25EfF".to_string()),
			estimated_gas: self.gas,
			fees: self.fees.clone(),
		})
	}

	async fn health_check(&self, _config: &ProviderRuntimeConfig) -> ProviderResult<bool> {
		Ok(true)
	}
}

pub fn registry_with(adapters: Vec<StaticAdapter>) -> Arc<ProviderRegistry> {
	let mut registry = ProviderRegistry::new();
	for adapter in adapters {
		registry.register(Arc::new(adapter));
	}
	Arc::new(registry)
}

pub fn provider(provider_id: &str, adapter_id: &str, timeout_ms: u64) -> Provider {
	Provider::new(provider_id, adapter_id, "http://localhost", timeout_ms)
}

/// Price feed answering from fixed tables
#[derive(Debug, Default)]
pub struct StaticPriceFeed {
	pub prices: HashMap<String, f64>,
	pub native_usd: f64,
	pub gas_price_wei: u128,
}

impl StaticPriceFeed {
	pub fn new(native_usd: f64, gas_price_wei: u128) -> Self {
		Self {
			prices: HashMap::new(),
			native_usd,
			gas_price_wei,
		}
	}

	pub fn with_price(mut self, token: &TokenInfo, price: f64) -> Self {
		self.prices.insert(token.cache_key(), price);
		self
	}
}

#[async_trait]
impl PriceFeed for StaticPriceFeed {
	async fn token_price_usd(&self, token: &TokenInfo) -> PriceResult<f64> {
		self.prices
			.get(&token.cache_key())
			.copied()
			.ok_or_else(|| PriceError::Unavailable {
				asset: token.symbol.clone(),
				reason: "not configured".to_string(),
			})
	}

	async fn native_price_usd(&self, _chain_id: u64) -> PriceResult<f64> {
		Ok(self.native_usd)
	}

	async fn gas_price_wei(&self, _chain_id: u64) -> PriceResult<u128> {
		Ok(self.gas_price_wei)
	}
}
