//! Static price feed keyed by token symbol

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::RwLock;

use ttv_aggregator::async_trait::async_trait;
use ttv_aggregator::models::{PriceError, PriceFeed, PriceResult, TokenInfo};

pub const USD_KRW_RATE: f64 = 1300.0;

pub fn default_symbol_prices() -> HashMap<String, f64> {
	HashMap::from([
		("USDC".to_string(), 1.0),
		("USDT".to_string(), 1.0),
		("DAI".to_string(), 1.0),
		("WETH".to_string(), 2000.0),
		("KRWx".to_string(), 1.0 / USD_KRW_RATE),
		("KRT".to_string(), 1.0 / USD_KRW_RATE),
	])
}

/// Feed answering from a mutable symbol table
#[derive(Debug)]
pub struct StaticPriceFeed {
	prices: RwLock<HashMap<String, f64>>,
	native_usd: f64,
	gas_price_wei: u128,
}

impl Default for StaticPriceFeed {
	fn default() -> Self {
		Self {
			prices: RwLock::new(default_symbol_prices()),
			native_usd: 2000.0,
			// 1 gwei
			gas_price_wei: 1_000_000_000,
		}
	}
}

impl StaticPriceFeed {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_price(self, symbol: &str, price_usd: f64) -> Self {
		self.set_price(symbol, price_usd);
		self
	}

	pub fn set_price(&self, symbol: &str, price_usd: f64) {
		self.prices
			.write()
			.unwrap()
			.insert(symbol.to_string(), price_usd);
	}
}

#[async_trait]
impl PriceFeed for StaticPriceFeed {
	async fn token_price_usd(&self, token: &TokenInfo) -> PriceResult<f64> {
		self.prices
			.read()
			.unwrap()
			.get(&token.symbol)
			.copied()
			.ok_or_else(|| PriceError::Unavailable {
				asset: token.symbol.clone(),
				reason: "not in static table".to_string(),
			})
	}

	async fn native_price_usd(&self, _chain_id: u64) -> PriceResult<f64> {
		Ok(self.native_usd)
	}

	async fn gas_price_wei(&self, _chain_id: u64) -> PriceResult<u128> {
		Ok(self.gas_price_wei)
	}
}
