//! Short-TTL cache in front of the price feed
//!
//! Token prices fail closed: once an entry is older than the configured
//! maximum age it is refetched, and a failed refetch is an error rather than
//! a stale or zero price. Gas prices have no hard cap and fall back to the
//! last observed value when the feed is unavailable.

use crate::ttl_cache::TtlCache;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use ttv_types::{
	GasSnapshot, PriceError, PriceFeed, PriceResult, PriceSnapshot, TokenInfo,
};

#[derive(Debug, Clone)]
pub struct PriceCacheConfig {
	pub max_price_age: Duration,
	/// Gas prices older than this are refreshed before use
	pub gas_refresh: Duration,
}

impl Default for PriceCacheConfig {
	fn default() -> Self {
		Self {
			max_price_age: Duration::from_secs(60),
			gas_refresh: Duration::from_secs(15),
		}
	}
}

#[derive(Debug)]
pub struct PriceCache {
	feed: Arc<dyn PriceFeed>,
	token_prices: TtlCache<String, f64>,
	native_prices: TtlCache<u64, f64>,
	gas: DashMap<u64, GasSnapshot>,
	config: PriceCacheConfig,
}

fn validate_price(asset: &str, price: f64) -> PriceResult<f64> {
	if price.is_finite() && price > 0.0 {
		Ok(price)
	} else {
		Err(PriceError::InvalidPrice {
			asset: asset.to_string(),
			price,
		})
	}
}

impl PriceCache {
	pub fn new(feed: Arc<dyn PriceFeed>, config: PriceCacheConfig) -> Self {
		Self {
			feed,
			token_prices: TtlCache::new(config.max_price_age),
			native_prices: TtlCache::new(config.max_price_age),
			gas: DashMap::new(),
			config,
		}
	}

	/// USD price of one whole token, fetched if missing or older than the max age
	pub async fn token_price(&self, token: &TokenInfo) -> PriceResult<f64> {
		let key = token.cache_key();
		if let Some(price) = self.token_prices.get(&key) {
			return Ok(price);
		}
		self.refresh_token(token).await
	}

	/// USD price of a chain's native asset
	pub async fn native_price(&self, chain_id: u64) -> PriceResult<f64> {
		if let Some(price) = self.native_prices.get(&chain_id) {
			return Ok(price);
		}
		self.refresh_native(chain_id).await
	}

	/// Current gas price plus native asset price for `chain_id`
	pub async fn gas_snapshot(&self, chain_id: u64) -> PriceResult<GasSnapshot> {
		let native_price_usd = self.native_price(chain_id).await?;

		let cached = self.gas.get(&chain_id).map(|entry| *entry);
		let fresh = cached.filter(|snapshot| {
			let age = Utc::now().signed_duration_since(snapshot.observed_at);
			age.to_std().map(|age| age < self.config.gas_refresh).unwrap_or(true)
		});

		let gas_price_wei = match fresh {
			Some(snapshot) => snapshot.gas_price_wei,
			None => match self.refresh_gas(chain_id).await {
				Ok(price) => price,
				Err(e) => match cached {
					Some(previous) => {
						warn!(
							"Gas price refresh failed for chain {}, using last observed value: {}",
							chain_id, e
						);
						previous.gas_price_wei
					},
					None => return Err(e),
				},
			},
		};

		Ok(GasSnapshot {
			chain_id,
			gas_price_wei,
			native_price_usd,
			observed_at: self
				.gas
				.get(&chain_id)
				.map(|entry| entry.observed_at)
				.unwrap_or_else(Utc::now),
		})
	}

	/// Prices for every token a pipeline run needs, fixed for the rest of the run
	pub async fn snapshot(&self, tokens: &[&TokenInfo]) -> PriceResult<PriceSnapshot> {
		let mut snapshot = PriceSnapshot::new();
		for token in tokens {
			let price = self.token_price(token).await?;
			snapshot.insert(token, price);
		}
		Ok(snapshot)
	}

	/// Fetch and overwrite a token price
	pub async fn refresh_token(&self, token: &TokenInfo) -> PriceResult<f64> {
		let price = validate_price(&token.symbol, self.feed.token_price_usd(token).await?)?;
		debug!("Price for {} on chain {}: ${}", token.symbol, token.chain_id, price);
		self.token_prices.insert(token.cache_key(), price);
		Ok(price)
	}

	pub async fn refresh_native(&self, chain_id: u64) -> PriceResult<f64> {
		let price = validate_price(
			&format!("native:{}", chain_id),
			self.feed.native_price_usd(chain_id).await?,
		)?;
		self.native_prices.insert(chain_id, price);
		Ok(price)
	}

	/// Fetch and overwrite a chain's gas price
	pub async fn refresh_gas(&self, chain_id: u64) -> PriceResult<u128> {
		let gas_price_wei = self.feed.gas_price_wei(chain_id).await?;
		let native_price_usd = self
			.native_prices
			.get(&chain_id)
			.unwrap_or_default();
		self.gas.insert(
			chain_id,
			GasSnapshot {
				chain_id,
				gas_price_wei,
				native_price_usd,
				observed_at: Utc::now(),
			},
		);
		Ok(gas_price_wei)
	}

	/// Refresh every listed token and chain, logging individual failures
	pub async fn refresh_all(&self, tokens: &[TokenInfo], chains: &[u64]) -> usize {
		let mut failures = 0;
		for token in tokens {
			if let Err(e) = self.refresh_token(token).await {
				failures += 1;
				warn!("Price refresh failed for {}: {}", token.symbol, e);
			}
		}
		for &chain_id in chains {
			if let Err(e) = self.refresh_native(chain_id).await {
				failures += 1;
				warn!("Native price refresh failed for chain {}: {}", chain_id, e);
			}
			if let Err(e) = self.refresh_gas(chain_id).await {
				failures += 1;
				warn!("Gas price refresh failed for chain {}: {}", chain_id, e);
			}
		}
		failures
	}

	/// Background task refreshing prices and gas on a fixed interval
	pub fn spawn_refresher(
		self: Arc<Self>,
		tokens: Vec<TokenInfo>,
		chains: Vec<u64>,
		interval: Duration,
	) -> JoinHandle<()> {
		info!(
			"Starting price refresher: {} tokens, {} chains every {:?}",
			tokens.len(),
			chains.len(),
			interval
		);
		tokio::spawn(async move {
			let mut ticker = tokio::time::interval(interval);
			loop {
				ticker.tick().await;
				let failures = self.refresh_all(&tokens, &chains).await;
				self.token_prices.purge_expired();
				debug!("Price refresh cycle finished with {} failures", failures);
			}
		})
	}
}
