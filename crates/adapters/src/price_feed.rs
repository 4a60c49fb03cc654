//! HTTP price feed: CoinGecko for USD prices, chain RPC for gas prices

use crate::client_cache::{AuthConfig, ClientCache};
use crate::{build_url, fetch_json};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;
use ttv_types::{
	ChainInfo, PriceError, PriceFeed, PriceResult, ProviderError, ProviderRuntimeConfig,
	SecretString, TokenInfo,
};

const PRICE_FEED_ID: &str = "coingecko";
const API_KEY_HEADER: &str = "x-cg-pro-api-key";

type PriceTable = HashMap<String, HashMap<String, f64>>;

/// Live `PriceFeed` backed by the CoinGecko simple price API
#[derive(Debug, Clone)]
pub struct HttpPriceFeed {
	cache: ClientCache,
	runtime: ProviderRuntimeConfig,
	chains: HashMap<u64, ChainInfo>,
}

impl HttpPriceFeed {
	pub fn new(
		cache: ClientCache,
		base_url: &str,
		api_key: Option<SecretString>,
		chains: impl IntoIterator<Item = ChainInfo>,
		timeout_ms: u64,
	) -> Self {
		let mut runtime =
			ProviderRuntimeConfig::new(PRICE_FEED_ID.to_string(), base_url.to_string(), timeout_ms);
		runtime.api_key = api_key;
		Self {
			cache,
			runtime,
			chains: chains.into_iter().map(|c| (c.chain_id, c)).collect(),
		}
	}

	fn chain(&self, chain_id: u64) -> PriceResult<&ChainInfo> {
		self.chains
			.get(&chain_id)
			.ok_or(PriceError::UnsupportedChain { chain_id })
	}

	async fn fetch_table(&self, path: &str, query: &[(&str, &str)]) -> PriceResult<PriceTable> {
		let mut url = build_url(&self.runtime.endpoint, path).map_err(price_error)?;
		url.query_pairs_mut().extend_pairs(query);

		let client = self
			.cache
			.get_client_with_auth(
				&self.runtime,
				&AuthConfig::api_key(API_KEY_HEADER, self.runtime.api_key.as_ref()),
			)
			.map_err(price_error)?;
		fetch_json(client.get(url), self.runtime.timeout_ms, PRICE_FEED_ID)
			.await
			.map_err(price_error)
	}
}

fn price_error(err: ProviderError) -> PriceError {
	match err {
		ProviderError::HttpError(e) => PriceError::HttpError(e),
		other => PriceError::InvalidResponse {
			reason: other.to_string(),
		},
	}
}

fn extract_usd(table: &PriceTable, key: &str, asset: &str) -> PriceResult<f64> {
	let price = table
		.get(key)
		.and_then(|quotes| quotes.get("usd"))
		.copied()
		.ok_or_else(|| PriceError::Unavailable {
			asset: asset.to_string(),
			reason: "no USD quote in price feed response".to_string(),
		})?;
	if !price.is_finite() || price <= 0.0 {
		return Err(PriceError::InvalidPrice {
			asset: asset.to_string(),
			price,
		});
	}
	Ok(price)
}

#[async_trait]
impl PriceFeed for HttpPriceFeed {
	async fn token_price_usd(&self, token: &TokenInfo) -> PriceResult<f64> {
		if token.is_native() {
			return self.native_price_usd(token.chain_id).await;
		}
		let chain = self.chain(token.chain_id)?;
		let address = token.address.to_lowercase();
		debug!("Fetching USD price for {} on {}", token.symbol, chain.name);

		let table = self
			.fetch_table(
				&format!("simple/token_price/{}", chain.price_platform),
				&[("contract_addresses", address.as_str()), ("vs_currencies", "usd")],
			)
			.await?;
		extract_usd(&table, &address, &token.symbol)
	}

	async fn native_price_usd(&self, chain_id: u64) -> PriceResult<f64> {
		let chain = self.chain(chain_id)?;
		let table = self
			.fetch_table(
				"simple/price",
				&[("ids", chain.native_coin_id.as_str()), ("vs_currencies", "usd")],
			)
			.await?;
		extract_usd(&table, &chain.native_coin_id, &chain.native_symbol)
	}

	async fn gas_price_wei(&self, chain_id: u64) -> PriceResult<u128> {
		let chain = self.chain(chain_id)?;
		let client = self
			.cache
			.get_client_with_auth(&self.runtime, &AuthConfig::None)
			.map_err(price_error)?;
		Ok(crate::rpc::gas_price(
			&client,
			&chain.rpc_url,
			Duration::from_millis(self.runtime.timeout_ms),
		)
		.await?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_support::spawn_server;
	use axum::extract::{Path, Query};
	use axum::routing::{get, post};
	use axum::{Json, Router};
	use serde_json::json;

	fn chain(rpc_url: &str) -> ChainInfo {
		ChainInfo {
			chain_id: 1,
			name: "Ethereum".to_string(),
			rpc_url: rpc_url.to_string(),
			native_symbol: "ETH".to_string(),
			price_platform: "ethereum".to_string(),
			native_coin_id: "ethereum".to_string(),
		}
	}

	async fn feed() -> HttpPriceFeed {
		let router = Router::new()
			.route(
				"/simple/token_price/{platform}",
				get(
					|Path(platform): Path<String>,
					 Query(params): Query<HashMap<String, String>>| async move {
						assert_eq!(platform, "ethereum");
						let address = params["contract_addresses"].clone();
						let price = if address == "0xdac17f958d2ee523a2206206994597c13d831ec7" {
							0.0
						} else {
							0.9998
						};
						let mut body = HashMap::new();
						body.insert(address, HashMap::from([("usd".to_string(), price)]));
						Json(body)
					},
				),
			)
			.route(
				"/simple/price",
				get(|| async { Json(json!({ "ethereum": { "usd": 3012.5 } })) }),
			)
			.route(
				"/rpc",
				post(|| async { Json(json!({ "jsonrpc": "2.0", "id": 1, "result": "0x4a817c800" })) }),
			);
		let base_url = spawn_server(router).await;
		HttpPriceFeed::new(
			ClientCache::new(),
			&base_url,
			None,
			[chain(&format!("{}/rpc", base_url))],
			2_000,
		)
	}

	#[tokio::test]
	async fn test_token_price_is_keyed_by_lowercase_address() {
		let feed = feed().await;
		let usdc = TokenInfo::new(1, "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48", "USDC", 6);
		assert_eq!(feed.token_price_usd(&usdc).await.unwrap(), 0.9998);
	}

	#[tokio::test]
	async fn test_zero_price_is_rejected() {
		let feed = feed().await;
		let usdt = TokenInfo::new(1, "0xdAC17F958D2ee523a2206206994597C13D831ec7", "USDT", 6);
		assert!(matches!(
			feed.token_price_usd(&usdt).await,
			Err(PriceError::InvalidPrice { .. })
		));
	}

	#[tokio::test]
	async fn test_native_price_and_gas() {
		let feed = feed().await;
		let eth = TokenInfo::new(1, "0x0000000000000000000000000000000000000000", "ETH", 18);
		assert_eq!(feed.token_price_usd(&eth).await.unwrap(), 3012.5);
		assert_eq!(feed.gas_price_wei(1).await.unwrap(), 20_000_000_000);
	}

	#[tokio::test]
	async fn test_unknown_chain() {
		let feed = feed().await;
		assert!(matches!(
			feed.gas_price_wei(8217).await,
			Err(PriceError::UnsupportedChain { chain_id: 8217 })
		));
	}
}
