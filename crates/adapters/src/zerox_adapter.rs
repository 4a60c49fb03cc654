//! 0x Swap API adapter

use crate::client_cache::{AuthConfig, ClientStrategy};
use crate::{aggregator_token_address, build_url, fetch_json, gas_from_json, require_positive_amount};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};
use ttv_types::constants::limits::BPS_DENOMINATOR;
use ttv_types::{
	AdapterInfo, ProviderAdapter, ProviderError, ProviderFees, ProviderKind, ProviderQuote,
	ProviderQuoteRequest, ProviderResult, ProviderRuntimeConfig,
};

pub const ZEROX_ADAPTER_ID: &str = "zerox-v1";
const API_KEY_HEADER: &str = "0x-api-key";
const SUPPORTED_CHAINS: &[u64] = &[1, 10, 56, 137, 8453, 42161, 43114];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ZeroXQuoteResponse {
	buy_amount: String,
	#[serde(default)]
	data: Option<String>,
	to: String,
	#[serde(default)]
	value: Option<String>,
	#[serde(default)]
	allowance_target: Option<String>,
	#[serde(default)]
	gas: Option<serde_json::Value>,
	#[serde(default)]
	estimated_gas: Option<serde_json::Value>,
	#[serde(default)]
	protocol_fee: Option<String>,
}

/// Adapter for the 0x `/swap/v1/quote` endpoint
#[derive(Debug)]
pub struct ZeroXAdapter {
	adapter_info: AdapterInfo,
	client_strategy: ClientStrategy,
}

impl ZeroXAdapter {
	pub fn new(client_strategy: ClientStrategy) -> Self {
		Self {
			adapter_info: AdapterInfo::new(ZEROX_ADAPTER_ID, "0x Protocol", ProviderKind::Aggregator)
				.with_description("0x Swap API v1 aggregator"),
			client_strategy,
		}
	}

	fn convert_response(
		&self,
		response: ZeroXQuoteResponse,
		config: &ProviderRuntimeConfig,
	) -> ProviderResult<ProviderQuote> {
		require_positive_amount(&response.buy_amount, &config.provider_id)?;

		let estimated_gas = gas_from_json(response.gas.as_ref())
			.or_else(|| gas_from_json(response.estimated_gas.as_ref()));
		let protocol_fee_wei = response
			.protocol_fee
			.filter(|fee| fee.parse::<u128>().is_ok_and(|wei| wei > 0));

		Ok(ProviderQuote {
			provider_id: config.provider_id.clone(),
			provider_name: self.adapter_info.name.clone(),
			amount_out: response.buy_amount,
			call_data: response.data.filter(|d| !d.is_empty() && d != "0x"),
			to: response.to,
			value: response.value.unwrap_or_else(|| "0".to_string()),
			allowance_target: response.allowance_target,
			estimated_gas,
			fees: ProviderFees {
				lp_fee_bps: None,
				protocol_fee_wei,
			},
		})
	}
}

#[async_trait]
impl ProviderAdapter for ZeroXAdapter {
	fn adapter_info(&self) -> &AdapterInfo {
		&self.adapter_info
	}

	fn supports_chain(&self, chain_id: u64) -> bool {
		SUPPORTED_CHAINS.contains(&chain_id)
	}

	async fn get_quote(
		&self,
		request: &ProviderQuoteRequest,
		config: &ProviderRuntimeConfig,
	) -> ProviderResult<ProviderQuote> {
		if !self.supports_chain(request.chain_id) {
			return Err(ProviderError::ChainNotSupported {
				chain_id: request.chain_id,
				provider_id: config.provider_id.clone(),
			});
		}

		let mut url = build_url(&config.endpoint, "swap/v1/quote")?;
		{
			let mut query = url.query_pairs_mut();
			query
				.append_pair("sellToken", aggregator_token_address(&request.token_in))
				.append_pair("buyToken", aggregator_token_address(&request.token_out))
				.append_pair("sellAmount", &request.amount_in)
				.append_pair(
					"slippagePercentage",
					&(f64::from(request.slippage_bps) / BPS_DENOMINATOR).to_string(),
				);
			if let Some(taker) = &request.taker {
				query.append_pair("takerAddress", taker);
			}
		}

		debug!(
			"Requesting 0x quote {} -> {} on chain {}",
			request.token_in.symbol, request.token_out.symbol, request.chain_id
		);

		let client = self
			.client_strategy
			.client_for(config, &AuthConfig::api_key(API_KEY_HEADER, config.api_key.as_ref()))?;
		let response: ZeroXQuoteResponse =
			fetch_json(client.get(url), config.timeout_ms, &config.provider_id).await?;

		let quote = self.convert_response(response, config)?;
		info!(
			"0x quote for {}: {} out",
			config.provider_id, quote.amount_out
		);
		Ok(quote)
	}

	async fn health_check(&self, config: &ProviderRuntimeConfig) -> ProviderResult<bool> {
		let url = build_url(&config.endpoint, "swap/v1/sources")?;
		let client = self
			.client_strategy
			.client_for(config, &AuthConfig::api_key(API_KEY_HEADER, config.api_key.as_ref()))?;
		let healthy = client
			.get(url)
			.timeout(std::time::Duration::from_millis(config.timeout_ms))
			.send()
			.await
			.map(|response| response.status().is_success())
			.unwrap_or(false);
		Ok(healthy)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::client_cache::ClientCache;
	use crate::test_support::spawn_server;
	use axum::extract::Query;
	use axum::http::HeaderMap;
	use axum::routing::get;
	use axum::{Json, Router};
	use serde_json::json;
	use std::collections::HashMap;
	use ttv_types::{SecretString, TokenInfo};

	fn request() -> ProviderQuoteRequest {
		ProviderQuoteRequest {
			chain_id: 1,
			token_in: TokenInfo::new(1, "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48", "USDC", 6),
			token_out: TokenInfo::new(1, "0xdAC17F958D2ee523a2206206994597C13D831ec7", "USDT", 6),
			amount_in: "1000000000".to_string(),
			slippage_bps: 50,
			taker: None,
		}
	}

	fn adapter() -> ZeroXAdapter {
		ZeroXAdapter::new(ClientStrategy::Cached(ClientCache::new()))
	}

	#[test]
	fn test_convert_response() {
		let response: ZeroXQuoteResponse = serde_json::from_value(json!({
			"buyAmount": "999100000",
			"data": "0xd9627aa4",
			"to": "0xDef1C0ded9bec7F1a1670819833240f027b25EfF",
			"value": "0",
			"allowanceTarget": "0xDef1C0ded9bec7F1a1670819833240f027b25EfF",
			"gas": "180000",
			"estimatedGas": "150000",
			"protocolFee": "0"
		}))
		.unwrap();
		let config = ProviderRuntimeConfig::new("0x".to_string(), "http://x".to_string(), 1000);

		let quote = adapter().convert_response(response, &config).unwrap();
		assert_eq!(quote.provider_id, "0x");
		assert_eq!(quote.amount_out, "999100000");
		assert_eq!(quote.estimated_gas, Some(180_000));
		assert!(quote.is_executable());
		assert_eq!(quote.fees.protocol_fee_wei, None);
	}

	#[test]
	fn test_zero_buy_amount_is_no_liquidity() {
		let response: ZeroXQuoteResponse = serde_json::from_value(json!({
			"buyAmount": "0",
			"to": "0xDef1C0ded9bec7F1a1670819833240f027b25EfF"
		}))
		.unwrap();
		let config = ProviderRuntimeConfig::new("0x".to_string(), "http://x".to_string(), 1000);
		assert!(matches!(
			adapter().convert_response(response, &config),
			Err(ProviderError::NoLiquidity { .. })
		));
	}

	#[tokio::test]
	async fn test_get_quote_against_local_server() {
		let router = Router::new().route(
			"/swap/v1/quote",
			get(
				|headers: HeaderMap, Query(params): Query<HashMap<String, String>>| async move {
					assert_eq!(headers.get("0x-api-key").unwrap(), "test-key");
					assert_eq!(params["sellAmount"], "1000000000");
					assert_eq!(params["slippagePercentage"], "0.005");
					Json(json!({
						"buyAmount": "998700000",
						"data": "0xd9627aa4",
						"to": "0xDef1C0ded9bec7F1a1670819833240f027b25EfF",
						"value": "0",
						"estimatedGas": "165000",
						"protocolFee": "1500000000000000"
					}))
				},
			),
		);
		let base_url = spawn_server(router).await;

		let mut config = ProviderRuntimeConfig::new("0x".to_string(), base_url, 2_000);
		config.api_key = Some(SecretString::from("test-key"));

		let quote = adapter().get_quote(&request(), &config).await.unwrap();
		assert_eq!(quote.amount_out, "998700000");
		assert_eq!(quote.estimated_gas, Some(165_000));
		assert_eq!(quote.fees.protocol_fee_wei.as_deref(), Some("1500000000000000"));
	}

	#[tokio::test]
	async fn test_http_error_is_reported() {
		let router = Router::new().route(
			"/swap/v1/quote",
			get(|| async {
				(
					axum::http::StatusCode::BAD_REQUEST,
					Json(json!({"reason": "INSUFFICIENT_ASSET_LIQUIDITY"})),
				)
			}),
		);
		let base_url = spawn_server(router).await;
		let config = ProviderRuntimeConfig::new("0x".to_string(), base_url, 2_000);

		let err = adapter().get_quote(&request(), &config).await.unwrap_err();
		assert_eq!(err.status_code(), Some(400));
		assert!(err.to_string().contains("INSUFFICIENT_ASSET_LIQUIDITY"));
	}

	#[tokio::test]
	async fn test_unsupported_chain() {
		let mut req = request();
		req.chain_id = 8217;
		let config = ProviderRuntimeConfig::new("0x".to_string(), "http://127.0.0.1:1".to_string(), 100);
		assert!(matches!(
			adapter().get_quote(&req, &config).await,
			Err(ProviderError::ChainNotSupported { chain_id: 8217, .. })
		));
	}
}
