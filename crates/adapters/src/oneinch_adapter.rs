//! 1inch Swap API adapter

use crate::client_cache::{AuthConfig, ClientStrategy};
use crate::{aggregator_token_address, build_url, fetch_json, gas_from_json, require_positive_amount};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};
use ttv_types::constants::limits::NATIVE_TOKEN_ADDRESS;
use ttv_types::{
	AdapterInfo, ProviderAdapter, ProviderError, ProviderFees, ProviderKind, ProviderQuote,
	ProviderQuoteRequest, ProviderResult, ProviderRuntimeConfig,
};

pub const ONEINCH_ADAPTER_ID: &str = "oneinch-v5";
const SUPPORTED_CHAINS: &[u64] = &[1, 10, 56, 100, 137, 250, 324, 8217, 8453, 42161, 43114];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OneInchTx {
	to: String,
	data: String,
	#[serde(default)]
	value: Option<String>,
	#[serde(default)]
	gas: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OneInchSwapResponse {
	#[serde(alias = "toTokenAmount")]
	to_amount: String,
	tx: OneInchTx,
}

/// Adapter for the 1inch `/{chainId}/swap` endpoint
#[derive(Debug)]
pub struct OneInchAdapter {
	adapter_info: AdapterInfo,
	client_strategy: ClientStrategy,
}

impl OneInchAdapter {
	pub fn new(client_strategy: ClientStrategy) -> Self {
		Self {
			adapter_info: AdapterInfo::new(ONEINCH_ADAPTER_ID, "1inch", ProviderKind::Aggregator)
				.with_description("1inch Swap API v5 aggregator"),
			client_strategy,
		}
	}

	fn convert_response(
		&self,
		response: OneInchSwapResponse,
		config: &ProviderRuntimeConfig,
	) -> ProviderResult<ProviderQuote> {
		require_positive_amount(&response.to_amount, &config.provider_id)?;
		let tx = response.tx;

		Ok(ProviderQuote {
			provider_id: config.provider_id.clone(),
			provider_name: self.adapter_info.name.clone(),
			amount_out: response.to_amount,
			estimated_gas: gas_from_json(tx.gas.as_ref()).filter(|gas| *gas > 0),
			call_data: Some(tx.data).filter(|d| !d.is_empty() && d != "0x"),
			// The router is both the swap target and the spender
			allowance_target: Some(tx.to.clone()),
			to: tx.to,
			value: tx.value.unwrap_or_else(|| "0".to_string()),
			fees: ProviderFees::default(),
		})
	}
}

#[async_trait]
impl ProviderAdapter for OneInchAdapter {
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

		let mut url = build_url(&config.endpoint, &format!("{}/swap", request.chain_id))?;
		url.query_pairs_mut()
			.append_pair("fromTokenAddress", aggregator_token_address(&request.token_in))
			.append_pair("toTokenAddress", aggregator_token_address(&request.token_out))
			.append_pair("amount", &request.amount_in)
			.append_pair("slippage", &(f64::from(request.slippage_bps) / 100.0).to_string())
			.append_pair(
				"fromAddress",
				request.taker.as_deref().unwrap_or(NATIVE_TOKEN_ADDRESS),
			)
			.append_pair("disableEstimate", "true");

		debug!(
			"Requesting 1inch quote {} -> {} on chain {}",
			request.token_in.symbol, request.token_out.symbol, request.chain_id
		);

		let client = self
			.client_strategy
			.client_for(config, &AuthConfig::bearer(config.api_key.as_ref()))?;
		let response: OneInchSwapResponse =
			fetch_json(client.get(url), config.timeout_ms, &config.provider_id).await?;

		let mut quote = self.convert_response(response, config)?;
		if request.taker.is_none() {
			// Swap data built for the placeholder sender cannot be executed
			quote.call_data = None;
		}
		info!(
			"1inch quote for {}: {} out",
			config.provider_id, quote.amount_out
		);
		Ok(quote)
	}

	async fn health_check(&self, config: &ProviderRuntimeConfig) -> ProviderResult<bool> {
		let url = build_url(&config.endpoint, "1/healthcheck")?;
		let client = self
			.client_strategy
			.client_for(config, &AuthConfig::bearer(config.api_key.as_ref()))?;
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
