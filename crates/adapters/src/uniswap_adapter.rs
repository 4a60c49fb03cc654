//! Uniswap V3 adapter quoting through the on-chain QuoterV1 contract
//!
//! Each fee tier is quoted concurrently with `eth_call`; the tier with the
//! largest output wins and the swap is encoded for SwapRouter
//! `exactInputSingle`.

use crate::abi::{
	address, decode_quote_exact_input_single, encode_exact_input_single,
	encode_quote_exact_input_single, fee_tier, uint, AbiError, ExactInputSingleParams,
};
use crate::client_cache::{AuthConfig, ClientStrategy};
use crate::rpc;
use async_trait::async_trait;
use alloy_primitives::aliases::U160;
use alloy_primitives::U256;
use futures::future::join_all;
use std::time::Duration;
use tracing::{debug, info};
use ttv_types::constants::limits::BPS_DENOMINATOR;
use ttv_types::{
	AdapterInfo, ProviderAdapter, ProviderError, ProviderFees, ProviderKind, ProviderQuote,
	ProviderQuoteRequest, ProviderResult, ProviderRuntimeConfig,
};

pub const UNISWAP_V3_ADAPTER_ID: &str = "uniswap-v3";
pub const QUOTER_V1_ADDRESS: &str = "0xb27308f9F90D607463bb33eA1BeBb41C27CE5AB6";
pub const SWAP_ROUTER_ADDRESS: &str = "0xE592427A0AEce92De3Edee1F18E0157C05861564";
pub const FEE_TIERS: [u32; 3] = [500, 3000, 10000];

const SUPPORTED_CHAINS: &[u64] = &[1, 10, 137, 42161];
const SWAP_GAS_ESTIMATE: u64 = 150_000;
const DEADLINE_SECS: i64 = 30 * 60;

/// Adapter for Uniswap V3 single-pool swaps
#[derive(Debug)]
pub struct UniswapV3Adapter {
	adapter_info: AdapterInfo,
	client_strategy: ClientStrategy,
	fee_tiers: Vec<u32>,
}

impl UniswapV3Adapter {
	pub fn new(client_strategy: ClientStrategy) -> Self {
		Self {
			adapter_info: AdapterInfo::new(UNISWAP_V3_ADAPTER_ID, "Uniswap V3", ProviderKind::Amm)
				.with_description("Uniswap V3 QuoterV1 with SwapRouter exactInputSingle"),
			client_strategy,
			fee_tiers: FEE_TIERS.to_vec(),
		}
	}

	pub fn with_fee_tiers(mut self, fee_tiers: Vec<u32>) -> Self {
		self.fee_tiers = fee_tiers;
		self
	}

	fn quote_call_data(request: &ProviderQuoteRequest, fee: u32) -> ProviderResult<String> {
		encode_quote_exact_input_single(
			&request.token_in.address,
			&request.token_out.address,
			fee,
			&request.amount_in,
		)
		.map_err(invalid_request)
	}

	/// `exactInputSingle` calldata paying out to the taker; without a taker
	/// there is no recipient and the route is quote-only
	fn swap_call_data(
		request: &ProviderQuoteRequest,
		fee: u32,
		amount_out: U256,
		deadline: i64,
	) -> ProviderResult<Option<String>> {
		let Some(taker) = request.taker.as_deref() else {
			return Ok(None);
		};
		let params = ExactInputSingleParams {
			tokenIn: address(&request.token_in.address).map_err(invalid_request)?,
			tokenOut: address(&request.token_out.address).map_err(invalid_request)?,
			fee: fee_tier(fee).map_err(invalid_request)?,
			recipient: address(taker).map_err(invalid_request)?,
			deadline: U256::from(deadline.max(0) as u64),
			amountIn: uint(&request.amount_in).map_err(invalid_request)?,
			amountOutMinimum: minimum_amount_out(amount_out, request.slippage_bps),
			sqrtPriceLimitX96: U160::ZERO,
		};
		Ok(Some(encode_exact_input_single(params)))
	}
}

/// Output floor after slippage, rounded down
pub fn minimum_amount_out(amount_out: U256, slippage_bps: u16) -> U256 {
	let denominator = U256::from(BPS_DENOMINATOR as u64);
	let keep = denominator.saturating_sub(U256::from(slippage_bps));
	amount_out / denominator * keep + amount_out % denominator * keep / denominator
}

fn invalid_request(err: AbiError) -> ProviderError {
	ProviderError::InvalidResponse {
		reason: format!("Cannot encode Uniswap call: {}", err),
	}
}

#[async_trait]
impl ProviderAdapter for UniswapV3Adapter {
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
		if request.token_in.is_native() || request.token_out.is_native() {
			return Err(ProviderError::NoLiquidity {
				reason: "Uniswap V3 pools hold wrapped native tokens only".to_string(),
			});
		}
		let rpc_url = config
			.rpc_url
			.as_deref()
			.ok_or_else(|| ProviderError::ConfigError {
				reason: format!("No RPC URL configured for chain {}", request.chain_id),
			})?;

		let client = self.client_strategy.client_for(config, &AuthConfig::None)?;
		let timeout = Duration::from_millis(config.timeout_ms);

		let calls = self.fee_tiers.iter().map(|&fee| {
			let client = client.clone();
			async move {
				let data = Self::quote_call_data(request, fee)?;
				let raw = rpc::eth_call(&client, rpc_url, QUOTER_V1_ADDRESS, &data, timeout).await?;
				let amount = decode_quote_exact_input_single(&raw).map_err(rpc::RpcError::from)?;
				Ok::<_, ProviderError>((fee, amount))
			}
		});

		let mut best: Option<(u32, U256)> = None;
		for (fee, result) in self.fee_tiers.iter().zip(join_all(calls).await) {
			match result {
				Ok((fee, amount)) if !amount.is_zero() => match best {
					Some((_, current)) if current >= amount => {},
					_ => best = Some((fee, amount)),
				},
				Ok(_) => debug!("Uniswap tier {} returned zero output", fee),
				Err(e) => debug!("Uniswap tier {} failed: {}", fee, e),
			}
		}

		let (fee, amount_out) = best.ok_or_else(|| ProviderError::NoLiquidity {
			reason: format!(
				"No Uniswap V3 pool for {}/{} in tiers {:?}",
				request.token_in.symbol, request.token_out.symbol, self.fee_tiers
			),
		})?;

		let deadline = chrono::Utc::now().timestamp() + DEADLINE_SECS;
		let call_data = Self::swap_call_data(request, fee, amount_out, deadline)?;

		info!(
			"Uniswap V3 quote for {}: {} out via {} tier",
			config.provider_id, amount_out, fee
		);

		Ok(ProviderQuote {
			provider_id: config.provider_id.clone(),
			provider_name: self.adapter_info.name.clone(),
			amount_out: amount_out.to_string(),
			call_data,
			to: SWAP_ROUTER_ADDRESS.to_string(),
			value: "0".to_string(),
			allowance_target: Some(SWAP_ROUTER_ADDRESS.to_string()),
			estimated_gas: Some(SWAP_GAS_ESTIMATE),
			fees: ProviderFees {
				lp_fee_bps: Some(fee / 100),
				protocol_fee_wei: None,
			},
		})
	}

	async fn health_check(&self, config: &ProviderRuntimeConfig) -> ProviderResult<bool> {
		let Some(rpc_url) = config.rpc_url.as_deref() else {
			return Ok(false);
		};
		let client = self.client_strategy.client_for(config, &AuthConfig::None)?;
		Ok(
			rpc::gas_price(&client, rpc_url, Duration::from_millis(config.timeout_ms))
				.await
				.is_ok(),
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::client_cache::ClientCache;
	use crate::test_support::spawn_server;
	use axum::routing::post;
	use axum::{Json, Router};
	use serde_json::{json, Value};
	use ttv_types::constants::limits::NATIVE_TOKEN_ADDRESS;
	use ttv_types::TokenInfo;

	const WETH: &str = "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2";
	const USDC: &str = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48";
	const TAKER: &str = "0x1234567890123456789012345678901234567890";

	fn word(value: u64) -> String {
		format!("{:064x}", value)
	}

	fn request() -> ProviderQuoteRequest {
		ProviderQuoteRequest {
			chain_id: 1,
			token_in: TokenInfo::new(1, WETH, "WETH", 18),
			token_out: TokenInfo::new(1, USDC, "USDC", 6),
			amount_in: "1000000000000000000".to_string(),
			slippage_bps: 50,
			taker: Some(TAKER.to_string()),
		}
	}

	fn adapter() -> UniswapV3Adapter {
		UniswapV3Adapter::new(ClientStrategy::Cached(ClientCache::new()))
	}

	fn quoter_router() -> Router {
		// 0.05% pool reverts, 0.3% pool quotes best, 1% pool quotes worse
		Router::new().route(
			"/",
			post(|Json(body): Json<Value>| async move {
				let data = body["params"][0]["data"].as_str().unwrap_or_default().to_string();
				let tier = data[10 + 2 * 64..10 + 3 * 64].to_string();
				if tier == word(500) {
					Json(json!({"jsonrpc": "2.0", "id": 1, "error": {"code": 3, "message": "execution reverted"}}))
				} else if tier == word(3000) {
					Json(json!({"jsonrpc": "2.0", "id": 1, "result": format!("0x{}", word(3_010_000_000))}))
				} else {
					Json(json!({"jsonrpc": "2.0", "id": 1, "result": format!("0x{}", word(2_990_000_000))}))
				}
			}),
		)
	}

	#[test]
	fn test_minimum_amount_out() {
		assert_eq!(
			minimum_amount_out(U256::from(1_000_000u64), 50),
			U256::from(995_000u64)
		);
		assert_eq!(minimum_amount_out(U256::from(1_999u64), 100), U256::from(1_979u64));
		assert_eq!(minimum_amount_out(U256::MAX, 0), U256::MAX);
	}

	#[test]
	fn test_quote_call_data_layout() {
		let data = UniswapV3Adapter::quote_call_data(&request(), 3000).unwrap();
		assert!(data.starts_with("0xf7729d43"));
		assert_eq!(data.len(), 2 + 8 + 5 * 64);
		assert!(data.contains(&word(3000)));
	}

	#[test]
	fn test_swap_call_data_layout() {
		let data = UniswapV3Adapter::swap_call_data(
			&request(),
			500,
			U256::from(3_000_000_000u64),
			1_700_000_000,
		)
		.unwrap()
		.unwrap();
		assert!(data.starts_with("0x414bf389"));
		assert_eq!(data.len(), 2 + 8 + 8 * 64);
		// recipient is the fourth word, amountOutMinimum the seventh
		assert_eq!(
			&data[10 + 3 * 64..10 + 4 * 64],
			format!("{:0>64}", &TAKER[2..])
		);
		assert_eq!(&data[10 + 6 * 64..10 + 7 * 64], word(2_985_000_000));
	}

	#[test]
	fn test_swap_without_taker_has_no_call_data() {
		let mut req = request();
		req.taker = None;
		let data = UniswapV3Adapter::swap_call_data(&req, 500, U256::from(1u64), 0).unwrap();
		assert!(data.is_none());
	}

	#[tokio::test]
	async fn test_native_token_has_no_pool() {
		let mut req = request();
		req.token_in = TokenInfo::new(1, NATIVE_TOKEN_ADDRESS, "ETH", 18);
		let config = ProviderRuntimeConfig::new("uniswap-v3".to_string(), String::new(), 1_000)
			.with_rpc_url(Some("http://127.0.0.1:1".to_string()));
		assert!(matches!(
			adapter().get_quote(&req, &config).await,
			Err(ProviderError::NoLiquidity { .. })
		));
	}

	#[tokio::test]
	async fn test_best_fee_tier_wins() {
		let rpc_url = spawn_server(quoter_router()).await;
		let config = ProviderRuntimeConfig::new("uniswap-v3".to_string(), String::new(), 2_000)
			.with_rpc_url(Some(rpc_url));

		let quote = adapter().get_quote(&request(), &config).await.unwrap();
		assert_eq!(quote.amount_out, "3010000000");
		assert_eq!(quote.fees.lp_fee_bps, Some(30));
		assert_eq!(quote.to, SWAP_ROUTER_ADDRESS);
		assert!(quote.is_executable());
	}

	#[tokio::test]
	async fn test_quote_without_taker_is_not_executable() {
		let rpc_url = spawn_server(quoter_router()).await;
		let config = ProviderRuntimeConfig::new("uniswap-v3".to_string(), String::new(), 2_000)
			.with_rpc_url(Some(rpc_url));
		let mut req = request();
		req.taker = None;

		let quote = adapter().get_quote(&req, &config).await.unwrap();
		assert_eq!(quote.amount_out, "3010000000");
		assert!(quote.call_data.is_none());
		assert!(!quote.is_executable());
	}

	#[tokio::test]
	async fn test_all_tiers_reverting_is_no_liquidity() {
		let router = Router::new().route(
			"/",
			post(|| async {
				Json(json!({"jsonrpc": "2.0", "id": 1, "error": {"code": 3, "message": "execution reverted"}}))
			}),
		);
		let rpc_url = spawn_server(router).await;
		let config = ProviderRuntimeConfig::new("uniswap-v3".to_string(), String::new(), 2_000)
			.with_rpc_url(Some(rpc_url));

		let err = adapter().get_quote(&request(), &config).await.unwrap_err();
		assert_eq!(err.tag(), "no_liquidity");
	}
}
