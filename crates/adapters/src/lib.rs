//! TTV Adapters
//!
//! Liquidity provider adapters, the HTTP price feed and the registry the
//! quote gateway resolves providers through.

pub mod abi;
pub mod client_cache;
pub mod oneinch_adapter;
pub mod price_feed;
pub mod rpc;
pub mod uniswap_adapter;
pub mod zerox_adapter;

#[cfg(test)]
mod test_support;

pub use client_cache::{AuthConfig, ClientCache, ClientConfig, ClientStrategy};
pub use oneinch_adapter::OneInchAdapter;
pub use price_feed::HttpPriceFeed;
pub use uniswap_adapter::UniswapV3Adapter;
pub use zerox_adapter::ZeroXAdapter;
pub use ttv_types::{ProviderAdapter, ProviderError, ProviderResult};

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use ttv_types::constants::limits::NATIVE_TOKEN_ALIAS;
use ttv_types::TokenInfo;
use url::Url;

/// Registry of adapters keyed by adapter id
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
	adapters: HashMap<String, Arc<dyn ProviderAdapter>>,
}

impl ProviderRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registry with the built-in 0x, 1inch and Uniswap V3 adapters sharing one client cache
	pub fn with_defaults(cache: ClientCache) -> Self {
		let mut registry = Self::new();
		registry.register(Arc::new(ZeroXAdapter::new(ClientStrategy::Cached(
			cache.clone(),
		))));
		registry.register(Arc::new(OneInchAdapter::new(ClientStrategy::Cached(
			cache.clone(),
		))));
		registry.register(Arc::new(UniswapV3Adapter::new(ClientStrategy::Cached(
			cache,
		))));
		registry
	}

	/// Register an adapter under its own id, replacing any previous one
	pub fn register(&mut self, adapter: Arc<dyn ProviderAdapter>) {
		let id = adapter.id().to_string();
		debug!("Registering provider adapter {}", id);
		self.adapters.insert(id, adapter);
	}

	pub fn get(&self, adapter_id: &str) -> Option<Arc<dyn ProviderAdapter>> {
		self.adapters.get(adapter_id).cloned()
	}

	pub fn require(&self, adapter_id: &str) -> ProviderResult<Arc<dyn ProviderAdapter>> {
		self.get(adapter_id)
			.ok_or_else(|| ProviderError::AdapterNotRegistered {
				adapter_id: adapter_id.to_string(),
			})
	}

	pub fn ids(&self) -> Vec<String> {
		let mut ids: Vec<_> = self.adapters.keys().cloned().collect();
		ids.sort();
		ids
	}

	pub fn get_all(&self) -> &HashMap<String, Arc<dyn ProviderAdapter>> {
		&self.adapters
	}

	pub fn len(&self) -> usize {
		self.adapters.len()
	}

	pub fn is_empty(&self) -> bool {
		self.adapters.is_empty()
	}
}

/// Join a relative path onto a provider endpoint, treating the endpoint as a directory
pub(crate) fn build_url(base_url: &str, path: &str) -> ProviderResult<Url> {
	let mut base = Url::parse(base_url).map_err(|e| ProviderError::ConfigError {
		reason: format!("Invalid base URL '{}': {}", base_url, e),
	})?;

	if !base.path().ends_with('/') {
		base.set_path(&format!("{}/", base.path()));
	}

	base.join(path.trim_start_matches('/'))
		.map_err(|e| ProviderError::ConfigError {
			reason: format!(
				"Failed to join URL path '{}' to base '{}': {}",
				path, base_url, e
			),
		})
}

/// Send a request and decode a JSON body, mapping transport and status failures
pub(crate) async fn fetch_json<T: DeserializeOwned>(
	request: RequestBuilder,
	timeout_ms: u64,
	provider_id: &str,
) -> ProviderResult<T> {
	let response = request
		.timeout(Duration::from_millis(timeout_ms))
		.send()
		.await
		.map_err(|e| {
			if e.is_timeout() {
				ProviderError::Timeout { timeout_ms }
			} else {
				ProviderError::HttpError(e)
			}
		})?;

	let status = response.status();
	if !status.is_success() {
		let body = response.text().await.unwrap_or_default();
		debug!("{} responded {}: {}", provider_id, status, body);
		return Err(if body.is_empty() {
			ProviderError::from_http_failure(status.as_u16())
		} else {
			ProviderError::http_failure(status.as_u16(), truncate(&body, 256))
		});
	}

	let body = response.text().await?;
	serde_json::from_str(&body).map_err(|e| ProviderError::InvalidResponse {
		reason: format!("Failed to parse {} response: {}", provider_id, e),
	})
}

/// Address aggregators expect for a token; native assets use the 0xEeee alias
pub(crate) fn aggregator_token_address(token: &TokenInfo) -> &str {
	if token.is_native() {
		NATIVE_TOKEN_ALIAS
	} else {
		&token.address
	}
}

/// Reject empty or zero output amounts
pub(crate) fn require_positive_amount(amount: &str, provider_id: &str) -> ProviderResult<()> {
	match amount.parse::<u128>() {
		Ok(0) => Err(ProviderError::NoLiquidity {
			reason: format!("{} returned a zero output amount", provider_id),
		}),
		Ok(_) => Ok(()),
		Err(_) => Err(ProviderError::InvalidResponse {
			reason: format!("{} returned non-integer amount '{}'", provider_id, amount),
		}),
	}
}

/// Gas values arrive as either JSON numbers or decimal strings
pub(crate) fn gas_from_json(value: Option<&serde_json::Value>) -> Option<u64> {
	match value? {
		serde_json::Value::Number(n) => n.as_u64(),
		serde_json::Value::String(s) => s.parse().ok(),
		_ => None,
	}
}

fn truncate(body: &str, max: usize) -> String {
	match body.char_indices().nth(max) {
		Some((idx, _)) => format!("{}...", &body[..idx]),
		None => body.to_string(),
	}
}
