//! Provider gateway: concurrent fan-out to every eligible provider
//!
//! Each provider call runs as its own task with its own timeout. The gateway
//! waits for every task to settle; one slow or failing provider never fails
//! its siblings. Dropping the returned future aborts the tasks still in flight.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tokio::time::{timeout, Duration};
use tracing::{debug, info, warn};
use ttv_adapters::ProviderRegistry;
use ttv_types::{
	ChainInfo, Provider, ProviderError, ProviderFailure, ProviderKind, ProviderQuote,
	ProviderQuoteRequest, ProviderRuntimeConfig, QuoteError, QuoteResult,
};

/// Settled outcome of one provider call
#[derive(Debug)]
pub struct ProviderAttempt {
	pub provider_id: String,
	pub elapsed_ms: u64,
	pub outcome: Result<ProviderQuote, ProviderError>,
}

/// Successful quotes plus the failures that were swallowed
#[derive(Debug, Default)]
pub struct GatewayResult {
	pub quotes: Vec<ProviderQuote>,
	pub failures: Vec<ProviderFailure>,
}

#[derive(Debug, Clone)]
pub struct ProviderGateway {
	registry: Arc<ProviderRegistry>,
	providers: Vec<Provider>,
	chains: HashMap<u64, ChainInfo>,
}

impl ProviderGateway {
	pub fn new(
		registry: Arc<ProviderRegistry>,
		providers: Vec<Provider>,
		chains: impl IntoIterator<Item = ChainInfo>,
	) -> Self {
		Self {
			registry,
			providers,
			chains: chains.into_iter().map(|c| (c.chain_id, c)).collect(),
		}
	}

	/// Check that every provider references a registered adapter
	pub fn validate_providers(&self) -> Result<(), String> {
		for provider in &self.providers {
			if self.registry.get(&provider.adapter_id).is_none() {
				return Err(format!(
					"Provider '{}' references unknown adapter '{}'",
					provider.provider_id, provider.adapter_id
				));
			}
		}
		Ok(())
	}

	pub fn providers(&self) -> &[Provider] {
		&self.providers
	}

	pub fn chain(&self, chain_id: u64) -> Option<&ChainInfo> {
		self.chains.get(&chain_id)
	}

	pub fn chain_ids(&self) -> Vec<u64> {
		let mut ids: Vec<_> = self.chains.keys().copied().collect();
		ids.sort_unstable();
		ids
	}

	/// Kind of the adapter behind a provider; unknown providers count as aggregators
	pub fn provider_kind(&self, provider_id: &str) -> ProviderKind {
		self.providers
			.iter()
			.find(|p| p.provider_id == provider_id)
			.and_then(|p| self.registry.get(&p.adapter_id))
			.map(|adapter| adapter.kind())
			.unwrap_or(ProviderKind::Aggregator)
	}

	fn runtime_config(&self, provider: &Provider, chain_id: u64) -> ProviderRuntimeConfig {
		ProviderRuntimeConfig::from(provider)
			.with_rpc_url(self.chains.get(&chain_id).map(|c| c.rpc_url.clone()))
	}

	/// Providers that are enabled, serve the chain and have a capable adapter
	fn eligible(&self, chain_id: u64) -> Vec<Provider> {
		self.providers
			.iter()
			.filter(|provider| {
				let adapter_supports = self
					.registry
					.get(&provider.adapter_id)
					.is_some_and(|adapter| adapter.supports_chain(chain_id));
				let eligible = provider.enabled && provider.serves_chain(chain_id) && adapter_supports;
				if !eligible {
					debug!(
						"Skipping provider {} for chain {}",
						provider.provider_id, chain_id
					);
				}
				eligible
			})
			.cloned()
			.collect()
	}

	/// Query every eligible provider and return all settled attempts in provider order
	pub async fn quote_all(&self, request: &ProviderQuoteRequest) -> Vec<ProviderAttempt> {
		let providers = self.eligible(request.chain_id);
		info!(
			"Fetching quotes for {} -> {} on chain {} from {} providers",
			request.token_in.symbol,
			request.token_out.symbol,
			request.chain_id,
			providers.len()
		);

		let mut tasks = JoinSet::new();
		for (index, provider) in providers.iter().enumerate() {
			let adapter = match self.registry.get(&provider.adapter_id) {
				Some(adapter) => adapter,
				None => continue,
			};
			let config = self.runtime_config(provider, request.chain_id);
			let request = request.clone();
			let provider_id = provider.provider_id.clone();
			let timeout_ms = provider.timeout_ms;

			tasks.spawn(async move {
				debug!("Starting quote fetch from provider {}", provider_id);
				let started = Instant::now();
				let outcome = match timeout(
					Duration::from_millis(timeout_ms),
					adapter.get_quote(&request, &config),
				)
				.await
				{
					Ok(result) => result,
					Err(_) => Err(ProviderError::Timeout { timeout_ms }),
				};
				let attempt = ProviderAttempt {
					provider_id,
					elapsed_ms: started.elapsed().as_millis() as u64,
					outcome,
				};
				(index, attempt)
			});
		}

		let mut attempts: Vec<(usize, ProviderAttempt)> = Vec::with_capacity(providers.len());
		while let Some(joined) = tasks.join_next().await {
			match joined {
				Ok(settled) => attempts.push(settled),
				Err(e) => warn!("Provider task aborted: {}", e),
			}
		}
		attempts.sort_by_key(|(index, _)| *index);

		attempts.into_iter().map(|(_, attempt)| attempt).collect()
	}

	/// Fan out and keep the successes; fails only when every provider failed
	pub async fn quote(&self, request: &ProviderQuoteRequest) -> QuoteResult<GatewayResult> {
		let attempts = self.quote_all(request).await;
		let mut result = GatewayResult::default();

		for attempt in attempts {
			match attempt.outcome {
				Ok(quote) => {
					info!(
						"Got quote from provider {} in {}ms",
						attempt.provider_id, attempt.elapsed_ms
					);
					result.quotes.push(quote);
				},
				Err(e) => {
					warn!(
						"Provider {} failed after {}ms ({}): {}",
						attempt.provider_id,
						attempt.elapsed_ms,
						e.tag(),
						e
					);
					result
						.failures
						.push(ProviderFailure::new(&attempt.provider_id, &e));
				},
			}
		}

		info!(
			"Quote fan-out completed: {} quotes, {} failures",
			result.quotes.len(),
			result.failures.len()
		);

		if result.quotes.is_empty() {
			return Err(QuoteError::NoQuotesAvailable {
				failures: result.failures,
			});
		}
		Ok(result)
	}

	/// Health check every enabled provider against its first served chain
	pub async fn health_check_all(&self) -> HashMap<String, bool> {
		let mut results = HashMap::new();

		for provider in self.providers.iter().filter(|p| p.enabled) {
			let chain_id = provider
				.chains
				.first()
				.copied()
				.or_else(|| self.chains.keys().min().copied())
				.unwrap_or(1);
			let healthy = match self.registry.get(&provider.adapter_id) {
				Some(adapter) => adapter
					.health_check(&self.runtime_config(provider, chain_id))
					.await
					.unwrap_or(false),
				None => false,
			};
			results.insert(provider.provider_id.clone(), healthy);
		}

		results
	}
}
