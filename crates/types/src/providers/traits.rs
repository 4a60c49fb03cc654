//! Core provider trait

use super::{
	AdapterInfo, ProviderKind, ProviderQuote, ProviderQuoteRequest, ProviderResult,
	ProviderRuntimeConfig,
};
use async_trait::async_trait;
use std::fmt::Debug;

/// Interface every liquidity provider adapter implements
///
/// Adding a provider means implementing this trait and registering the
/// adapter; the gateway fans out to every registered provider uniformly.
#[async_trait]
pub trait ProviderAdapter: Send + Sync + Debug {
	/// Get adapter information. This is the only required accessor.
	fn adapter_info(&self) -> &AdapterInfo;

	fn id(&self) -> &str {
		&self.adapter_info().adapter_id
	}

	fn name(&self) -> &str {
		&self.adapter_info().name
	}

	fn kind(&self) -> ProviderKind {
		self.adapter_info().kind
	}

	/// Whether the adapter can quote on the given chain
	fn supports_chain(&self, _chain_id: u64) -> bool {
		true
	}

	/// Quote a single swap
	async fn get_quote(
		&self,
		request: &ProviderQuoteRequest,
		config: &ProviderRuntimeConfig,
	) -> ProviderResult<ProviderQuote>;

	/// Health check against the provider backend
	async fn health_check(&self, config: &ProviderRuntimeConfig) -> ProviderResult<bool>;
}
