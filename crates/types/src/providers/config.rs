//! Provider identity and runtime configuration

use crate::models::SecretString;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Whether a provider routes across other venues or is a venue itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
	Aggregator,
	Amm,
}

/// Static description of an adapter implementation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdapterInfo {
	pub adapter_id: String,
	pub name: String,
	pub kind: ProviderKind,
	pub version: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
}

impl AdapterInfo {
	pub fn new(adapter_id: &str, name: &str, kind: ProviderKind) -> Self {
		Self {
			adapter_id: adapter_id.to_string(),
			name: name.to_string(),
			kind,
			version: "1.0.0".to_string(),
			description: None,
		}
	}

	pub fn with_description(mut self, description: &str) -> Self {
		self.description = Some(description.to_string());
		self
	}
}

/// A configured provider instance the gateway fans out to
#[derive(Debug, Clone, PartialEq)]
pub struct Provider {
	pub provider_id: String,
	/// Id of the adapter implementation serving this provider
	pub adapter_id: String,
	pub name: String,
	pub endpoint: String,
	pub timeout_ms: u64,
	pub enabled: bool,
	pub api_key: Option<SecretString>,
	pub headers: Option<HashMap<String, String>>,
	/// Chains this provider is enabled on; empty means all configured chains
	pub chains: Vec<u64>,
}

impl Provider {
	pub fn new(provider_id: &str, adapter_id: &str, endpoint: &str, timeout_ms: u64) -> Self {
		Self {
			provider_id: provider_id.to_string(),
			adapter_id: adapter_id.to_string(),
			name: provider_id.to_string(),
			endpoint: endpoint.to_string(),
			timeout_ms,
			enabled: true,
			api_key: None,
			headers: None,
			chains: Vec::new(),
		}
	}

	pub fn serves_chain(&self, chain_id: u64) -> bool {
		self.chains.is_empty() || self.chains.contains(&chain_id)
	}
}

/// Everything an adapter needs to make one call
#[derive(Debug, Clone)]
pub struct ProviderRuntimeConfig {
	pub provider_id: String,
	pub endpoint: String,
	pub timeout_ms: u64,
	pub api_key: Option<SecretString>,
	pub headers: Option<HashMap<String, String>>,
	/// JSON-RPC endpoint of the request's chain, for on-chain quoters
	pub rpc_url: Option<String>,
}

impl ProviderRuntimeConfig {
	pub fn new(provider_id: String, endpoint: String, timeout_ms: u64) -> Self {
		Self {
			provider_id,
			endpoint,
			timeout_ms,
			api_key: None,
			headers: None,
			rpc_url: None,
		}
	}

	pub fn with_rpc_url(mut self, rpc_url: Option<String>) -> Self {
		self.rpc_url = rpc_url;
		self
	}
}

impl From<&Provider> for ProviderRuntimeConfig {
	fn from(provider: &Provider) -> Self {
		Self {
			provider_id: provider.provider_id.clone(),
			endpoint: provider.endpoint.clone(),
			timeout_ms: provider.timeout_ms,
			api_key: provider.api_key.clone(),
			headers: provider.headers.clone(),
			rpc_url: None,
		}
	}
}
