//! HTTP client cache for provider and price-feed connections
//!
//! Clients are keyed by provider, base URL and headers so that providers with
//! different credentials never share a client. Entries expire after a TTL.

use dashmap::{mapref::entry::Entry, DashMap};
use reqwest::{Client, ClientBuilder};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use ttv_types::{ProviderError, ProviderResult, ProviderRuntimeConfig, SecretString};

const USER_AGENT: &str = "TTV-Aggregator/1.0";

/// Configuration a cached client is built from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientConfig {
	pub base_url: String,
	pub provider_id: String,
	pub max_idle_per_host: usize,
	pub keep_alive_timeout_ms: u64,
	pub headers: Vec<(String, String)>,
}

impl From<&ProviderRuntimeConfig> for ClientConfig {
	fn from(config: &ProviderRuntimeConfig) -> Self {
		let mut headers = vec![
			("User-Agent".to_string(), USER_AGENT.to_string()),
			("Accept".to_string(), "application/json".to_string()),
		];
		if let Some(extra) = &config.headers {
			let mut extra: Vec<_> = extra.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
			extra.sort();
			headers.extend(extra);
		}

		Self {
			base_url: config.endpoint.clone(),
			provider_id: config.provider_id.clone(),
			max_idle_per_host: 10,
			keep_alive_timeout_ms: 90_000,
			headers,
		}
	}
}

/// How a provider authenticates
#[derive(Debug, Clone)]
pub enum AuthConfig {
	None,
	Bearer { token: SecretString },
	ApiKey { header: String, key: SecretString },
}

impl AuthConfig {
	pub fn bearer(token: Option<&SecretString>) -> Self {
		match token {
			Some(token) if !token.is_empty() => Self::Bearer {
				token: token.clone(),
			},
			_ => Self::None,
		}
	}

	pub fn api_key(header: &str, key: Option<&SecretString>) -> Self {
		match key {
			Some(key) if !key.is_empty() => Self::ApiKey {
				header: header.to_string(),
				key: key.clone(),
			},
			_ => Self::None,
		}
	}
}

#[derive(Debug, Clone)]
struct CachedClient {
	client: Arc<Client>,
	created_at: Instant,
}

impl CachedClient {
	fn new(client: Client) -> Self {
		Self {
			client: Arc::new(client),
			created_at: Instant::now(),
		}
	}

	fn is_expired(&self, ttl: Duration) -> bool {
		self.created_at.elapsed() > ttl
	}
}

/// Thread-safe cache of HTTP clients with TTL
#[derive(Clone, Debug)]
pub struct ClientCache {
	clients: Arc<DashMap<ClientConfig, CachedClient>>,
	ttl: Duration,
}

impl ClientCache {
	/// Create a new client cache with default 30-minute TTL
	pub fn new() -> Self {
		Self::with_ttl(Duration::from_secs(30 * 60))
	}

	pub fn with_ttl(ttl: Duration) -> Self {
		Self {
			clients: Arc::new(DashMap::new()),
			ttl,
		}
	}

	/// Get or create a client for the given configuration
	pub fn get_client(&self, config: &ClientConfig) -> ProviderResult<Arc<Client>> {
		self.clients.remove_if(config, |_, cached| {
			let expired = cached.is_expired(self.ttl);
			if expired {
				warn!(
					"Client cache expired for {} (age: {:?}), will create new client",
					config.base_url,
					cached.created_at.elapsed()
				);
			}
			expired
		});

		if let Some(cached) = self.clients.get(config) {
			debug!("Reusing cached client for {}", config.base_url);
			return Ok(cached.client.clone());
		}

		debug!("Creating new client for {}", config.base_url);
		let cached = CachedClient::new(build_client(&config.headers, config)?);

		match self.clients.entry(config.clone()) {
			Entry::Occupied(entry) => Ok(entry.get().client.clone()),
			Entry::Vacant(entry) => Ok(entry.insert(cached).client.clone()),
		}
	}

	/// Get or create a client with the provider's authentication applied
	pub fn get_client_with_auth(
		&self,
		runtime: &ProviderRuntimeConfig,
		auth: &AuthConfig,
	) -> ProviderResult<Arc<Client>> {
		let mut config = ClientConfig::from(runtime);
		match auth {
			AuthConfig::None => {},
			AuthConfig::Bearer { token } => {
				config.headers.push((
					"Authorization".to_string(),
					format!("Bearer {}", token.expose_secret()),
				));
			},
			AuthConfig::ApiKey { header, key } => {
				config
					.headers
					.push((header.clone(), key.expose_secret().to_string()));
			},
		}
		self.get_client(&config)
	}

	/// Remove all expired clients
	pub fn cleanup_expired(&self) -> usize {
		let before = self.clients.len();
		self.clients.retain(|_, cached| !cached.is_expired(self.ttl));
		let removed = before.saturating_sub(self.clients.len());
		if removed > 0 {
			debug!("Cleaned up {} expired clients from cache", removed);
		}
		removed
	}

	pub fn len(&self) -> usize {
		self.clients.len()
	}

	pub fn is_empty(&self) -> bool {
		self.clients.is_empty()
	}

	pub fn ttl(&self) -> Duration {
		self.ttl
	}
}

impl Default for ClientCache {
	fn default() -> Self {
		Self::new()
	}
}

fn build_client(headers: &[(String, String)], config: &ClientConfig) -> ProviderResult<Client> {
	let mut header_map = reqwest::header::HeaderMap::new();
	for (key, value) in headers {
		if let (Ok(name), Ok(value)) = (
			reqwest::header::HeaderName::from_bytes(key.as_bytes()),
			reqwest::header::HeaderValue::from_str(value),
		) {
			header_map.insert(name, value);
		}
	}

	ClientBuilder::new()
		.pool_max_idle_per_host(config.max_idle_per_host)
		.pool_idle_timeout(Duration::from_millis(config.keep_alive_timeout_ms))
		.tcp_keepalive(Duration::from_secs(60))
		.default_headers(header_map)
		.build()
		.map_err(ProviderError::HttpError)
}

/// Whether an adapter reuses cached clients or builds one per call
#[derive(Debug, Clone)]
pub enum ClientStrategy {
	Cached(ClientCache),
	OnDemand,
}

impl ClientStrategy {
	pub fn client_for(
		&self,
		runtime: &ProviderRuntimeConfig,
		auth: &AuthConfig,
	) -> ProviderResult<Arc<Client>> {
		match self {
			ClientStrategy::Cached(cache) => cache.get_client_with_auth(runtime, auth),
			ClientStrategy::OnDemand => ClientCache::with_ttl(Duration::ZERO)
				.get_client_with_auth(runtime, auth),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;

	fn runtime(provider_id: &str) -> ProviderRuntimeConfig {
		ProviderRuntimeConfig::new(
			provider_id.to_string(),
			"https://api.0x.org".to_string(),
			2_000,
		)
	}

	#[test]
	fn test_client_config_from_runtime_config() {
		let mut config = runtime("0x");
		config.headers = Some(HashMap::from([(
			"X-Partner".to_string(),
			"acme".to_string(),
		)]));
		let client_config = ClientConfig::from(&config);

		assert_eq!(client_config.base_url, "https://api.0x.org");
		assert_eq!(client_config.provider_id, "0x");
		assert!(client_config
			.headers
			.contains(&("X-Partner".to_string(), "acme".to_string())));
	}

	#[tokio::test]
	async fn test_client_cache_reuse() {
		let cache = ClientCache::new();
		let config = ClientConfig::from(&runtime("0x"));

		let client1 = cache.get_client(&config).unwrap();
		let client2 = cache.get_client(&config).unwrap();
		assert!(Arc::ptr_eq(&client1, &client2));
		assert_eq!(cache.len(), 1);
	}

	#[tokio::test]
	async fn test_client_cache_ttl_expiration() {
		let cache = ClientCache::with_ttl(Duration::from_millis(50));
		let config = ClientConfig::from(&runtime("1inch"));

		let client1 = cache.get_client(&config).unwrap();
		tokio::time::sleep(Duration::from_millis(100)).await;
		let client2 = cache.get_client(&config).unwrap();

		assert!(!Arc::ptr_eq(&client1, &client2));
	}

	#[tokio::test]
	async fn test_different_credentials_get_different_clients() {
		let cache = ClientCache::new();
		let config = runtime("0x");
		let key_a = SecretString::from("key-a");
		let key_b = SecretString::from("key-b");

		let a = cache
			.get_client_with_auth(&config, &AuthConfig::api_key("0x-api-key", Some(&key_a)))
			.unwrap();
		let a_again = cache
			.get_client_with_auth(&config, &AuthConfig::api_key("0x-api-key", Some(&key_a)))
			.unwrap();
		let b = cache
			.get_client_with_auth(&config, &AuthConfig::api_key("0x-api-key", Some(&key_b)))
			.unwrap();
		let none = cache.get_client_with_auth(&config, &AuthConfig::None).unwrap();

		assert!(Arc::ptr_eq(&a, &a_again));
		assert!(!Arc::ptr_eq(&a, &b));
		assert!(!Arc::ptr_eq(&a, &none));
	}

	#[test]
	fn test_empty_credentials_mean_no_auth() {
		let empty = SecretString::from("");
		assert!(matches!(AuthConfig::bearer(Some(&empty)), AuthConfig::None));
		assert!(matches!(AuthConfig::api_key("k", None), AuthConfig::None));
	}

	#[tokio::test]
	async fn test_cleanup_expired() {
		let cache = ClientCache::with_ttl(Duration::from_millis(10));
		cache.get_client(&ClientConfig::from(&runtime("a"))).unwrap();
		cache.get_client(&ClientConfig::from(&runtime("b"))).unwrap();
		tokio::time::sleep(Duration::from_millis(30)).await;
		assert_eq!(cache.cleanup_expired(), 2);
		assert!(cache.is_empty());
	}
}
