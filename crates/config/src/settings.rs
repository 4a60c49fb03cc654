//! Configuration settings structures

use crate::{configurable_value::ConfigurableValue, ConfigurableValueError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use ttv_types::{
	constants::limits::{
		DEFAULT_CORRIDOR_GAS_LIMIT, DEFAULT_GAS_BUFFER_BPS, DEFAULT_GAS_LIMIT,
		DEFAULT_GAS_PRICE_REFRESH_SECS, DEFAULT_MAX_ALTERNATIVES, DEFAULT_MAX_PRICE_AGE_SECS,
		DEFAULT_PIPELINE_TIMEOUT_MS, DEFAULT_PROVIDER_TIMEOUT_MS, MAX_PROVIDER_TIMEOUT_MS,
		MAX_SLIPPAGE_BPS, MIN_PROVIDER_TIMEOUT_MS, MIN_SLIPPAGE_BPS, QUOTE_TTL_SECS,
		RISK_PROFILE_TTL_SECS,
	},
	fees::{default_partner_discounts, validate_partner_discounts},
	ChainInfo, FeeStructure, PegCurrency, Provider, RiskThresholds, SavingsShare, TokenInfo,
	TokenRegistry, VolumeDiscountTier,
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
	#[error("Invalid timeout for {field}: {value}ms (must be between {min} and {max})")]
	InvalidTimeout {
		field: String,
		value: u64,
		min: u64,
		max: u64,
	},

	#[error("Invalid quote settings: {reason}")]
	InvalidQuoteSettings { reason: String },

	#[error("Invalid fee settings: {reason}")]
	InvalidFeeSettings { reason: String },

	#[error("Invalid risk settings: {reason}")]
	InvalidRiskSettings { reason: String },

	#[error("Invalid provider {provider_id}: {reason}")]
	InvalidProvider { provider_id: String, reason: String },

	#[error("Token {token} on chain {chain_id} references an unconfigured chain")]
	UnknownChain { chain_id: u64, token: String },

	#[error("Invalid corridor settings: {reason}")]
	InvalidCorridor { reason: String },
}

/// Main application settings
///
/// Every section has defaults, so a partial config file only overrides
/// what it names.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct Settings {
	pub server: ServerSettings,
	pub timeouts: TimeoutSettings,
	pub quote: QuoteSettings,
	pub gas: GasSettings,
	pub pricing: PricingSettings,
	pub chains: Vec<ChainConfig>,
	pub tokens: Vec<TokenConfig>,
	pub providers: HashMap<String, ProviderConfig>,
	pub corridor: CorridorSettings,
	pub fees: FeeSettings,
	pub risk: RiskSettings,
	pub environment: EnvironmentSettings,
	pub logging: LoggingSettings,
}

/// Server configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ServerSettings {
	pub host: String,
	pub port: u16,
	/// Allowed CORS origins; empty allows any origin
	pub cors_origins: Vec<String>,
}

impl Default for ServerSettings {
	fn default() -> Self {
		Self {
			host: "0.0.0.0".to_string(),
			port: 3000,
			cors_origins: Vec::new(),
		}
	}
}

/// Timeout configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct TimeoutSettings {
	/// Default per-provider timeout in milliseconds
	pub per_provider_ms: u64,
	/// Budget for the whole quote pipeline in milliseconds
	pub global_ms: u64,
	/// Timeout for price feed and RPC requests
	pub request_ms: u64,
}

impl Default for TimeoutSettings {
	fn default() -> Self {
		Self {
			per_provider_ms: DEFAULT_PROVIDER_TIMEOUT_MS,
			global_ms: DEFAULT_PIPELINE_TIMEOUT_MS,
			request_ms: DEFAULT_PROVIDER_TIMEOUT_MS,
		}
	}
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct QuoteSettings {
	pub ttl_secs: i64,
	pub max_alternatives: usize,
	pub min_amount_usd: f64,
	pub max_amount_usd: f64,
	pub max_slippage_bps: u16,
	/// Tie-break order for routes with equal cost; unlisted providers rank last
	pub provider_priority: Vec<String>,
}

impl Default for QuoteSettings {
	fn default() -> Self {
		Self {
			ttl_secs: QUOTE_TTL_SECS,
			max_alternatives: DEFAULT_MAX_ALTERNATIVES,
			min_amount_usd: 1.0,
			max_amount_usd: 1_000_000.0,
			max_slippage_bps: MAX_SLIPPAGE_BPS,
			provider_priority: vec![
				"0x".to_string(),
				"1inch".to_string(),
				"uniswap-v3".to_string(),
			],
		}
	}
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct GasSettings {
	pub buffer_bps: u32,
	/// Gas limit assumed when a provider reports no estimate
	pub default_gas_limit: u64,
	pub corridor_gas_limit: u64,
}

impl Default for GasSettings {
	fn default() -> Self {
		Self {
			buffer_bps: DEFAULT_GAS_BUFFER_BPS,
			default_gas_limit: DEFAULT_GAS_LIMIT,
			corridor_gas_limit: DEFAULT_CORRIDOR_GAS_LIMIT,
		}
	}
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct PricingSettings {
	pub max_price_age_secs: u64,
	/// Gas prices older than this are refetched; the last value is served if that fails
	pub gas_refresh_secs: u64,
	pub background_refresh: bool,
	pub refresh_interval_secs: u64,
	pub coingecko_url: String,
	pub coingecko_api_key: Option<ConfigurableValue>,
}

impl Default for PricingSettings {
	fn default() -> Self {
		Self {
			max_price_age_secs: DEFAULT_MAX_PRICE_AGE_SECS,
			gas_refresh_secs: DEFAULT_GAS_PRICE_REFRESH_SECS,
			background_refresh: true,
			refresh_interval_secs: 30,
			coingecko_url: "https://api.coingecko.com/api/v3".to_string(),
			coingecko_api_key: None,
		}
	}
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChainConfig {
	pub chain_id: u64,
	pub name: String,
	pub rpc_url: String,
	pub native_symbol: String,
	pub price_platform: String,
	pub native_coin_id: String,
}

impl From<&ChainConfig> for ChainInfo {
	fn from(chain: &ChainConfig) -> Self {
		Self {
			chain_id: chain.chain_id,
			name: chain.name.clone(),
			rpc_url: chain.rpc_url.clone(),
			native_symbol: chain.native_symbol.clone(),
			price_platform: chain.price_platform.clone(),
			native_coin_id: chain.native_coin_id.clone(),
		}
	}
}

fn default_chains() -> Vec<ChainConfig> {
	vec![
		ChainConfig {
			chain_id: 1,
			name: "Ethereum".to_string(),
			rpc_url: "https://eth.llamarpc.com".to_string(),
			native_symbol: "ETH".to_string(),
			price_platform: "ethereum".to_string(),
			native_coin_id: "ethereum".to_string(),
		},
		ChainConfig {
			chain_id: 8217,
			name: "Klaytn".to_string(),
			rpc_url: "https://public-node-api.klaytnapi.com/v1/cypress".to_string(),
			native_symbol: "KLAY".to_string(),
			price_platform: "klay-token".to_string(),
			native_coin_id: "klay-token".to_string(),
		},
	]
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TokenConfig {
	pub address: String,
	pub symbol: String,
	pub decimals: u8,
	pub chain_id: u64,
	#[serde(default)]
	pub peg: Option<PegCurrency>,
}

impl From<&TokenConfig> for TokenInfo {
	fn from(token: &TokenConfig) -> Self {
		Self {
			address: token.address.clone(),
			symbol: token.symbol.clone(),
			decimals: token.decimals,
			chain_id: token.chain_id,
			peg: token.peg,
		}
	}
}

fn token(
	chain_id: u64,
	address: &str,
	symbol: &str,
	decimals: u8,
	peg: Option<PegCurrency>,
) -> TokenConfig {
	TokenConfig {
		address: address.to_string(),
		symbol: symbol.to_string(),
		decimals,
		chain_id,
		peg,
	}
}

fn default_tokens() -> Vec<TokenConfig> {
	let usd = Some(PegCurrency::Usd);
	vec![
		token(1, "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48", "USDC", 6, usd),
		token(1, "0xdAC17F958D2ee523a2206206994597C13D831ec7", "USDT", 6, usd),
		token(1, "0x6B175474E89094C44Da98b954EedeAC495271d0F", "DAI", 18, usd),
		token(1, "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2", "WETH", 18, None),
		token(8217, "0x6270B58BE569a7c0b8f47594F191631Ae5b2C86C", "USDC", 6, usd),
		token(8217, "0xceE8FAF64bE97aF5a7016412E8a34b4932325Ee7", "USDT", 6, usd),
	]
}

/// Fee table for one provider, in basis points of the input value
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ProviderFeeConfig {
	pub protocol_fee_bps: u32,
	pub aggregator_fee_bps: u32,
	/// Used when the provider does not report the pool fee it routed through
	pub lp_fee_bps: u32,
}

/// Individual provider configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
	pub provider_id: String,
	pub adapter_id: String,
	pub endpoint: String,
	#[serde(default)]
	pub timeout_ms: Option<u64>,
	#[serde(default = "default_true")]
	pub enabled: bool,
	#[serde(default)]
	pub name: Option<String>,
	#[serde(default)]
	pub api_key: Option<ConfigurableValue>,
	#[serde(default)]
	pub headers: Option<HashMap<String, String>>,
	#[serde(default)]
	pub chains: Vec<u64>,
	#[serde(default)]
	pub fees: ProviderFeeConfig,
}

fn default_true() -> bool {
	true
}

impl ProviderConfig {
	/// Convert to the domain provider, resolving the API key
	pub fn to_provider(&self, default_timeout_ms: u64) -> Result<Provider, ConfigurableValueError> {
		let api_key = self
			.api_key
			.as_ref()
			.map(|key| key.resolve_for_secret())
			.transpose()?;

		Ok(Provider {
			provider_id: self.provider_id.clone(),
			adapter_id: self.adapter_id.clone(),
			name: self.name.clone().unwrap_or_else(|| self.provider_id.clone()),
			endpoint: self.endpoint.clone(),
			timeout_ms: self.timeout_ms.unwrap_or(default_timeout_ms),
			enabled: self.enabled,
			api_key,
			headers: self.headers.clone(),
			chains: self.chains.clone(),
		})
	}
}

fn default_providers() -> HashMap<String, ProviderConfig> {
	let provider = |id: &str, adapter: &str, name: &str, endpoint: &str, key: Option<&str>, fees| {
		(
			id.to_string(),
			ProviderConfig {
				provider_id: id.to_string(),
				adapter_id: adapter.to_string(),
				endpoint: endpoint.to_string(),
				timeout_ms: None,
				enabled: true,
				name: Some(name.to_string()),
				api_key: key.map(ConfigurableValue::from_env),
				headers: None,
				chains: Vec::new(),
				fees,
			},
		)
	};

	HashMap::from([
		provider(
			"0x",
			"zerox-v1",
			"0x Protocol",
			"https://api.0x.org",
			Some("ZEROX_API_KEY"),
			ProviderFeeConfig::default(),
		),
		provider(
			"1inch",
			"oneinch-v5",
			"1inch",
			"https://api.1inch.dev/swap/v5.2",
			Some("ONEINCH_API_KEY"),
			ProviderFeeConfig::default(),
		),
		provider(
			"uniswap-v3",
			"uniswap-v3",
			"Uniswap V3",
			"",
			None,
			ProviderFeeConfig {
				lp_fee_bps: 30,
				..ProviderFeeConfig::default()
			},
		),
	])
}

/// Direct corridor between tokens pegged to the same regional currency
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct CorridorSettings {
	pub enabled: bool,
	pub chain_id: u64,
	/// Member tokens, by address or symbol
	pub tokens: Vec<String>,
	/// Hub token for the two-hop comparison, by address or symbol
	pub hub_token: String,
}

impl Default for CorridorSettings {
	fn default() -> Self {
		Self {
			enabled: true,
			chain_id: 8217,
			tokens: Vec::new(),
			hub_token: "USDC".to_string(),
		}
	}
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct FeeSettings {
	pub structure: FeeStructure,
	pub savings: SavingsShare,
	pub partner_discounts: Vec<VolumeDiscountTier>,
}

impl Default for FeeSettings {
	fn default() -> Self {
		Self {
			structure: FeeStructure::default(),
			savings: SavingsShare::default(),
			partner_discounts: default_partner_discounts(),
		}
	}
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct RiskSettings {
	pub default_thresholds: RiskThresholds,
	pub corridor_thresholds: RiskThresholds,
	/// Blacklisted tokens, by address or symbol
	pub blacklist: Vec<String>,
	pub whitelist: Vec<String>,
	/// Known pool TVL per token (address or symbol) in USD
	pub pool_tvl_usd: HashMap<String, f64>,
	/// TVL assumed for tokens missing from `pool_tvl_usd`
	pub default_pool_tvl_usd: f64,
	pub usd_krw_rate: f64,
	pub profile_ttl_secs: u64,
}

impl Default for RiskSettings {
	fn default() -> Self {
		Self {
			default_thresholds: RiskThresholds::standard(),
			corridor_thresholds: RiskThresholds::corridor(),
			blacklist: Vec::new(),
			whitelist: vec!["USDC".to_string(), "USDT".to_string(), "DAI".to_string()],
			pool_tvl_usd: HashMap::new(),
			default_pool_tvl_usd: 1_000_000.0,
			usd_krw_rate: 1300.0,
			profile_ttl_secs: RISK_PROFILE_TTL_SECS,
		}
	}
}

/// Environment-specific settings
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct EnvironmentSettings {
	pub profile: EnvironmentProfile,
	pub debug: bool,
}

impl Default for EnvironmentSettings {
	fn default() -> Self {
		Self {
			profile: EnvironmentProfile::Development,
			debug: true,
		}
	}
}

/// Environment profiles
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentProfile {
	Development,
	Staging,
	Production,
}

/// Logging configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingSettings {
	pub level: String,
	pub format: LogFormat,
	pub structured: bool,
}

impl Default for LoggingSettings {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
			format: LogFormat::Pretty,
			structured: false,
		}
	}
}

/// Log format options
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	Json,
	Pretty,
	Compact,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			server: ServerSettings::default(),
			timeouts: TimeoutSettings::default(),
			quote: QuoteSettings::default(),
			gas: GasSettings::default(),
			pricing: PricingSettings::default(),
			chains: default_chains(),
			tokens: default_tokens(),
			providers: default_providers(),
			corridor: CorridorSettings::default(),
			fees: FeeSettings::default(),
			risk: RiskSettings::default(),
			environment: EnvironmentSettings::default(),
			logging: LoggingSettings::default(),
		}
	}
}

impl Settings {
	/// Get server bind address
	pub fn bind_address(&self) -> String {
		format!("{}:{}", self.server.host, self.server.port)
	}

	/// Get enabled providers only
	pub fn enabled_providers(&self) -> impl Iterator<Item = &ProviderConfig> {
		self.providers.values().filter(|config| config.enabled)
	}

	/// Check if running in production
	pub fn is_production(&self) -> bool {
		self.environment.profile == EnvironmentProfile::Production
	}

	/// Check if debug mode is enabled
	pub fn is_debug(&self) -> bool {
		self.environment.debug && !self.is_production()
	}

	pub fn chain_infos(&self) -> Vec<ChainInfo> {
		self.chains.iter().map(ChainInfo::from).collect()
	}

	pub fn token_registry(&self) -> TokenRegistry {
		TokenRegistry::new(self.tokens.iter().map(TokenInfo::from).collect())
	}

	/// Validate ranges and cross-references
	pub fn validate(&self) -> Result<(), ConfigValidationError> {
		let timeout_range = MIN_PROVIDER_TIMEOUT_MS..=MAX_PROVIDER_TIMEOUT_MS;
		let check_timeout = |field: &str, value: u64| {
			if timeout_range.contains(&value) {
				Ok(())
			} else {
				Err(ConfigValidationError::InvalidTimeout {
					field: field.to_string(),
					value,
					min: MIN_PROVIDER_TIMEOUT_MS,
					max: MAX_PROVIDER_TIMEOUT_MS,
				})
			}
		};
		check_timeout("timeouts.per_provider_ms", self.timeouts.per_provider_ms)?;
		check_timeout("timeouts.global_ms", self.timeouts.global_ms)?;
		check_timeout("timeouts.request_ms", self.timeouts.request_ms)?;

		let quote = &self.quote;
		if quote.ttl_secs <= 0 {
			return Err(ConfigValidationError::InvalidQuoteSettings {
				reason: "ttl_secs must be positive".to_string(),
			});
		}
		if !(quote.min_amount_usd > 0.0 && quote.min_amount_usd <= quote.max_amount_usd) {
			return Err(ConfigValidationError::InvalidQuoteSettings {
				reason: format!(
					"amount bounds {}..{} are invalid",
					quote.min_amount_usd, quote.max_amount_usd
				),
			});
		}
		if !(MIN_SLIPPAGE_BPS..=MAX_SLIPPAGE_BPS).contains(&quote.max_slippage_bps) {
			return Err(ConfigValidationError::InvalidQuoteSettings {
				reason: format!(
					"max_slippage_bps must be between {} and {}",
					MIN_SLIPPAGE_BPS, MAX_SLIPPAGE_BPS
				),
			});
		}

		let fee_error = |e: ttv_types::FeeError| ConfigValidationError::InvalidFeeSettings {
			reason: e.to_string(),
		};
		self.fees.structure.validate().map_err(fee_error)?;
		self.fees.savings.validate().map_err(fee_error)?;
		validate_partner_discounts(&self.fees.partner_discounts).map_err(fee_error)?;

		if self.risk.usd_krw_rate <= 0.0 {
			return Err(ConfigValidationError::InvalidRiskSettings {
				reason: "usd_krw_rate must be positive".to_string(),
			});
		}
		if self.risk.default_pool_tvl_usd <= 0.0
			|| self.risk.pool_tvl_usd.values().any(|tvl| *tvl <= 0.0)
		{
			return Err(ConfigValidationError::InvalidRiskSettings {
				reason: "pool TVL values must be positive".to_string(),
			});
		}

		for (key, provider) in &self.providers {
			if provider.adapter_id.trim().is_empty() {
				return Err(ConfigValidationError::InvalidProvider {
					provider_id: key.clone(),
					reason: "adapter_id is required".to_string(),
				});
			}
			if let Some(timeout_ms) = provider.timeout_ms {
				check_timeout(&format!("providers.{}.timeout_ms", key), timeout_ms)?;
			}
		}

		for token in &self.tokens {
			if !self.chains.iter().any(|c| c.chain_id == token.chain_id) {
				return Err(ConfigValidationError::UnknownChain {
					chain_id: token.chain_id,
					token: token.symbol.clone(),
				});
			}
		}

		if self.corridor.enabled && !self.corridor.tokens.is_empty() {
			let registry = self.token_registry();
			for member in self.corridor.tokens.iter().chain([&self.corridor.hub_token]) {
				if registry.resolve(self.corridor.chain_id, member).is_none() {
					return Err(ConfigValidationError::InvalidCorridor {
						reason: format!(
							"token {} is not registered on chain {}",
							member, self.corridor.chain_id
						),
					});
				}
			}
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults_are_valid() {
		let settings = Settings::default();
		assert!(settings.validate().is_ok());
		assert_eq!(settings.bind_address(), "0.0.0.0:3000");
		assert_eq!(settings.quote.max_alternatives, 2);
		assert_eq!(settings.gas.buffer_bps, 1000);
		assert_eq!(settings.enabled_providers().count(), 3);
	}

	#[test]
	fn test_invalid_timeout_rejected() {
		let mut settings = Settings::default();
		settings.timeouts.per_provider_ms = 10;
		assert!(matches!(
			settings.validate(),
			Err(ConfigValidationError::InvalidTimeout { .. })
		));
	}

	#[test]
	fn test_unsorted_fee_tiers_rejected() {
		let mut settings = Settings::default();
		settings.fees.structure.volume_discounts.reverse();
		assert!(matches!(
			settings.validate(),
			Err(ConfigValidationError::InvalidFeeSettings { .. })
		));
	}

	#[test]
	fn test_corridor_members_must_be_registered() {
		let mut settings = Settings::default();
		settings.corridor.tokens = vec!["KRWx".to_string(), "KRT".to_string()];
		assert!(matches!(
			settings.validate(),
			Err(ConfigValidationError::InvalidCorridor { .. })
		));

		settings.tokens.push(token(
			8217,
			"0x1111111111111111111111111111111111111111",
			"KRWx",
			18,
			Some(PegCurrency::Krw),
		));
		settings.tokens.push(token(
			8217,
			"0x2222222222222222222222222222222222222222",
			"KRT",
			18,
			Some(PegCurrency::Krw),
		));
		assert!(settings.validate().is_ok());
	}

	#[test]
	fn test_provider_conversion_resolves_plain_key() {
		let mut config = Settings::default().providers["0x"].clone();
		config.api_key = Some(ConfigurableValue::from_plain("k"));
		let provider = config.to_provider(2_000).unwrap();
		assert_eq!(provider.timeout_ms, 2_000);
		assert_eq!(provider.api_key.unwrap().expose_secret(), "k");
		assert_eq!(provider.name, "0x Protocol");
	}

	#[test]
	fn test_partial_json_keeps_other_defaults() {
		let settings: Settings =
			serde_json::from_str(r#"{"quote":{"ttl_secs":45},"server":{"port":8080}}"#).unwrap();
		assert_eq!(settings.quote.ttl_secs, 45);
		assert_eq!(settings.quote.max_slippage_bps, 1000);
		assert_eq!(settings.server.port, 8080);
		assert_eq!(settings.chains.len(), 2);
	}
}
