//! TTV Aggregator Library
//!
//! Multi-provider swap quote aggregator that ranks routes by total
//! transaction value: every cost a trader pays, normalized to USD.

pub use ttv_types::{
	chrono,
	serde_json,
	ChainInfo,
	CorridorComparison,
	CostBreakdown,
	ExecutionPlan,
	FeeCalculation,
	PriceFeed,
	Provider,
	ProviderAdapter,
	ProviderError,
	ProviderQuote,
	ProviderQuoteRequest,
	QuoteError,
	QuoteRequest,
	QuoteResponse,
	RiskAssessment,
	RouteInfo,
	TokenInfo,
};

pub use ttv_service::{
	CorridorOptimizer, CostNormalizer, FeeEngine, LiquiditySource, PriceCache, ProviderGateway,
	QuoteService, QuoteServiceTrait, RiskGate, RouteSelector,
};

pub use ttv_api::{create_router, AppState};
pub use ttv_adapters::{ClientCache, HttpPriceFeed, ProviderRegistry};
pub use ttv_config::{load_config, log_service_info, log_startup_complete, Settings};

pub mod config {
	pub use ttv_config::*;
}

pub mod adapters {
	pub use ttv_adapters::*;
}

pub mod api {
	pub use ttv_api::*;
}

pub mod service {
	pub use ttv_service::*;
}

pub mod models {
	pub use ttv_types::*;
}

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use ttv_config::{log_service_shutdown, LogFormat};
use ttv_types::constants::limits::QUOTE_PURGE_INTERVAL_SECS;
use ttv_service::{
	NormalizerConfig, PriceCacheConfig, QuoteServiceConfig, QuoteServiceParts, RiskConfig,
	StaticLiquiditySource,
};

pub use async_trait;
pub use reqwest;

/// Builder wiring every component once at process start
#[derive(Default)]
pub struct AggregatorBuilder {
	settings: Option<Settings>,
	registry: Option<ProviderRegistry>,
	providers: Vec<Provider>,
	price_feed: Option<Arc<dyn PriceFeed>>,
	liquidity: Option<Arc<dyn LiquiditySource>>,
	background_refresh: Option<bool>,
}

impl AggregatorBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Create aggregator builder from configuration
	pub fn from_config(settings: Settings) -> Self {
		Self::new().with_settings(settings)
	}

	pub fn with_settings(mut self, settings: Settings) -> Self {
		self.settings = Some(settings);
		self
	}

	pub fn settings(&self) -> Option<&Settings> {
		self.settings.as_ref()
	}

	/// Register a custom adapter next to the built-in ones
	pub fn with_adapter(mut self, adapter: Arc<dyn ProviderAdapter>) -> Self {
		let mut registry = self
			.registry
			.unwrap_or_else(|| ProviderRegistry::with_defaults(ClientCache::new()));
		registry.register(adapter);
		self.registry = Some(registry);
		self
	}

	/// Add a provider on top of the ones enabled in settings
	pub fn with_provider(mut self, provider: Provider) -> Self {
		self.providers.push(provider);
		self
	}

	/// Replace the CoinGecko feed
	pub fn with_price_feed(mut self, feed: Arc<dyn PriceFeed>) -> Self {
		self.price_feed = Some(feed);
		self
	}

	/// Replace the configured pool TVL table
	pub fn with_liquidity_source(mut self, liquidity: Arc<dyn LiquiditySource>) -> Self {
		self.liquidity = Some(liquidity);
		self
	}

	/// Override `pricing.background_refresh`
	pub fn with_background_refresh(mut self, enabled: bool) -> Self {
		self.background_refresh = Some(enabled);
		self
	}

	/// Initialize tracing with configuration-based settings
	fn init_tracing_from_settings(settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
		let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
			.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.logging.level));
		let structured = settings.logging.structured;
		let builder = tracing_subscriber::fmt()
			.with_env_filter(env_filter)
			.with_target(structured)
			.with_thread_ids(structured);

		let result = match settings.logging.format {
			LogFormat::Json => builder.json().try_init(),
			LogFormat::Pretty => builder.pretty().try_init(),
			LogFormat::Compact => builder.compact().try_init(),
		};
		result.map_err(|e| format!("Failed to initialize tracing: {}", e))?;

		info!(
			"Logging configuration applied: level={}, format={:?}, structured={}",
			settings.logging.level, settings.logging.format, settings.logging.structured
		);
		Ok(())
	}

	fn build_state(self, settings: &Settings) -> Result<AppState, Box<dyn std::error::Error>> {
		settings.validate()?;

		let chains = settings.chain_infos();
		let tokens = Arc::new(settings.token_registry());
		let client_cache = ClientCache::new();

		let registry = self
			.registry
			.unwrap_or_else(|| ProviderRegistry::with_defaults(client_cache.clone()));
		let mut providers = Vec::new();
		for config in settings.enabled_providers() {
			let provider = config
				.to_provider(settings.timeouts.per_provider_ms)
				.map_err(|e| format!("Provider '{}': {}", config.provider_id, e))?;
			providers.push(provider);
		}
		providers.extend(self.providers);
		providers.sort_by(|a, b| a.provider_id.cmp(&b.provider_id));

		let gateway = Arc::new(ProviderGateway::new(
			Arc::new(registry),
			providers,
			chains.clone(),
		));
		gateway
			.validate_providers()
			.map_err(|e| format!("Provider validation failed: {}", e))?;
		info!("Initialized with {} provider(s)", gateway.providers().len());

		let feed = match self.price_feed {
			Some(feed) => feed,
			None => {
				let api_key = settings
					.pricing
					.coingecko_api_key
					.as_ref()
					.map(|key| key.resolve_for_secret())
					.transpose()
					.map_err(|e| format!("CoinGecko API key: {}", e))?;
				Arc::new(HttpPriceFeed::new(
					client_cache,
					&settings.pricing.coingecko_url,
					api_key,
					chains,
					settings.timeouts.per_provider_ms,
				)) as Arc<dyn PriceFeed>
			},
		};
		let prices = Arc::new(PriceCache::new(
			feed,
			PriceCacheConfig {
				max_price_age: Duration::from_secs(settings.pricing.max_price_age_secs),
				gas_refresh: Duration::from_secs(settings.pricing.gas_refresh_secs),
			},
		));

		let normalizer = Arc::new(CostNormalizer::new(NormalizerConfig {
			gas_buffer_bps: settings.gas.buffer_bps,
			default_gas_limit: settings.gas.default_gas_limit,
			corridor_gas_limit: settings.gas.corridor_gas_limit,
			fee_tables: settings
				.providers
				.values()
				.map(|p| (p.provider_id.clone(), p.fees.clone()))
				.collect(),
		}));
		let selector = Arc::new(RouteSelector::new(
			settings.quote.provider_priority.clone(),
			settings.quote.max_alternatives,
		));
		let corridor = Arc::new(CorridorOptimizer::from_settings(&settings.corridor, &tokens));
		if settings.corridor.enabled && !corridor.is_enabled() {
			warn!("Corridor is enabled in settings but its hub or members did not resolve");
		}

		let liquidity = self.liquidity.unwrap_or_else(|| {
			Arc::new(StaticLiquiditySource::new(
				settings.risk.pool_tvl_usd.clone(),
				settings.risk.default_pool_tvl_usd,
			))
		});
		let risk = Arc::new(RiskGate::new(
			Arc::clone(&prices),
			liquidity,
			RiskConfig::from(&settings.risk),
			corridor.members().to_vec(),
		));
		let fees = Arc::new(FeeEngine::from_settings(&settings.fees)?);

		if self
			.background_refresh
			.unwrap_or(settings.pricing.background_refresh)
		{
			Arc::clone(&prices).spawn_refresher(
				tokens.all().to_vec(),
				gateway.chain_ids(),
				Duration::from_secs(settings.pricing.refresh_interval_secs.max(1)),
			);
		}

		let quote_service = QuoteService::new(
			QuoteServiceParts {
				gateway: Arc::clone(&gateway),
				normalizer,
				selector,
				prices,
				risk: Arc::clone(&risk),
				fees: Arc::clone(&fees),
				corridor,
				tokens: Arc::clone(&tokens),
			},
			QuoteServiceConfig::from(settings),
		);
		quote_service.spawn_purger(Duration::from_secs(QUOTE_PURGE_INTERVAL_SECS));

		Ok(AppState {
			quote_service: Arc::new(quote_service) as Arc<dyn QuoteServiceTrait>,
			gateway,
			risk,
			fees,
			tokens,
		})
	}

	/// Wire every component and return the router with its state
	pub async fn start(mut self) -> Result<(axum::Router, AppState), Box<dyn std::error::Error>> {
		let settings = self.settings.take().unwrap_or_default();
		let state = self.build_state(&settings)?;
		let router = create_router(&settings.server.cors_origins).with_state(state.clone());
		Ok((router, state))
	}

	/// Load `.env` and configuration, initialize tracing, then bind and serve
	/// until Ctrl-C
	pub async fn start_server(mut self) -> Result<(), Box<dyn std::error::Error>> {
		dotenvy::dotenv().ok();

		let using_provided_settings = self.settings.is_some();
		let settings = match self.settings.take() {
			Some(settings) => settings,
			None => load_config()?,
		};

		Self::init_tracing_from_settings(&settings)?;
		log_service_info(&settings);
		info!(
			"Using configuration: loaded from {}",
			if using_provided_settings {
				"provided settings"
			} else {
				"config file or defaults"
			}
		);

		let bind_addr = settings.bind_address();
		let addr: SocketAddr = bind_addr
			.parse()
			.map_err(|e| format!("Invalid bind address '{}': {}", bind_addr, e))?;

		self.settings = Some(settings);
		let (app, _) = self.start().await?;

		let listener = tokio::net::TcpListener::bind(addr).await?;
		log_startup_complete(&bind_addr);

		axum::serve(listener, app)
			.with_graceful_shutdown(async {
				if let Err(e) = tokio::signal::ctrl_c().await {
					warn!("Failed to listen for shutdown signal: {}", e);
				}
			})
			.await?;

		log_service_shutdown();
		Ok(())
	}
}
