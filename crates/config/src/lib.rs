//! TTV Configuration
//!
//! Settings tree, file/environment loading and startup logging for the
//! TTV quote aggregator.

pub mod configurable_value;
pub mod loader;
pub mod settings;
pub mod startup_logger;

pub use configurable_value::{ConfigurableValue, ConfigurableValueError, ValueType};
pub use loader::{load_config, load_config_from, ConfigLoadError};
pub use settings::{
	ChainConfig, ConfigValidationError, CorridorSettings, EnvironmentProfile, EnvironmentSettings,
	FeeSettings, GasSettings, LogFormat, LoggingSettings, PricingSettings, ProviderConfig,
	ProviderFeeConfig, QuoteSettings, RiskSettings, ServerSettings, Settings, TimeoutSettings,
	TokenConfig,
};
pub use startup_logger::{log_service_info, log_service_shutdown, log_startup_complete};
