//! Global limits and defaults for configuration and runtime

/// Basis-point denominator (100% = 10_000 bps)
pub const BPS_DENOMINATOR: f64 = 10_000.0;

/// Minimum slippage tolerance accepted on a quote request
pub const MIN_SLIPPAGE_BPS: u16 = 1;

/// Maximum slippage tolerance accepted on a quote request
pub const MAX_SLIPPAGE_BPS: u16 = 1_000; // 10%

/// Default slippage tolerance when the caller omits it
pub const DEFAULT_SLIPPAGE_BPS: u16 = 50;

/// Minimum allowed timeout for provider requests in milliseconds
pub const MIN_PROVIDER_TIMEOUT_MS: u64 = 100;

/// Maximum allowed timeout for provider requests in milliseconds
pub const MAX_PROVIDER_TIMEOUT_MS: u64 = 30_000;

/// Default timeout for provider requests in milliseconds
pub const DEFAULT_PROVIDER_TIMEOUT_MS: u64 = 5_000;

/// Default timeout for the whole quote pipeline in milliseconds
pub const DEFAULT_PIPELINE_TIMEOUT_MS: u64 = 8_000;

/// Lifetime of an issued quote
pub const QUOTE_TTL_SECS: i64 = 30;

/// How often issued quotes past their grace period are dropped
pub const QUOTE_PURGE_INTERVAL_SECS: u64 = 30;

/// Window over which trader volume counts toward discount tiers
pub const TRAILING_VOLUME_WINDOW_DAYS: i64 = 30;

/// Number of alternatives kept on a quote response
pub const DEFAULT_MAX_ALTERNATIVES: usize = 2;

/// Token prices older than this are refused
pub const DEFAULT_MAX_PRICE_AGE_SECS: u64 = 60;

/// Gas prices are refreshed after this age but may be served stale
pub const DEFAULT_GAS_PRICE_REFRESH_SECS: u64 = 15;

/// Buffer applied to gas cost estimates (10%)
pub const DEFAULT_GAS_BUFFER_BPS: u32 = 1_000;

/// Gas limit assumed when a provider does not report an estimate
pub const DEFAULT_GAS_LIMIT: u64 = 200_000;

/// Gas limit used for a direct corridor swap
pub const DEFAULT_CORRIDOR_GAS_LIMIT: u64 = 150_000;

/// Maximum age of a cached token risk profile
pub const RISK_PROFILE_TTL_SECS: u64 = 300;

/// Risk score at or above which a transaction is blocked
pub const RISK_BLOCK_SCORE: u8 = 80;

/// Highest possible risk score
pub const MAX_RISK_SCORE: u8 = 100;

/// Trades above this USD size get an RFQ recommendation
pub const LARGE_TRADE_USD: f64 = 100_000.0;

/// Decimal places kept when splitting fee revenue
pub const REVENUE_DECIMALS: u32 = 6;

/// Placeholder address for a chain's native asset
pub const NATIVE_TOKEN_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Placeholder address some aggregators use for the native asset
pub const NATIVE_TOKEN_ALIAS: &str = "0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee";
