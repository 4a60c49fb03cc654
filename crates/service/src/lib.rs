//! TTV Service
//!
//! Core quote pipeline: provider fan-out, cost normalization, ranking,
//! corridor comparison, risk gating, fees and the quote lifecycle.

pub mod corridor;
pub mod execution;
pub mod fees;
pub mod gateway;
pub mod normalizer;
pub mod price_cache;
pub mod quote;
pub mod risk;
pub mod route_selector;
pub mod ttl_cache;

#[cfg(test)]
mod test_support;

pub use corridor::{CorridorOptimizer, LegPricing};
pub use execution::ExecutionPlanner;
pub use fees::{split_revenue, FeeEngine, FeeRequest};
pub use gateway::{GatewayResult, ProviderAttempt, ProviderGateway};
pub use normalizer::{CostNormalizer, NormalizationInput, NormalizeError, NormalizerConfig};
pub use price_cache::{PriceCache, PriceCacheConfig};
pub use quote::{QuoteService, QuoteServiceConfig, QuoteServiceParts, QuoteServiceTrait};
pub use risk::{LiquiditySource, RiskConfig, RiskGate, StaticLiquiditySource};
pub use route_selector::{annotate_savings, RankedRoutes, RouteSelector};
pub use ttl_cache::TtlCache;
