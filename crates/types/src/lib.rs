//! TTV Types
//!
//! Shared models and traits for the TTV quote aggregator: provider and
//! price-feed contracts, cost breakdowns, fee, risk and corridor models.

pub mod constants;
pub mod corridor;
pub mod execution;
pub mod fees;
pub mod models;
pub mod prices;
pub mod providers;
pub mod quotes;
pub mod risk;
pub mod routes;

pub use chrono;
pub use rust_decimal;
pub use serde_json;

pub use corridor::{CorridorComparison, HubLeg};
pub use execution::{BuildTransactionRequest, ExecutionError, ExecutionPlan, TransactionPayload};
pub use fees::{
	FeeCalculation, FeeClamp, FeeError, FeeMode, FeeResult, FeeStructure, PartnerRevenueRecord,
	RecordTransactionRequest, SavingsShare, TransactionRecord, VolumeDiscountTier,
};
pub use models::{ChainInfo, PegCurrency, SecretString, TokenInfo, TokenRegistry};
pub use prices::{GasSnapshot, PriceError, PriceFeed, PriceResult, PriceSnapshot};
pub use providers::{
	AdapterInfo, Provider, ProviderAdapter, ProviderError, ProviderFees, ProviderKind,
	ProviderQuote, ProviderQuoteRequest, ProviderResult, ProviderRuntimeConfig,
};
pub use quotes::{
	ProviderFailure, QuoteError, QuoteRequest, QuoteResponse, QuoteResult, QuoteValidationError,
};
pub use risk::{
	DepegAlert, DepegSeverity, RiskAssessment, RiskError, RiskFactor, RiskFactorType, RiskLevel,
	RiskThresholds, Severity, TokenRiskProfile,
};
pub use routes::{CostBreakdown, RouteInfo};
