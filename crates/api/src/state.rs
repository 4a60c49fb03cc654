use std::sync::Arc;

use ttv_service::{FeeEngine, ProviderGateway, QuoteServiceTrait, RiskGate};
use ttv_types::TokenRegistry;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
	pub quote_service: Arc<dyn QuoteServiceTrait>,
	pub gateway: Arc<ProviderGateway>,
	pub risk: Arc<RiskGate>,
	pub fees: Arc<FeeEngine>,
	pub tokens: Arc<TokenRegistry>,
}
