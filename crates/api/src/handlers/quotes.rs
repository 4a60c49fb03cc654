//! Quote and transaction-builder handlers

use axum::{
	extract::{Path, State},
	response::Json,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::handlers::common::{execution_error, quote_error, ApiError};
use crate::state::AppState;
use ttv_types::{BuildTransactionRequest, ExecutionPlan, ProviderKind, QuoteRequest, QuoteResponse};

/// POST /api/v1/quote - Run the full quote pipeline
pub async fn post_quote(
	State(state): State<AppState>,
	Json(request): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>, ApiError> {
	info!(
		"Received quote request {} -> {} on chain {}",
		request.from_token, request.to_token, request.chain_id
	);

	let quote = state.quote_service.get_quote(request).await.map_err(|e| {
		warn!("Quote request failed: {}", e);
		quote_error(e)
	})?;

	info!(
		"Returning quote {} (best {}, {} alternatives, executable: {})",
		quote.quote_id,
		quote.best_route.provider_id,
		quote.alternatives.len(),
		quote.executable
	);
	Ok(Json(quote))
}

/// GET /api/v1/quote/{id} - Fetch a previously issued quote
pub async fn get_quote(
	State(state): State<AppState>,
	Path(quote_id): Path<String>,
) -> Result<Json<QuoteResponse>, ApiError> {
	debug!("Looking up quote {}", quote_id);
	let quote = state
		.quote_service
		.get_issued(&quote_id)
		.await
		.map_err(quote_error)?;
	Ok(Json(quote))
}

/// Provider entry listed by the providers endpoint
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSummary {
	pub provider_id: String,
	pub name: String,
	pub adapter_id: String,
	pub kind: ProviderKind,
	pub enabled: bool,
	pub timeout_ms: u64,
	pub chains: Vec<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvidersResponse {
	pub providers: Vec<ProviderSummary>,
	pub total: usize,
	pub chains: Vec<u64>,
}

/// GET /api/v1/quote/providers - Configured providers
pub async fn get_providers(State(state): State<AppState>) -> Json<ProvidersResponse> {
	let providers: Vec<ProviderSummary> = state
		.gateway
		.providers()
		.iter()
		.map(|p| ProviderSummary {
			provider_id: p.provider_id.clone(),
			name: p.name.clone(),
			adapter_id: p.adapter_id.clone(),
			kind: state.gateway.provider_kind(&p.provider_id),
			enabled: p.enabled,
			timeout_ms: p.timeout_ms,
			chains: p.chains.clone(),
		})
		.collect();

	Json(ProvidersResponse {
		total: providers.len(),
		providers,
		chains: state.gateway.chain_ids(),
	})
}

/// POST /api/v1/tx/build - Approve and swap transactions for an issued quote
pub async fn post_build_transaction(
	State(state): State<AppState>,
	Json(request): Json<BuildTransactionRequest>,
) -> Result<Json<ExecutionPlan>, ApiError> {
	info!("Building transactions for quote {}", request.quote_id);
	let plan = state
		.quote_service
		.build_transaction(request)
		.await
		.map_err(execution_error)?;
	Ok(Json(plan))
}
