//! Risk gate handlers

use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::handlers::common::{risk_error, ApiError};
use crate::state::AppState;
use ttv_types::{DepegAlert, RiskAssessment, RiskError, TokenInfo};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessRequest {
	pub chain_id: u64,
	pub token: String,
	/// Second token of the swap; both sides are assessed when present
	#[serde(default)]
	pub token_out: Option<String>,
	pub amount_usd: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepegCheckRequest {
	pub chain_id: u64,
	pub token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepegCheckResponse {
	pub token: TokenInfo,
	pub depegged: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub alert: Option<DepegAlert>,
}

#[derive(Debug, Serialize)]
pub struct DepegAlertsResponse {
	pub alerts: Vec<DepegAlert>,
	pub total: usize,
}

fn resolve(state: &AppState, chain_id: u64, token: &str) -> Result<TokenInfo, ApiError> {
	state
		.tokens
		.resolve(chain_id, token)
		.cloned()
		.ok_or_else(|| {
			risk_error(RiskError::UnknownToken {
				chain_id,
				token: token.to_string(),
			})
		})
}

/// POST /api/v1/risk/assess - Risk assessment for a token and USD amount
pub async fn post_assess(
	State(state): State<AppState>,
	Json(request): Json<RiskAssessRequest>,
) -> Result<Json<RiskAssessment>, ApiError> {
	let token = resolve(&state, request.chain_id, &request.token)?;
	let assessment = match &request.token_out {
		Some(token_out) => {
			let token_out = resolve(&state, request.chain_id, token_out)?;
			state
				.risk
				.assess_pair(&token, &token_out, request.amount_usd)
				.await
		},
		None => state.risk.assess(&token, request.amount_usd).await,
	}
	.map_err(risk_error)?;

	debug!(
		"Risk for {} at ${:.2}: score {}",
		token.symbol, request.amount_usd, assessment.risk_score
	);
	Ok(Json(assessment))
}

/// POST /api/v1/risk/check-depeg - Standalone depeg check
pub async fn post_check_depeg(
	State(state): State<AppState>,
	Json(request): Json<DepegCheckRequest>,
) -> Result<Json<DepegCheckResponse>, ApiError> {
	let token = resolve(&state, request.chain_id, &request.token)?;
	let alert = state.risk.check_depeg(&token).await.map_err(risk_error)?;
	Ok(Json(DepegCheckResponse {
		token,
		depegged: alert.is_some(),
		alert,
	}))
}

/// GET /api/v1/risk/depeg-alerts - Latest alert per token
pub async fn get_depeg_alerts(State(state): State<AppState>) -> Json<DepegAlertsResponse> {
	let alerts = state.risk.depeg_alerts();
	Json(DepegAlertsResponse {
		total: alerts.len(),
		alerts,
	})
}
