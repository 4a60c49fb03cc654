//! Fee engine and partner ledger handlers

use axum::{
	extract::{Path, State},
	http::StatusCode,
	response::Json,
};
use serde::{Deserialize, Serialize};

use crate::handlers::common::{fee_error, ApiError};
use crate::state::AppState;
use ttv_service::FeeRequest;
use ttv_types::{
	FeeCalculation, FeeStructure, PartnerRevenueRecord, RecordTransactionRequest,
	TransactionRecord,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPartnerRequest {
	pub partner_id: String,
	pub name: String,
	#[serde(default)]
	pub share_percent: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct PartnersResponse {
	pub partners: Vec<PartnerRevenueRecord>,
	pub total: usize,
}

/// POST /api/v1/fees/calculate - Flat or savings-based fee quote
pub async fn post_calculate(
	State(state): State<AppState>,
	Json(request): Json<FeeRequest>,
) -> Result<Json<FeeCalculation>, ApiError> {
	let calculation = state.fees.calculate(&request).await.map_err(fee_error)?;
	Ok(Json(calculation))
}

/// GET /api/v1/fees/structure - Current fee structure
pub async fn get_structure(State(state): State<AppState>) -> Json<FeeStructure> {
	Json(state.fees.fee_structure().await)
}

/// PUT /api/v1/fees/structure - Replace the fee structure
pub async fn put_structure(
	State(state): State<AppState>,
	Json(structure): Json<FeeStructure>,
) -> Result<Json<FeeStructure>, ApiError> {
	let updated = state
		.fees
		.update_fee_structure(structure)
		.await
		.map_err(fee_error)?;
	Ok(Json(updated))
}

/// POST /api/v1/fees/transactions - Record a completed transaction
pub async fn post_transaction(
	State(state): State<AppState>,
	Json(request): Json<RecordTransactionRequest>,
) -> Result<(StatusCode, Json<TransactionRecord>), ApiError> {
	let record = state.fees.record_transaction(request).map_err(fee_error)?;
	Ok((StatusCode::CREATED, Json(record)))
}

/// POST /api/v1/partners - Register a partner
pub async fn post_partner(
	State(state): State<AppState>,
	Json(request): Json<RegisterPartnerRequest>,
) -> Result<(StatusCode, Json<PartnerRevenueRecord>), ApiError> {
	let partner = state
		.fees
		.register_partner(&request.partner_id, &request.name, request.share_percent)
		.await
		.map_err(fee_error)?;
	Ok((StatusCode::CREATED, Json(partner)))
}

/// GET /api/v1/partners - List partners
pub async fn get_partners(State(state): State<AppState>) -> Json<PartnersResponse> {
	let partners = state.fees.list_partners();
	Json(PartnersResponse {
		total: partners.len(),
		partners,
	})
}

/// GET /api/v1/partners/{id} - Partner record
pub async fn get_partner(
	State(state): State<AppState>,
	Path(partner_id): Path<String>,
) -> Result<Json<PartnerRevenueRecord>, ApiError> {
	let partner = state.fees.get_partner(&partner_id).map_err(fee_error)?;
	Ok(Json(partner))
}
