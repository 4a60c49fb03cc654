use axum::{http::StatusCode, response::Json};
use serde::Serialize;
use ttv_types::{ExecutionError, FeeError, QuoteError, QuoteValidationError, RiskError};

/// Error response format shared by handlers
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
	pub error: String,
	pub message: String,
	pub timestamp: i64,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<serde_json::Value>,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn api_error(status: StatusCode, code: &str, message: impl Into<String>) -> ApiError {
	(
		status,
		Json(ErrorResponse {
			error: code.to_string(),
			message: message.into(),
			timestamp: chrono::Utc::now().timestamp(),
			details: None,
		}),
	)
}

fn validation_error(e: &QuoteValidationError) -> ApiError {
	let code = match e {
		QuoteValidationError::UnsupportedToken { .. } => "UNSUPPORTED_TOKEN",
		QuoteValidationError::UnsupportedChain { .. } => "UNSUPPORTED_CHAIN",
		_ => "VALIDATION_ERROR",
	};
	api_error(StatusCode::BAD_REQUEST, code, e.to_string())
}

pub fn quote_error(e: QuoteError) -> ApiError {
	match e {
		QuoteError::Validation(ref inner) => validation_error(inner),
		QuoteError::NoQuotesAvailable { ref failures } => {
			let (status, mut body) = api_error(
				StatusCode::SERVICE_UNAVAILABLE,
				"NO_QUOTES_AVAILABLE",
				e.to_string(),
			);
			body.details = serde_json::to_value(failures).ok();
			(status, body)
		},
		QuoteError::StalePrice(_) => {
			api_error(StatusCode::SERVICE_UNAVAILABLE, "STALE_PRICE", e.to_string())
		},
		QuoteError::Fee(inner) => fee_error(inner),
		QuoteError::Risk(inner) => risk_error(inner),
		QuoteError::Timeout { .. } => api_error(StatusCode::GATEWAY_TIMEOUT, "TIMEOUT", e.to_string()),
		QuoteError::Expired { .. } => api_error(StatusCode::GONE, "QUOTE_EXPIRED", e.to_string()),
		QuoteError::NotFound { .. } => {
			api_error(StatusCode::NOT_FOUND, "QUOTE_NOT_FOUND", e.to_string())
		},
		QuoteError::ProcessingFailed { .. } => {
			api_error(StatusCode::INTERNAL_SERVER_ERROR, "PROCESSING_FAILED", e.to_string())
		},
	}
}

pub fn execution_error(e: ExecutionError) -> ApiError {
	let (status, code) = match e {
		ExecutionError::QuoteNotFound { .. } => (StatusCode::NOT_FOUND, "QUOTE_NOT_FOUND"),
		ExecutionError::QuoteExpired { .. } => (StatusCode::GONE, "QUOTE_EXPIRED"),
		ExecutionError::RiskBlocked { .. } => (StatusCode::FORBIDDEN, "RISK_BLOCKED"),
		ExecutionError::MissingTrader { .. } => {
			(StatusCode::UNPROCESSABLE_ENTITY, "MISSING_TRADER")
		},
		ExecutionError::TraderMismatch { .. } => (StatusCode::FORBIDDEN, "TRADER_MISMATCH"),
		ExecutionError::MissingCallData { .. } => {
			(StatusCode::UNPROCESSABLE_ENTITY, "MISSING_CALL_DATA")
		},
		ExecutionError::InvalidAddress { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
		ExecutionError::Encoding { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "ENCODING_ERROR"),
	};
	api_error(status, code, e.to_string())
}

pub fn fee_error(e: FeeError) -> ApiError {
	let (status, code) = match e {
		FeeError::PartnerNotFound { .. } => (StatusCode::NOT_FOUND, "PARTNER_NOT_FOUND"),
		FeeError::PartnerExists { .. } => (StatusCode::CONFLICT, "PARTNER_EXISTS"),
		_ => (StatusCode::BAD_REQUEST, "FEE_ERROR"),
	};
	api_error(status, code, e.to_string())
}

pub fn risk_error(e: RiskError) -> ApiError {
	let (status, code) = match e {
		RiskError::UnknownToken { .. } => (StatusCode::BAD_REQUEST, "UNSUPPORTED_TOKEN"),
		RiskError::NotPegged { .. } => (StatusCode::BAD_REQUEST, "TOKEN_NOT_PEGGED"),
		RiskError::InvalidAmount { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
		RiskError::Price(_) => (StatusCode::SERVICE_UNAVAILABLE, "STALE_PRICE"),
	};
	api_error(status, code, e.to_string())
}
