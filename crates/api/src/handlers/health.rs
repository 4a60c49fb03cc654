use axum::{extract::State, http::StatusCode, response::Json};
use serde::Serialize;
use std::collections::HashMap;

use crate::state::AppState;

/// GET /health - Liveness check
pub async fn health() -> &'static str {
	"OK"
}

/// Readiness response
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
	pub status: String,
	pub providers: HashMap<String, bool>,
}

/// GET /ready - Ready while at least one provider answers its health check
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
	let providers = state.gateway.health_check_all().await;
	let healthy = providers.is_empty() || providers.values().any(|v| *v);

	let status = if healthy { "ready" } else { "degraded" };
	let body = ReadinessResponse {
		status: status.to_string(),
		providers,
	};
	let code = if healthy {
		StatusCode::OK
	} else {
		StatusCode::SERVICE_UNAVAILABLE
	};
	(code, Json(body))
}
