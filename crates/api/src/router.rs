use axum::{
	http::HeaderValue,
	routing::{get, post},
	Router,
};
use tower::ServiceBuilder;
use tower_http::{
	compression::CompressionLayer,
	cors::{AllowOrigin, CorsLayer},
	limit::RequestBodyLimitLayer,
	request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
	trace::TraceLayer,
};
use tracing::{warn, Level};

use crate::handlers::{
	get_depeg_alerts, get_partner, get_partners, get_providers, get_quote, get_structure, health,
	post_assess, post_build_transaction, post_calculate, post_check_depeg, post_partner,
	post_quote, post_transaction, put_structure, ready,
};
use crate::security::add_security_headers;
use crate::state::AppState;

const MAX_BODY_BYTES: usize = 1024 * 1024;

/// CORS from the configured origins; empty or `*` allows any origin
fn cors_layer(origins: &[String]) -> CorsLayer {
	if origins.is_empty() || origins.iter().any(|o| o == "*") {
		return CorsLayer::permissive();
	}
	let allowed: Vec<HeaderValue> = origins
		.iter()
		.filter_map(|origin| match HeaderValue::from_str(origin) {
			Ok(value) => Some(value),
			Err(_) => {
				warn!("Ignoring invalid CORS origin {}", origin);
				None
			},
		})
		.collect();
	CorsLayer::permissive().allow_origin(AllowOrigin::list(allowed))
}

pub fn create_router(cors_origins: &[String]) -> Router<AppState> {
	let cors = cors_layer(cors_origins);
	let body_limit = RequestBodyLimitLayer::new(MAX_BODY_BYTES);
	let trace = TraceLayer::new_for_http()
		.make_span_with(|req: &axum::http::Request<_>| {
			let req_id = req
				.headers()
				.get("x-request-id")
				.and_then(|v| v.to_str().ok())
				.unwrap_or("-");
			tracing::info_span!(
				"http_request",
				method = %req.method(),
				uri = %req.uri(),
				req_id
			)
		})
		.on_request(tower_http::trace::DefaultOnRequest::new().level(Level::INFO))
		.on_response(
			tower_http::trace::DefaultOnResponse::new()
				.level(Level::INFO)
				.latency_unit(tower_http::LatencyUnit::Millis),
		);
	let req_id = ServiceBuilder::new()
		.layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
		.layer(PropagateRequestIdLayer::x_request_id());

	let router = Router::new()
		.route("/health", get(health))
		.route("/ready", get(ready))
		.route("/api/v1/quote", post(post_quote))
		.route("/api/v1/quote/providers", get(get_providers))
		.route("/api/v1/quote/{id}", get(get_quote))
		.route("/api/v1/tx/build", post(post_build_transaction))
		.route("/api/v1/risk/assess", post(post_assess))
		.route("/api/v1/risk/check-depeg", post(post_check_depeg))
		.route("/api/v1/risk/depeg-alerts", get(get_depeg_alerts))
		.route("/api/v1/fees/calculate", post(post_calculate))
		.route("/api/v1/fees/structure", get(get_structure).put(put_structure))
		.route("/api/v1/fees/transactions", post(post_transaction))
		.route("/api/v1/partners", get(get_partners).post(post_partner))
		.route("/api/v1/partners/{id}", get(get_partner));

	let router = router
		.layer(cors)
		.layer(CompressionLayer::new())
		.layer(trace)
		.layer(req_id)
		.layer(body_limit);

	add_security_headers(router)
}
