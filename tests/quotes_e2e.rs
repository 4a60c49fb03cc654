//! Quote pipeline and transaction builder E2E tests

mod mocks;

use std::sync::Arc;
use std::time::Duration;

use crate::mocks::adapters::{MockProviderAdapter, ROUTER};
use crate::mocks::api_fixtures::components_total;
use crate::mocks::configs::{mock_provider, mock_provider_with_timeout, test_settings, KRW_CHAIN};
use crate::mocks::feeds::StaticPriceFeed;
use crate::mocks::{ApiFixtures, TestServer};
use reqwest::{Client, StatusCode};
use ttv_aggregator::serde_json::{json, Value};
use ttv_aggregator::AggregatorBuilder;

async fn post_quote(client: &Client, server: &TestServer, body: &Value) -> reqwest::Response {
	client
		.post(server.url("/api/v1/quote"))
		.json(body)
		.send()
		.await
		.unwrap()
}

#[tokio::test]
async fn test_quote_ranks_cheapest_route_first() {
	let server = TestServer::spawn().await.expect("Failed to start test server");
	let client = Client::new();

	let resp = post_quote(&client, &server, &ApiFixtures::quote_request("1000")).await;
	assert_eq!(resp.status(), StatusCode::OK);
	let body: Value = resp.json().await.unwrap();

	assert_eq!(body["bestRoute"]["providerId"], "alpha");
	let alternatives = body["alternatives"].as_array().unwrap();
	let ids: Vec<&str> = alternatives
		.iter()
		.map(|r| r["providerId"].as_str().unwrap())
		.collect();
	assert_eq!(ids, vec!["beta", "gamma"]);

	let mut previous = body["bestRoute"]["breakdown"]["totalCostUsd"].as_f64().unwrap();
	for route in alternatives {
		let total = route["breakdown"]["totalCostUsd"].as_f64().unwrap();
		assert!(total >= previous);
		previous = total;
	}

	assert_eq!(body["executable"], true);
	assert_eq!(body["risk"]["canProceed"], true);
	assert_eq!(body["amountIn"], "1000");

	server.abort();
}

#[tokio::test]
async fn test_every_route_total_is_sum_of_components() {
	let server = TestServer::spawn().await.expect("Failed to start test server");
	let client = Client::new();

	let resp = post_quote(&client, &server, &ApiFixtures::quote_request("2500")).await;
	let body: Value = resp.json().await.unwrap();

	let mut routes = vec![body["bestRoute"].clone()];
	routes.extend(body["alternatives"].as_array().unwrap().iter().cloned());
	for route in routes {
		let breakdown = &route["breakdown"];
		let total = breakdown["totalCostUsd"].as_f64().unwrap();
		assert!((total - components_total(breakdown)).abs() < 1e-9);
	}

	server.abort();
}

#[tokio::test]
async fn test_service_fee_attached_to_quote() {
	let server = TestServer::spawn().await.expect("Failed to start test server");
	let client = Client::new();

	let resp = post_quote(&client, &server, &ApiFixtures::quote_request("1000")).await;
	let body: Value = resp.json().await.unwrap();

	// 5 bps of $1,000
	let fee = body["fee"]["feeUsd"].as_f64().unwrap();
	assert!((fee - 0.5).abs() < 1e-9);
	assert_eq!(body["fee"]["mode"], "flat");
	let service_fee = body["breakdown"]["serviceFeeUsd"].as_f64().unwrap();
	assert!((service_fee - 0.5).abs() < 1e-9);
	for route in body["alternatives"].as_array().unwrap() {
		let alt_fee = route["breakdown"]["serviceFeeUsd"].as_f64().unwrap();
		assert!((alt_fee - 0.5).abs() < 1e-9);
	}

	let issued = body["issuedAt"].as_i64().unwrap();
	let expires = body["expiresAt"].as_i64().unwrap();
	assert_eq!(expires - issued, 30_000);

	server.abort();
}

#[tokio::test]
async fn test_timed_out_provider_absent_from_routes() {
	let builder = AggregatorBuilder::new()
		.with_settings(test_settings())
		.with_adapter(Arc::new(MockProviderAdapter::new("mock-a").with_lp_fee_bps(5)))
		.with_adapter(Arc::new(MockProviderAdapter::new("mock-b").with_lp_fee_bps(30)))
		.with_adapter(Arc::new(MockProviderAdapter::slow(
			"mock-slow",
			Duration::from_secs(2),
		)))
		.with_provider(mock_provider("alpha", "mock-a"))
		.with_provider(mock_provider("beta", "mock-b"))
		.with_provider(mock_provider_with_timeout("sluggish", "mock-slow", 200))
		.with_price_feed(Arc::new(StaticPriceFeed::new()));
	let server = TestServer::spawn_with_builder(builder)
		.await
		.expect("Failed to start test server");
	let client = Client::new();

	let resp = post_quote(&client, &server, &ApiFixtures::quote_request("1000")).await;
	assert_eq!(resp.status(), StatusCode::OK);
	let body: Value = resp.json().await.unwrap();

	assert_eq!(body["bestRoute"]["providerId"], "alpha");
	let alternatives = body["alternatives"].as_array().unwrap();
	assert_eq!(alternatives.len(), 1);
	assert_eq!(alternatives[0]["providerId"], "beta");

	server.abort();
}

#[tokio::test]
async fn test_all_providers_failing_returns_no_quotes() {
	let builder = AggregatorBuilder::new()
		.with_settings(test_settings())
		.with_adapter(Arc::new(MockProviderAdapter::failing("mock-down-1")))
		.with_adapter(Arc::new(MockProviderAdapter::failing("mock-down-2")))
		.with_provider(mock_provider("down-1", "mock-down-1"))
		.with_provider(mock_provider("down-2", "mock-down-2"))
		.with_price_feed(Arc::new(StaticPriceFeed::new()));
	let server = TestServer::spawn_with_builder(builder)
		.await
		.expect("Failed to start test server");
	let client = Client::new();

	let resp = post_quote(&client, &server, &ApiFixtures::quote_request("1000")).await;
	assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
	let body: Value = resp.json().await.unwrap();
	assert_eq!(body["error"], "NO_QUOTES_AVAILABLE");

	server.abort();
}

#[tokio::test]
async fn test_invalid_requests_rejected() {
	let server = TestServer::spawn().await.expect("Failed to start test server");
	let client = Client::new();

	let cases = [
		(ApiFixtures::quote_request("abc"), "VALIDATION_ERROR"),
		(ApiFixtures::quote_request("0"), "VALIDATION_ERROR"),
		(ApiFixtures::quote_request_for(1, "USDC", "USDC", "10"), "VALIDATION_ERROR"),
		(ApiFixtures::quote_request_for(1, "USDC", "WBTC", "10"), "UNSUPPORTED_TOKEN"),
		(ApiFixtures::quote_request_for(999, "USDC", "USDT", "10"), "UNSUPPORTED_CHAIN"),
		// below the $1 minimum
		(ApiFixtures::quote_request("0.5"), "VALIDATION_ERROR"),
	];

	for (request, code) in cases {
		let resp = post_quote(&client, &server, &request).await;
		assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "request {}", request);
		let body: Value = resp.json().await.unwrap();
		assert_eq!(body["error"], code, "request {}", request);
	}

	server.abort();
}

#[tokio::test]
async fn test_issued_quote_can_be_fetched() {
	let server = TestServer::spawn().await.expect("Failed to start test server");
	let client = Client::new();

	let resp = post_quote(&client, &server, &ApiFixtures::quote_request("1000")).await;
	let quote: Value = resp.json().await.unwrap();
	let quote_id = quote["quoteId"].as_str().unwrap();

	let resp = client
		.get(server.url(&format!("/api/v1/quote/{}", quote_id)))
		.send()
		.await
		.unwrap();
	assert_eq!(resp.status(), StatusCode::OK);
	let fetched: Value = resp.json().await.unwrap();
	assert_eq!(fetched["quoteId"], quote_id);
	assert_eq!(fetched["bestRoute"]["providerId"], "alpha");

	let resp = client
		.get(server.url("/api/v1/quote/unknown-id"))
		.send()
		.await
		.unwrap();
	assert_eq!(resp.status(), StatusCode::NOT_FOUND);
	let body: Value = resp.json().await.unwrap();
	assert_eq!(body["error"], "QUOTE_NOT_FOUND");

	server.abort();
}

#[tokio::test]
async fn test_build_transaction_with_approval() {
	let server = TestServer::spawn().await.expect("Failed to start test server");
	let client = Client::new();

	let resp = post_quote(&client, &server, &ApiFixtures::quote_request("1000")).await;
	let quote: Value = resp.json().await.unwrap();
	let quote_id = quote["quoteId"].as_str().unwrap();

	let resp = client
		.post(server.url("/api/v1/tx/build"))
		.json(&ApiFixtures::build_request(quote_id))
		.send()
		.await
		.unwrap();
	assert_eq!(resp.status(), StatusCode::OK);
	let plan: Value = resp.json().await.unwrap();

	assert_eq!(plan["quoteId"], quote_id);
	assert_eq!(plan["providerId"], "alpha");
	assert_eq!(plan["swapTx"]["to"], ROUTER);
	assert_eq!(plan["swapTx"]["data"], "0x12aa3caf");
	assert_eq!(plan["swapTx"]["chainId"], 1);
	let approve_data = plan["approveTx"]["data"].as_str().unwrap();
	assert!(approve_data.starts_with("0x095ea7b3"));
	assert_eq!(plan["expiresAt"], quote["expiresAt"]);

	let resp = client
		.post(server.url("/api/v1/tx/build"))
		.json(&ApiFixtures::build_request("missing"))
		.send()
		.await
		.unwrap();
	assert_eq!(resp.status(), StatusCode::NOT_FOUND);

	server.abort();
}

#[tokio::test]
async fn test_build_transaction_is_bound_to_trader() {
	let server = TestServer::spawn().await.expect("Failed to start test server");
	let client = Client::new();

	let resp = post_quote(&client, &server, &ApiFixtures::quote_request("1000")).await;
	let quote: Value = resp.json().await.unwrap();
	let resp = client
		.post(server.url("/api/v1/tx/build"))
		.json(&json!({
			"quoteId": quote["quoteId"],
			"trader": "0x9999999999999999999999999999999999999999"
		}))
		.send()
		.await
		.unwrap();
	assert_eq!(resp.status(), StatusCode::FORBIDDEN);
	let body: Value = resp.json().await.unwrap();
	assert_eq!(body["error"], "TRADER_MISMATCH");

	let anonymous = ApiFixtures::quote_request_for(1, "USDC", "USDT", "1000");
	let resp = post_quote(&client, &server, &anonymous).await;
	let quote: Value = resp.json().await.unwrap();
	assert_eq!(quote["executable"], false);
	let resp = client
		.post(server.url("/api/v1/tx/build"))
		.json(&ApiFixtures::build_request(quote["quoteId"].as_str().unwrap()))
		.send()
		.await
		.unwrap();
	assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
	let body: Value = resp.json().await.unwrap();
	assert_eq!(body["error"], "MISSING_TRADER");

	server.abort();
}

#[tokio::test]
async fn test_depegged_quote_is_not_executable() {
	let mut settings = test_settings();
	settings.risk.default_thresholds.depeg_threshold_bps = 50;
	let builder = AggregatorBuilder::new()
		.with_settings(settings)
		.with_adapter(Arc::new(MockProviderAdapter::new("mock-a").with_price("USDT", 0.98)))
		.with_provider(mock_provider("alpha", "mock-a"))
		.with_price_feed(Arc::new(StaticPriceFeed::new().with_price("USDT", 0.98)));
	let server = TestServer::spawn_with_builder(builder)
		.await
		.expect("Failed to start test server");
	let client = Client::new();

	let resp = post_quote(&client, &server, &ApiFixtures::quote_request("1000")).await;
	assert_eq!(resp.status(), StatusCode::OK);
	let quote: Value = resp.json().await.unwrap();

	assert_eq!(quote["executable"], false);
	assert_eq!(quote["risk"]["canProceed"], false);
	assert!(quote["bestRoute"]["quote"].get("callData").is_none());

	let resp = client
		.post(server.url("/api/v1/tx/build"))
		.json(&ApiFixtures::build_request(quote["quoteId"].as_str().unwrap()))
		.send()
		.await
		.unwrap();
	assert_eq!(resp.status(), StatusCode::FORBIDDEN);
	let body: Value = resp.json().await.unwrap();
	assert_eq!(body["error"], "RISK_BLOCKED");

	server.abort();
}

#[tokio::test]
async fn test_corridor_swap_includes_hub_comparison() {
	let server = TestServer::spawn().await.expect("Failed to start test server");
	let client = Client::new();

	let request = ApiFixtures::quote_request_for(KRW_CHAIN, "KRWx", "KRT", "1000000");
	let resp = post_quote(&client, &server, &request).await;
	assert_eq!(resp.status(), StatusCode::OK);
	let body: Value = resp.json().await.unwrap();

	assert_eq!(body["bestRoute"]["isCorridor"], true);
	let corridor = &body["corridor"];
	assert_eq!(corridor["hubToken"], "USDC");
	let legs = corridor["hubLegs"].as_array().unwrap();
	assert_eq!(legs.len(), 2);
	assert_eq!(legs[0]["fromToken"], "KRWx");
	assert_eq!(legs[0]["toToken"], "USDC");
	assert_eq!(legs[1]["fromToken"], "USDC");
	assert_eq!(legs[1]["toToken"], "KRT");

	let direct = corridor["directCostUsd"].as_f64().unwrap();
	let hub = corridor["hubCostUsd"].as_f64().unwrap();
	assert_eq!(corridor["isDirectBetter"], direct <= hub);

	// Hub legs carry no service fee, so neither does the direct side
	let breakdown = &body["bestRoute"]["breakdown"];
	let service_fee = breakdown["serviceFeeUsd"].as_f64().unwrap();
	assert!(service_fee > 0.0);
	let market = breakdown["totalCostUsd"].as_f64().unwrap() - service_fee;
	assert!((direct - market).abs() < 1e-9);

	server.abort();
}

#[tokio::test]
async fn test_non_corridor_swap_has_no_comparison() {
	let server = TestServer::spawn().await.expect("Failed to start test server");
	let client = Client::new();

	let resp = post_quote(&client, &server, &ApiFixtures::quote_request("1000")).await;
	let body: Value = resp.json().await.unwrap();
	assert!(body.get("corridor").is_none());
	assert_eq!(body["bestRoute"]["isCorridor"], false);

	server.abort();
}

#[tokio::test]
async fn test_providers_listed() {
	let server = TestServer::spawn().await.expect("Failed to start test server");
	let client = Client::new();

	let resp = client
		.get(server.url("/api/v1/quote/providers"))
		.send()
		.await
		.unwrap();
	assert_eq!(resp.status(), StatusCode::OK);
	let body: Value = resp.json().await.unwrap();

	assert_eq!(body["total"], 3);
	let ids: Vec<&str> = body["providers"]
		.as_array()
		.unwrap()
		.iter()
		.map(|p| p["providerId"].as_str().unwrap())
		.collect();
	assert_eq!(ids, vec!["alpha", "beta", "gamma"]);
	assert_eq!(body["providers"][2]["kind"], "amm");
	assert_eq!(body["chains"], ttv_aggregator::serde_json::json!([1, KRW_CHAIN]));

	server.abort();
}
