//! Test server for integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use ttv_aggregator::config::Settings;
use ttv_aggregator::{AggregatorBuilder, AppState};

use super::adapters::MockProviderAdapter;
use super::configs::{mock_provider, test_settings};
use super::feeds::StaticPriceFeed;

/// Running server bound to an ephemeral local port
pub struct TestServer {
	pub base_url: String,
	pub state: AppState,
	pub handle: JoinHandle<()>,
}

impl TestServer {
	/// Three healthy providers with distinct LP fees
	pub async fn spawn() -> Result<Self, Box<dyn std::error::Error>> {
		let builder = AggregatorBuilder::new()
			.with_settings(test_settings())
			.with_adapter(Arc::new(MockProviderAdapter::new("mock-a").with_lp_fee_bps(5)))
			.with_adapter(Arc::new(MockProviderAdapter::new("mock-b").with_lp_fee_bps(30)))
			.with_adapter(Arc::new(MockProviderAdapter::amm("mock-c").with_lp_fee_bps(100)))
			.with_provider(mock_provider("alpha", "mock-a"))
			.with_provider(mock_provider("beta", "mock-b"))
			.with_provider(mock_provider("gamma", "mock-c"))
			.with_price_feed(Arc::new(StaticPriceFeed::new()));
		Self::spawn_with_builder(builder).await
	}

	/// Server with the given settings and no providers beyond the ones they name
	pub async fn spawn_with_settings(settings: Settings) -> Result<Self, Box<dyn std::error::Error>> {
		let builder = AggregatorBuilder::new()
			.with_settings(settings)
			.with_price_feed(Arc::new(StaticPriceFeed::new()));
		Self::spawn_with_builder(builder).await
	}

	pub async fn spawn_with_builder(
		builder: AggregatorBuilder,
	) -> Result<Self, Box<dyn std::error::Error>> {
		let (app, state) = builder.with_background_refresh(false).start().await?;

		let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
		let addr = listener.local_addr()?;
		let base_url = format!("http://{}:{}", addr.ip(), addr.port());

		let handle = tokio::spawn(async move {
			let _ = axum::serve(listener, app).await;
		});

		// Give the server a moment to start accepting
		tokio::time::sleep(Duration::from_millis(10)).await;

		Ok(Self {
			base_url,
			state,
			handle,
		})
	}

	pub fn url(&self, path: &str) -> String {
		format!("{}{}", self.base_url, path)
	}

	pub fn abort(self) {
		self.handle.abort();
	}
}
