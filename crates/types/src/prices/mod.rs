//! Price and gas feed contract plus the per-request market snapshot

use crate::models::TokenInfo;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Debug;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PriceError {
	#[error("Price unavailable for {asset}: {reason}")]
	Unavailable { asset: String, reason: String },

	#[error("Price for {asset} is stale: {age_secs}s old (max {max_age_secs}s)")]
	Stale {
		asset: String,
		age_secs: u64,
		max_age_secs: u64,
	},

	#[error("Invalid price for {asset}: {price}")]
	InvalidPrice { asset: String, price: f64 },

	#[error("Chain not configured: {chain_id}")]
	UnsupportedChain { chain_id: u64 },

	#[error("HTTP request failed: {0}")]
	HttpError(#[from] reqwest::Error),

	#[error("Invalid response format: {reason}")]
	InvalidResponse { reason: String },
}

pub type PriceResult<T> = Result<T, PriceError>;

/// External source of token prices and gas prices
#[async_trait]
pub trait PriceFeed: Send + Sync + Debug {
	/// USD price of one whole token
	async fn token_price_usd(&self, token: &TokenInfo) -> PriceResult<f64>;

	/// USD price of the chain's native gas asset
	async fn native_price_usd(&self, chain_id: u64) -> PriceResult<f64>;

	/// Current gas price in wei
	async fn gas_price_wei(&self, chain_id: u64) -> PriceResult<u128>;
}

/// Gas price and native asset price observed for one chain
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasSnapshot {
	pub chain_id: u64,
	pub gas_price_wei: u128,
	pub native_price_usd: f64,
	pub observed_at: DateTime<Utc>,
}

impl GasSnapshot {
	/// USD cost of `gas_limit` units before any buffer
	pub fn gas_cost_usd(&self, gas_limit: u64) -> f64 {
		let native = (gas_limit as f64) * (self.gas_price_wei as f64) / 1e18;
		native * self.native_price_usd
	}
}

/// Token USD prices fixed for the duration of one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSnapshot {
	prices: HashMap<String, f64>,
}

impl PriceSnapshot {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&mut self, token: &TokenInfo, price_usd: f64) {
		self.prices.insert(token.cache_key(), price_usd);
	}

	pub fn with_price(mut self, token: &TokenInfo, price_usd: f64) -> Self {
		self.insert(token, price_usd);
		self
	}

	/// Price of `token`, failing closed when missing or non-positive
	pub fn price_of(&self, token: &TokenInfo) -> PriceResult<f64> {
		match self.prices.get(&token.cache_key()) {
			Some(price) if price.is_finite() && *price > 0.0 => Ok(*price),
			Some(price) => Err(PriceError::InvalidPrice {
				asset: token.symbol.clone(),
				price: *price,
			}),
			None => Err(PriceError::Unavailable {
				asset: token.symbol.clone(),
				reason: "not in price snapshot".to_string(),
			}),
		}
	}
}
