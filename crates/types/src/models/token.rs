//! Token metadata and the registry of quotable tokens

use crate::constants::limits::{NATIVE_TOKEN_ADDRESS, NATIVE_TOKEN_ALIAS};
use serde::{Deserialize, Serialize};

/// External currency a stablecoin is pegged to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PegCurrency {
	Usd,
	Krw,
}

impl PegCurrency {
	/// Peg target expressed in USD
	pub fn target_usd(&self, usd_krw_rate: f64) -> f64 {
		match self {
			PegCurrency::Usd => 1.0,
			PegCurrency::Krw if usd_krw_rate > 0.0 => 1.0 / usd_krw_rate,
			PegCurrency::Krw => 0.0,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
	pub address: String,
	pub symbol: String,
	pub decimals: u8,
	pub chain_id: u64,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub peg: Option<PegCurrency>,
}

impl TokenInfo {
	pub fn new(chain_id: u64, address: &str, symbol: &str, decimals: u8) -> Self {
		Self {
			address: address.to_string(),
			symbol: symbol.to_string(),
			decimals,
			chain_id,
			peg: None,
		}
	}

	pub fn with_peg(mut self, peg: PegCurrency) -> Self {
		self.peg = Some(peg);
		self
	}

	pub fn is_native(&self) -> bool {
		self.address.eq_ignore_ascii_case(NATIVE_TOKEN_ADDRESS)
			|| self.address.eq_ignore_ascii_case(NATIVE_TOKEN_ALIAS)
	}

	/// Match by address or symbol, ignoring case
	pub fn matches(&self, token: &str) -> bool {
		self.address.eq_ignore_ascii_case(token) || self.symbol.eq_ignore_ascii_case(token)
	}

	pub fn same_token(&self, other: &TokenInfo) -> bool {
		self.chain_id == other.chain_id && self.address.eq_ignore_ascii_case(&other.address)
	}

	/// Lowercased `chain:address` key for caches
	pub fn cache_key(&self) -> String {
		format!("{}:{}", self.chain_id, self.address.to_lowercase())
	}
}

/// Registered tokens, looked up by chain and address or symbol
#[derive(Debug, Clone, Default)]
pub struct TokenRegistry {
	tokens: Vec<TokenInfo>,
}

impl TokenRegistry {
	pub fn new(tokens: Vec<TokenInfo>) -> Self {
		let mut registry = Self::default();
		for token in tokens {
			registry.register(token);
		}
		registry
	}

	/// Register a token, replacing an existing entry for the same chain and address
	pub fn register(&mut self, token: TokenInfo) {
		self.tokens.retain(|t| !t.same_token(&token));
		self.tokens.push(token);
	}

	/// Resolve a token by address first, then by symbol
	pub fn resolve(&self, chain_id: u64, token: &str) -> Option<&TokenInfo> {
		self.tokens
			.iter()
			.find(|t| t.chain_id == chain_id && t.address.eq_ignore_ascii_case(token))
			.or_else(|| {
				self.tokens
					.iter()
					.find(|t| t.chain_id == chain_id && t.symbol.eq_ignore_ascii_case(token))
			})
	}

	pub fn tokens_on(&self, chain_id: u64) -> impl Iterator<Item = &TokenInfo> {
		self.tokens.iter().filter(move |t| t.chain_id == chain_id)
	}

	pub fn all(&self) -> &[TokenInfo] {
		&self.tokens
	}

	pub fn len(&self) -> usize {
		self.tokens.len()
	}

	pub fn is_empty(&self) -> bool {
		self.tokens.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn registry() -> TokenRegistry {
		TokenRegistry::new(vec![
			TokenInfo::new(1, "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48", "USDC", 6)
				.with_peg(PegCurrency::Usd),
			TokenInfo::new(1, "0xdAC17F958D2ee523a2206206994597C13D831ec7", "USDT", 6)
				.with_peg(PegCurrency::Usd),
			TokenInfo::new(8217, "0x754288077D0fF82AF7a5317C7CB8c444D421d103", "USDC", 6),
		])
	}

	#[test]
	fn test_resolve_is_case_insensitive_and_chain_scoped() {
		let registry = registry();
		let usdc = registry
			.resolve(1, "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48")
			.unwrap();
		assert_eq!(usdc.symbol, "USDC");
		assert_eq!(registry.resolve(1, "usdt").unwrap().decimals, 6);
		assert_eq!(registry.resolve(8217, "USDC").unwrap().chain_id, 8217);
		assert!(registry.resolve(10, "USDC").is_none());
	}

	#[test]
	fn test_register_replaces_existing_entry() {
		let mut registry = registry();
		registry.register(TokenInfo::new(
			1,
			"0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48",
			"USDC.e",
			6,
		));
		assert_eq!(registry.len(), 3);
		assert_eq!(registry.resolve(1, "USDC.e").unwrap().decimals, 6);
	}

	#[test]
	fn test_krw_peg_target() {
		let target = PegCurrency::Krw.target_usd(1300.0);
		assert!((target - 1.0 / 1300.0).abs() < 1e-12);
		assert_eq!(PegCurrency::Usd.target_usd(1300.0), 1.0);
	}
}
