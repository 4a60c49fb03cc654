//! Settings used by the integration test servers

#![allow(dead_code)]

use ttv_aggregator::config::{Settings, TokenConfig};
use ttv_aggregator::models::{PegCurrency, Provider};

pub const KRW_CHAIN: u64 = 8217;
pub const KRWX: &str = "0x1111111111111111111111111111111111111111";
pub const KRT: &str = "0x2222222222222222222222222222222222222222";

/// Defaults with the network-backed providers removed and a KRW corridor
/// registered on the Klaytn chain
pub fn test_settings() -> Settings {
	let mut settings = Settings::default();
	settings.providers.clear();
	settings.server.host = "127.0.0.1".to_string();
	settings.pricing.background_refresh = false;

	for (address, symbol) in [(KRWX, "KRWx"), (KRT, "KRT")] {
		settings.tokens.push(TokenConfig {
			address: address.to_string(),
			symbol: symbol.to_string(),
			decimals: 18,
			chain_id: KRW_CHAIN,
			peg: Some(PegCurrency::Krw),
		});
	}
	settings.corridor.enabled = true;
	settings.corridor.chain_id = KRW_CHAIN;
	settings.corridor.tokens = vec!["KRWx".to_string(), "KRT".to_string()];
	settings.corridor.hub_token = "USDC".to_string();
	settings.risk.usd_krw_rate = super::feeds::USD_KRW_RATE;
	settings
}

/// Provider served by a mock adapter of the same id
pub fn mock_provider(provider_id: &str, adapter_id: &str) -> Provider {
	Provider::new(provider_id, adapter_id, "http://localhost", 1_000)
}

pub fn mock_provider_with_timeout(provider_id: &str, adapter_id: &str, timeout_ms: u64) -> Provider {
	Provider::new(provider_id, adapter_id, "http://localhost", timeout_ms)
}
