use serde::{Deserialize, Serialize};

/// A chain the aggregator can quote on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainInfo {
	pub chain_id: u64,
	pub name: String,
	/// JSON-RPC endpoint used for gas prices and on-chain quoters
	pub rpc_url: String,
	/// Symbol of the native gas asset (ETH, MATIC, KLAY)
	pub native_symbol: String,
	/// CoinGecko asset platform id used for token price lookups
	pub price_platform: String,
	/// CoinGecko coin id of the native asset
	pub native_coin_id: String,
}
