//! Turns an issued quote into approve and swap transactions

use chrono::{DateTime, Utc};
use tracing::debug;
use ttv_adapters::abi::encode_approve;
use ttv_types::models::{is_valid_address, same_address, to_base_units};
use ttv_types::{ExecutionError, ExecutionPlan, QuoteResponse, TransactionPayload};

/// Stateless builder for the transaction-builder contract
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecutionPlanner;

impl ExecutionPlanner {
	pub fn new() -> Self {
		Self
	}

	/// Build the transactions for `quote` on behalf of `trader`
	///
	/// An approval is only emitted for ERC-20 inputs whose route names an
	/// allowance target.
	pub fn plan(
		&self,
		quote: &QuoteResponse,
		trader: &str,
		now: DateTime<Utc>,
	) -> Result<ExecutionPlan, ExecutionError> {
		if !is_valid_address(trader) {
			return Err(ExecutionError::InvalidAddress {
				field: "trader".to_string(),
				address: trader.to_string(),
			});
		}
		if quote.is_expired_at(now) {
			return Err(ExecutionError::QuoteExpired {
				quote_id: quote.quote_id.clone(),
				expired_at: quote.expires_at,
			});
		}
		if !quote.risk.can_proceed {
			return Err(ExecutionError::RiskBlocked {
				quote_id: quote.quote_id.clone(),
				risk_score: quote.risk.risk_score,
			});
		}
		// Route call data pays out to the trader the quote was requested for
		match quote.trader.as_deref() {
			None => {
				return Err(ExecutionError::MissingTrader {
					quote_id: quote.quote_id.clone(),
				})
			},
			Some(quoted) if !same_address(quoted, trader) => {
				return Err(ExecutionError::TraderMismatch {
					quote_id: quote.quote_id.clone(),
					quoted: quoted.to_string(),
					requested: trader.to_string(),
				})
			},
			Some(_) => {},
		}

		let route = &quote.best_route;
		let data = match route.quote.call_data.as_deref() {
			Some(data) if !data.is_empty() => data.to_string(),
			_ => {
				return Err(ExecutionError::MissingCallData {
					provider_id: route.provider_id.clone(),
				})
			},
		};

		let approve_tx = match route.quote.allowance_target.as_deref() {
			Some(spender) if !quote.from_token.is_native() => {
				let amount = to_base_units(&quote.amount_in, quote.from_token.decimals).map_err(|e| {
					ExecutionError::Encoding {
						reason: e.to_string(),
					}
				})?;
				let data = encode_approve(spender, &amount).map_err(|e| ExecutionError::Encoding {
					reason: e.to_string(),
				})?;
				Some(TransactionPayload {
					chain_id: quote.chain_id,
					from: trader.to_string(),
					to: quote.from_token.address.clone(),
					data,
					value: "0".to_string(),
					gas_limit: None,
				})
			},
			_ => None,
		};

		debug!(
			"Planned execution for quote {} via {} (approval: {})",
			quote.quote_id,
			route.provider_id,
			approve_tx.is_some()
		);

		Ok(ExecutionPlan {
			quote_id: quote.quote_id.clone(),
			provider_id: route.provider_id.clone(),
			approve_tx,
			swap_tx: TransactionPayload {
				chain_id: quote.chain_id,
				from: trader.to_string(),
				to: route.quote.to.clone(),
				data,
				value: route.quote.value.clone(),
				gas_limit: Some(route.gas_estimate),
			},
			expires_at: quote.expires_at,
		})
	}
}
