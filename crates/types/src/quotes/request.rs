//! Quote request model and boundary validation

use super::QuoteValidationError;
use crate::constants::limits::{DEFAULT_SLIPPAGE_BPS, MIN_SLIPPAGE_BPS};
use crate::fees::FeeMode;
use crate::models::{is_valid_address, parse_amount};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

fn default_slippage_bps() -> u16 {
	DEFAULT_SLIPPAGE_BPS
}

/// Incoming quote request
///
/// Tokens are given by address or registered symbol; `amount` is a
/// human-unit decimal string of the input token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
	pub chain_id: u64,
	pub from_token: String,
	pub to_token: String,
	pub amount: String,
	#[serde(default = "default_slippage_bps")]
	pub slippage_bps: u16,
	#[serde(default, alias = "userAddress", skip_serializing_if = "Option::is_none")]
	pub trader: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub partner_id: Option<String>,
	#[serde(default)]
	pub fee_mode: FeeMode,
}

impl QuoteRequest {
	pub fn new(chain_id: u64, from_token: &str, to_token: &str, amount: &str) -> Self {
		Self {
			chain_id,
			from_token: from_token.to_string(),
			to_token: to_token.to_string(),
			amount: amount.to_string(),
			slippage_bps: DEFAULT_SLIPPAGE_BPS,
			trader: None,
			partner_id: None,
			fee_mode: FeeMode::default(),
		}
	}

	pub fn with_slippage_bps(mut self, slippage_bps: u16) -> Self {
		self.slippage_bps = slippage_bps;
		self
	}

	pub fn with_trader(mut self, trader: &str) -> Self {
		self.trader = Some(trader.to_string());
		self
	}

	pub fn with_partner(mut self, partner_id: &str) -> Self {
		self.partner_id = Some(partner_id.to_string());
		self
	}

	pub fn with_fee_mode(mut self, fee_mode: FeeMode) -> Self {
		self.fee_mode = fee_mode;
		self
	}

	/// Shape validation that needs no prices. USD bounds are checked once
	/// the input token price is known.
	pub fn validate(&self, max_slippage_bps: u16) -> Result<Decimal, QuoteValidationError> {
		if self.from_token.trim().is_empty() {
			return Err(QuoteValidationError::MissingRequiredField {
				field: "fromToken".to_string(),
			});
		}
		if self.to_token.trim().is_empty() {
			return Err(QuoteValidationError::MissingRequiredField {
				field: "toToken".to_string(),
			});
		}
		if self.from_token.eq_ignore_ascii_case(&self.to_token) {
			return Err(QuoteValidationError::SameToken {
				token: self.from_token.clone(),
			});
		}

		let amount = parse_amount(&self.amount).map_err(|e| QuoteValidationError::InvalidAmount {
			reason: e.to_string(),
		})?;
		if amount.is_zero() {
			return Err(QuoteValidationError::InvalidAmount {
				reason: "amount must be greater than zero".to_string(),
			});
		}

		if !(MIN_SLIPPAGE_BPS..=max_slippage_bps).contains(&self.slippage_bps) {
			return Err(QuoteValidationError::InvalidSlippage {
				value: self.slippage_bps,
				min: MIN_SLIPPAGE_BPS,
				max: max_slippage_bps,
			});
		}

		if let Some(trader) = &self.trader {
			if !is_valid_address(trader) {
				return Err(QuoteValidationError::InvalidAddress {
					field: "trader".to_string(),
					address: trader.clone(),
				});
			}
		}

		Ok(amount)
	}
}

/// Check a USD-denominated amount against the configured bounds
pub fn validate_usd_bounds(
	amount_usd: f64,
	min_usd: f64,
	max_usd: f64,
) -> Result<(), QuoteValidationError> {
	if amount_usd < min_usd {
		return Err(QuoteValidationError::AmountBelowMinimum {
			amount_usd,
			min_usd,
		});
	}
	if amount_usd > max_usd {
		return Err(QuoteValidationError::AmountAboveMaximum {
			amount_usd,
			max_usd,
		});
	}
	Ok(())
}
