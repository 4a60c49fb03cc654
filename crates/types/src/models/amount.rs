//! Conversion between human-unit decimal strings and integer base units

use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
	#[error("Invalid amount format: {0}")]
	InvalidFormat(String),

	#[error("Amount {amount} has more than {decimals} decimal places")]
	TooPrecise { amount: String, decimals: u8 },

	#[error("Amount out of range: {0}")]
	OutOfRange(String),
}

/// Whether `value` matches `^\d+(\.\d+)?$`
pub fn is_decimal_string(value: &str) -> bool {
	let mut parts = value.splitn(2, '.');
	let whole = parts.next().unwrap_or_default();
	let fraction = parts.next();
	let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
	digits(whole) && fraction.map_or(true, digits)
}

/// Parse a human-unit amount such as `"1250.5"`
pub fn parse_amount(value: &str) -> Result<Decimal, AmountError> {
	if !is_decimal_string(value) {
		return Err(AmountError::InvalidFormat(value.to_string()));
	}
	Decimal::from_str(value)
		.map(|d| d.normalize())
		.map_err(|_| AmountError::OutOfRange(value.to_string()))
}

fn scale_factor(decimals: u8) -> Result<Decimal, AmountError> {
	10i128
		.checked_pow(decimals as u32)
		.and_then(|p| Decimal::try_from_i128_with_scale(p, 0).ok())
		.ok_or_else(|| AmountError::OutOfRange(format!("10^{}", decimals)))
}

/// Convert a human-unit amount to an integer base-unit string
pub fn to_base_units(value: &str, decimals: u8) -> Result<String, AmountError> {
	let amount = parse_amount(value)?;
	if amount.scale() > decimals as u32 {
		return Err(AmountError::TooPrecise {
			amount: value.to_string(),
			decimals,
		});
	}
	let scaled = amount
		.checked_mul(scale_factor(decimals)?)
		.ok_or_else(|| AmountError::OutOfRange(value.to_string()))?;
	Ok(scaled.trunc().normalize().to_string())
}

/// Convert an integer base-unit string back to a human-unit decimal
pub fn from_base_units(value: &str, decimals: u8) -> Result<Decimal, AmountError> {
	if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
		return Err(AmountError::InvalidFormat(value.to_string()));
	}
	let mantissa =
		i128::from_str(value).map_err(|_| AmountError::OutOfRange(value.to_string()))?;
	Decimal::try_from_i128_with_scale(mantissa, decimals as u32)
		.map(|d| d.normalize())
		.map_err(|_| AmountError::OutOfRange(value.to_string()))
}
