use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeeError {
	#[error("Invalid fee structure: {reason}")]
	InvalidStructure { reason: String },

	#[error("Invalid amount: {reason}")]
	InvalidAmount { reason: String },

	#[error("Savings-based fee requires a savings figure")]
	SavingsRequired,

	#[error("Savings must be non-negative, got {savings_usd}")]
	NegativeSavings { savings_usd: f64 },

	#[error("Partner not found: {partner_id}")]
	PartnerNotFound { partner_id: String },

	#[error("Partner already registered: {partner_id}")]
	PartnerExists { partner_id: String },

	#[error("Invalid revenue share: {value}% (must be between 0 and 100)")]
	InvalidShare { value: f64 },
}
