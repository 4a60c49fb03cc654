//! Shared domain models used across providers, pricing and the quote pipeline

pub mod address;
pub mod amount;
pub mod chain;
pub mod secret_string;
pub mod token;

pub use address::{is_valid_address, parse_address, same_address};
pub use amount::{from_base_units, is_decimal_string, parse_amount, to_base_units, AmountError};
pub use chain::ChainInfo;
pub use secret_string::SecretString;
pub use token::{PegCurrency, TokenInfo, TokenRegistry};
