pub mod common;
pub mod fees;
pub mod health;
pub mod quotes;
pub mod risk;

pub use fees::{
	get_partner, get_partners, get_structure, post_calculate, post_partner, post_transaction,
	put_structure,
};
pub use health::{health, ready};
pub use quotes::{get_providers, get_quote, post_build_transaction, post_quote};
pub use risk::{get_depeg_alerts, post_assess, post_check_depeg};
