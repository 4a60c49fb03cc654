//! TTV API
//!
//! Axum router, handlers and error mapping for the TTV quote aggregator.

pub mod handlers;
pub mod router;
pub mod security;
pub mod state;

pub use handlers::common::ErrorResponse;
pub use router::create_router;
pub use state::AppState;
