//! Provider adapter contract and models

pub mod config;
pub mod errors;
pub mod models;
pub mod traits;

pub use config::{AdapterInfo, Provider, ProviderKind, ProviderRuntimeConfig};
pub use errors::ProviderError;
pub use models::{ProviderFees, ProviderQuote, ProviderQuoteRequest};
pub use traits::ProviderAdapter;

pub type ProviderResult<T> = Result<T, ProviderError>;
