//! Quote request/response models and errors

pub mod errors;
pub mod request;
pub mod response;

pub use errors::{ProviderFailure, QuoteError, QuoteValidationError};
pub use request::{validate_usd_bounds, QuoteRequest};
pub use response::QuoteResponse;

pub type QuoteResult<T> = Result<T, QuoteError>;
