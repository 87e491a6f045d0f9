pub mod error;
pub mod types;

#[cfg(feature = "maturity")]
pub mod maturity;

#[cfg(feature = "report")]
pub mod report;

pub use error::MaturityError;
pub use types::*;

/// Standard result type for all maturity-calculator operations
pub type MaturityResult<T> = Result<T, MaturityError>;
