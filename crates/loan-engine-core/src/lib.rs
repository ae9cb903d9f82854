pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "amortization")]
pub mod amortization;

#[cfg(feature = "payoff")]
pub mod payoff;

#[cfg(feature = "affordability")]
pub mod affordability;

#[cfg(feature = "offers")]
pub mod offers;

#[cfg(feature = "consolidation")]
pub mod consolidation;

pub use error::LoanEngineError;
pub use types::*;

/// Standard result type for all loan-engine operations
pub type LoanEngineResult<T> = Result<T, LoanEngineError>;
