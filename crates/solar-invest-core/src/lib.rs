pub mod error;
pub mod numeric;
pub mod solver;
pub mod time_value;
pub mod types;

#[cfg(feature = "solar")]
pub mod solar;

#[cfg(feature = "scenarios")]
pub mod scenarios;

pub use error::SolarInvestError;
pub use types::*;

/// Standard result type for all solar-invest operations
pub type SolarInvestResult<T> = Result<T, SolarInvestError>;
