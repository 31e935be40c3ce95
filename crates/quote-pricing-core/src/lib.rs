pub mod category;
pub mod error;
pub mod types;

#[cfg(feature = "pricing")]
pub mod settings;

#[cfg(feature = "pricing")]
pub mod pricing;

#[cfg(feature = "post_calculation")]
pub mod post_calculation;

#[cfg(feature = "quotation")]
pub mod quotation;

#[cfg(feature = "calculators")]
pub mod calculators;

pub use category::CostCategory;
pub use error::PricingError;
pub use types::*;

/// Standard result type for all quote-pricing operations
pub type PricingResult<T> = Result<T, PricingError>;
