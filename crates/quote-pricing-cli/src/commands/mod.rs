pub mod calculators;
pub mod post_calculation;
pub mod pricing;
pub mod quotation;
