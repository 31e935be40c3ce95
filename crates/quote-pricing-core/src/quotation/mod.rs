pub mod actions;
pub mod snapshot;
pub mod status;

pub use actions::QuotationAction;
pub use snapshot::Quotation;
pub use status::QuotationStatus;
