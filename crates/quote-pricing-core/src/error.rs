use thiserror::Error;

#[derive(Debug, Error)]
pub enum PricingError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Quotation is frozen in status '{status}'; pricing can no longer be edited")]
    QuotationFrozen { status: String },

    #[error("{kind} not found: {id}")]
    NotFound { kind: String, id: String },

    #[error("Duplicate {kind}: {id}")]
    Duplicate { kind: String, id: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl PricingError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        PricingError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for PricingError {
    fn from(e: serde_json::Error) -> Self {
        PricingError::SerializationError(e.to_string())
    }
}
