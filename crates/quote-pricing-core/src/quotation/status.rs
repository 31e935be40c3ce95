use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::PricingError;
use crate::PricingResult;

/// Lifecycle of a quotation.
///
/// `draft → sent → accepted | rejected`, with optional internal review
/// (`awaiting_approval → approved`) before sending. A sent or rejected
/// quotation can be reopened as a new draft revision. `accepted` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotationStatus {
    #[default]
    Draft,
    AwaitingApproval,
    Approved,
    Sent,
    Accepted,
    Rejected,
}

impl QuotationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuotationStatus::Draft => "draft",
            QuotationStatus::AwaitingApproval => "awaiting_approval",
            QuotationStatus::Approved => "approved",
            QuotationStatus::Sent => "sent",
            QuotationStatus::Accepted => "accepted",
            QuotationStatus::Rejected => "rejected",
        }
    }

    pub fn can_transition_to(&self, next: QuotationStatus) -> bool {
        use QuotationStatus::*;
        matches!(
            (self, next),
            (Draft, AwaitingApproval)
                | (Draft, Sent)
                | (AwaitingApproval, Approved)
                | (AwaitingApproval, Draft)
                | (Approved, Sent)
                | (Sent, Accepted)
                | (Sent, Rejected)
                | (Sent, Draft)
                | (Rejected, Draft)
        )
    }

    pub fn transition(&self, next: QuotationStatus) -> PricingResult<QuotationStatus> {
        if !self.can_transition_to(next) {
            return Err(PricingError::InvalidTransition {
                from: self.to_string(),
                to: next.to_string(),
            });
        }
        Ok(next)
    }

    /// Signed quotations no longer accept pricing edits.
    pub fn is_pricing_frozen(&self) -> bool {
        matches!(self, QuotationStatus::Accepted)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, QuotationStatus::Accepted)
    }
}

impl fmt::Display for QuotationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
