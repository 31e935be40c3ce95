pub mod cost_entry;
pub mod ledger;
pub mod reconciler;
