pub mod aggregator;
pub mod breakdown;
pub mod line_items;
pub mod markup;
pub mod vat;
