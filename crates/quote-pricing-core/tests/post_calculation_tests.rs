use chrono::NaiveDate;
use quote_pricing_core::post_calculation::cost_entry::CostEntry;
use quote_pricing_core::post_calculation::ledger::CostLedger;
use quote_pricing_core::post_calculation::reconciler::{reconcile, ReconciliationInput};
use quote_pricing_core::pricing::aggregator::{price_breakdown, PricingConfig};
use quote_pricing_core::pricing::breakdown::CostBreakdown;
use quote_pricing_core::pricing::markup::MarkupConfig;
use quote_pricing_core::CostCategory;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;

fn date(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, m, d).unwrap()
}

fn budgeted_input(entries: Vec<CostEntry>) -> ReconciliationInput {
    let mut costs = BTreeMap::new();
    costs.insert(CostCategory::Elements, dec!(10000));
    costs.insert(CostCategory::Installation, dec!(2000));
    let config = PricingConfig {
        category_markups: MarkupConfig::uniform(dec!(25)).unwrap(),
        ..PricingConfig::default()
    };
    let mut warnings = Vec::new();
    let pricing =
        price_breakdown(&CostBreakdown::from_costs(&costs).unwrap(), &config, &mut warnings)
            .unwrap();
    ReconciliationInput::from_pricing(&pricing, entries)
}

#[test]
fn test_elements_overrun_is_negative_variance() {
    let input = budgeted_input(vec![
        CostEntry::material(
            "inv-101",
            date(3, 4),
            CostCategory::Elements,
            "Element batch 1",
            dec!(6500),
        )
        .with_supplier("Sawmill Oy"),
        CostEntry::material(
            "inv-102",
            date(3, 18),
            CostCategory::Elements,
            "Element batch 2",
            dec!(5500),
        ),
    ]);
    let out = reconcile(&input).unwrap();
    let elements = out
        .result
        .categories
        .iter()
        .find(|r| r.category == CostCategory::Elements)
        .unwrap();
    assert_eq!(elements.variance, dec!(-2000));
    assert!(elements.over_budget);
    assert!(out.warnings.iter().any(|w| w.contains("elements")));
}

#[test]
fn test_realized_margin_scenario() {
    let input = budgeted_input(vec![
        CostEntry::material("m1", date(4, 2), CostCategory::Elements, "", dec!(8800)),
        CostEntry::labor(
            "l1",
            date(4, 9),
            CostCategory::Installation,
            "Crew week 15",
            dec!(44),
            dec!(50),
        )
        .unwrap(),
    ]);
    let out = reconcile(&input).unwrap().result;
    assert_eq!(out.selling_price_ex_vat, dec!(15000));
    assert_eq!(out.realized_total, dec!(11000));
    assert_eq!(out.realized_profit, dec!(4000));
    assert_eq!(out.realized_margin_percent.round_dp(2), dec!(26.67));
    assert_eq!(out.budgeted_margin_percent, dec!(20));
    assert!(out.margin_delta > Decimal::ZERO);
    assert!(!out.at_risk);
}

#[test]
fn test_margin_erosion_flags_at_risk() {
    let input = budgeted_input(vec![
        CostEntry::material("m1", date(5, 2), CostCategory::Elements, "", dec!(11200)),
        CostEntry::material("m2", date(5, 3), CostCategory::Installation, "", dec!(2300)),
    ]);
    // realized margin = 1500 / 15000 = 10% against a budgeted 20%
    let out = reconcile(&input).unwrap().result;
    assert_eq!(out.realized_margin_percent, dec!(10));
    assert!(out.at_risk);
}

#[test]
fn test_ledger_feeds_reconciliation() {
    let ledger = CostLedger::default()
        .with_entry(CostEntry::material("a", date(6, 1), CostCategory::Design, "", dec!(400)))
        .unwrap()
        .with_entry(CostEntry::material("b", date(6, 2), CostCategory::Design, "", dec!(100)))
        .unwrap()
        .without_entry("b")
        .unwrap();
    let input = budgeted_input(ledger.entries().to_vec());
    let out = reconcile(&input).unwrap().result;
    assert_eq!(out.realized_total, dec!(400));
    // unbudgeted design spend: percent_used stays guarded at zero
    let design = out
        .categories
        .iter()
        .find(|r| r.category == CostCategory::Design)
        .unwrap();
    assert_eq!(design.percent_used, Decimal::ZERO);
    assert_eq!(design.variance, dec!(-400));
}

#[test]
fn test_reconcile_from_json() {
    let json = r#"{
        "budget": {"elements": "10000", "trusses": "3000"},
        "selling_price_ex_vat": "16250",
        "budgeted_profit_percent": "20",
        "cost_entries": [
            {"id": "1", "date": "2024-02-01", "category": "trusses", "amount": "2800",
             "cost_type": "material"},
            {"id": "2", "date": "2024-02-11", "category": "installation", "amount": "960",
             "cost_type": "labor", "labor_hours": "24", "labor_rate": "40"}
        ],
        "at_risk_threshold": "3"
    }"#;
    let input: ReconciliationInput = serde_json::from_str(json).unwrap();
    let out = reconcile(&input).unwrap().result;
    assert_eq!(out.realized_total, dec!(3760));
    assert_eq!(out.realized_labor_total, dec!(960));
    assert_eq!(out.labor_hours_total, dec!(24));
    assert_eq!(out.monthly.len(), 1);
    assert_eq!(out.monthly[0].month, "2024-02");
}
