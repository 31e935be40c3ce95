use quote_pricing_core::settings::PricingSettings;
use quote_pricing_core::types::Percent;
use quote_pricing_core::CostCategory;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;

/// Load pricing settings. Without a path the built-in defaults apply.
///
/// YAML is parsed with serde_yaml, which also accepts JSON files.
pub fn load_settings(path: Option<&str>) -> Result<PricingSettings, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(PricingSettings::default());
    };
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read settings '{}': {}", path, e))?;
    let settings: PricingSettings = serde_yaml::from_str(&contents)
        .map_err(|e| format!("Failed to parse settings '{}': {}", path, e))?;
    tracing::debug!(path, "loaded pricing settings");
    Ok(settings)
}

/// Fill pricing configuration fields absent from `input` with the settings
/// defaults. Category markups are merged per resolved category, so alias
/// spellings override the matching default; the input wins.
pub fn apply_pricing_defaults(
    input: &mut Value,
    settings: &PricingSettings,
) -> Result<(), Box<dyn std::error::Error>> {
    let Value::Object(obj) = input else {
        return Err("pricing input must be a JSON object".into());
    };

    let mut markups = settings.default_markups.clone();
    if let Some(given) = obj.get("category_markups").filter(|v| !v.is_null()) {
        let given: BTreeMap<CostCategory, Percent> = serde_json::from_value(given.clone())
            .map_err(|e| format!("Invalid category_markups: {}", e))?;
        for (category, pct) in given {
            markups = markups.with_markup(category, pct)?;
        }
    }
    obj.insert("category_markups".into(), serde_json::to_value(&markups)?);

    if !obj.contains_key("commission_percentage") {
        obj.insert(
            "commission_percentage".into(),
            serde_json::to_value(settings.commission_percentage)?,
        );
    }
    if !obj.contains_key("vat_mode") {
        obj.insert("vat_mode".into(), serde_json::to_value(&settings.vat_mode)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quote_pricing_core::pricing::aggregator::PricingInput;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn merged(mut input: Value) -> PricingInput {
        apply_pricing_defaults(&mut input, &PricingSettings::default()).unwrap();
        serde_json::from_value(input).unwrap()
    }

    #[test]
    fn test_defaults_fill_missing_fields() {
        let input = merged(json!({ "sections": [] }));
        let markups = &input.config.category_markups;
        assert_eq!(markups.percent(CostCategory::Elements), dec!(25));
        assert_eq!(markups.percent(CostCategory::Transportation), dec!(10));
        assert_eq!(input.config.commission_percentage, dec!(0));
    }

    #[test]
    fn test_alias_keys_override_defaults() {
        let input = merged(json!({
            "sections": [],
            "category_markups": { "transport": "40", "Elements": "60", "truss": 35 }
        }));
        let markups = &input.config.category_markups;
        assert_eq!(markups.percent(CostCategory::Transportation), dec!(40));
        assert_eq!(markups.percent(CostCategory::Elements), dec!(60));
        assert_eq!(markups.percent(CostCategory::Trusses), dec!(35));
        // untouched categories keep the settings default
        assert_eq!(markups.percent(CostCategory::Products), dec!(20));
    }

    #[test]
    fn test_input_commission_wins() {
        let input = merged(json!({ "sections": [], "commission_percentage": "4" }));
        assert_eq!(input.config.commission_percentage, dec!(4));
    }

    #[test]
    fn test_out_of_range_markup_rejected() {
        let mut input = json!({ "category_markups": { "design": "900" } });
        assert!(apply_pricing_defaults(&mut input, &PricingSettings::default()).is_err());
    }
}
