use serde_json::Value;

/// Headline figure of each command, in priority order.
const PRIORITY_KEYS: [&str; 7] = [
    "total_with_vat",
    "realized_margin_percent",
    "element_count",
    "truss_count",
    "selling_price_ex_vat",
    "realized_total",
    "status",
];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result_obj {
        // quotation snapshots carry their figures under "pricing"
        let pricing = map.get("pricing").and_then(Value::as_object);
        for key in PRIORITY_KEYS {
            let found = map
                .get(key)
                .or_else(|| pricing.and_then(|p| p.get(key)));
            if let Some(val) = found.filter(|v| !v.is_null()) {
                println!("{}", format_minimal(val));
                return;
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
