use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

/// Format output as tables: scalar fields first, then one table per
/// per-category map or list of rows.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result_table(result, map);
            } else {
                print_object(map);
            }
        }
        Value::Array(arr) => print_rows(arr),
        _ => println!("{}", value),
    }
}

fn print_result_table(result: &Value, envelope: &Map<String, Value>) {
    match result {
        Value::Object(res_map) => print_object(res_map),
        other => println!("{}", format_value(other)),
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_object(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    let mut nested: Vec<(&String, &Value)> = Vec::new();
    for (key, val) in map {
        if is_row_collection(val) {
            nested.push((key, val));
        } else {
            builder.push_record([key.as_str(), &format_value(val)]);
        }
    }
    println!("{}", Table::from(builder));

    for (key, val) in nested {
        println!("\n{}:", key);
        match val {
            Value::Array(rows) => print_rows(rows),
            Value::Object(keyed) => print_keyed_rows(keyed),
            _ => {}
        }
    }
}

/// Arrays of objects and maps whose values are all objects, e.g. the
/// per-category breakdown.
fn is_row_collection(value: &Value) -> bool {
    match value {
        Value::Array(arr) => !arr.is_empty() && arr.iter().all(Value::is_object),
        Value::Object(map) => !map.is_empty() && map.values().all(Value::is_object),
        _ => false,
    }
}

fn print_keyed_rows(map: &Map<String, Value>) {
    let Some(Value::Object(first)) = map.values().next() else {
        return;
    };
    let columns: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(std::iter::once(String::new()).chain(columns.iter().cloned()));
    for (key, row) in map {
        let mut record = vec![key.clone()];
        record.extend(columns.iter().map(|c| cell(row, c)));
        builder.push_record(record);
    }
    println!("{}", Table::from(builder));
}

fn print_rows(arr: &[Value]) {
    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            println!("{}", format_value(item));
        }
        return;
    };
    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(headers.iter().cloned());
    for item in arr {
        builder.push_record(headers.iter().map(|h| cell(item, h)));
    }
    println!("{}", Table::from(builder));
}

fn cell(row: &Value, column: &str) -> String {
    row.get(column).map(format_value).unwrap_or_default()
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => arr.iter().map(format_value).collect::<Vec<_>>().join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
