use serde_json::{Map, Value};
use std::io;

/// Write output as CSV to stdout.
///
/// Per-category data (the pricing `breakdown`, reconciliation `categories`)
/// is written as rows, followed by the remaining totals as field,value
/// pairs. Any other result is written as field,value pairs only.
pub fn print_csv(value: &Value) {
    let _ = write_csv(io::stdout().lock(), value);
}

fn write_csv<W: io::Write>(out: W, value: &Value) -> csv::Result<()> {
    // Category rows and the trailing totals have different widths.
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(out);

    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match result {
        Value::Object(map) => {
            if let Some(Value::Object(rows)) = map.get("breakdown") {
                write_keyed_rows(&mut wtr, "category", rows)?;
                write_fields(&mut wtr, map, "breakdown")?;
            } else if let Some(Value::Array(rows)) = map.get("categories") {
                write_rows(&mut wtr, rows)?;
                write_fields(&mut wtr, map, "categories")?;
            } else {
                write_fields(&mut wtr, map, "")?;
            }
        }
        Value::Array(arr) => write_rows(&mut wtr, arr)?,
        other => wtr.write_record([&format_csv_value(other)])?,
    }

    wtr.flush()?;
    Ok(())
}

/// Field,value pairs of `map`, leaving out the `skip` key.
fn write_fields<W: io::Write>(
    wtr: &mut csv::Writer<W>,
    map: &Map<String, Value>,
    skip: &str,
) -> csv::Result<()> {
    wtr.write_record(["field", "value"])?;
    for (key, val) in map.iter().filter(|(key, _)| key.as_str() != skip) {
        wtr.write_record([key.as_str(), &format_csv_value(val)])?;
    }
    Ok(())
}

fn write_keyed_rows<W: io::Write>(
    wtr: &mut csv::Writer<W>,
    key_header: &str,
    rows: &Map<String, Value>,
) -> csv::Result<()> {
    let Some(Value::Object(first)) = rows.values().next() else {
        return Ok(());
    };
    let columns: Vec<&str> = first.keys().map(String::as_str).collect();
    wtr.write_record(std::iter::once(key_header).chain(columns.iter().copied()))?;
    for (key, row) in rows {
        let mut record = vec![key.clone()];
        record.extend(columns.iter().map(|c| cell(row, c)));
        wtr.write_record(&record)?;
    }
    Ok(())
}

fn write_rows<W: io::Write>(wtr: &mut csv::Writer<W>, arr: &[Value]) -> csv::Result<()> {
    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            wtr.write_record([&format_csv_value(item)])?;
        }
        return Ok(());
    };
    let headers: Vec<&str> = first.keys().map(String::as_str).collect();
    wtr.write_record(&headers)?;
    for item in arr {
        let row: Vec<String> = headers.iter().map(|h| cell(item, h)).collect();
        wtr.write_record(&row)?;
    }
    Ok(())
}

fn cell(row: &Value, column: &str) -> String {
    row.get(column).map(format_csv_value).unwrap_or_default()
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
