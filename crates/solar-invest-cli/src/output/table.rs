use rust_decimal::Decimal;
use serde_json::Value;
use solar_invest_core::numeric::round_dp;
use std::str::FromStr;
use tabled::{builder::Builder, Table};

/// Format output as a table using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            // Check if "result" key holds the primary data
            if let Some(result) = map.get("result") {
                print_result_table(result, map);
            } else {
                print_flat_object(value);
            }
        }
        Value::Array(arr) => {
            print_array_table(arr);
        }
        _ => {
            println!("{}", value);
        }
    }
}

fn print_result_table(result: &Value, envelope: &serde_json::Map<String, Value>) {
    match result {
        // Ledger and tariff paths: one row per year
        Value::Array(rows) => print_array_table(rows),
        Value::Object(res_map) => {
            // Comparison: one row per scenario
            if let Some(Value::Array(headlines)) = res_map.get("headlines") {
                print_array_table(headlines);
                if let Some(best) = res_map.get("best_by_npv").and_then(Value::as_str) {
                    println!("\nBest by NPV: {}", best);
                }
                if let Some(Value::Object(results)) = res_map.get("results") {
                    for (key, r) in results {
                        print_lines(&format!("Findings [{}]", key), r.get("conclusions"));
                    }
                }
            } else {
                print_flat_object(result);
                print_lines("Findings", res_map.get("conclusions"));
                print_lines("Narrative", res_map.get("narrative"));
            }
        }
        _ => print_flat_object(&Value::Object(envelope.clone())),
    }

    // Print warnings if any
    print_lines("Warnings", envelope.get("warnings"));

    // Print methodology
    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_lines(title: &str, lines: Option<&Value>) {
    if let Some(Value::Array(items)) = lines {
        if !items.is_empty() {
            println!("\n{}:", title);
            for item in items {
                if let Value::String(s) = item {
                    println!("  - {}", s);
                }
            }
        }
    }
}

fn print_flat_object(value: &Value) {
    if let Value::Object(map) = value {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in map {
            // Narrative lists are printed below the table
            if key == "conclusions" || key == "narrative" {
                continue;
            }
            builder.push_record([key.as_str(), &format_value(val)]);
        }
        let table = Table::from(builder);
        println!("{}", table);
    }
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    // Collect all keys from first object for headers
    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        let table = Table::from(builder);
        println!("{}", table);
    } else {
        // Simple array of values
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => match Decimal::from_str(s) {
            Ok(d) => format_decimal(d),
            Err(_) => s.clone(),
        },
        Value::Number(n) => format_number(n),
        Value::Bool(b) => b.to_string(),
        Value::Null => "n/a".to_string(),
        Value::Array(arr) if arr.iter().any(Value::is_object) => format!("[{} rows]", arr.len()),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// Amounts arrive as decimal strings; same rounding as [`format_number`].
fn format_decimal(d: Decimal) -> String {
    if d.fract().is_zero() {
        d.trunc().to_string()
    } else if d.abs() < Decimal::ONE {
        format!("{:.4}", round_dp(d, 4))
    } else {
        format!("{:.2}", round_dp(d, 2))
    }
}

/// Two decimals for fractional values; integers as-is.
fn format_number(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() != 0.0 => {
            if f.abs() < 1.0 {
                format!("{:.4}", f)
            } else {
                format!("{:.2}", f)
            }
        }
        _ => n.to_string(),
    }
}
