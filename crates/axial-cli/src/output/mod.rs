use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::ui;

pub mod table;

/// Render a serializable response to a string in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Table => render_table(value),
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
    }
}

/// Print a serializable response in the requested format.
pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    println!("{rendered}");
    Ok(())
}

/// Objects become `key | value` rows, arrays of objects one row per item.
/// Nested objects are flattened one level with dotted keys.
fn render_table<T: Serialize>(value: &T) -> anyhow::Result<String> {
    let prefs = ui::prefs();
    let options = table::TableOptions {
        max_width: prefs.term_width,
        color: prefs.table_color,
    };

    let rendered = match serde_json::to_value(value)? {
        Value::Array(items) if items.is_empty() => String::from("(no rows)"),
        Value::Array(items) if items.iter().all(Value::is_object) => {
            let mut headers: Vec<String> = Vec::new();
            for key in items.iter().filter_map(Value::as_object).flat_map(|m| m.keys()) {
                if !headers.contains(key) {
                    headers.push(key.clone());
                }
            }
            let rows = items
                .iter()
                .filter_map(Value::as_object)
                .map(|map| {
                    headers
                        .iter()
                        .map(|h| map.get(h).map_or_else(|| String::from("-"), cell))
                        .collect()
                })
                .collect::<Vec<Vec<String>>>();
            let header_refs = headers.iter().map(String::as_str).collect::<Vec<_>>();
            table::render(&header_refs, &rows, options)
        }
        Value::Array(items) => {
            let rows = items.iter().map(|item| vec![cell(item)]).collect::<Vec<_>>();
            table::render(&["value"], &rows, options)
        }
        Value::Object(map) => {
            let mut rows = Vec::new();
            for (key, value) in map {
                match value {
                    Value::Object(inner) => {
                        for (sub, value) in inner {
                            rows.push(vec![format!("{key}.{sub}"), cell(&value)]);
                        }
                    }
                    other => rows.push(vec![key, cell(&other)]),
                }
            }
            table::render(&["key", "value"], &rows, options)
        }
        scalar => table::render(&["value"], &[vec![cell(&scalar)]], options),
    };
    Ok(rendered)
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::from("-"),
        Value::String(v) => v.clone(),
        Value::Array(items) if items.iter().all(Value::is_string) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde::Serialize;
    use serde_json::json;

    use super::render;
    use crate::cli::OutputFormat;

    #[derive(Serialize)]
    struct Report {
        classified: usize,
        skipped: usize,
        trends_file: Option<String>,
    }

    const REPORT: Report = Report {
        classified: 4,
        skipped: 1,
        trends_file: None,
    };

    #[test]
    fn json_render_is_valid_json() {
        let out = render(&REPORT, OutputFormat::Json).expect("json render should work");
        let parsed: serde_json::Value = serde_json::from_str(&out).expect("json should parse");
        assert_eq!(parsed["classified"], 4);
        assert!(parsed["trends_file"].is_null());
    }

    #[test]
    fn raw_render_is_single_line_json() {
        let out = render(&REPORT, OutputFormat::Raw).expect("raw render should work");
        assert!(!out.contains('\n'));
        assert!(out.contains("\"skipped\":1"));
    }

    #[test]
    fn table_render_for_object_lists_keys() {
        let out = render(&REPORT, OutputFormat::Table).expect("table render should work");
        let mut lines = out.lines();
        assert!(lines.next().is_some_and(|line| line.starts_with("key")));
        assert!(out.contains("classified"));
        assert!(out.lines().any(|line| line.starts_with("trends_file") && line.ends_with('-')));
    }

    #[test]
    fn table_render_flattens_nested_maps() {
        let value = json!({"by_theme": {"OTHER": 2, "LEGITIMATE_SOFTWARE": 5}, "total": 7});
        let out = render(&value, OutputFormat::Table).expect("table render should work");
        assert!(out.contains("by_theme.OTHER"));
        assert!(out.contains("by_theme.LEGITIMATE_SOFTWARE"));
    }

    #[test]
    fn table_render_for_rows() {
        let value = json!([
            {"title": "Red team noise", "severity": "HIGH", "affected_tenants": ["acme", "globex"]},
            {"title": "Vendor updaters", "severity": "LOW"}
        ]);
        let out = render(&value, OutputFormat::Table).expect("table render should work");
        assert!(out.lines().next().is_some_and(|l| l.contains("title") && l.contains("severity")));
        assert!(out.contains("acme, globex"));
        assert_eq!(out.lines().count(), 4);
    }

    #[test]
    fn table_render_empty_array() {
        let out = render(&json!([]), OutputFormat::Table).expect("table render should work");
        assert_eq!(out, "(no rows)");
    }
}
