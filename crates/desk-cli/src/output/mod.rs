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

fn table_options() -> table::TableOptions {
    let prefs = ui::prefs();
    table::TableOptions {
        max_width: prefs.term_width,
        color: prefs.table_color,
    }
}

fn render_table<T: Serialize>(value: &T) -> anyhow::Result<String> {
    let options = table_options();
    match serde_json::to_value(value)? {
        Value::Array(items) => Ok(render_rows(&items, options)),
        Value::Object(map) => {
            let mut rows = map
                .into_iter()
                .map(|(key, value)| vec![key, value_to_cell(&value)])
                .collect::<Vec<_>>();
            rows.sort();
            Ok(table::render(&["field", "value"], &rows, options))
        }
        scalar => Ok(table::render(
            &["value"],
            &[vec![value_to_cell(&scalar)]],
            options,
        )),
    }
}

/// One row per array element, one column per key seen in any element.
fn render_rows(items: &[Value], options: table::TableOptions) -> String {
    if items.is_empty() {
        return String::from("(no rows)");
    }
    if !items.iter().all(Value::is_object) {
        let rows = items
            .iter()
            .map(|item| vec![value_to_cell(item)])
            .collect::<Vec<_>>();
        return table::render(&["value"], &rows, options);
    }

    let mut headers = items
        .iter()
        .filter_map(Value::as_object)
        .flat_map(|map| map.keys().cloned())
        .collect::<Vec<_>>();
    headers.sort();
    headers.dedup();

    let rows = items
        .iter()
        .filter_map(Value::as_object)
        .map(|map| {
            headers
                .iter()
                .map(|header| map.get(header).map_or_else(|| "-".to_string(), value_to_cell))
                .collect()
        })
        .collect::<Vec<Vec<String>>>();

    let header_refs = headers.iter().map(String::as_str).collect::<Vec<_>>();
    table::render(&header_refs, &rows, options)
}

fn value_to_cell(value: &Value) -> String {
    match value {
        Value::Null => String::from("-"),
        Value::Bool(v) => v.to_string(),
        Value::Number(v) => v.to_string(),
        Value::String(v) => v.clone(),
        Value::Array(items) if items.is_empty() => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde::Serialize;
    use serde_json::json;

    use super::{render, render_rows, table::TableOptions};
    use crate::cli::OutputFormat;

    #[derive(Serialize)]
    struct Line {
        sku: &'static str,
        stock_level: u32,
    }

    const PLAIN: TableOptions = TableOptions {
        max_width: None,
        color: false,
    };

    #[test]
    fn json_render_is_valid_json() {
        let out = render(&Line { sku: "MUG-1", stock_level: 3 }, OutputFormat::Json)
            .expect("json render should work");
        let parsed: serde_json::Value = serde_json::from_str(&out).expect("json should parse");
        assert_eq!(parsed["sku"], "MUG-1");
        assert_eq!(parsed["stock_level"], 3);
    }

    #[test]
    fn raw_render_is_single_line_json() {
        let out = render(&Line { sku: "MUG-1", stock_level: 3 }, OutputFormat::Raw)
            .expect("raw render should work");
        assert!(!out.contains('\n'));
    }

    #[test]
    fn object_renders_as_field_value_table() {
        let out = render(&Line { sku: "MUG-1", stock_level: 3 }, OutputFormat::Table)
            .expect("table render should work");
        let first = out.lines().next().unwrap();
        assert!(first.contains("field"));
        assert!(out.contains("stock_level"));
    }

    #[test]
    fn rows_take_union_of_keys() {
        let items = vec![json!({ "sku": "A" }), json!({ "sku": "B", "name": "Bowl" })];
        let out = render_rows(&items, PLAIN);
        let lines = out.lines().collect::<Vec<_>>();
        assert!(lines[0].contains("name") && lines[0].contains("sku"));
        assert_eq!(lines.len(), 4);
        assert!(lines[2].contains('-'));
    }

    #[test]
    fn empty_list_says_so() {
        assert_eq!(render_rows(&[], PLAIN), "(no rows)");
    }
}
