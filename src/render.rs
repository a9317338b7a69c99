//! Result shaping for sqlgate.
//!
//! Renders query results as an HTML table fragment. Every header and cell is
//! escaped, so values from the store can never inject markup.

use crate::db::{QueryResult, Row, Value};

/// Shown when a statement produced no projection at all.
pub const NO_COLUMNS_MESSAGE: &str = "No columns detected in query results";

/// Placeholder row text for a projection with zero rows.
pub const NO_RESULTS_MESSAGE: &str = "No results found";

/// Renders a query result.
pub fn render_result(result: &QueryResult) -> String {
    render_table(&result.rows, &result.column_names())
}

/// Renders rows under the given column headers.
///
/// Cells are taken by position, so duplicate column names (e.g. `id` from
/// both sides of a join) each show their own value. Missing cells render
/// empty.
pub fn render_table(rows: &[Row], columns: &[String]) -> String {
    if columns.is_empty() {
        return format!(r#"<div class="error">{NO_COLUMNS_MESSAGE}</div>"#);
    }

    let headers: String = columns
        .iter()
        .map(|name| format!("<th>{}</th>", escape_html(name)))
        .collect();

    let body: String = if rows.is_empty() {
        format!(
            r#"<tr><td colspan="{}" class="no-results">{NO_RESULTS_MESSAGE}</td></tr>"#,
            columns.len()
        )
    } else {
        rows.iter().map(|row| render_row(row, columns.len())).collect()
    };

    format!(
        concat!(
            r#"<div class="table-container">"#,
            r#"<table class="result-table">"#,
            "<thead><tr>{}</tr></thead>",
            "<tbody>{}</tbody>",
            "</table>",
            "</div>"
        ),
        headers, body
    )
}

fn render_row(row: &Row, width: usize) -> String {
    let cells: String = (0..width)
        .map(|index| match row.value_at(index) {
            Some(Value::Null) => r#"<td class="null">NULL</td>"#.to_string(),
            Some(value) => format!("<td>{}</td>", escape_html(&value.to_display_string())),
            None => "<td></td>".to_string(),
        })
        .collect();
    format!("<tr>{cells}</tr>")
}

/// Renders an error message in the standard alert block.
pub fn render_error(message: &str) -> String {
    format!(
        concat!(
            r#"<div class="error-alert">"#,
            r#"<div class="error-icon">!</div>"#,
            r#"<div class="error-message">{}</div>"#,
            "</div>"
        ),
        escape_html(message)
    )
}

/// Escapes text for use in HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
