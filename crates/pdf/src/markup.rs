//! Typst source for one statement.
//!
//! Every piece of user data is emitted as a Typst string literal (`#"..."`),
//! never as raw markup, so keys or client names containing `*`, `#` or `$`
//! render verbatim.

use std::fmt::Write;

use releve_core::RowField;

use crate::report::GroupReport;

const HEADER_FILL: &str = "rgb(179, 204, 255)";

/// Escapes `text` as the body of a Typst string literal.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\r' => {}
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}

/// Content block for a text cell. `\n` becomes a Typst line break.
pub fn text_content(text: &str) -> String {
    let parts: Vec<String> = text
        .split('\n')
        .map(|line| format!("#\"{}\"", escape(line)))
        .collect();
    format!("[{}]", parts.join(" \\ "))
}

fn is_numeric(field: RowField) -> bool {
    matches!(field, RowField::Amount | RowField::Commission)
}

/// Builds the complete document. `logos` are file names relative to the
/// compilation root, passed only when both images are available.
pub fn build_markup(report: &GroupReport<'_>, logos: Option<(&str, &str)>) -> String {
    let variant = report.variant;
    let mut out = String::new();

    out.push_str("#set page(paper: \"a4\", margin: (x: 1.5cm, y: 2cm))\n");
    out.push_str("#set text(size: 11pt)\n\n");

    if let Some((left, right)) = logos {
        let _ = writeln!(
            out,
            "#grid(columns: (1fr, 1fr), align: (left + horizon, right + horizon),\n  \
             image(\"{}\", width: 3cm, height: 2cm, fit: \"contain\"),\n  \
             image(\"{}\", width: 3cm, height: 2cm, fit: \"contain\"),\n)\n#v(20pt)",
            escape(left),
            escape(right)
        );
    }

    let _ = writeln!(
        out,
        "#align(center, text(size: 16pt, weight: \"bold\")[#\"{}\"])\n#v(20pt)",
        escape(&variant.title)
    );

    // Info block
    out.push_str("#grid(columns: (4cm, 1fr), row-gutter: 6pt,\n");
    for (label, value) in report.info_lines() {
        let _ = writeln!(out, "  {}, {},", text_content(&label), text_content(&value));
    }
    out.push_str(")\n#v(20pt)\n\n");

    // Transactions
    let columns = &variant.columns;
    let widths = vec!["1fr"; columns.len()].join(", ");
    let aligns: Vec<&str> = columns
        .iter()
        .map(|c| if is_numeric(c.field) { "right + horizon" } else { "center + horizon" })
        .collect();
    let _ = writeln!(
        out,
        "#table(\n  columns: ({widths},),\n  align: ({},),\n  stroke: 0.5pt + black,\n  inset: 3pt,\n  \
         fill: (_, y) => if y == 0 {{ {HEADER_FILL} }} else {{ white }},",
        aligns.join(", ")
    );
    let headers: Vec<String> = columns
        .iter()
        .map(|c| format!("text(size: 8pt, weight: \"bold\"){}", text_content(&c.header)))
        .collect();
    let _ = writeln!(out, "  table.header({}),", headers.join(", "));
    for cells in report.table_rows() {
        let rendered: Vec<String> = cells
            .iter()
            .map(|c| format!("text(size: 7pt){}", text_content(c)))
            .collect();
        let _ = writeln!(out, "  {},", rendered.join(", "));
    }
    out.push_str(")\n");

    if let Some(line) = report.summary_line() {
        let _ = writeln!(
            out,
            "#v(30pt)\n#align(right, text(weight: \"bold\"){})",
            text_content(&line)
        );
    }
    let _ = writeln!(
        out,
        "#v(20pt)\n#align(left, text(size: 8pt, fill: gray){})",
        text_content(&report.generated_line())
    );
    out
}
