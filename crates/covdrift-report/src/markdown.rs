use covdrift_core::{Numbers, ReportRow};

use crate::render::{cell_value, missing_cell, Column, Renderer};

/// Markdown pipe table with right-aligned numeric columns and a bold TOTAL.
///
/// # Examples
///
/// ```
/// use covdrift_core::{Numbers, ReportRow};
/// use covdrift_report::render::{Column, Renderer};
/// use covdrift_report::markdown::MarkdownRenderer;
///
/// let rows = vec![ReportRow {
///     name: "my_app.py".into(),
///     numbers: Numbers { n_statements: 4, n_missing: 1, ..Numbers::default() },
///     missing: vec![],
///     source: vec![],
/// }];
/// let out = MarkdownRenderer.render(
///     &[Column::Name, Column::Stmts, Column::Miss, Column::Cover],
///     &rows,
///     None,
///     &[],
/// );
/// assert!(out.contains("| my\\_app.py"));
/// ```
pub struct MarkdownRenderer;

impl Renderer for MarkdownRenderer {
    fn render(
        &self,
        header: &[Column],
        rows: &[ReportRow],
        total: Option<&Numbers>,
        footer: &[String],
    ) -> String {
        let mut out = String::new();

        let captions: Vec<String> = header
            .iter()
            .map(|c| c.caption().replace(' ', "&nbsp;"))
            .collect();
        out.push_str(&format!("| {} |\n", captions.join(" | ")));
        let rule: Vec<&str> = header
            .iter()
            .map(|c| if *c == Column::Name { "---" } else { "---:" })
            .collect();
        out.push_str(&format!("| {} |\n", rule.join(" | ")));

        for row in rows {
            let cells: Vec<String> = header
                .iter()
                .map(|column| match column {
                    Column::Name => row.name.replace('_', "\\_"),
                    Column::Missing => missing_cell(row),
                    Column::Cover => format!("{}%", cell_value(*column, &row.name, &row.numbers)),
                    _ => cell_value(*column, &row.name, &row.numbers),
                })
                .collect();
            out.push_str(&format!("| {} |\n", cells.join(" | ")));
        }

        if let Some(total) = total {
            let cells: Vec<String> = header
                .iter()
                .map(|column| {
                    if *column == Column::Missing {
                        return String::new();
                    }
                    let value = cell_value(*column, "TOTAL", total);
                    if value.is_empty() {
                        return value;
                    }
                    if *column == Column::Cover {
                        format!("**{value}%**")
                    } else {
                        format!("**{value}**")
                    }
                })
                .collect();
            out.push_str(&format!("| {} |\n", cells.join(" | ")));
        }

        for line in footer {
            out.push('\n');
            out.push_str(line);
            out.push('\n');
        }

        out
    }
}
