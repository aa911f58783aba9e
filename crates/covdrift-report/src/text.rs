use covdrift_core::{Numbers, ReportRow};

use crate::render::{cell_value, missing_cell, Column, Renderer};

/// Aligned plain-text table with rule lines and a TOTAL row.
///
/// # Examples
///
/// ```
/// use covdrift_core::{Numbers, ReportRow};
/// use covdrift_report::render::{Column, Renderer};
/// use covdrift_report::text::TextRenderer;
///
/// let rows = vec![ReportRow {
///     name: "app.py".into(),
///     numbers: Numbers { n_statements: 10, n_missing: 5, ..Numbers::default() },
///     missing: vec![],
///     source: vec![],
/// }];
/// let out = TextRenderer.render(
///     &[Column::Name, Column::Stmts, Column::Miss, Column::Cover],
///     &rows,
///     None,
///     &[],
/// );
/// assert!(out.starts_with("Name"));
/// assert!(out.contains("50%"));
/// ```
pub struct TextRenderer;

impl TextRenderer {
    fn widths(rows: &[ReportRow], total: Option<&Numbers>) -> (usize, usize) {
        let name_len = rows
            .iter()
            .map(|r| r.name.len())
            .chain([5])
            .max()
            .unwrap_or(5)
            + 1;
        let total_cover = total.map(Numbers::pc_covered_str).unwrap_or_default();
        let mut n = (total_cover.len() + 2).max(" Cover".len()) + 1;
        for row in rows {
            n = n.max(row.numbers.pc_covered_str().len() + 2);
        }
        (name_len, n)
    }

    fn format_cell(column: Column, text: &str, header: bool, name_len: usize, n: usize) -> String {
        match column {
            Column::Name => format!("{text:<name_len$}"),
            Column::Stmts | Column::Miss | Column::Branch | Column::BrPart => {
                format!("{text:>7}")
            }
            Column::DeltaMiss => format!("{text:>11}"),
            Column::Cover => {
                if header {
                    format!("{text:>n$}")
                } else {
                    format!("{text:>width$}%", width = n - 1)
                }
            }
            Column::Missing => {
                if header {
                    format!("{text:>10}")
                } else {
                    format!("   {text:<9}")
                }
            }
        }
    }
}

impl Renderer for TextRenderer {
    fn render(
        &self,
        header: &[Column],
        rows: &[ReportRow],
        total: Option<&Numbers>,
        footer: &[String],
    ) -> String {
        let (name_len, n) = Self::widths(rows, total);

        let header_str: String = header
            .iter()
            .map(|c| Self::format_cell(*c, c.caption(), true, name_len, n))
            .collect();
        let rule = "-".repeat(header_str.chars().count());

        let mut out = String::new();
        out.push_str(&header_str);
        out.push('\n');
        out.push_str(&rule);
        out.push('\n');

        for row in rows {
            for column in header {
                let text = if *column == Column::Missing {
                    missing_cell(row)
                } else {
                    cell_value(*column, &row.name, &row.numbers)
                };
                out.push_str(&Self::format_cell(*column, &text, false, name_len, n));
            }
            out.push('\n');
        }

        if let Some(total) = total {
            if !rows.is_empty() {
                out.push_str(&rule);
                out.push('\n');
            }
            for column in header {
                let text = if *column == Column::Missing {
                    String::new()
                } else {
                    cell_value(*column, "TOTAL", total)
                };
                out.push_str(&Self::format_cell(*column, &text, false, name_len, n));
            }
            out.push('\n');
        }

        for line in footer {
            out.push('\n');
            out.push_str(line);
            out.push('\n');
        }

        out
    }
}
