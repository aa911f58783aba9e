//! The diff report: an HTML table meant to be posted as a pull-request
//! comment, with per-file expandable code snippets for every missing range.
//!
//! The document is bounded: platforms cap comment size around 64 KiB, so
//! after assembling the full tables the renderer measures them against
//! [`SIZE_CEILING`] and, on overflow, re-renders once in short mode with
//! snippet bodies dropped. Short mode is assumed to always fit and is never
//! re-measured.

use std::fmt::Write as _;

use covdrift_core::{FileBlockMap, MissingRange, Numbers, ReportRow};
use sha2::{Digest, Sha256};

use crate::render::{cell_value, plain_range, Column, Renderer};

/// Hard output-size bound: 64 KiB minus a safety margin for the text the
/// posting side wraps around the document.
pub const SIZE_CEILING: usize = 64 * 1024 - 1024;

/// Snippet lines longer than this are clipped in truncated snippets.
const LINE_CLIP: usize = 128;

/// Bounded HTML-ish renderer for pull-request comments.
///
/// Rows where every missing range carries `same_cov: true` are moved out of
/// the primary table into a collapsed secondary table, so reviewers see new
/// regressions first. The block map decides which files get deep links into
/// the pull request's diff view.
pub struct DiffRenderer<'a> {
    blocks: &'a FileBlockMap,
    pr_number: Option<String>,
}

impl<'a> DiffRenderer<'a> {
    pub fn new(blocks: &'a FileBlockMap, pr_number: Option<String>) -> Self {
        DiffRenderer { blocks, pr_number }
    }

    /// One locator line per missing range, optionally wrapped in a deep link
    /// into the pull request's diff view.
    fn locator(&self, name: &str, range: &MissingRange, linked: bool) -> String {
        let nice = plain_range(range);
        let many = if nice.contains('-') { "s" } else { "" };
        let loc = match range.same_cov {
            None => format!("Missing coverage at line{many} {nice}"),
            Some(true) => format!("Was already missing at line{many} {nice}"),
            Some(false) => format!("New missing coverage at line{many} {nice} !"),
        };
        match &self.pr_number {
            Some(pr) if linked => {
                let link = format!(
                    "{pr}/files#diff-{}R{}-R{}",
                    sha256_hex(name),
                    range.start,
                    range.end
                );
                format!("<a href=\"{link}\">{loc}</a>")
            }
            _ => loc,
        }
    }

    /// Build one `<tr>` per row, splitting into the primary and collapsed
    /// line sets, then append the total row to the primary set.
    fn render_tables(
        &self,
        header: &[Column],
        rows: &[ReportRow],
        total: Option<&Numbers>,
        short: bool,
    ) -> String {
        let show_missing = header.contains(&Column::Missing);

        let header_cells: String = header
            .iter()
            .filter(|c| **c != Column::Missing)
            .map(|c| {
                format!(
                    "<th align={}>{}</th>",
                    align(*c),
                    c.caption().replace(' ', "&nbsp;")
                )
            })
            .collect();
        let header_str = format!("<tr>{header_cells}</tr>");

        let mut lines: Vec<String> = Vec::new();
        let mut collapsed_lines: Vec<String> = Vec::new();

        for row in rows {
            let mut collapse = row.numbers.n_diff_missing.unwrap_or(0) <= 0;
            let mut name_cell = row.name.clone();

            if show_missing {
                collapse = row.missing.iter().all(|m| m.same_cov == Some(true));
                let linked = self.blocks.contains_key(&row.name);

                let mut snippets: Vec<String> = Vec::new();
                for range in &row.missing {
                    let mut snippet = self.locator(&row.name, range, linked);
                    if !short {
                        let budget = if collapse {
                            256
                        } else if range.same_cov == Some(true) {
                            512
                        } else {
                            1024
                        };
                        let body = snippet_body(&row.source, range, budget);
                        let _ = write!(snippet, "<pre lang=\"diff\">{body}</pre>");
                    }
                    if short {
                        snippet = format!("<li>{snippet}</li>");
                    }
                    snippets.push(snippet);
                }

                name_cell = format!(
                    "<details><summary>{}</summary><p>{}</p></details>",
                    row.name,
                    snippets.concat()
                );
            }

            let cells: String = header
                .iter()
                .filter(|c| **c != Column::Missing)
                .map(|column| {
                    let value = if *column == Column::Name {
                        name_cell.clone()
                    } else {
                        cell_value(*column, &row.name, &row.numbers)
                    };
                    let pct = if *column == Column::Cover { "%" } else { "" };
                    format!("<td align={}>{value}{pct}</td>", align(*column))
                })
                .collect();
            let line = format!("<tr>{cells}</tr>");

            if collapse {
                collapsed_lines.push(line);
            } else {
                lines.push(line);
            }
        }

        if let Some(total) = total {
            let cells: String = header
                .iter()
                .filter(|c| **c != Column::Missing)
                .map(|column| {
                    let value = cell_value(*column, "TOTAL", total);
                    let insert = if value.is_empty() {
                        value
                    } else if *column == Column::Cover {
                        format!("<b>{value}%</b>")
                    } else {
                        format!("<b>{value}</b>")
                    };
                    format!("<td align={}>{insert}</td>", align(*column))
                })
                .collect();
            lines.push(format!("<tr>{cells}</tr>"));
        }

        let mut result = format!(
            "<table><thead>{header_str}</thead><tbody>{}</tbody></table>",
            lines.concat()
        );

        if !collapsed_lines.is_empty() {
            let _ = write!(
                result,
                "\n\n<details><summary>Files without new missing coverage</summary>\n\
                 <table><thead>{header_str}</thead><tbody>{}</tbody></table></details>",
                collapsed_lines.concat()
            );
        }

        result
    }
}

impl Renderer for DiffRenderer<'_> {
    fn render(
        &self,
        header: &[Column],
        rows: &[ReportRow],
        total: Option<&Numbers>,
        footer: &[String],
    ) -> String {
        let tables = self.render_tables(header, rows, total, false);
        // Only one retry: drop snippet bodies and trust that to fit.
        let (tables, omitted) = if tables.len() > SIZE_CEILING {
            (self.render_tables(header, rows, total, true), true)
        } else {
            (tables, false)
        };

        let mut out = tables;
        out.push('\n');
        if !footer.is_empty() {
            out.push('\n');
        }
        for line in footer {
            out.push('\n');
            out.push_str(line);
            out.push('\n');
        }
        out.push('\n');
        if omitted {
            out.push_str("\n\n*Snippets were omitted because the report was too large*\n");
        }
        out
    }
}

fn align(column: Column) -> &'static str {
    if column == Column::Name {
        "left"
    } else {
        "right"
    }
}

fn sha256_hex(name: &str) -> String {
    let digest = Sha256::digest(name.as_bytes());
    let mut hex = String::with_capacity(64);
    for byte in digest {
        let _ = write!(hex, "{byte:02x}");
    }
    hex
}

/// Source lines around a missing range, each marked as missing or context,
/// truncated head-and-tail when the assembled text blows its budget.
fn snippet_body(source: &[String], range: &MissingRange, budget: usize) -> String {
    let lo = range.start.saturating_sub(2);
    let hi = range.end.min(source.len());

    let mut lines: Vec<String> = Vec::new();
    for (idx, text) in source.iter().enumerate().take(hi).skip(lo) {
        let line_no = idx + 1;
        let prefix = if range.start <= line_no && line_no < range.end {
            "- "
        } else {
            " "
        };
        let line = format!("{prefix}{text}");
        if line.trim().is_empty() {
            lines.push("<span/>".to_string());
        } else {
            lines.push(line);
        }
    }

    let body = lines.join("\n");
    if body.len() <= budget {
        return body;
    }

    let keep = budget / LINE_CLIP;
    let mut kept: Vec<String> = Vec::new();
    kept.extend(lines.iter().take(keep.min(lines.len())).cloned());
    kept.push("  ...".to_string());
    kept.extend(lines.iter().skip(lines.len().saturating_sub(keep)).cloned());
    kept.iter()
        .map(|s| clip_line(s))
        .collect::<Vec<_>>()
        .join("\n")
}

fn clip_line(line: &str) -> String {
    if line.chars().count() > LINE_CLIP {
        let clipped: String = line.chars().take(LINE_CLIP).collect();
        format!("{clipped}...")
    } else {
        line.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, ranges: Vec<MissingRange>, source: Vec<String>) -> ReportRow {
        let n_missing = ranges.iter().map(|r| (r.end - r.start) as u64).sum();
        ReportRow {
            name: name.into(),
            numbers: Numbers {
                n_statements: source.len() as u64,
                n_missing,
                n_diff_missing: Some(1),
                ..Numbers::default()
            },
            missing: ranges,
            source,
        }
    }

    fn header() -> Vec<Column> {
        vec![
            Column::Name,
            Column::Stmts,
            Column::Miss,
            Column::Cover,
            Column::Missing,
        ]
    }

    fn numbered_source(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("print({i})")).collect()
    }

    #[test]
    fn mixed_ranges_land_in_primary_table() {
        let blocks = FileBlockMap::new();
        let r = row(
            "a.py",
            vec![
                MissingRange {
                    start: 1,
                    end: 3,
                    same_cov: Some(true),
                },
                MissingRange {
                    start: 8,
                    end: 9,
                    same_cov: Some(false),
                },
            ],
            numbered_source(10),
        );
        let out = DiffRenderer::new(&blocks, None).render(&header(), &[r], None, &[]);
        assert!(out.contains("Was already missing at lines 1-2"));
        assert!(out.contains("New missing coverage at line 8 !"));
        assert!(!out.contains("Files without new missing coverage"));
    }

    #[test]
    fn all_same_cov_rows_collapse() {
        let blocks = FileBlockMap::new();
        let r = row(
            "b.py",
            vec![MissingRange {
                start: 2,
                end: 4,
                same_cov: Some(true),
            }],
            numbered_source(5),
        );
        let out = DiffRenderer::new(&blocks, None).render(&header(), &[r], None, &[]);
        assert!(out.contains("Files without new missing coverage"));
        let secondary = out.split("Files without new missing coverage").nth(1).unwrap();
        assert!(secondary.contains("b.py"));
    }

    #[test]
    fn range_without_classification_does_not_collapse() {
        let blocks = FileBlockMap::new();
        let r = row(
            "c.py",
            vec![MissingRange {
                start: 1,
                end: 2,
                same_cov: None,
            }],
            numbered_source(3),
        );
        let out = DiffRenderer::new(&blocks, None).render(&header(), &[r], None, &[]);
        assert!(out.contains("Missing coverage at line 1"));
        assert!(!out.contains("Files without new missing coverage"));
    }

    #[test]
    fn deep_link_requires_pr_number_and_changed_file() {
        let mut blocks = FileBlockMap::new();
        blocks.insert("a.py".to_string(), vec![]);
        let ranges = vec![MissingRange {
            start: 8,
            end: 10,
            same_cov: Some(false),
        }];

        let r = row("a.py", ranges.clone(), numbered_source(12));
        let out = DiffRenderer::new(&blocks, Some("42".into())).render(&header(), &[r], None, &[]);
        let expected = format!("42/files#diff-{}R8-R10", sha256_hex("a.py"));
        assert!(out.contains(&expected));

        // Same file without a PR number, and an unrecognized file with one.
        let r = row("a.py", ranges.clone(), numbered_source(12));
        let out = DiffRenderer::new(&blocks, None).render(&header(), &[r], None, &[]);
        assert!(!out.contains("<a href"));

        let r = row("other.py", ranges, numbered_source(12));
        let out = DiffRenderer::new(&blocks, Some("42".into())).render(&header(), &[r], None, &[]);
        assert!(!out.contains("<a href"));
    }

    #[test]
    fn snippet_marks_missing_lines_and_blank_lines() {
        let source = vec![
            "def f():".to_string(),
            "    x = 1".to_string(),
            String::new(),
            "    return x".to_string(),
        ];
        let range = MissingRange {
            start: 2,
            end: 4,
            same_cov: None,
        };
        let body = snippet_body(&source, &range, 1024);
        assert_eq!(body, " def f():\n-     x = 1\n<span/>\n     return x");
    }

    #[test]
    fn snippet_clamps_to_file_bounds() {
        let source = numbered_source(3);
        let range = MissingRange {
            start: 1,
            end: 9,
            same_cov: None,
        };
        let body = snippet_body(&source, &range, 1024);
        assert_eq!(body.lines().count(), 3);
    }

    #[test]
    fn oversized_snippet_truncates_head_and_tail() {
        let source = numbered_source(40);
        let range = MissingRange {
            start: 2,
            end: 40,
            same_cov: Some(true),
        };
        let body = snippet_body(&source, &range, 512);
        let lines: Vec<&str> = body.lines().collect();
        // 4 head lines, an ellipsis marker, 4 tail lines.
        assert_eq!(lines.len(), 9);
        assert_eq!(lines[4], "  ...");
        assert_eq!(lines[0], " print(1)");
        assert_eq!(lines[8], "- print(40)");
    }

    #[test]
    fn truncated_snippet_clips_long_lines() {
        let source: Vec<String> = (0..20).map(|_| "x".repeat(300)).collect();
        let range = MissingRange {
            start: 1,
            end: 20,
            same_cov: None,
        };
        let body = snippet_body(&source, &range, 1024);
        for line in body.lines() {
            assert!(line.chars().count() <= LINE_CLIP + 3);
        }
        assert!(body.contains("..."));
    }

    #[test]
    fn total_row_is_bold_in_primary_table() {
        let blocks = FileBlockMap::new();
        let total = Numbers {
            n_statements: 10,
            n_missing: 2,
            ..Numbers::default()
        };
        let out = DiffRenderer::new(&blocks, None).render(
            &[Column::Name, Column::Stmts, Column::Miss, Column::Cover],
            &[],
            Some(&total),
            &[],
        );
        assert!(out.contains("<td align=left><b>TOTAL</b></td>"));
        assert!(out.contains("<b>80%</b>"));
    }

    #[test]
    fn oversized_report_degrades_to_short_mode() {
        let blocks = FileBlockMap::new();
        let source: Vec<String> = (0..200).map(|i| format!("x = {i}; ").repeat(40)).collect();
        let rows: Vec<ReportRow> = (0..80)
            .map(|i| {
                row(
                    &format!("pkg/module_{i}.py"),
                    vec![MissingRange {
                        start: 5,
                        end: 180,
                        same_cov: None,
                    }],
                    source.clone(),
                )
            })
            .collect();
        let out = DiffRenderer::new(&blocks, None).render(&header(), &rows, None, &[]);
        assert!(out.contains("*Snippets were omitted because the report was too large*"));
        assert!(out.contains("<li>"));
        assert!(!out.contains("<pre lang=\"diff\">"));
        assert!(out.len() <= SIZE_CEILING + 1024);
    }

    #[test]
    fn short_mode_note_follows_footer() {
        let blocks = FileBlockMap::new();
        let source: Vec<String> = (0..200).map(|i| format!("x = {i}; ").repeat(40)).collect();
        let rows: Vec<ReportRow> = (0..80)
            .map(|i| {
                row(
                    &format!("pkg/module_{i}.py"),
                    vec![MissingRange {
                        start: 5,
                        end: 180,
                        same_cov: None,
                    }],
                    source.clone(),
                )
            })
            .collect();
        let footer = vec!["3 files skipped due to complete coverage.".to_string()];
        let out = DiffRenderer::new(&blocks, None).render(&header(), &rows, None, &footer);
        let skipped = out.find("3 files skipped").unwrap();
        let note = out.find("*Snippets were omitted").unwrap();
        assert!(skipped < note);
    }
}
