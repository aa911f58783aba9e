use covdrift_core::{MissingRange, Numbers, ReportRow};

/// A report table column.
///
/// `Missing` is special: the diff renderer never emits it as a plain column,
/// it drives per-row snippet expansion instead.
///
/// # Examples
///
/// ```
/// use covdrift_report::render::Column;
///
/// assert_eq!(Column::DeltaMiss.caption(), "∆ Miss");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    /// File path.
    Name,
    /// Total statements.
    Stmts,
    /// Missing statements.
    Miss,
    /// Total branch exits.
    Branch,
    /// Partially taken branches.
    BrPart,
    /// Missing statements introduced relative to the base report.
    DeltaMiss,
    /// Coverage percentage.
    Cover,
    /// Uncovered line ranges.
    Missing,
}

impl Column {
    /// Column caption as shown in table headers.
    pub fn caption(&self) -> &'static str {
        match self {
            Column::Name => "Name",
            Column::Stmts => "Stmts",
            Column::Miss => "Miss",
            Column::Branch => "Branch",
            Column::BrPart => "BrPart",
            Column::DeltaMiss => "∆ Miss",
            Column::Cover => "Cover",
            Column::Missing => "Missing",
        }
    }
}

/// A renderer variant for the tabular report.
///
/// One implementation per output format; the summary reporter selects a
/// variant from configuration and hands every one the same inputs.
pub trait Renderer {
    /// Render header columns, body rows, an optional aggregate total, and
    /// trailing footer lines into the final document.
    fn render(
        &self,
        header: &[Column],
        rows: &[ReportRow],
        total: Option<&Numbers>,
        footer: &[String],
    ) -> String;
}

/// The bare coverage percentage, for scripting.
pub struct TotalRenderer;

impl Renderer for TotalRenderer {
    fn render(
        &self,
        _header: &[Column],
        _rows: &[ReportRow],
        total: Option<&Numbers>,
        _footer: &[String],
    ) -> String {
        let mut out = total.map(Numbers::pc_covered_str).unwrap_or_default();
        out.push('\n');
        out
    }
}

/// Render a missing range as its 1-based inclusive line span, `start` or
/// `start-last`, bolding ranges the analysis classified as newly missing.
///
/// # Examples
///
/// ```
/// use covdrift_core::MissingRange;
/// use covdrift_report::render::format_range;
///
/// // Lines 4 through 6: the exclusive end never leaks into the output.
/// let r = MissingRange { start: 4, end: 7, same_cov: Some(false) };
/// assert_eq!(format_range(&r), "**4-6**");
/// ```
pub fn format_range(range: &MissingRange) -> String {
    let s = plain_range(range);
    if range.same_cov == Some(false) {
        format!("**{s}**")
    } else {
        s
    }
}

/// The unbolded `start` / `start-last` form of a range, with the exclusive
/// `end` converted to the inclusive last line.
pub(crate) fn plain_range(range: &MissingRange) -> String {
    if range.start == range.end - 1 {
        range.start.to_string()
    } else {
        format!("{}-{}", range.start, range.end - 1)
    }
}

/// Value of a non-`Missing` column for a row or the total line.
pub(crate) fn cell_value(column: Column, name: &str, numbers: &Numbers) -> String {
    match column {
        Column::Name => name.to_string(),
        Column::Stmts => numbers.n_statements.to_string(),
        Column::Miss => numbers.n_missing.to_string(),
        Column::Branch => numbers.n_branches.to_string(),
        Column::BrPart => numbers.n_partial_branches.to_string(),
        Column::DeltaMiss => numbers
            .n_diff_missing
            .map(|d| d.to_string())
            .unwrap_or_default(),
        Column::Cover => numbers.pc_covered_str(),
        Column::Missing => String::new(),
    }
}

/// Missing column content: all ranges joined.
pub(crate) fn missing_cell(row: &ReportRow) -> String {
    row.missing
        .iter()
        .map(format_range)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line_range_renders_one_number() {
        let r = MissingRange {
            start: 12,
            end: 13,
            same_cov: None,
        };
        assert_eq!(format_range(&r), "12");
    }

    #[test]
    fn span_renders_inclusive_last_line() {
        // Lines 4 through 8; the exclusive end is 9.
        let r = MissingRange {
            start: 4,
            end: 9,
            same_cov: Some(true),
        };
        assert_eq!(format_range(&r), "4-8");
    }

    #[test]
    fn two_line_span_keeps_the_dash_form() {
        let r = MissingRange {
            start: 5,
            end: 7,
            same_cov: None,
        };
        assert_eq!(format_range(&r), "5-6");
    }

    #[test]
    fn new_miss_is_bolded() {
        let r = MissingRange {
            start: 4,
            end: 5,
            same_cov: Some(false),
        };
        assert_eq!(format_range(&r), "**4**");
    }

    #[test]
    fn delta_miss_cell_empty_when_unknown() {
        let numbers = Numbers::default();
        assert_eq!(cell_value(Column::DeltaMiss, "f", &numbers), "");
        let numbers = Numbers {
            n_diff_missing: Some(-2),
            ..Numbers::default()
        };
        assert_eq!(cell_value(Column::DeltaMiss, "f", &numbers), "-2");
    }

    #[test]
    fn total_renderer_emits_percentage_only() {
        let total = Numbers {
            n_statements: 4,
            n_missing: 1,
            ..Numbers::default()
        };
        let out = TotalRenderer.render(&[], &[], Some(&total), &[]);
        assert_eq!(out, "75\n");
    }
}
