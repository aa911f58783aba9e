use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One parsed change region from a zero-context unified diff.
///
/// Offsets are zero-based; sizes may be 0 for pure insertions or deletions
/// anchored between lines.
///
/// # Examples
///
/// ```
/// use covdrift_core::Hunk;
///
/// let hunk = Hunk {
///     base_start: 3,
///     base_size: 3,
///     curr_start: 3,
///     curr_size: 5,
/// };
/// assert_eq!(hunk.base_start + hunk.base_size, 6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hunk {
    /// Zero-based first affected line in the base revision.
    pub base_start: usize,
    /// Number of base lines covered by the hunk.
    pub base_size: usize,
    /// Zero-based first affected line in the current working tree.
    pub curr_start: usize,
    /// Number of current lines covered by the hunk.
    pub curr_size: usize,
}

/// A maximal run of lines identical between the base revision and the
/// current working tree, expressed as aligned offsets and a shared length.
///
/// # Examples
///
/// ```
/// use covdrift_core::UnchangedBlock;
///
/// let block = UnchangedBlock { base_offset: 0, curr_offset: 0, length: 3 };
/// assert_eq!(block.length, 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnchangedBlock {
    /// Zero-based offset of the block in the base revision.
    pub base_offset: usize,
    /// Zero-based offset of the block in the current working tree.
    pub curr_offset: usize,
    /// Number of identical lines (0 only for degenerate trailing blocks).
    pub length: usize,
}

/// Per relative file path, the ordered unchanged blocks between two
/// revisions. Gaps between consecutive blocks correspond exactly to the
/// hunks consumed to build them.
pub type FileBlockMap = BTreeMap<String, Vec<UnchangedBlock>>;

/// A contiguous run of uncovered lines in the current version of a file.
///
/// `start` is 1-based, `end` is exclusive. `same_cov` is supplied by the
/// external coverage analysis: `Some(true)` means the exact range was
/// already uncovered in the base revision, `Some(false)` means the miss is
/// new, and `None` means no base comparison was available.
///
/// # Examples
///
/// ```
/// use covdrift_core::MissingRange;
///
/// let range: MissingRange = serde_json::from_str(
///     r#"{"start": 4, "end": 7, "sameCov": false}"#,
/// ).unwrap();
/// assert_eq!(range.same_cov, Some(false));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingRange {
    /// 1-based first uncovered line.
    pub start: usize,
    /// Exclusive end of the uncovered run.
    pub end: usize,
    /// Base-comparison flag from the coverage analysis, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub same_cov: Option<bool>,
}

/// Statement and branch counts for one file or the whole report.
///
/// The counts are opaque to the renderers; only the derived coverage
/// percentage and the column values are consumed.
///
/// # Examples
///
/// ```
/// use covdrift_core::Numbers;
///
/// let mut total = Numbers::default();
/// total.add(&Numbers { n_statements: 10, n_missing: 2, ..Numbers::default() });
/// assert_eq!(total.pc_covered_str(), "80");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Numbers {
    /// Total statements in the file.
    pub n_statements: u64,
    /// Statements with no coverage.
    pub n_missing: u64,
    /// Total branch exits.
    pub n_branches: u64,
    /// Branches only partially taken.
    pub n_partial_branches: u64,
    /// Missing statements introduced relative to the base report, if known.
    pub n_diff_missing: Option<i64>,
    /// Decimal places for the coverage percentage.
    pub precision: usize,
}

impl Numbers {
    /// Coverage percentage over statements and branch exits.
    pub fn pc_covered(&self) -> f64 {
        let denominator = self.n_statements + self.n_branches;
        if denominator == 0 {
            return 100.0;
        }
        let covered = denominator
            .saturating_sub(self.n_missing)
            .saturating_sub(self.n_partial_branches);
        100.0 * covered as f64 / denominator as f64
    }

    /// Coverage percentage formatted to the configured precision, without
    /// the `%` sign (renderers decide whether to append one).
    pub fn pc_covered_str(&self) -> String {
        format!("{:.*}", self.precision, self.pc_covered())
    }

    /// Accumulate another file's counts into this total.
    pub fn add(&mut self, other: &Numbers) {
        self.n_statements += other.n_statements;
        self.n_missing += other.n_missing;
        self.n_branches += other.n_branches;
        self.n_partial_branches += other.n_partial_branches;
        self.n_diff_missing = match (self.n_diff_missing, other.n_diff_missing) {
            (None, None) => None,
            (a, b) => Some(a.unwrap_or(0) + b.unwrap_or(0)),
        };
    }
}

/// One file's aggregate for the tabular report: identity, counts, missing
/// ranges, and the current source lines for snippet extraction.
#[derive(Debug, Clone)]
pub struct ReportRow {
    /// Relative path of the file.
    pub name: String,
    /// Statement and branch counts.
    pub numbers: Numbers,
    /// Ordered uncovered ranges; empty when the Missing column is disabled.
    pub missing: Vec<MissingRange>,
    /// Current working-tree source lines (empty for deleted files).
    pub source: Vec<String>,
}

/// Per-file entry in the coverage input document.
///
/// # Examples
///
/// ```
/// use covdrift_core::FileCoverage;
///
/// let fc: FileCoverage = serde_json::from_str(
///     r#"{"statements": 120, "missing": 14, "missingRanges": [{"start": 4, "end": 7}]}"#,
/// ).unwrap();
/// assert_eq!(fc.statements, 120);
/// assert_eq!(fc.missing_ranges.len(), 1);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileCoverage {
    /// Total statements.
    pub statements: u64,
    /// Statements with no coverage.
    pub missing: u64,
    /// Total branch exits.
    #[serde(default)]
    pub branches: u64,
    /// Branches only partially taken.
    #[serde(default)]
    pub partial_branches: u64,
    /// Missing statements introduced relative to the base report.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff_missing: Option<i64>,
    /// Uncovered line ranges, each pre-classified by the analysis.
    #[serde(default)]
    pub missing_ranges: Vec<MissingRange>,
}

/// The coverage input document produced by the external coverage analysis.
///
/// # Examples
///
/// ```
/// use covdrift_core::CoverageData;
///
/// let data: CoverageData = serde_json::from_str(
///     r#"{"branches": true, "files": {"a.py": {"statements": 10, "missing": 0}}}"#,
/// ).unwrap();
/// assert!(data.branches);
/// assert_eq!(data.files.len(), 1);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageData {
    /// Whether branch coverage was measured.
    #[serde(default)]
    pub branches: bool,
    /// Per relative file path coverage entries.
    #[serde(default)]
    pub files: BTreeMap<String, FileCoverage>,
}

impl CoverageData {
    /// True when any file carries base-comparison data (a `diff_missing`
    /// count or a classified missing range), enabling the `∆ Miss` column.
    pub fn has_base_comparison(&self) -> bool {
        self.files.values().any(|f| {
            f.diff_missing.is_some() || f.missing_ranges.iter().any(|m| m.same_cov.is_some())
        })
    }
}

/// Output format for the report.
///
/// Implements [`FromStr`] so it can be used directly with `clap` argument
/// parsing.
///
/// # Examples
///
/// ```
/// use covdrift_core::OutputFormat;
///
/// let fmt: OutputFormat = "diff".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Diff);
///
/// let fmt: OutputFormat = "md".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Markdown);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Aligned plain-text table.
    #[default]
    Text,
    /// Markdown pipe table.
    Markdown,
    /// Size-bounded HTML-ish report for pull-request comments.
    Diff,
    /// The coverage percentage only.
    Total,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Diff => write!(f, "diff"),
            OutputFormat::Total => write!(f, "total"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "diff" => Ok(OutputFormat::Diff),
            "total" => Ok(OutputFormat::Total),
            other => Err(format!("unknown report format: {other}")),
        }
    }
}
