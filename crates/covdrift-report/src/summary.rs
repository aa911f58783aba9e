//! Summary reporting: turns loaded coverage data into one of the tabular
//! output formats, wiring the diff format to the unchanged-block mapper.

use std::fs;
use std::path::Path;

use covdrift_core::{
    CovdriftError, CoverageData, FileCoverage, Numbers, OutputFormat, ReportConfig, ReportRow,
    Result,
};
use covdrift_diffmap::{BlockCache, DiffMapper};

use crate::diff::DiffRenderer;
use crate::markdown::MarkdownRenderer;
use crate::render::{Column, Renderer, TotalRenderer};
use crate::text::TextRenderer;

/// Everything the reporter needs to know about how to render.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub format: OutputFormat,
    pub base_revision: String,
    pub show_missing: bool,
    pub skip_covered: bool,
    pub skip_empty: bool,
    pub sort: String,
    pub precision: usize,
    /// Pull request number used for diff-view deep links.
    pub pr_number: Option<String>,
}

impl ReportOptions {
    /// Build options from the report config section, picking up the pull
    /// request number from the `GITHUB_PR_NUMBER` environment variable.
    pub fn from_config(config: &ReportConfig) -> Self {
        ReportOptions {
            format: config.format,
            base_revision: config.base_revision.clone(),
            show_missing: config.show_missing,
            skip_covered: config.skip_covered,
            skip_empty: config.skip_empty,
            sort: config.sort.clone(),
            precision: config.precision,
            pr_number: std::env::var("GITHUB_PR_NUMBER").ok(),
        }
    }
}

/// The reporter behind every output format.
///
/// Owns the block cache so repeated reports against the same base revision
/// reuse one `git diff` invocation.
pub struct SummaryReporter {
    options: ReportOptions,
    cache: BlockCache,
}

impl SummaryReporter {
    pub fn new(options: ReportOptions) -> Self {
        SummaryReporter {
            options,
            cache: BlockCache::new(),
        }
    }

    /// Render `data` into the configured format.
    ///
    /// `repo_root` is the working tree the coverage was measured in; the
    /// diff format shells out to git there and reads source files for
    /// snippets, the other formats never touch it.
    pub fn report(&mut self, data: &CoverageData, repo_root: &Path) -> Result<String> {
        if data.files.is_empty() {
            return Err(CovdriftError::NoData);
        }

        let mut total = Numbers {
            precision: self.options.precision,
            ..Numbers::default()
        };
        let mut skipped_count = 0usize;
        let mut empty_count = 0usize;
        let mut rows: Vec<ReportRow> = Vec::new();

        let want_source = self.options.format == OutputFormat::Diff && self.options.show_missing;
        for (name, file) in &data.files {
            let numbers = file_numbers(file, self.options.precision);
            total.add(&numbers);

            if self.options.skip_covered
                && numbers.n_missing == 0
                && numbers.n_partial_branches == 0
            {
                skipped_count += 1;
                continue;
            }
            if self.options.skip_empty && numbers.n_statements == 0 {
                empty_count += 1;
                continue;
            }

            let missing = if self.options.show_missing {
                file.missing_ranges.clone()
            } else {
                Vec::new()
            };
            let source = if want_source {
                read_source(&repo_root.join(name))
            } else {
                Vec::new()
            };
            rows.push(ReportRow {
                name: name.clone(),
                numbers,
                missing,
                source,
            });
        }

        let header = self.build_header(data);
        self.sort_rows(&mut rows, &header)?;

        let mut footer = Vec::new();
        if self.options.skip_covered && skipped_count > 0 {
            let suffix = if skipped_count > 1 { "s" } else { "" };
            footer.push(format!(
                "{skipped_count} file{suffix} skipped due to complete coverage."
            ));
        }
        if self.options.skip_empty && empty_count > 0 {
            let suffix = if empty_count > 1 { "s" } else { "" };
            footer.push(format!("{empty_count} empty file{suffix} skipped."));
        }

        match self.options.format {
            OutputFormat::Text => Ok(TextRenderer.render(&header, &rows, Some(&total), &footer)),
            OutputFormat::Markdown => {
                Ok(MarkdownRenderer.render(&header, &rows, Some(&total), &footer))
            }
            OutputFormat::Total => Ok(TotalRenderer.render(&header, &rows, Some(&total), &footer)),
            OutputFormat::Diff => {
                let mapper = DiffMapper::new(repo_root);
                let blocks = mapper.compute(&self.options.base_revision, &mut self.cache)?;
                let renderer = DiffRenderer::new(blocks, self.options.pr_number.clone());
                Ok(renderer.render(&header, &rows, Some(&total), &footer))
            }
        }
    }

    fn build_header(&self, data: &CoverageData) -> Vec<Column> {
        let mut header = vec![Column::Name, Column::Stmts, Column::Miss];
        if data.branches {
            header.push(Column::Branch);
            header.push(Column::BrPart);
        }
        if data.has_base_comparison() {
            header.push(Column::DeltaMiss);
        }
        header.push(Column::Cover);
        if self.options.show_missing {
            header.push(Column::Missing);
        }
        header
    }

    /// Sort rows by the configured column, optionally reversed with a `-`
    /// prefix. Only columns present in the header are valid sort keys.
    fn sort_rows(&self, rows: &mut [ReportRow], header: &[Column]) -> Result<()> {
        let option = self.options.sort.to_lowercase();
        let (reverse, key) = match option.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, option.strip_prefix('+').unwrap_or(&option)),
        };

        let column = match key {
            "name" => Column::Name,
            "stmts" => Column::Stmts,
            "miss" => Column::Miss,
            "branch" => Column::Branch,
            "brpart" => Column::BrPart,
            "cover" => Column::Cover,
            "diff" => Column::DeltaMiss,
            _ => {
                return Err(CovdriftError::Config(format!(
                    "Invalid sorting option: {:?}",
                    self.options.sort
                )))
            }
        };
        if !header.contains(&column) {
            return Err(CovdriftError::Config(format!(
                "Invalid sorting option: {:?}",
                self.options.sort
            )));
        }

        match column {
            Column::Name => rows.sort_by(|a, b| a.name.cmp(&b.name)),
            Column::Stmts => sort_with_tiebreak(rows, |r| r.numbers.n_statements as i64),
            Column::Miss => sort_with_tiebreak(rows, |r| r.numbers.n_missing as i64),
            Column::Branch => sort_with_tiebreak(rows, |r| r.numbers.n_branches as i64),
            Column::BrPart => sort_with_tiebreak(rows, |r| r.numbers.n_partial_branches as i64),
            Column::DeltaMiss => {
                sort_with_tiebreak(rows, |r| r.numbers.n_diff_missing.unwrap_or(0))
            }
            Column::Cover => rows.sort_by(|a, b| {
                a.numbers
                    .pc_covered()
                    .total_cmp(&b.numbers.pc_covered())
                    .then_with(|| a.name.cmp(&b.name))
            }),
            Column::Missing => unreachable!("never a sort key"),
        }
        if reverse {
            rows.reverse();
        }
        Ok(())
    }
}

fn sort_with_tiebreak(rows: &mut [ReportRow], key: impl Fn(&ReportRow) -> i64) {
    rows.sort_by(|a, b| key(a).cmp(&key(b)).then_with(|| a.name.cmp(&b.name)));
}

fn file_numbers(file: &FileCoverage, precision: usize) -> Numbers {
    Numbers {
        n_statements: file.statements,
        n_missing: file.missing,
        n_branches: file.branches,
        n_partial_branches: file.partial_branches,
        n_diff_missing: file.diff_missing,
        precision,
    }
}

/// A file's working-tree source for snippet extraction. Files that cannot
/// be read (deleted since measurement, generated paths) get no snippet body.
fn read_source(path: &Path) -> Vec<String> {
    match fs::read_to_string(path) {
        Ok(content) => content.lines().map(str::to_string).collect(),
        Err(_) => Vec::new(),
    }
}
