use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CovdriftError;
use crate::types::OutputFormat;

/// Top-level configuration loaded from `.covdrift.toml`.
///
/// CLI flags override values loaded here; defaults apply for anything
/// omitted.
///
/// # Examples
///
/// ```
/// use covdrift_core::CovdriftConfig;
///
/// let config = CovdriftConfig::default();
/// assert_eq!(config.report.base_revision, "main");
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CovdriftConfig {
    /// Report behavior settings.
    #[serde(default)]
    pub report: ReportConfig,
}

impl CovdriftConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`CovdriftError::Io`] if the file cannot be read, or
    /// [`CovdriftError::Toml`] if the content is not valid TOML.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use covdrift_core::CovdriftConfig;
    /// use std::path::Path;
    ///
    /// let config = CovdriftConfig::from_file(Path::new(".covdrift.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, CovdriftError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`CovdriftError::Toml`] if parsing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use covdrift_core::CovdriftConfig;
    ///
    /// let toml = r#"
    /// [report]
    /// base_revision = "origin/develop"
    /// "#;
    /// let config = CovdriftConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.report.base_revision, "origin/develop");
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, CovdriftError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }
}

/// Report behavior configuration.
///
/// # Examples
///
/// ```
/// use covdrift_core::ReportConfig;
///
/// let config = ReportConfig::default();
/// assert_eq!(config.sort, "name");
/// assert!(!config.show_missing);
/// assert_eq!(config.precision, 0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Output format (default: text).
    #[serde(default)]
    pub format: OutputFormat,
    /// Base revision the working tree is diffed against (default: "main").
    #[serde(default = "default_base_revision")]
    pub base_revision: String,
    /// Show the per-file Missing column / snippets (default: false).
    #[serde(default)]
    pub show_missing: bool,
    /// Omit files with full coverage from the table (default: false).
    #[serde(default)]
    pub skip_covered: bool,
    /// Omit files with no statements from the table (default: false).
    #[serde(default)]
    pub skip_empty: bool,
    /// Sort column, optionally prefixed with `+` or `-` (default: "name").
    #[serde(default = "default_sort")]
    pub sort: String,
    /// Decimal places for coverage percentages (default: 0).
    #[serde(default)]
    pub precision: usize,
}

fn default_base_revision() -> String {
    "main".into()
}

fn default_sort() -> String {
    "name".into()
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            base_revision: default_base_revision(),
            show_missing: false,
            skip_covered: false,
            skip_empty: false,
            sort: default_sort(),
            precision: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = CovdriftConfig::default();
        assert_eq!(config.report.format, OutputFormat::Text);
        assert_eq!(config.report.base_revision, "main");
        assert!(!config.report.show_missing);
        assert!(!config.report.skip_covered);
        assert!(!config.report.skip_empty);
        assert_eq!(config.report.sort, "name");
        assert_eq!(config.report.precision, 0);
    }

    #[test]
    fn parse_minimal_toml() {
        let toml = r#"
[report]
format = "diff"
base_revision = "origin/main"
"#;
        let config = CovdriftConfig::from_toml(toml).unwrap();
        assert_eq!(config.report.format, OutputFormat::Diff);
        assert_eq!(config.report.base_revision, "origin/main");
        assert_eq!(config.report.sort, "name");
    }

    #[test]
    fn parse_full_toml() {
        let toml = r#"
[report]
format = "markdown"
base_revision = "develop"
show_missing = true
skip_covered = true
skip_empty = true
sort = "-miss"
precision = 2
"#;
        let config = CovdriftConfig::from_toml(toml).unwrap();
        assert_eq!(config.report.format, OutputFormat::Markdown);
        assert!(config.report.show_missing);
        assert!(config.report.skip_covered);
        assert!(config.report.skip_empty);
        assert_eq!(config.report.sort, "-miss");
        assert_eq!(config.report.precision, 2);
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let config = CovdriftConfig::from_toml("").unwrap();
        assert_eq!(config.report.base_revision, "main");
    }

    #[test]
    fn invalid_toml_returns_error() {
        let result = CovdriftConfig::from_toml("{{invalid}}");
        assert!(result.is_err());
    }
}
