use std::path::PathBuf;

/// Errors that can occur across covdrift.
///
/// Each variant wraps a specific error domain. Library crates use this type
/// directly; the binary crate converts to `miette` diagnostics at the boundary.
///
/// # Examples
///
/// ```
/// use covdrift_core::CovdriftError;
///
/// let err = CovdriftError::Config("unknown sort column".into());
/// assert!(err.to_string().contains("unknown sort column"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum CovdriftError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Git operation failure.
    #[error("git error: {0}")]
    Git(String),

    /// Diff stream parsing failure.
    #[error("parse error: {0}")]
    Parse(String),

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A required file was not found.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The coverage input contained nothing to report.
    #[error("no data to report")]
    NoData,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: CovdriftError = io_err.into();
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn config_error_displays_message() {
        let err = CovdriftError::Config("bad value".into());
        assert_eq!(err.to_string(), "configuration error: bad value");
    }

    #[test]
    fn file_not_found_shows_path() {
        let err = CovdriftError::FileNotFound(PathBuf::from("/tmp/missing.py"));
        assert!(err.to_string().contains("/tmp/missing.py"));
    }

    #[test]
    fn no_data_message() {
        assert_eq!(CovdriftError::NoData.to_string(), "no data to report");
    }
}
