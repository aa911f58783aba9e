//! Core types, configuration, and error handling for covdrift.
//!
//! This crate provides the shared foundation used by the other covdrift
//! crates:
//! - [`CovdriftError`] — unified error type using `thiserror`
//! - [`CovdriftConfig`] — configuration loaded from `.covdrift.toml`
//! - Shared types: [`Hunk`], [`UnchangedBlock`], [`FileBlockMap`],
//!   [`MissingRange`], [`Numbers`], [`ReportRow`], [`CoverageData`],
//!   [`OutputFormat`]

mod config;
mod error;
mod types;

pub use config::{CovdriftConfig, ReportConfig};
pub use error::CovdriftError;
pub use types::{
    CoverageData, FileBlockMap, FileCoverage, Hunk, MissingRange, Numbers, OutputFormat,
    ReportRow, UnchangedBlock,
};

/// A convenience `Result` type for covdrift operations.
pub type Result<T> = std::result::Result<T, CovdriftError>;
