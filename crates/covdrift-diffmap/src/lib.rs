//! Unchanged-block mapping between a base revision and the working tree.
//!
//! Parses the zero-context diff produced by `git diff --unified=0` and
//! reconstructs, per changed file, the ordered line ranges that are
//! byte-identical in both revisions. The report layer uses the resulting
//! [`covdrift_core::FileBlockMap`] to decide which files participate in
//! pull-request deep links.

pub mod blocks;
pub mod git;
pub mod mapper;
pub mod parser;

pub use mapper::{BlockCache, DiffMapper};
