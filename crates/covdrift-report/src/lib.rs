//! Report rendering for covdrift.
//!
//! [`SummaryReporter`] is the entry point: it takes loaded coverage data and
//! produces one of four output formats. `text` and `markdown` are plain
//! tables, `total` is the bare percentage, and `diff` is the bounded
//! HTML-ish document meant for pull-request comments, which pulls in the
//! unchanged-block mapping from `covdrift-diffmap` to link missing ranges to
//! the pull request's diff view.

pub mod diff;
pub mod markdown;
pub mod render;
pub mod summary;
pub mod text;

pub use diff::DiffRenderer;
pub use markdown::MarkdownRenderer;
pub use render::{format_range, Column, Renderer, TotalRenderer};
pub use summary::{ReportOptions, SummaryReporter};
pub use text::TextRenderer;
