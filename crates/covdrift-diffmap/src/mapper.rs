use std::collections::HashMap;
use std::path::PathBuf;

use covdrift_core::{FileBlockMap, Result};

use crate::blocks::reconstruct_blocks;
use crate::git;
use crate::parser::parse_file_hunks;

/// Memoized unchanged-block maps keyed by base revision.
///
/// Owned by the orchestrator and passed into [`DiffMapper::compute`] by
/// mutable reference. Entries are never invalidated: a second compute for
/// the same base revision reuses the cached map even if the working tree
/// changed in between. That staleness is a documented trade-off — the cache
/// lives for one report invocation at most in practice, where the tree does
/// not move.
///
/// # Examples
///
/// ```
/// use covdrift_diffmap::BlockCache;
///
/// let cache = BlockCache::new();
/// assert!(cache.get("main").is_none());
/// ```
#[derive(Debug, Default)]
pub struct BlockCache {
    entries: HashMap<String, FileBlockMap>,
}

impl BlockCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a previously computed map for `base_revision`.
    pub fn get(&self, base_revision: &str) -> Option<&FileBlockMap> {
        self.entries.get(base_revision)
    }
}

/// Maps changed files to their unchanged line blocks between a base
/// revision and the current working tree.
///
/// Invokes `git diff --unified=0` once per base revision (memoized through
/// the caller's [`BlockCache`]), parses the hunk headers, and reconstructs
/// per-file aligned blocks. Given the same diff output, reconstruction is a
/// pure function.
///
/// # Examples
///
/// ```no_run
/// use covdrift_diffmap::{BlockCache, DiffMapper};
///
/// let mapper = DiffMapper::new(".");
/// let mut cache = BlockCache::new();
/// let blocks = mapper.compute("main", &mut cache).unwrap();
/// for (file, blocks) in blocks {
///     println!("{file}: {} unchanged blocks", blocks.len());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct DiffMapper {
    repo_root: PathBuf,
}

impl DiffMapper {
    /// Create a mapper rooted at a repository working tree.
    pub fn new(repo_root: impl Into<PathBuf>) -> Self {
        Self {
            repo_root: repo_root.into(),
        }
    }

    /// The working tree this mapper diffs against.
    pub fn repo_root(&self) -> &std::path::Path {
        &self.repo_root
    }

    /// Compute (or fetch from `cache`) the per-file unchanged-block map for
    /// `base_revision`.
    ///
    /// Files deleted from the working tree contribute a degenerate
    /// zero-length trailing block; files absent from the base behave as if
    /// the base were empty. Only the overall diff invocation is fatal.
    ///
    /// # Errors
    ///
    /// Returns [`covdrift_core::CovdriftError::Git`] when the diff cannot
    /// run (bad revision, not a repository) and
    /// [`covdrift_core::CovdriftError::Parse`] on a malformed hunk header.
    pub fn compute<'c>(
        &self,
        base_revision: &str,
        cache: &'c mut BlockCache,
    ) -> Result<&'c FileBlockMap> {
        if !cache.entries.contains_key(base_revision) {
            let map = self.compute_uncached(base_revision)?;
            cache.entries.insert(base_revision.to_string(), map);
        }
        Ok(&cache.entries[base_revision])
    }

    fn compute_uncached(&self, base_revision: &str) -> Result<FileBlockMap> {
        let diff_text = git::diff_working_tree(&self.repo_root, base_revision)?;
        let files = parse_file_hunks(&diff_text)?;

        let mut map = FileBlockMap::new();
        for file in files {
            let curr_lines = git::current_line_count(&self.repo_root, &file.path);
            let blocks = reconstruct_blocks(&file.hunks, curr_lines);
            map.insert(file.path, blocks);
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_starts_empty() {
        let cache = BlockCache::new();
        assert!(cache.get("main").is_none());
    }

    #[test]
    fn compute_fails_outside_a_repository() {
        let dir = tempfile::tempdir().unwrap();
        let mapper = DiffMapper::new(dir.path());
        let mut cache = BlockCache::new();
        assert!(mapper.compute("main", &mut cache).is_err());
        // A failed compute must not poison the cache.
        assert!(cache.get("main").is_none());
    }
}
