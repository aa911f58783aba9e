//! Blocking calls to the `git` tool and the working tree.
//!
//! One-shot invocations with no timeout or retry: the whole-diff listing is
//! fatal on failure, while per-file lookups degrade to "absent".

use std::path::Path;
use std::process::Command;

use covdrift_core::CovdriftError;

/// Run `git diff --unified=0 <base>` against the working tree and return the
/// raw diff text.
///
/// # Errors
///
/// Returns [`CovdriftError::Git`] when the diff cannot be produced at all —
/// an invalid base revision or a directory that is not a repository. There
/// is no partial or degraded result.
pub fn diff_working_tree(repo_root: &Path, base_revision: &str) -> Result<String, CovdriftError> {
    let output = Command::new("git")
        .args(["-C", &repo_root.to_string_lossy(), "diff", "--unified=0"])
        .arg(base_revision)
        .output()
        .map_err(|e| CovdriftError::Git(format!("failed to run git diff: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CovdriftError::Git(format!(
            "git diff --unified=0 {base_revision} failed: {}",
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Fetch the full content of `path` as it existed at `revision`, or `None`
/// if the file is absent there (e.g. newly added in the working tree).
///
/// # Errors
///
/// Returns [`CovdriftError::Git`] only when the `git` binary itself cannot
/// be spawned; a failing `git show` is the "not found" signal.
pub fn show_at_revision(
    repo_root: &Path,
    revision: &str,
    path: &str,
) -> Result<Option<String>, CovdriftError> {
    let output = Command::new("git")
        .args(["-C", &repo_root.to_string_lossy(), "show"])
        .arg(format!("{revision}:{path}"))
        .output()
        .map_err(|e| CovdriftError::Git(format!("failed to run git show: {e}")))?;

    if !output.status.success() {
        return Ok(None);
    }

    Ok(Some(String::from_utf8_lossy(&output.stdout).to_string()))
}

/// Number of lines of `path` in the working tree, or `None` when the file
/// is missing — a deletion, not an error.
pub fn current_line_count(repo_root: &Path, path: &str) -> Option<usize> {
    std::fs::read_to_string(repo_root.join(path))
        .ok()
        .map(|content| content.lines().count())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_working_tree_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(current_line_count(dir.path(), "nope.py"), None);
    }

    #[test]
    fn line_count_splits_like_the_diff() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("f.py"), "a\nb\nc\n").unwrap();
        assert_eq!(current_line_count(dir.path(), "f.py"), Some(3));
        // No trailing newline still counts the last line.
        std::fs::write(dir.path().join("g.py"), "a\nb").unwrap();
        assert_eq!(current_line_count(dir.path(), "g.py"), Some(2));
    }

    #[test]
    fn diff_outside_a_repository_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = diff_working_tree(dir.path(), "main").unwrap_err();
        assert!(err.to_string().contains("git"));
    }
}
