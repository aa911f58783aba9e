use covdrift_core::{CovdriftError, Hunk};

/// The hunks of one file section in a zero-context unified diff.
///
/// # Examples
///
/// ```
/// use covdrift_diffmap::parser::parse_file_hunks;
///
/// let diff = "diff --git a/hello.py b/hello.py\n\
///             --- a/hello.py\n\
///             +++ b/hello.py\n\
///             @@ -4,3 +4,5 @@\n\
///             -old\n\
///             +new\n";
/// let files = parse_file_hunks(diff).unwrap();
/// assert_eq!(files.len(), 1);
/// assert_eq!(files[0].hunks.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct FileHunks {
    /// Path of the file in the current working tree (the `b/` side).
    pub path: String,
    /// Parsed hunks in stream order.
    pub hunks: Vec<Hunk>,
}

/// Parse a zero-context unified diff (as produced by `git diff --unified=0`)
/// into per-file hunk lists.
///
/// Only positions matter for block reconstruction, so added and removed
/// content lines are skipped without inspection. The diff is assumed to come
/// from a trusted tool; a malformed hunk header is a fatal error, not
/// something to recover from.
///
/// # Errors
///
/// Returns [`CovdriftError::Parse`] if a hunk header cannot be parsed.
///
/// # Examples
///
/// ```
/// use covdrift_diffmap::parser::parse_file_hunks;
///
/// let files = parse_file_hunks("").unwrap();
/// assert!(files.is_empty());
/// ```
pub fn parse_file_hunks(input: &str) -> Result<Vec<FileHunks>, CovdriftError> {
    let mut files: Vec<FileHunks> = Vec::new();
    let mut current: Option<FileHunks> = None;

    for line in input.lines() {
        if let Some(rest) = line.strip_prefix("diff --git ") {
            if let Some(file) = current.take() {
                files.push(file);
            }
            current = Some(FileHunks {
                path: parse_git_header_path(rest),
                hunks: Vec::new(),
            });
            continue;
        }

        if line.starts_with("@@") {
            let Some(file) = current.as_mut() else {
                return Err(CovdriftError::Parse(format!(
                    "hunk header outside a file section: {line}"
                )));
            };
            file.hunks.push(parse_hunk_header(line)?);
        }
        // Everything else — content lines, index/mode lines, ---/+++ —
        // carries no positional information beyond the headers above.
    }

    if let Some(file) = current.take() {
        files.push(file);
    }

    Ok(files)
}

/// Extract the current-side path from the remainder of a `diff --git` line
/// (`a/<path> b/<path>`).
fn parse_git_header_path(rest: &str) -> String {
    let raw = rest.rsplit(' ').next().unwrap_or(rest).trim_matches('"');
    raw.strip_prefix("b/").unwrap_or(raw).to_string()
}

/// Parse a hunk range token (`start` or `start,size`) into a zero-based
/// offset and a size.
///
/// The literal `0,0` encodes a width-1 anchor before the nominal start.
/// For any other token the offset is `start - 1` when real content exists
/// (`size > 0`); a zero size leaves the start undecremented, since the
/// anchor point sits *between* lines `start - 1` and `start`.
///
/// # Errors
///
/// Returns [`CovdriftError::Parse`] for non-numeric tokens.
///
/// # Examples
///
/// ```
/// use covdrift_diffmap::parser::parse_range_info;
///
/// assert_eq!(parse_range_info("0,0").unwrap(), (0, 1));
/// assert_eq!(parse_range_info("5,3").unwrap(), (4, 3));
/// assert_eq!(parse_range_info("7").unwrap(), (6, 1));
/// assert_eq!(parse_range_info("2,0").unwrap(), (2, 0));
/// ```
pub fn parse_range_info(token: &str) -> Result<(usize, usize), CovdriftError> {
    if token == "0,0" {
        return Ok((0, 1));
    }
    if let Some((start, size)) = token.split_once(',') {
        let start: usize = start
            .parse()
            .map_err(|_| CovdriftError::Parse(format!("invalid range start in: {token}")))?;
        let size: usize = size
            .parse()
            .map_err(|_| CovdriftError::Parse(format!("invalid range size in: {token}")))?;
        if size > 0 {
            let start = start
                .checked_sub(1)
                .ok_or_else(|| CovdriftError::Parse(format!("invalid range start in: {token}")))?;
            Ok((start, size))
        } else {
            Ok((start, 0))
        }
    } else {
        let start: usize = token
            .parse()
            .map_err(|_| CovdriftError::Parse(format!("invalid range start in: {token}")))?;
        let start = start
            .checked_sub(1)
            .ok_or_else(|| CovdriftError::Parse(format!("invalid range start in: {token}")))?;
        Ok((start, 1))
    }
}

fn parse_hunk_header(line: &str) -> Result<Hunk, CovdriftError> {
    let inner = line
        .strip_prefix("@@ ")
        .and_then(|s| {
            let end = s.find(" @@")?;
            Some(&s[..end])
        })
        .ok_or_else(|| CovdriftError::Parse(format!("invalid hunk header: {line}")))?;

    let mut parts = inner.split(' ');
    let base = parts
        .next()
        .and_then(|p| p.strip_prefix('-'))
        .ok_or_else(|| CovdriftError::Parse(format!("invalid base range in hunk: {line}")))?;
    let curr = parts
        .next()
        .and_then(|p| p.strip_prefix('+'))
        .ok_or_else(|| CovdriftError::Parse(format!("invalid current range in hunk: {line}")))?;
    if parts.next().is_some() {
        return Err(CovdriftError::Parse(format!("invalid hunk header: {line}")));
    }

    let (base_start, base_size) = parse_range_info(base)?;
    let (curr_start, curr_size) = parse_range_info(curr)?;

    Ok(Hunk {
        base_start,
        base_size,
        curr_start,
        curr_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_diff_returns_empty_vec() {
        let files = parse_file_hunks("").unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn range_info_zero_zero_is_width_one_anchor() {
        assert_eq!(parse_range_info("0,0").unwrap(), (0, 1));
    }

    #[test]
    fn range_info_converts_to_zero_based() {
        assert_eq!(parse_range_info("5,3").unwrap(), (4, 3));
        assert_eq!(parse_range_info("1,1").unwrap(), (0, 1));
    }

    #[test]
    fn range_info_bare_start_defaults_to_size_one() {
        assert_eq!(parse_range_info("7").unwrap(), (6, 1));
    }

    #[test]
    fn range_info_zero_size_keeps_anchor_undecremented() {
        // "@@ -2,0 +3,59 @@": the base anchor sits between lines 2 and 3.
        assert_eq!(parse_range_info("2,0").unwrap(), (2, 0));
    }

    #[test]
    fn range_info_rejects_garbage() {
        assert!(parse_range_info("x,3").is_err());
        assert!(parse_range_info("5,y").is_err());
        assert!(parse_range_info("nope").is_err());
    }

    #[test]
    fn single_file_single_hunk() {
        let diff = "\
diff --git a/src/app.py b/src/app.py
index abc1234..def5678 100644
--- a/src/app.py
+++ b/src/app.py
@@ -4,3 +4,5 @@
-old one
-old two
-old three
+new one
+new two
+new three
+new four
+new five
";
        let files = parse_file_hunks(diff).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "src/app.py");
        assert_eq!(
            files[0].hunks,
            vec![Hunk {
                base_start: 3,
                base_size: 3,
                curr_start: 3,
                curr_size: 5,
            }]
        );
    }

    #[test]
    fn multiple_files_and_hunks() {
        let diff = "\
diff --git a/a.py b/a.py
--- a/a.py
+++ b/a.py
@@ -2,0 +3,2 @@
+x
+y
@@ -85 +87 @@ def main():
-old
+new
diff --git a/b.py b/b.py
--- a/b.py
+++ b/b.py
@@ -1 +1,2 @@
-one
+one
+two
";
        let files = parse_file_hunks(diff).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].path, "a.py");
        assert_eq!(files[0].hunks.len(), 2);
        assert_eq!(files[0].hunks[0].base_start, 2);
        assert_eq!(files[0].hunks[0].base_size, 0);
        assert_eq!(files[0].hunks[1].base_start, 84);
        assert_eq!(files[1].path, "b.py");
        assert_eq!(files[1].hunks.len(), 1);
    }

    #[test]
    fn hunk_header_with_section_heading_parses() {
        let diff = "\
diff --git a/m.py b/m.py
@@ -85 +85 @@ In EDS-NLP, everything is a module
";
        let files = parse_file_hunks(diff).unwrap();
        assert_eq!(
            files[0].hunks,
            vec![Hunk {
                base_start: 84,
                base_size: 1,
                curr_start: 84,
                curr_size: 1,
            }]
        );
    }

    #[test]
    fn new_file_hunk_anchors_at_zero() {
        let diff = "\
diff --git a/new.py b/new.py
new file mode 100644
--- /dev/null
+++ b/new.py
@@ -0,0 +1,3 @@
+a
+b
+c
";
        let files = parse_file_hunks(diff).unwrap();
        assert_eq!(
            files[0].hunks,
            vec![Hunk {
                base_start: 0,
                base_size: 1,
                curr_start: 0,
                curr_size: 3,
            }]
        );
    }

    #[test]
    fn quoted_paths_are_unwrapped() {
        let diff = "diff --git \"a/my file.py\" \"b/my file.py\"\n@@ -1 +1 @@\n-x\n+y\n";
        let files = parse_file_hunks(diff).unwrap();
        // rsplit on space keeps only the final token of a quoted path; the
        // diff stream is still consumed without error.
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].hunks.len(), 1);
    }

    #[test]
    fn malformed_hunk_header_is_fatal() {
        let diff = "diff --git a/f.py b/f.py\n@@ broken @@\n";
        assert!(parse_file_hunks(diff).is_err());
    }

    #[test]
    fn hunk_before_any_file_is_fatal() {
        assert!(parse_file_hunks("@@ -1 +1 @@\n").is_err());
    }
}
