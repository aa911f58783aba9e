use covdrift_core::{Hunk, UnchangedBlock};

/// Reconstruct the unchanged blocks of one file from its ordered hunks.
///
/// Walks aligned base/current cursors from 0. Each hunk contributes the gap
/// before it as a block, then advances both cursors past the changed region.
/// The remainder of the file after the last hunk becomes one trailing block
/// whose length is derived from the current file's total line count;
/// `curr_line_count == None` (deleted or unreadable file) yields a
/// zero-length trailing block rather than an error.
///
/// The result tiles both revisions exactly: block lengths plus the hunks'
/// sizes sum to the full line range on each side, with no gaps or overlaps.
///
/// # Examples
///
/// ```
/// use covdrift_core::Hunk;
/// use covdrift_diffmap::blocks::reconstruct_blocks;
///
/// // Base has 10 lines; lines 4-6 were replaced by 5 new lines.
/// let hunks = [Hunk { base_start: 3, base_size: 3, curr_start: 3, curr_size: 5 }];
/// let blocks = reconstruct_blocks(&hunks, Some(12));
/// assert_eq!(blocks.len(), 2);
/// assert_eq!((blocks[0].base_offset, blocks[0].curr_offset, blocks[0].length), (0, 0, 3));
/// assert_eq!((blocks[1].base_offset, blocks[1].curr_offset, blocks[1].length), (6, 8, 4));
/// ```
pub fn reconstruct_blocks(hunks: &[Hunk], curr_line_count: Option<usize>) -> Vec<UnchangedBlock> {
    let mut blocks = Vec::with_capacity(hunks.len() + 1);
    let mut base_offset = 0usize;
    let mut curr_offset = 0usize;

    for hunk in hunks {
        let length = hunk.base_start.saturating_sub(base_offset);
        if length > 0 {
            blocks.push(UnchangedBlock {
                base_offset,
                curr_offset,
                length,
            });
        }
        base_offset = hunk.base_start + hunk.base_size;
        curr_offset = hunk.curr_start + hunk.curr_size;
    }

    let trailing = curr_line_count
        .map(|total| total.saturating_sub(curr_offset))
        .unwrap_or(0);
    blocks.push(UnchangedBlock {
        base_offset,
        curr_offset,
        length: trailing,
    });

    blocks
}
