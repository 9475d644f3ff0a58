use std::fmt;

/// Hunks whose new-side gap to the preceding hunk is at most this many lines
/// are presented in the same group.
pub const GROUP_GAP_THRESHOLD: i64 = 10;

/// A contiguous region of change within one file's diff.
///
/// `old_line`/`del_lines` describe the old side, `new_line`/`add_lines` the
/// new side, using the same numbering as a unified diff header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hunk {
    pub old_line: u32,
    pub del_lines: u32,
    pub new_line: u32,
    pub add_lines: u32,
}

impl Hunk {
    pub fn new(old_line: u32, del_lines: u32, new_line: u32, add_lines: u32) -> Self {
        Self {
            old_line,
            del_lines,
            new_line,
            add_lines,
        }
    }

    /// First new-side line after this hunk's additions.
    pub fn new_end(&self) -> i64 {
        i64::from(self.new_line) + i64::from(self.add_lines)
    }

    /// Lines between the end of `prev` and the start of `self` on the new side.
    ///
    /// Signed so overlapping or touching hunks yield zero or a negative gap.
    pub fn gap_after(&self, prev: &Hunk) -> i64 {
        i64::from(self.new_line) - prev.new_end()
    }
}

impl fmt::Display for Hunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let old_part = match self.del_lines {
            0 => format!("-{},0", self.old_line),
            1 => format!("-{}", self.old_line),
            n => format!("-{},{}", self.old_line, n),
        };

        let new_part = match self.add_lines {
            0 => format!("+{},0", self.new_line),
            1 => format!("+{}", self.new_line),
            n => format!("+{},{}", self.new_line, n),
        };

        write!(f, "@@ {} {} @@", old_part, new_part)
    }
}

/// An ordered, non-empty run of hunks close enough to present together.
///
/// Holds positions into [`FileDiff::hunks`](super::FileDiff::hunks) rather
/// than copies, so a group can be mapped back to the hunks it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HunkGroup {
    pub hunks: Vec<usize>,
}

impl HunkGroup {
    pub(crate) fn starting_at(hunk_index: usize) -> Self {
        Self {
            hunks: vec![hunk_index],
        }
    }

    /// Position of the first hunk in the group.
    pub fn first(&self) -> usize {
        self.hunks[0]
    }

    pub fn len(&self) -> usize {
        self.hunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hunks.is_empty()
    }

    pub fn contains(&self, hunk_index: usize) -> bool {
        self.hunks.contains(&hunk_index)
    }
}
