use super::hunk::{GROUP_GAP_THRESHOLD, Hunk, HunkGroup};
use super::line::{ChangeType, DiffLine, LineRef, Side};
use log::{debug, trace};
use std::fmt;

/// All changes to a single file within one commit.
///
/// Produced by a [`Repo`](crate::Repo) with hunks and lines filled in, then
/// passed once through [`FileDiff::group_hunks`] and
/// [`FileDiff::classify_lines`]. Both mutate the diff in place and touch
/// disjoint fields.
///
/// Neither operation is idempotent: running [`FileDiff::group_hunks`] twice
/// appends a second copy of every group. Call [`FileDiff::reset`] first to
/// process the same diff again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    pub file_index: u32,
    pub path: String,
    /// Hunks in ascending position order.
    pub hunks: Vec<Hunk>,
    pub removed: Vec<DiffLine>,
    pub added: Vec<DiffLine>,
    pub hunk_groups: Vec<HunkGroup>,
    /// Position in `hunk_groups` of the group owning each hunk.
    pub hunk_groups_by_hunk_index: Vec<usize>,
}

impl FileDiff {
    pub fn new(file_index: u32, path: impl Into<String>) -> Self {
        Self {
            file_index,
            path: path.into(),
            hunks: Vec::new(),
            removed: Vec::new(),
            added: Vec::new(),
            hunk_groups: Vec::new(),
            hunk_groups_by_hunk_index: Vec::new(),
        }
    }

    /// Append a line to the removed or added set, assigning its line index.
    pub fn push_line(
        &mut self,
        side: Side,
        line_no: u32,
        content: impl Into<String>,
        normalized: impl Into<String>,
    ) -> &mut DiffLine {
        let file_index = self.file_index;
        let lines = match side {
            Side::Removed => &mut self.removed,
            Side::Added => &mut self.added,
        };
        let line_index = lines.len() as u32;
        lines.push(DiffLine::new(
            side, file_index, line_index, line_no, content, normalized,
        ));
        let last = lines.len() - 1;
        &mut lines[last]
    }

    pub fn lines(&self, side: Side) -> &[DiffLine] {
        match side {
            Side::Removed => &self.removed,
            Side::Added => &self.added,
        }
    }

    /// Partition the hunks into groups of neighbours.
    ///
    /// A hunk joins the current group when the new-side gap to the hunk
    /// directly before it is at most [`GROUP_GAP_THRESHOLD`] lines; otherwise
    /// it opens a new group. The gap is local, so a chain of close hunks
    /// forms one group however far its ends are apart. No-op without hunks.
    pub fn group_hunks(&mut self) {
        if self.hunks.is_empty() {
            return;
        }
        if self.hunk_groups_by_hunk_index.len() < self.hunks.len() {
            self.hunk_groups_by_hunk_index.resize(self.hunks.len(), 0);
        }

        self.hunk_groups.push(HunkGroup::starting_at(0));
        let mut current = self.hunk_groups.len() - 1;
        self.hunk_groups_by_hunk_index[0] = current;

        for j in 1..self.hunks.len() {
            let gap = self.hunks[j].gap_after(&self.hunks[j - 1]);
            if gap <= GROUP_GAP_THRESHOLD {
                self.hunk_groups[current].hunks.push(j);
            } else {
                self.hunk_groups.push(HunkGroup::starting_at(j));
                current = self.hunk_groups.len() - 1;
            }
            self.hunk_groups_by_hunk_index[j] = current;
        }

        debug!(
            "{}: {} hunks in {} groups",
            self.path,
            self.hunks.len(),
            self.hunk_groups.len()
        );
    }

    /// Pair removed and added lines that only differ by spaces.
    ///
    /// Every removed line is compared with every added line after stripping
    /// `' '` from both normalized texts. Lines tagged [`ChangeType::Symbol`]
    /// are skipped on both sides. A match links the two lines through
    /// `related` and retags both as [`ChangeType::Whitespace`].
    ///
    /// The scan neither stops at the first match nor skips added lines that
    /// are already paired, so when several lines normalize identically the
    /// last match overwrites earlier links. Pairing is unspecified for such
    /// duplicates.
    pub fn classify_lines(&mut self) {
        let file_index = self.file_index;
        let added_spaceless: Vec<String> = self.added.iter().map(DiffLine::spaceless).collect();
        let mut matches = 0usize;

        for i in 0..self.removed.len() {
            if self.removed[i].kind == ChangeType::Symbol {
                continue;
            }
            let removed_spaceless = self.removed[i].spaceless();

            for (j, candidate) in added_spaceless.iter().enumerate() {
                if self.added[j].kind == ChangeType::Symbol || *candidate != removed_spaceless {
                    continue;
                }
                trace!("{}: -{} matches +{}", self.path, i, j);

                let added = &mut self.added[j];
                added.related = Some(LineRef {
                    file_index,
                    line_index: i as u32,
                });
                added.kind = ChangeType::Whitespace;

                let removed = &mut self.removed[i];
                removed.related = Some(LineRef {
                    file_index,
                    line_index: j as u32,
                });
                removed.kind = ChangeType::Whitespace;

                matches += 1;
            }
        }

        debug!(
            "{}: {} whitespace matches across {} removed / {} added lines",
            self.path,
            matches,
            self.removed.len(),
            self.added.len()
        );
    }

    /// Group hunks and classify lines.
    pub fn analyze(&mut self) {
        self.group_hunks();
        self.classify_lines();
    }

    /// Restore the state the diff had before grouping and classification.
    ///
    /// Symbol tags come from upstream and are kept.
    pub fn reset(&mut self) {
        self.hunk_groups.clear();
        self.hunk_groups_by_hunk_index.clear();

        for (side, lines) in [
            (Side::Removed, &mut self.removed),
            (Side::Added, &mut self.added),
        ] {
            for line in lines.iter_mut() {
                if line.kind != ChangeType::Symbol {
                    line.kind = side.initial_type();
                }
                line.related = None;
            }
        }
    }

    /// Group owning the hunk at `hunk_index`.
    pub fn group_of(&self, hunk_index: usize) -> Option<&HunkGroup> {
        self.hunk_groups_by_hunk_index
            .get(hunk_index)
            .and_then(|&group| self.hunk_groups.get(group))
    }

    /// Hunks covered by `group`, in order.
    pub fn hunks_in<'a>(&'a self, group: &'a HunkGroup) -> impl Iterator<Item = &'a Hunk> + 'a {
        group.hunks.iter().filter_map(|&i| self.hunks.get(i))
    }

    /// Lines on `side` whose line number falls inside `hunk`.
    pub fn lines_in<'a>(
        &'a self,
        hunk: &Hunk,
        side: Side,
    ) -> impl Iterator<Item = &'a DiffLine> + 'a {
        let (start, len) = match side {
            Side::Removed => (hunk.old_line, hunk.del_lines),
            Side::Added => (hunk.new_line, hunk.add_lines),
        };
        let end = start.saturating_add(len);
        self.lines(side)
            .iter()
            .filter(move |line| line.line_no >= start && line.line_no < end)
    }

    /// Resolve the `related` link of the line at `line_index` on `side`.
    pub fn counterpart(&self, side: Side, line_index: usize) -> Option<&DiffLine> {
        let related = self.lines(side).get(line_index)?.related?;
        if related.file_index != self.file_index {
            return None;
        }
        self.lines(side.opposite())
            .get(related.line_index as usize)
    }

    /// Count lines by classification.
    pub fn summary(&self) -> ChangeSummary {
        let mut summary = ChangeSummary {
            removed: self.removed.len(),
            added: self.added.len(),
            ..ChangeSummary::default()
        };

        for line in self.removed.iter().chain(&self.added) {
            match line.kind {
                ChangeType::Whitespace => summary.whitespace += 1,
                ChangeType::Symbol => summary.symbol += 1,
                ChangeType::Removed => summary.churn += 1,
                ChangeType::Added => {}
            }
        }

        summary
    }
}

/// Line counts of a classified [`FileDiff`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeSummary {
    pub removed: usize,
    pub added: usize,
    /// Lines on either side tagged as whitespace-only.
    pub whitespace: usize,
    pub symbol: usize,
    /// Removed lines left unpaired.
    pub churn: usize,
}

impl std::ops::AddAssign for ChangeSummary {
    fn add_assign(&mut self, other: Self) {
        self.removed += other.removed;
        self.added += other.added;
        self.whitespace += other.whitespace;
        self.symbol += other.symbol;
        self.churn += other.churn;
    }
}

impl fmt::Display for ChangeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} removed, {} added ({} whitespace, {} symbol, {} churn)",
            self.removed, self.added, self.whitespace, self.symbol, self.churn
        )
    }
}


#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Ordered hunks: each starts some distance after the previous one ends.
    fn arb_hunks() -> impl Strategy<Value = Vec<Hunk>> {
        prop::collection::vec((0u32..30, 0u32..6, 0u32..6), 1..25).prop_map(|shapes| {
            let mut next = 1u32;
            shapes
                .into_iter()
                .map(|(distance, del_lines, add_lines)| {
                    let start = next + distance;
                    next = start + add_lines;
                    Hunk::new(start, del_lines, start, add_lines)
                })
                .collect()
        })
    }

    fn grouped(hunks: Vec<Hunk>) -> FileDiff {
        let mut file = FileDiff::new(0, "prop.rs");
        file.hunks = hunks;
        file.group_hunks();
        file
    }

    proptest! {
        /// Concatenating the groups yields every hunk position once, in order.
        #[test]
        fn groups_partition_hunks(hunks in arb_hunks()) {
            let file = grouped(hunks);
            let flattened: Vec<usize> = file
                .hunk_groups
                .iter()
                .flat_map(|g| g.hunks.iter().copied())
                .collect();
            let expected: Vec<usize> = (0..file.hunks.len()).collect();
            prop_assert_eq!(flattened, expected);
            prop_assert!(file.hunk_groups.iter().all(|g| !g.is_empty()));
        }

        /// The index maps every hunk to the group that contains it.
        #[test]
        fn index_points_at_owning_group(hunks in arb_hunks()) {
            let file = grouped(hunks);
            prop_assert_eq!(file.hunk_groups_by_hunk_index.len(), file.hunks.len());
            for i in 0..file.hunks.len() {
                prop_assert!(file.group_of(i).unwrap().contains(i));
            }
        }

        /// Group boundaries sit exactly where the local gap exceeds the threshold.
        #[test]
        fn boundaries_follow_gap(hunks in arb_hunks()) {
            let file = grouped(hunks);
            for j in 1..file.hunks.len() {
                let same = file.hunk_groups_by_hunk_index[j] == file.hunk_groups_by_hunk_index[j - 1];
                let close = file.hunks[j].gap_after(&file.hunks[j - 1]) <= GROUP_GAP_THRESHOLD;
                prop_assert_eq!(same, close);
            }
        }
    }
}
