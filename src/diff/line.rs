use std::fmt;

/// Classification of a changed line.
///
/// Lines start as [`ChangeType::Removed`] or [`ChangeType::Added`] depending
/// on which side of the diff they come from. Classification may overwrite
/// that tag; any new kind must be added here and handled by
/// [`FileDiff::classify_lines`](super::FileDiff::classify_lines).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeType {
    /// Removed and not paired with anything: churn.
    Removed,
    /// Added and not paired with anything.
    Added,
    /// Same content as its related line once spaces are stripped.
    Whitespace,
    /// Assigned upstream by symbol-aware tooling. Never reclassified.
    Symbol,
}

impl ChangeType {
    /// Tag used in reports.
    pub fn label(self) -> &'static str {
        match self {
            ChangeType::Removed => "churn",
            ChangeType::Added => "added",
            ChangeType::Whitespace => "ws",
            ChangeType::Symbol => "symbol",
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which set of a [`FileDiff`](super::FileDiff) a line lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Removed,
    Added,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Removed => Side::Added,
            Side::Added => Side::Removed,
        }
    }

    /// Type a line on this side carries before classification.
    pub fn initial_type(self) -> ChangeType {
        match self {
            Side::Removed => ChangeType::Removed,
            Side::Added => ChangeType::Added,
        }
    }

    pub fn marker(self) -> char {
        match self {
            Side::Removed => '-',
            Side::Added => '+',
        }
    }
}

/// Lookup key for a line on the opposite side of the same file.
///
/// Resolved through [`FileDiff::counterpart`](super::FileDiff::counterpart);
/// it does not borrow or own the line it names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineRef {
    pub file_index: u32,
    pub line_index: u32,
}

/// One changed line of a file diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub file_index: u32,
    /// Position within the removed or added set of the owning file.
    pub line_index: u32,
    /// Line number on this line's side of the diff.
    pub line_no: u32,
    pub content: String,
    /// Whitespace-insensitive comparable form of `content`.
    pub normalized: String,
    pub kind: ChangeType,
    pub related: Option<LineRef>,
}

impl DiffLine {
    pub fn new(
        side: Side,
        file_index: u32,
        line_index: u32,
        line_no: u32,
        content: impl Into<String>,
        normalized: impl Into<String>,
    ) -> Self {
        Self {
            file_index,
            line_index,
            line_no,
            content: content.into(),
            normalized: normalized.into(),
            kind: side.initial_type(),
            related: None,
        }
    }

    /// Normalized text with every space removed, as compared by the classifier.
    pub fn spaceless(&self) -> String {
        self.normalized.replace(' ', "")
    }
}
