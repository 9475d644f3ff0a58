use super::file::{ChangeSummary, FileDiff};
use super::format_file_diff;

/// All file diffs of one commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diff {
    pub files: Vec<FileDiff>,
}

impl Diff {
    /// Group and classify every file.
    pub fn analyze(&mut self) {
        super::analyze_files(&mut self.files);
    }

    pub fn file(&self, path: &str) -> Option<&FileDiff> {
        self.files.iter().find(|file| file.path == path)
    }

    /// Keep only files whose path is in `paths`; an empty filter keeps all.
    pub fn retain_paths(&mut self, paths: &[String]) {
        if paths.is_empty() {
            return;
        }
        self.files.retain(|file| paths.contains(&file.path));
    }

    /// Totals across all files.
    pub fn summary(&self) -> ChangeSummary {
        let mut total = ChangeSummary::default();
        for file in &self.files {
            total += file.summary();
        }
        total
    }
}

impl std::fmt::Display for Diff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, file_diff) in self.files.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", format_file_diff(file_diff))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::{ChangeType, Hunk, Side};

    fn sample() -> Diff {
        let mut flake = FileDiff::new(0, "flake.nix");
        flake.hunks = vec![Hunk::new(136, 0, 137, 1)];
        flake.push_line(Side::Added, 137, "      debug = true;", "debug = true;");

        let mut gtk = FileDiff::new(1, "gtk.nix");
        gtk.hunks = vec![Hunk::new(10, 1, 10, 1)];
        gtk.push_line(Side::Removed, 10, "    size=24;", "size=24;");
        gtk.push_line(Side::Added, 10, "    size = 24;", "size = 24;");

        Diff {
            files: vec![flake, gtk],
        }
    }

    #[test]
    fn analyze_all_files() {
        let mut diff = sample();
        diff.analyze();

        assert_eq!(diff.files[0].hunk_groups.len(), 1);
        assert_eq!(diff.files[1].added[0].kind, ChangeType::Whitespace);
        assert_eq!(
            diff.summary(),
            ChangeSummary {
                removed: 1,
                added: 2,
                whitespace: 2,
                symbol: 0,
                churn: 0,
            }
        );
    }

    #[test]
    fn retain_selected_paths() {
        let mut diff = sample();
        diff.retain_paths(&["gtk.nix".to_string()]);
        assert_eq!(diff.files.len(), 1);
        assert!(diff.file("gtk.nix").is_some());
        assert!(diff.file("flake.nix").is_none());
    }

    #[test]
    fn retain_empty_filter_keeps_everything() {
        let mut diff = sample();
        diff.retain_paths(&[]);
        assert_eq!(diff.files.len(), 2);
    }

    #[test]
    fn render_multiple_files() {
        let mut diff = sample();
        diff.analyze();
        let rendered = diff.to_string();

        assert!(rendered.contains("flake.nix:\n"));
        assert!(rendered.contains("  +137:\tadded\t      debug = true;\n"));
        assert!(rendered.contains("\n\ngtk.nix:\n"));
        assert!(rendered.contains("  -10:\tws->+10\t    size=24;\n"));
    }
}
