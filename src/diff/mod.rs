pub mod file;
pub mod full;
pub mod hunk;
pub mod line;

pub use file::{ChangeSummary, FileDiff};
pub use full::Diff;
pub use hunk::{GROUP_GAP_THRESHOLD, Hunk, HunkGroup};
pub use line::{ChangeType, DiffLine, LineRef, Side};

use rayon::prelude::*;

/// Group and classify every file, one rayon task per file.
///
/// Files share no state, so the order in which they finish does not matter.
pub fn analyze_files(files: &mut [FileDiff]) {
    files.par_iter_mut().for_each(FileDiff::analyze);
}

/// Format an analyzed file diff for display.
///
/// Hunk groups are separated by a blank line. Each changed line is printed
/// with its line number and classification; whitespace-only lines name the
/// line they were paired with.
///
/// Example output:
/// ```text
/// src/call.rs:
///   @@ -4 +4 @@
///   -4:	ws->+4	foo(a, b)
///   +4:	ws->-4	foo(a,b)
///   1 removed, 1 added (2 whitespace, 0 symbol, 0 churn)
/// ```
pub fn format_file_diff(file: &FileDiff) -> String {
    let mut result = format_file_groups(file, &file.hunk_groups);
    result.push_str(&format!("  {}\n", file.summary()));
    result
}

/// Format only `groups` of an analyzed file diff, without the summary line.
pub fn format_file_groups<'a>(
    file: &'a FileDiff,
    groups: impl IntoIterator<Item = &'a HunkGroup>,
) -> String {
    let mut result = String::new();
    result.push_str(&file.path);
    result.push_str(":\n");

    for (i, group) in groups.into_iter().enumerate() {
        if i > 0 {
            result.push('\n');
        }

        for hunk in file.hunks_in(group) {
            result.push_str(&format!("  {}\n", hunk));

            for side in [Side::Removed, Side::Added] {
                for line in file.lines_in(hunk, side) {
                    result.push_str(&format!(
                        "  {}{}:\t{}\t{}\n",
                        side.marker(),
                        line.line_no,
                        line_tag(file, side, line),
                        line.content
                    ));
                }
            }
        }
    }

    result
}

fn line_tag(file: &FileDiff, side: Side, line: &DiffLine) -> String {
    if line.kind != ChangeType::Whitespace {
        return line.kind.label().to_string();
    }
    match file.counterpart(side, line.line_index as usize) {
        Some(other) => format!("ws->{}{}", side.opposite().marker(), other.line_no),
        None => line.kind.label().to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    fn reformatted_call() -> FileDiff {
        let mut file = FileDiff::new(0, "src/call.rs");
        file.hunks = vec![Hunk::new(4, 1, 4, 1), Hunk::new(9, 0, 10, 1), Hunk::new(40, 1, 40, 1)];
        file.push_line(Side::Removed, 4, "foo(a, b)", "foo(a, b)");
        file.push_line(Side::Added, 4, "foo(a,b)", "foo(a,b)");
        file.push_line(Side::Added, 10, "bar();", "bar();");
        file.push_line(Side::Removed, 40, "let x = 1;", "let x = 1;");
        file.push_line(Side::Added, 40, "let x = 2;", "let x = 2;");
        file
    }

    #[test]
    fn format_analyzed_file() {
        let mut file = reformatted_call();
        file.analyze();

        assert_eq!(
            format_file_diff(&file),
            "src/call.rs:\n\
             \x20 @@ -4 +4 @@\n\
             \x20 -4:\tws->+4\tfoo(a, b)\n\
             \x20 +4:\tws->-4\tfoo(a,b)\n\
             \x20 @@ -9,0 +10 @@\n\
             \x20 +10:\tadded\tbar();\n\
             \n\
             \x20 @@ -40 +40 @@\n\
             \x20 -40:\tchurn\tlet x = 1;\n\
             \x20 +40:\tadded\tlet x = 2;\n\
             \x20 2 removed, 3 added (2 whitespace, 0 symbol, 1 churn)\n"
        );
    }

    #[test]
    fn format_selected_group_only() {
        let mut file = reformatted_call();
        file.analyze();

        assert_eq!(
            format_file_groups(&file, file.group_of(2)),
            "src/call.rs:\n\
             \x20 @@ -40 +40 @@\n\
             \x20 -40:\tchurn\tlet x = 1;\n\
             \x20 +40:\tadded\tlet x = 2;\n"
        );
    }

    #[test]
    fn format_file_without_hunks() {
        let file = FileDiff::new(2, "image.png");
        assert_eq!(
            format_file_diff(&file),
            "image.png:\n  0 removed, 0 added (0 whitespace, 0 symbol, 0 churn)\n"
        );
    }

    #[test]
    fn analyze_files_processes_every_file() {
        let mut files = vec![reformatted_call(), reformatted_call(), FileDiff::new(2, "empty")];
        analyze_files(&mut files);

        for file in &files[..2] {
            assert_eq!(file.hunk_groups.len(), 2);
            assert_eq!(file.removed[0].kind, ChangeType::Whitespace);
        }
        assert!(files[2].hunk_groups.is_empty());
    }

    #[test]
    fn summary_snapshot() {
        let mut file = reformatted_call();
        file.analyze();
        insta::assert_snapshot!(
            file.summary().to_string(),
            @"2 removed, 3 added (2 whitespace, 0 symbol, 1 churn)"
        );
    }
}
