//! Hunk grouping and whitespace-aware line classification for commits.
//!
//! A [`Repo`] hands out per-commit [`Diff`]s whose files carry ordered hunks
//! and the removed/added lines with normalized text. [`FileDiff::group_hunks`]
//! clusters nearby hunks for presentation and [`FileDiff::classify_lines`]
//! pairs lines that only differ by spaces. [`Churn`] wires the two to a
//! repository.

use error_set::error_set;

pub mod diff;
pub mod parse;
pub mod repo;

pub use diff::{
    ChangeSummary, ChangeType, Diff, DiffLine, FileDiff, Hunk, HunkGroup, LineRef, Side,
    analyze_files, format_file_diff, format_file_groups,
};
pub use parse::ParseError;
pub use repo::{BaseRepo, Commit, FileStat, FileStatus, GitRepo, Repo, RepoError};

error_set! {
    /// Top-level error for git-churn operations
    ChurnError := {
        #[display("No changes to {file} in {revision}")]
        NoSuchFile { file: String, revision: String },
        #[display("No selected hunk exists in {file} ({count} hunks)")]
        NoSuchHunk { file: String, count: usize },
        ParseError(ParseError),
        RepoError(RepoError),
    }
}

/// A commit together with the per-file status of its changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub commit: Commit,
    pub files: Vec<FileStatus>,
}

/// Main interface for analyzing commits of a repository
pub struct Churn<R: Repo> {
    repo: R,
}

impl<R: Repo> Churn<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn repo_mut(&mut self) -> &mut R {
        &mut self.repo
    }

    /// Commits newest first with their name-status, at most `max_count`.
    pub fn log(&self, max_count: Option<usize>) -> Result<Vec<LogEntry>, ChurnError> {
        let commits = match max_count {
            Some(max_count) => self.repo.commits_limited(max_count)?,
            None => self.repo.commits()?,
        };

        commits
            .into_iter()
            .map(|commit| -> Result<LogEntry, ChurnError> {
                let files = self.repo.name_status(&commit)?;
                Ok(LogEntry { commit, files })
            })
            .collect()
    }

    /// Grouped and classified diff of `revision`.
    ///
    /// Only files listed in `files` are analyzed; an empty list keeps all.
    ///
    /// # Examples
    /// ```no_run
    /// # use git_churn::{Churn, GitRepo};
    /// let churn = Churn::new(GitRepo::open(".").unwrap());
    /// let diff = churn.analyze("HEAD", &[]).unwrap();
    /// println!("{}", diff);
    /// ```
    pub fn analyze(&self, revision: &str, files: &[String]) -> Result<Diff, ChurnError> {
        let commit = self.repo.commit(revision)?;
        let mut diff = self.repo.diff(&commit)?;
        diff.retain_paths(files);
        diff.analyze();
        Ok(diff)
    }

    /// Formatted hunk groups owning the hunks picked by a `file:hunks` selector.
    ///
    /// # Examples
    /// ```no_run
    /// # use git_churn::{Churn, GitRepo};
    /// let churn = Churn::new(GitRepo::open(".").unwrap());
    /// print!("{}", churn.hunk_groups("HEAD", "src/lib.rs:2..3").unwrap());
    /// ```
    pub fn hunk_groups(&self, revision: &str, selector: &str) -> Result<String, ChurnError> {
        let refs = parse::parse_hunk_refs(selector)?;
        let diff = self.analyze(revision, std::slice::from_ref(&refs.file))?;

        let file = diff.file(&refs.file).ok_or_else(|| ChurnError::NoSuchFile {
            file: refs.file.clone(),
            revision: revision.to_string(),
        })?;

        let mut positions: Vec<usize> = (0..file.hunks.len())
            .filter(|&i| refs.selects(i))
            .filter_map(|i| file.hunk_groups_by_hunk_index.get(i).copied())
            .collect();
        positions.dedup();

        if positions.is_empty() {
            return Err(ChurnError::NoSuchHunk {
                file: refs.file,
                count: file.hunks.len(),
            });
        }

        Ok(format_file_groups(
            file,
            positions.iter().filter_map(|&g| file.hunk_groups.get(g)),
        ))
    }
}
