//! Version-control collaborators feeding the analysis.
//!
//! A [`Repo`] lists commits and produces structured per-commit diffs; the
//! [`git`] module provides one backed by libgit2. [`BaseRepo`] holds the
//! bootstrap checks shared by every backend.

pub mod git;

pub use git::GitRepo;

use crate::diff::Diff;
use chrono::{DateTime, FixedOffset};
use error_set::error_set;
use std::fmt;
use std::path::{Path, PathBuf};

const DATE_FORMAT: &str = "%a %b %d %H:%M:%S %Y %z";

error_set! {
    /// Errors from opening or reading a repository
    RepoError := {
        /// The configured root path does not exist
        #[display("\"{root}\" does not exist")]
        RootNotFound { root: String },
        /// The root exists but holds no repository of the expected kind
        #[display("\"{path}\" is not a {vcs} repository")]
        NotARepository { path: String, vcs: String },
        /// A branch, tag or revision could not be resolved to a commit
        #[display("Unknown revision '{revision}'")]
        UnknownRevision { revision: String },
        /// The VCS backend reported an error
        #[display("{message}")]
        Backend { message: String },
    }
}

/// Source of commits and diffs for a repository.
pub trait Repo {
    /// Select the branch or reference commits are listed from.
    fn set_branch(&mut self, branch: &str) -> Result<(), RepoError>;

    /// Resolve a single revision (hash, branch, tag, ...) to a commit.
    fn commit(&self, revision: &str) -> Result<Commit, RepoError>;

    /// Commits reachable from the selected reference, newest first.
    fn commits(&self) -> Result<Vec<Commit>, RepoError>;

    /// At most `max_count` commits, newest first.
    fn commits_limited(&self, max_count: usize) -> Result<Vec<Commit>, RepoError> {
        let mut commits = self.commits()?;
        commits.truncate(max_count);
        Ok(commits)
    }

    /// Per-file status of the changes introduced by `commit`.
    fn name_status(&self, commit: &Commit) -> Result<Vec<FileStatus>, RepoError>;

    /// Structured diff of `commit` against its first parent.
    ///
    /// Hunks and lines are filled in with normalized text attached; nothing
    /// is grouped or classified yet.
    fn diff(&self, commit: &Commit) -> Result<Diff, RepoError>;
}

/// A commit as reported by a [`Repo`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub revision: String,
    pub parents: Vec<String>,
    pub author: String,
    pub date: DateTime<FixedOffset>,
    pub message: String,
}

impl fmt::Display for Commit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "commit {}\nParents: {}\nAuthor: {}\nDate: {}\n\n{}\n",
            self.revision,
            self.parents.join(","),
            self.author,
            self.date.format(DATE_FORMAT),
            indent(&self.message, "\t"),
        )
    }
}

/// Prefix every line of `text` with `prefix`, dropping trailing newlines.
fn indent(text: &str, prefix: &str) -> String {
    text.trim_end_matches('\n')
        .lines()
        .map(|line| format!("{prefix}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// How a file changed in a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileStat {
    Modified,
    Added,
    Deleted,
    Renamed,
    PermissionChanged,
}

impl FileStat {
    /// Single-letter code, as in `git log --name-status`.
    pub fn code(self) -> char {
        match self {
            FileStat::Modified => 'M',
            FileStat::Added => 'A',
            FileStat::Deleted => 'D',
            FileStat::Renamed => 'R',
            FileStat::PermissionChanged => 'P',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStatus {
    pub path: String,
    pub status: FileStat,
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.status.code(), self.path)
    }
}

/// Location and existence checks shared by repository backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseRepo {
    /// Human-readable VCS name used in diagnostics, e.g. `git`.
    pub vcs_name: String,
    /// Directory inside the root that marks a repository, e.g. `.git`.
    pub repository_name: String,
    pub root: PathBuf,
    /// `root` joined with `repository_name`, set by [`BaseRepo::init`].
    pub repository: PathBuf,
}

impl BaseRepo {
    pub fn new(
        vcs_name: impl Into<String>,
        repository_name: impl Into<String>,
        root: impl AsRef<Path>,
    ) -> Self {
        Self {
            vcs_name: vcs_name.into(),
            repository_name: repository_name.into(),
            root: root.as_ref().to_path_buf(),
            repository: PathBuf::new(),
        }
    }

    /// Resolve the repository directory and check that it exists.
    pub fn init(&mut self) -> Result<(), RepoError> {
        self.repository = self.root.join(&self.repository_name);
        self.exists()
    }

    /// # Errors
    ///
    /// - [`RepoError::RootNotFound`] if the root is not a directory
    /// - [`RepoError::NotARepository`] if the root exists but the repository
    ///   directory does not
    pub fn exists(&self) -> Result<(), RepoError> {
        if self.repository.is_dir() {
            return Ok(());
        }
        if !self.root.is_dir() {
            return Err(RepoError::RootNotFound {
                root: self.root.display().to_string(),
            });
        }
        Err(RepoError::NotARepository {
            path: self.repository.display().to_string(),
            vcs: self.vcs_name.clone(),
        })
    }
}
