//! libgit2-backed [`Repo`].

use super::{BaseRepo, Commit, FileStat, FileStatus, Repo, RepoError};
use crate::diff::{Diff, FileDiff, Hunk, Side};
use chrono::{DateTime, FixedOffset, Offset, Utc};
use git2::{Delta, DiffDelta, DiffFindOptions, DiffOptions, Oid, Patch, Repository, Sort};
use log::{debug, info};
use std::path::Path;

/// A git repository read through libgit2.
///
/// Diffs are computed tree-to-tree with zero context lines, so every hunk
/// holds only changed lines. Selecting a branch changes where the commit
/// walk starts; the working tree is never touched.
pub struct GitRepo {
    base: BaseRepo,
    inner: Repository,
    start: Option<Oid>,
}

impl GitRepo {
    /// Open the repository whose working tree is `root`.
    ///
    /// # Errors
    ///
    /// [`RepoError::RootNotFound`] or [`RepoError::NotARepository`] when the
    /// path checks fail, [`RepoError::Backend`] when libgit2 cannot open it.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, RepoError> {
        let mut base = BaseRepo::new("git", ".git", root);
        base.init()?;

        let inner = Repository::open(&base.root).map_err(backend)?;
        info!("Opened git repository at {}", base.root.display());

        Ok(Self {
            base,
            inner,
            start: None,
        })
    }

    pub fn base(&self) -> &BaseRepo {
        &self.base
    }

    /// Tree diff of `commit` against its first parent, renames detected.
    fn tree_diff(&self, commit: &Commit) -> Result<git2::Diff<'_>, RepoError> {
        let oid = Oid::from_str(&commit.revision).map_err(backend)?;
        let commit = self.inner.find_commit(oid).map_err(backend)?;
        let new_tree = commit.tree().map_err(backend)?;
        let old_tree = if commit.parent_count() > 0 {
            Some(
                commit
                    .parent(0)
                    .and_then(|parent| parent.tree())
                    .map_err(backend)?,
            )
        } else {
            None
        };

        let mut opts = DiffOptions::new();
        opts.context_lines(0);

        let mut diff = self
            .inner
            .diff_tree_to_tree(old_tree.as_ref(), Some(&new_tree), Some(&mut opts))
            .map_err(backend)?;
        let mut find = DiffFindOptions::new();
        find.renames(true);
        diff.find_similar(Some(&mut find)).map_err(backend)?;

        Ok(diff)
    }
}

impl Repo for GitRepo {
    fn set_branch(&mut self, branch: &str) -> Result<(), RepoError> {
        let commit = self.commit(branch)?;
        self.start = Some(Oid::from_str(&commit.revision).map_err(backend)?);
        info!("Listing commits from {} ({})", branch, commit.revision);
        Ok(())
    }

    fn commit(&self, revision: &str) -> Result<Commit, RepoError> {
        let commit = self
            .inner
            .revparse_single(revision)
            .and_then(|object| object.peel_to_commit())
            .map_err(|_| RepoError::UnknownRevision {
                revision: revision.to_string(),
            })?;
        Ok(to_commit(&commit))
    }

    fn commits(&self) -> Result<Vec<Commit>, RepoError> {
        self.commits_limited(usize::MAX)
    }

    fn commits_limited(&self, max_count: usize) -> Result<Vec<Commit>, RepoError> {
        let mut revwalk = self.inner.revwalk().map_err(backend)?;
        revwalk
            .set_sorting(Sort::TOPOLOGICAL | Sort::TIME)
            .map_err(backend)?;
        let pushed = match self.start {
            Some(oid) => revwalk.push(oid),
            None => revwalk.push_head(),
        };
        pushed.map_err(backend)?;

        revwalk
            .take(max_count)
            .map(|oid| -> Result<Commit, RepoError> {
                let oid = oid.map_err(backend)?;
                let commit = self.inner.find_commit(oid).map_err(backend)?;
                Ok(to_commit(&commit))
            })
            .collect()
    }

    fn name_status(&self, commit: &Commit) -> Result<Vec<FileStatus>, RepoError> {
        let diff = self.tree_diff(commit)?;

        Ok(diff
            .deltas()
            .filter_map(|delta| {
                let status = match delta.status() {
                    Delta::Added | Delta::Copied => FileStat::Added,
                    Delta::Deleted => FileStat::Deleted,
                    Delta::Renamed => FileStat::Renamed,
                    Delta::Modified if delta.old_file().mode() != delta.new_file().mode() => {
                        FileStat::PermissionChanged
                    }
                    Delta::Modified | Delta::Typechange => FileStat::Modified,
                    _ => return None,
                };
                Some(FileStatus {
                    path: delta_path(&delta),
                    status,
                })
            })
            .collect())
    }

    fn diff(&self, commit: &Commit) -> Result<Diff, RepoError> {
        let diff = self.tree_diff(commit)?;
        let mut files = Vec::new();

        for (idx, delta) in diff.deltas().enumerate() {
            let mut file = FileDiff::new(files.len() as u32, delta_path(&delta));

            // Binary and unchanged files have no patch.
            if let Some(patch) = Patch::from_diff(&diff, idx).map_err(backend)? {
                fill_file_diff(&mut file, &patch)?;
            }

            debug!(
                "{}: {} hunks, -{} +{}",
                file.path,
                file.hunks.len(),
                file.removed.len(),
                file.added.len()
            );
            files.push(file);
        }

        Ok(Diff { files })
    }
}

fn fill_file_diff(file: &mut FileDiff, patch: &Patch<'_>) -> Result<(), RepoError> {
    for h in 0..patch.num_hunks() {
        let (hunk, line_count) = patch.hunk(h).map_err(backend)?;
        file.hunks.push(Hunk::new(
            hunk.old_start(),
            hunk.old_lines(),
            hunk.new_start(),
            hunk.new_lines(),
        ));

        for l in 0..line_count {
            let line = patch.line_in_hunk(h, l).map_err(backend)?;
            let content = String::from_utf8_lossy(line.content());
            let content = content.trim_end_matches(['\n', '\r']);

            let (side, line_no) = match line.origin() {
                '-' => (Side::Removed, line.old_lineno()),
                '+' => (Side::Added, line.new_lineno()),
                _ => continue,
            };
            if let Some(line_no) = line_no {
                file.push_line(side, line_no, content, normalize(content));
            }
        }
    }

    Ok(())
}

/// Comparable form of a line: surrounding whitespace removed.
fn normalize(content: &str) -> String {
    content.trim().to_string()
}

fn delta_path(delta: &DiffDelta<'_>) -> String {
    let file = match delta.status() {
        Delta::Deleted => delta.old_file(),
        _ => delta.new_file(),
    };
    file.path()
        .map(|path| path.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn to_commit(commit: &git2::Commit<'_>) -> Commit {
    let signature = commit.author();
    let name = signature.name().unwrap_or("Unknown");
    let author = match signature.email() {
        Some(email) if !email.is_empty() => format!("{name} <{email}>"),
        _ => name.to_string(),
    };
    let time = commit.time();

    Commit {
        revision: commit.id().to_string(),
        parents: commit.parent_ids().map(|id| id.to_string()).collect(),
        author,
        date: commit_date(time.seconds(), time.offset_minutes()),
        message: commit.message().unwrap_or("").to_string(),
    }
}

fn commit_date(seconds: i64, offset_minutes: i32) -> DateTime<FixedOffset> {
    let offset = FixedOffset::east_opt(offset_minutes * 60).unwrap_or(Utc.fix());
    DateTime::from_timestamp(seconds, 0)
        .unwrap_or_default()
        .with_timezone(&offset)
}

fn backend(err: git2::Error) -> RepoError {
    RepoError::Backend {
        message: err.message().to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn commit_date_keeps_offset() {
        let date = commit_date(1234567890, -420);
        assert_eq!(
            date.format(super::super::DATE_FORMAT).to_string(),
            "Fri Feb 13 16:31:30 2009 -0700"
        );
    }

    #[test]
    fn normalize_trims_surrounding_whitespace() {
        assert_eq!(normalize("\t  let x = 1;  "), "let x = 1;");
    }

    #[test]
    fn open_missing_root() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = GitRepo::open(dir.path().join("missing"));
        assert!(matches!(result, Err(RepoError::RootNotFound { .. })));
    }

    #[test]
    fn open_plain_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = GitRepo::open(dir.path());
        assert!(matches!(result, Err(RepoError::NotARepository { .. })));
    }
}
