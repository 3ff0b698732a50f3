// src/output/writer.rs
//! Writing notes. Child notes are written as soon as they are converted;
//! the parent only counts them.

use super::vault::Vault;
use crate::error::AppError;
use std::path::PathBuf;

/// A note whose content is ready but not yet on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingWrite {
    /// Vault-relative path.
    pub path: PathBuf,
    pub content: String,
}

impl PendingWrite {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Child notes found below one note, nested ones included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChildTally {
    pub written: usize,
    pub failed: usize,
}

impl ChildTally {
    /// Counts a written child together with everything below it.
    pub fn record_written(&mut self, child: &WriteOutcome) {
        self.written += 1 + child.children_written;
        self.failed += child.children_failed;
    }

    pub fn record_failed(&mut self) {
        self.failed += 1;
    }

    pub fn absorb(&mut self, other: ChildTally) {
        self.written += other.written;
        self.failed += other.failed;
    }
}

/// What happened to one note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    pub path: PathBuf,
    pub bytes_written: usize,
    /// Child notes written while this one was converted.
    pub children_written: usize,
    pub children_failed: usize,
}

/// Writes `note`, overwriting any existing file.
pub async fn finalize(
    vault: &dyn Vault,
    note: PendingWrite,
    children: ChildTally,
) -> Result<WriteOutcome, AppError> {
    vault.write_text(&note.path, &note.content).await?;
    log::debug!(
        "Wrote note {} ({} child notes)",
        note.path.display(),
        children.written
    );

    Ok(WriteOutcome {
        bytes_written: note.content.len(),
        path: note.path,
        children_written: children.written,
        children_failed: children.failed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::vault::FsVault;
    use tempfile::TempDir;

    fn outcome(children_written: usize, children_failed: usize) -> WriteOutcome {
        WriteOutcome {
            path: PathBuf::from("subpages/Child.md"),
            bytes_written: 10,
            children_written,
            children_failed,
        }
    }

    #[test]
    fn test_tally_counts_nested_children() {
        let mut tally = ChildTally::default();
        tally.record_written(&outcome(2, 1));
        tally.record_failed();

        let mut toggle = ChildTally::default();
        toggle.record_written(&outcome(0, 0));
        tally.absorb(toggle);

        assert_eq!(tally, ChildTally { written: 4, failed: 2 });
    }

    #[tokio::test]
    async fn test_finalize_writes_and_reports() {
        let dir = TempDir::new().unwrap();
        let vault = FsVault::new(dir.path());

        let written = finalize(
            &vault,
            PendingWrite::new("Notes/Parent.md", "---\n---\n[[Child]]\n\n"),
            ChildTally { written: 1, failed: 0 },
        )
        .await
        .unwrap();

        assert_eq!(written.path, PathBuf::from("Notes/Parent.md"));
        assert_eq!(written.children_written, 1);
        assert_eq!(written.bytes_written, 20);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("Notes/Parent.md")).unwrap(),
            "---\n---\n[[Child]]\n\n"
        );
    }

    #[tokio::test]
    async fn test_escaping_path_is_an_error() {
        let dir = TempDir::new().unwrap();
        let vault = FsVault::new(dir.path());

        let result = finalize(
            &vault,
            PendingWrite::new("../escape.md", "nope"),
            ChildTally::default(),
        )
        .await;

        assert!(result.is_err());
    }
}
