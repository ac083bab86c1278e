use derive_more::Display;
use dotgit_index::{IndexEntry, ObjectId};
use dotgit_secrets::Finding;
use std::path::PathBuf;

/// One file to recover. Only ever built from an entry the destination
/// accepted, and consumed by exactly one worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryTask {
    pub id: ObjectId,
    /// Relative to the destination root.
    pub path: PathBuf,
}

impl From<IndexEntry> for RecoveryTask {
    fn from(entry: IndexEntry) -> Self {
        Self { id: entry.id, path: PathBuf::from(entry.path) }
    }
}

/// Where a task is in its life. Transitions only go forward.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Queued,
    Fetching,
    Decoding,
    Writing,
    Succeeded,
    Failed,
}

impl TaskState {
    pub(crate) fn enter(self, task: &RecoveryTask) {
        tracing::debug!(path = %task.path.display(), id = %task.id, state = %self, "Task state");
    }
}

/// How a task ended. Failures are terminal; nothing is retried.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    #[display("ok")]
    Succeeded,
    #[display("network error")]
    NetworkError,
    #[display("decode error")]
    DecodeError,
    #[display("I/O error")]
    IoError,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryResult {
    pub path: PathBuf,
    pub outcome: Outcome,
    /// Byte count on success, the error otherwise.
    pub detail: String,
    /// Empty unless secret scanning is on and the write succeeded.
    pub findings: Vec<Finding>,
}

impl RecoveryResult {
    pub(crate) fn succeeded(task: &RecoveryTask, size: usize, findings: Vec<Finding>) -> Self {
        TaskState::Succeeded.enter(task);
        Self { path: task.path.clone(), outcome: Outcome::Succeeded, detail: format!("{size} bytes"), findings }
    }

    pub(crate) fn failed(task: &RecoveryTask, outcome: Outcome, detail: impl Into<String>) -> Self {
        TaskState::Failed.enter(task);
        Self { path: task.path.clone(), outcome, detail: detail.into(), findings: Vec::new() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_from_entry() {
        let id: ObjectId = "da39a3ee5e6b4b0d3255bfef95601890afd80709".parse().unwrap();
        let task = RecoveryTask::from(IndexEntry { id, path: "src/lib.rs".to_string() });
        assert_eq!(task.path, PathBuf::from("src/lib.rs"));
        assert_eq!(task.id, id);
    }

    #[test]
    fn test_results() {
        let task = RecoveryTask { id: ObjectId::from([0; 20]), path: PathBuf::from("a.txt") };
        let ok = RecoveryResult::succeeded(&task, 12, Vec::new());
        assert!(ok.outcome.is_success());
        assert_eq!(ok.detail, "12 bytes");
        let failed = RecoveryResult::failed(&task, Outcome::NetworkError, "unexpected HTTP status: 404");
        assert!(!failed.outcome.is_success());
        assert_eq!(failed.outcome.to_string(), "network error");
    }
}
