use crate::error::{ErrorKind, Result};
use crate::pool::{Recovery, WorkerPool};
use crate::report::Reporter;
use crate::task::RecoveryTask;
use dotgit_index::Index;
use dotgit_index::error::Error as IndexError;
use dotgit_remote::{FetcherHandle, Target};
use dotgit_storage::{BackendHandle, Destination};
use exn::ResultExt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

/// The raw index is saved under this name at the destination root.
pub const INDEX_FILE: &str = "index";

#[derive(Debug, Clone)]
pub struct DumpOptions {
    pub workers: usize,
    pub poll_interval: Duration,
    pub scan_secrets: bool,
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self { workers: 10, poll_interval: Duration::from_millis(500), scan_secrets: false }
    }
}

/// What a finished scan did.
#[derive(Debug, Default)]
pub struct Summary {
    /// Entries decoded from the index, accepted or not.
    pub entries: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Entries the destination refused to write.
    pub rejected: usize,
    pub findings: usize,
    /// Set if the index ended mid-record. Everything decoded before the cut
    /// was still recovered, but the tree is incomplete.
    pub truncation: Option<IndexError>,
}

impl Summary {
    pub fn is_complete(&self) -> bool {
        self.truncation.is_none()
    }
}

/// One scan of one target: fetch the index, decide what is safe to write,
/// then hand the rest to a [`WorkerPool`].
pub struct Dumper {
    target: Target,
    destination: Destination,
    backend: BackendHandle,
    fetcher: FetcherHandle,
    reporter: Arc<dyn Reporter>,
    options: DumpOptions,
}

impl Dumper {
    /// `backend` must write under `destination`; the destination decides
    /// which index paths are accepted, the backend does the writing.
    pub fn new(
        target: Target,
        destination: Destination,
        backend: BackendHandle,
        fetcher: FetcherHandle,
        reporter: Arc<dyn Reporter>,
        options: DumpOptions,
    ) -> Self {
        Self { target, destination, backend, fetcher, reporter, options }
    }

    /// Fails only if there is nothing to recover from: the index couldn't be
    /// fetched, saved, or recognised. Per-file failures are reported and
    /// counted, and truncation is returned in the [`Summary`].
    #[instrument(skip(self), fields(url = %self.target, destination = %self.destination.root().display()))]
    pub async fn run(&self) -> Result<Summary> {
        let url = self.target.index_url().or_raise(|| ErrorKind::Fetch)?;
        let raw = self.fetcher.fetch(&url).await.or_raise(|| ErrorKind::Fetch)?;
        tracing::info!(size = raw.len(), "Fetched index");
        self.backend.write(Path::new(INDEX_FILE), &raw).await.or_raise(|| ErrorKind::Storage)?;

        let index = Index::parse(&raw).or_raise(|| ErrorKind::Format)?;
        let declared = index.len();
        let mut summary = Summary::default();
        let mut tasks = Vec::new();
        // Decode everything before anything is queued.
        for entry in index.entries() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::error!(error = ?err, decoded = summary.entries, declared, "Index is truncated");
                    summary.truncation = Some(err);
                    break;
                },
            };
            summary.entries += 1;
            if !self.destination.accept(&entry.path) {
                tracing::warn!(path = %entry.path, id = %entry.id, "Refusing path outside destination");
                summary.rejected += 1;
                continue;
            }
            tasks.push(RecoveryTask::from(entry));
        }
        tracing::info!(
            declared,
            decoded = summary.entries,
            queued = tasks.len(),
            rejected = summary.rejected,
            "Decoded index"
        );

        let recovery = Arc::new(Recovery {
            target: self.target.clone(),
            fetcher: Arc::clone(&self.fetcher),
            backend: Arc::clone(&self.backend),
            reporter: Arc::clone(&self.reporter),
            scan_secrets: self.options.scan_secrets,
        });
        let stats = WorkerPool::new(self.options.workers, self.options.poll_interval).run(recovery, tasks).await;
        summary.succeeded = stats.succeeded;
        summary.failed = stats.failed;
        summary.findings = stats.findings;
        tracing::info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            rejected = summary.rejected,
            findings = summary.findings,
            "Scan finished"
        );
        Ok(summary)
    }
}
