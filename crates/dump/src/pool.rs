use crate::report::Reporter;
use crate::task::{Outcome, RecoveryResult, RecoveryTask, TaskState};
use dotgit_remote::{FetcherHandle, Target};
use dotgit_storage::BackendHandle;
use std::ops::AddAssign;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::instrument;

type Queue = Arc<Mutex<mpsc::Receiver<RecoveryTask>>>;

/// Everything a worker needs to turn a task into a file. Shared, read-only.
pub struct Recovery {
    pub target: Target,
    pub fetcher: FetcherHandle,
    pub backend: BackendHandle,
    pub reporter: Arc<dyn Reporter>,
    pub scan_secrets: bool,
}

impl Recovery {
    /// Fetch, decode and write one file. Never fails: every error ends up
    /// in the returned result.
    pub async fn recover(&self, task: &RecoveryTask) -> RecoveryResult {
        TaskState::Fetching.enter(task);
        let url = match self.target.object_url(&task.id) {
            Ok(url) => url,
            Err(err) => return RecoveryResult::failed(task, Outcome::NetworkError, err.to_string()),
        };
        let raw = match self.fetcher.fetch(&url).await {
            Ok(raw) => raw,
            Err(err) => {
                tracing::debug!(path = %task.path.display(), error = ?err, "Object fetch failed");
                return RecoveryResult::failed(task, Outcome::NetworkError, err.to_string());
            },
        };

        TaskState::Decoding.enter(task);
        let content = match tokio::task::spawn_blocking(move || dotgit_object::reconstruct(&raw)).await {
            Ok(Ok(content)) => content,
            Ok(Err(err)) => {
                tracing::debug!(path = %task.path.display(), error = ?err, "Object decode failed");
                return RecoveryResult::failed(task, Outcome::DecodeError, err.to_string());
            },
            Err(err) => return RecoveryResult::failed(task, Outcome::DecodeError, err.to_string()),
        };

        TaskState::Writing.enter(task);
        if let Err(err) = self.backend.write(&task.path, &content).await {
            tracing::debug!(path = %task.path.display(), error = ?err, "Write failed");
            return RecoveryResult::failed(task, Outcome::IoError, err.to_string());
        }

        // Only ever over what was actually written.
        let findings = match self.scan_secrets {
            true => dotgit_secrets::scan(&content),
            false => Vec::new(),
        };
        RecoveryResult::succeeded(task, content.len(), findings)
    }
}

/// Tally of terminal outcomes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    pub succeeded: usize,
    pub failed: usize,
    pub findings: usize,
}

impl PoolStats {
    fn record(&mut self, result: &RecoveryResult) {
        match result.outcome.is_success() {
            true => self.succeeded += 1,
            false => self.failed += 1,
        }
        self.findings += result.findings.len();
    }
}

impl AddAssign for PoolStats {
    fn add_assign(&mut self, other: Self) {
        self.succeeded += other.succeeded;
        self.failed += other.failed;
        self.findings += other.findings;
    }
}

/// A fixed number of workers draining one queue.
///
/// One producer (the caller of [`run`](Self::run)) feeds the queue; each
/// worker takes one task at a time and sees it through to a terminal
/// outcome. `run` only returns once every worker has exited, which happens
/// once the queue is closed and empty.
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    workers: usize,
    poll_interval: Duration,
}

impl WorkerPool {
    pub fn new(workers: usize, poll_interval: Duration) -> Self {
        Self { workers: workers.max(1), poll_interval }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    #[instrument(skip_all, fields(workers = self.workers, tasks = tasks.len()))]
    pub async fn run(&self, recovery: Arc<Recovery>, tasks: Vec<RecoveryTask>) -> PoolStats {
        let (sender, receiver) = mpsc::channel(self.workers * 2);
        let queue: Queue = Arc::new(Mutex::new(receiver));
        let mut workers = JoinSet::new();
        for worker in 0..self.workers {
            workers.spawn(Self::worker(worker, Arc::clone(&queue), Arc::clone(&recovery), self.poll_interval));
        }

        for task in tasks {
            TaskState::Queued.enter(&task);
            if sender.send(task).await.is_err() {
                // Only possible if every worker panicked.
                tracing::error!("All workers exited before the queue was drained");
                break;
            }
        }
        // Closing the queue is what lets idle workers exit.
        drop(sender);

        let mut stats = PoolStats::default();
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(worker_stats) => stats += worker_stats,
                Err(err) => tracing::error!(%err, "Worker panicked"),
            }
        }
        stats
    }

    async fn worker(worker: usize, queue: Queue, recovery: Arc<Recovery>, poll_interval: Duration) -> PoolStats {
        let mut stats = PoolStats::default();
        loop {
            let next = timeout(poll_interval, async { queue.lock().await.recv().await }).await;
            let task = match next {
                Ok(Some(task)) => task,
                // Closed and drained.
                Ok(None) => break,
                // Nothing yet, producer still going.
                Err(_) => continue,
            };
            let result = recovery.recover(&task).await;
            stats.record(&result);
            recovery.reporter.report(&result);
        }
        tracing::trace!(worker, ?stats, "Worker finished");
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::CollectingReporter;
    use dotgit_index::ObjectId;
    use dotgit_object::mock::loose_object;
    use dotgit_remote::MockFetcher;
    use dotgit_remote::error::ErrorKind as RemoteErrorKind;
    use dotgit_storage::backend::{MockBackend, StorageBackend};
    use rstest::rstest;
    use std::path::{Path, PathBuf};

    fn id(n: u8) -> ObjectId {
        ObjectId::from([n; 20])
    }

    fn task(n: u8, path: &str) -> RecoveryTask {
        RecoveryTask { id: id(n), path: PathBuf::from(path) }
    }

    struct Fixture {
        recovery: Arc<Recovery>,
        backend: Arc<MockBackend>,
        reporter: Arc<CollectingReporter>,
    }

    fn fixture(fetcher: MockFetcher, scan_secrets: bool) -> Fixture {
        let backend = Arc::new(MockBackend::default());
        let reporter = Arc::new(CollectingReporter::default());
        let recovery = Recovery {
            target: "http://example.com/.git/".parse().unwrap(),
            fetcher: Arc::new(fetcher),
            backend: backend.clone(),
            reporter: reporter.clone(),
            scan_secrets,
        };
        Fixture { recovery: Arc::new(recovery), backend, reporter }
    }

    fn target() -> Target {
        "http://example.com/.git/".parse().unwrap()
    }

    #[tokio::test]
    async fn test_recover_writes_content() {
        let fetcher = MockFetcher::default().with_object(&target(), &id(1), loose_object("blob", b"hello\n"));
        let fixture = fixture(fetcher, false);
        let result = fixture.recovery.recover(&task(1, "docs/hello.txt")).await;
        assert_eq!(result.outcome, Outcome::Succeeded);
        assert_eq!(fixture.backend.read(Path::new("docs/hello.txt")).await.unwrap(), b"hello\n");
    }

    #[tokio::test]
    async fn test_recover_failures() {
        let target = target();
        let url = target.object_url(&id(3)).unwrap();
        let fetcher = MockFetcher::default()
            .with_object(&target, &id(2), b"not zlib at all".to_vec())
            .with_failure(&url, RemoteErrorKind::Timeout);
        let fixture = fixture(fetcher, false);

        let missing = fixture.recovery.recover(&task(1, "missing.txt")).await;
        assert_eq!(missing.outcome, Outcome::NetworkError);
        assert_eq!(missing.detail, "unexpected HTTP status: 404");
        let corrupt = fixture.recovery.recover(&task(2, "corrupt.txt")).await;
        assert_eq!(corrupt.outcome, Outcome::DecodeError);
        let slow = fixture.recovery.recover(&task(3, "slow.txt")).await;
        assert_eq!(slow.outcome, Outcome::NetworkError);
        assert!(fixture.backend.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_recover_scans_after_write() {
        let content = b"DB:\n  database_url: \"postgres://root:toor@db/prod\"\n";
        let fetcher = MockFetcher::default().with_object(&target(), &id(1), loose_object("blob", content));
        let fixture = fixture(fetcher, true);
        let result = fixture.recovery.recover(&task(1, "config/database.yml")).await;
        assert!(result.outcome.is_success());
        assert_eq!(result.findings.len(), 1);
        assert_eq!(fixture.backend.read(Path::new("config/database.yml")).await.unwrap(), content);
    }

    #[rstest]
    #[case(1)]
    #[case(3)]
    #[case(16)]
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_pool_drains_every_task(#[case] workers: usize) {
        let target = target();
        let mut fetcher = MockFetcher::default();
        let mut tasks = Vec::new();
        for n in 0..40u8 {
            // Every fifth object is missing on the server.
            if n % 5 != 0 {
                fetcher = fetcher.with_object(&target, &id(n), loose_object("blob", format!("file {n}").as_bytes()));
            }
            tasks.push(task(n, &format!("dir{}/file{n}.txt", n % 4)));
        }
        let fixture = fixture(fetcher, false);
        let pool = WorkerPool::new(workers, Duration::from_millis(20));
        let stats = pool.run(fixture.recovery.clone(), tasks).await;

        assert_eq!(stats, PoolStats { succeeded: 32, failed: 8, findings: 0 });
        assert_eq!(fixture.reporter.results().len(), 40);
        let files = fixture.backend.snapshot().await;
        assert_eq!(files.len(), 32);
        assert_eq!(files[Path::new("dir1/file1.txt")], b"file 1");
    }

    #[tokio::test]
    async fn test_pool_with_no_tasks() {
        let fixture = fixture(MockFetcher::default(), false);
        let stats = WorkerPool::new(4, Duration::from_millis(10)).run(fixture.recovery.clone(), Vec::new()).await;
        assert_eq!(stats, PoolStats::default());
    }

    #[test]
    fn test_zero_workers_means_one() {
        assert_eq!(WorkerPool::new(0, Duration::from_millis(1)).workers(), 1);
    }
}
