use dotgit_dump::{ConsoleReporter, DumpOptions, Dumper, INDEX_FILE, Reporter};
use dotgit_index::mock::IndexBuilder;
use dotgit_object::mock::{deflate, loose_object};
use dotgit_remote::{MockFetcher, Target};
use dotgit_storage::backend::LocalBackend;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

fn target() -> Target {
    "http://192.168.0.10:8080/.git/".parse().unwrap()
}

fn options(workers: usize) -> DumpOptions {
    DumpOptions { workers, poll_interval: Duration::from_millis(10), scan_secrets: false }
}

/// Every regular file under `root`, keyed by its path relative to `root`.
fn tree(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    let mut files = BTreeMap::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in std::fs::read_dir(&dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                stack.push(path);
            } else {
                let relative = path.strip_prefix(root).unwrap().to_path_buf();
                files.insert(relative, std::fs::read(&path).unwrap());
            }
        }
    }
    files
}

async fn dump(root: &Path, fetcher: Arc<MockFetcher>, reporter: Arc<dyn Reporter>, options: DumpOptions) {
    let backend = Arc::new(LocalBackend::new("local", root).unwrap());
    let dumper = Dumper::new(target(), backend.destination().clone(), backend, fetcher, reporter, options);
    let summary = dumper.run().await.unwrap();
    assert!(summary.is_complete());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_empty_readme() {
    let dir = tempfile::tempdir().unwrap();
    let target = target();
    let root = dir.path().join(target.destination_name());
    assert!(root.ends_with("192.168.0.10_8080"));

    let hash = "da39a3ee5e6b4b0d3255bfef95601890afd80709";
    let index = IndexBuilder::new(2).entry(hash, "README.md").build();
    let fetcher = Arc::new(
        MockFetcher::default()
            .with_index(&target, index.clone())
            .with_object(&target, &hash.parse().unwrap(), deflate(b"blob 0\0")),
    );
    let reporter = Arc::new(ConsoleReporter::new(Vec::new()));

    dump(&root, fetcher.clone(), reporter.clone(), options(10)).await;

    assert_eq!(fetcher.requests(), 2);
    let files = tree(&root);
    assert_eq!(files.len(), 2);
    assert_eq!(files[Path::new("README.md")], b"");
    assert_eq!(files[Path::new(INDEX_FILE)], index);
    let reporter = Arc::into_inner(reporter).unwrap();
    assert_eq!(String::from_utf8(reporter.into_inner()).unwrap(), "[OK] README.md\n");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_worker_count_does_not_change_output() {
    let target = target();
    let mut builder = IndexBuilder::new(3);
    let mut fetcher = MockFetcher::default();
    for n in 0..60u32 {
        let hash = format!("{n:040x}");
        let path = format!("src/module{}/nested{}/file{n}.rs", n % 5, n % 3);
        builder = builder.entry(&hash, &path);
        let content = format!("// file {n}\n").repeat(usize::try_from(n).unwrap() * 7);
        fetcher = fetcher.with_object(&target, &hash.parse().unwrap(), loose_object("blob", content.as_bytes()));
    }
    // The same path twice: whichever write lands last wins, and both are
    // identical here so the trees still match.
    builder = builder.entry(&format!("{:040x}", 1), "src/module1/nested1/file1.rs");
    let fetcher = Arc::new(fetcher.with_index(&target, builder.build()));

    let single = tempfile::tempdir().unwrap();
    let many = tempfile::tempdir().unwrap();
    dump(single.path(), fetcher.clone(), Arc::new(dotgit_dump::CollectingReporter::default()), options(1)).await;
    dump(many.path(), fetcher.clone(), Arc::new(dotgit_dump::CollectingReporter::default()), options(10)).await;

    let single = tree(single.path());
    let many = tree(many.path());
    assert_eq!(single.len(), 61);
    assert_eq!(single, many);
}

#[tokio::test]
async fn test_failures_do_not_stop_the_scan() {
    let dir = tempfile::tempdir().unwrap();
    let target = target();
    let good = "1111111111111111111111111111111111111111";
    let missing = "2222222222222222222222222222222222222222";
    let corrupt = "3333333333333333333333333333333333333333";
    let index = IndexBuilder::new(2)
        .entry(good, "good.txt")
        .entry(missing, "missing.txt")
        .entry(corrupt, "corrupt.txt")
        .build();
    let fetcher = MockFetcher::default()
        .with_index(&target, index)
        .with_object(&target, &good.parse().unwrap(), loose_object("blob", b"ok"))
        .with_object(&target, &corrupt.parse().unwrap(), b"\x78\x9c garbage".to_vec());
    let backend = Arc::new(LocalBackend::new("local", dir.path()).unwrap());
    let reporter = Arc::new(dotgit_dump::CollectingReporter::default());
    let dumper = Dumper::new(
        target,
        backend.destination().clone(),
        backend,
        Arc::new(fetcher),
        reporter.clone(),
        options(3),
    );

    let summary = dumper.run().await.unwrap();
    assert_eq!((summary.succeeded, summary.failed), (1, 2));
    assert_eq!(reporter.results().len(), 3);
    assert_eq!(std::fs::read(dir.path().join("good.txt")).unwrap(), b"ok");
    assert!(!dir.path().join("missing.txt").exists());
    assert!(!dir.path().join("corrupt.txt").exists());
}

#[tokio::test]
async fn test_secrets_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let target = target();
    let hash = "4444444444444444444444444444444444444444";
    let fetcher = MockFetcher::default()
        .with_index(&target, IndexBuilder::new(2).entry(hash, ".env").build())
        .with_object(&target, &hash.parse().unwrap(), loose_object("blob", b"api_key = \"AKIAABCDEFGH1234\"\n"));
    let backend = Arc::new(LocalBackend::new("local", dir.path()).unwrap());
    let reporter = Arc::new(ConsoleReporter::new(Vec::new()));
    let options = DumpOptions { scan_secrets: true, ..options(2) };
    let dumper = Dumper::new(target, backend.destination().clone(), backend, Arc::new(fetcher), reporter.clone(), options);

    let summary = dumper.run().await.unwrap();
    assert_eq!(summary.findings, 1);
    drop(dumper);
    let out = String::from_utf8(Arc::into_inner(reporter).unwrap().into_inner()).unwrap();
    assert_eq!(out, "[OK] .env\n[SECRET] .env: api_key: api_****234\"\n");
}
