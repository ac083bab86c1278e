//! `dotgit`: rebuild a project's source tree from an exposed `.git/`
//! directory.
//!
//! ```bash
//! dotgit https://example.com/.git/ --workers 20 --scan-secrets
//! ```
//!
//! Recovered files land in a directory named after the host and port
//! (`example.com`, `10.0.0.1_8080`) unless `--output` says otherwise.
//! Progress lines go to stdout, logs to stderr.

use clap::Parser;
use derive_more::{Display, Error};
use dotgit_config::Config;
use dotgit_dump::{ConsoleReporter, DumpOptions, Dumper, Summary};
use dotgit_remote::{HttpFetcher, Target};
use dotgit_storage::Destination;
use dotgit_storage::backend::LocalBackend;
use exn::ResultExt;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "dotgit", version, about = "Rebuild a source tree from an exposed .git directory")]
struct Args {
    /// Exposed metadata directory, e.g. https://example.com/.git/
    url: String,

    /// Number of concurrent downloads
    #[arg(short, long)]
    workers: Option<usize>,

    /// Where to write recovered files [default: named after host and port]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Config file [default: dotgit.toml in the platform config directory]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Verify TLS certificates
    #[arg(long)]
    secure: bool,

    /// Scan recovered files for credentials
    #[arg(long)]
    scan_secrets: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Flags beat every other configuration source.
    fn apply(&self, config: &mut Config) {
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        if let Some(output) = &self.output {
            config.output = Some(output.clone());
        }
        if self.secure {
            config.accept_invalid_certs = false;
        }
        if self.scan_secrets {
            config.scan_secrets = true;
        }
    }
}

#[derive(Debug, Display, Error)]
enum ErrorKind {
    #[display("invalid configuration")]
    Config,
    #[display("invalid target URL")]
    Target,
    #[display("could not prepare destination directory")]
    Destination,
    #[display("could not set up HTTP client")]
    Client,
    #[display("scan aborted")]
    Scan,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "dotgit=debug" } else { "dotgit=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

async fn run(args: Args) -> Result<Summary, exn::Exn<ErrorKind>> {
    let mut config = Config::load(args.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    args.apply(&mut config);
    config.validate().or_raise(|| ErrorKind::Config)?;

    let target = args.url.parse::<Target>().or_raise(|| ErrorKind::Target)?;
    let root = config.output.clone().unwrap_or_else(|| PathBuf::from(target.destination_name()));
    let destination = Destination::new(&root).or_raise(|| ErrorKind::Destination)?;
    tracing::info!(url = %target, destination = %destination.root().display(), workers = config.workers, "Starting scan");

    let backend = Arc::new(LocalBackend::with_destination("local", destination.clone()));
    let fetcher = Arc::new(HttpFetcher::new(&config.fetch_options()).or_raise(|| ErrorKind::Client)?);
    let options = DumpOptions {
        workers: config.workers,
        poll_interval: config.poll_interval(),
        scan_secrets: config.scan_secrets,
    };
    let dumper = Dumper::new(target, destination, backend, fetcher, Arc::new(ConsoleReporter::stdout()), options);
    dumper.run().await.or_raise(|| ErrorKind::Scan)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);
    match run(args).await {
        Ok(summary) if summary.is_complete() => ExitCode::SUCCESS,
        Ok(_) => {
            tracing::error!("Index was truncated; the recovered tree is incomplete");
            ExitCode::FAILURE
        },
        Err(err) => {
            tracing::error!(error = ?err, "Scan failed");
            ExitCode::FAILURE
        },
    }
}
