//! Rebuilding a work tree from an exposed index.
//!
//! A [`Dumper`] drives one scan:
//!
//! 1. fetch the remote `index` and save it as-is,
//! 2. decode it, dropping any entry the [`Destination`](dotgit_storage::Destination)
//!    would not contain,
//! 3. queue one [`RecoveryTask`] per remaining entry on a [`WorkerPool`],
//! 4. each worker fetches the object, strips its header, writes the file and
//!    hands a [`RecoveryResult`] to the [`Reporter`].
//!
//! Only steps 1 and 2 can fail the scan. After that every failure belongs
//! to one file.

mod dumper;
pub mod error;
mod pool;
mod report;
mod task;

pub use crate::dumper::{DumpOptions, Dumper, INDEX_FILE, Summary};
pub use crate::pool::{PoolStats, Recovery, WorkerPool};
pub use crate::report::{CollectingReporter, ConsoleReporter, Reporter};
pub use crate::task::{Outcome, RecoveryResult, RecoveryTask, TaskState};
