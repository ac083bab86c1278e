//! Where recovered files end up.
//!
//! Every write goes through a [`Destination`], which owns the canonical root
//! directory and refuses any relative path that could land outside of it.
//! That check is the only thing standing between a hostile index and the
//! rest of the filesystem, so backends resolve paths through it rather than
//! joining paths themselves.

pub mod backend;
mod destination;
pub mod error;
mod path;

pub use crate::backend::StorageBackend;
pub use crate::destination::Destination;
pub use crate::path::validate as validate_path;
use std::sync::Arc;

pub type BackendHandle = Arc<dyn StorageBackend + Send + Sync>;
