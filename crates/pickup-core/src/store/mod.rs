//! Store module: the only state that survives between runs.
//!
//! - `CursorStore`: last processed order id (one decimal integer)
//! - `PendingQueue`: orders seen but not yet terminal (CSV, no header)
//! - `RunLock`: exclusive lock around a whole run
//!
//! Every mutation replaces the target file through a temp file in the same
//! directory followed by a rename, so a crash leaves either the old or the new
//! content, never a mix.

mod atomic;
mod cursor;
mod lock;
mod pending;

pub use cursor::CursorStore;
pub use lock::RunLock;
pub use pending::PendingQueue;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cursor file {} is corrupt or missing: {reason}", path.display())]
    CorruptCursor { path: PathBuf, reason: String },

    #[error("pending queue {} is malformed: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("another run holds the lock {}", .0.display())]
    Locked(PathBuf),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}
