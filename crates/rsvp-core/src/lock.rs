//! Per-event writer lock.
//!
//! Invitation numbers are computed by reading the current maximum and then
//! writing, so two writers on the same event can collide. The library does
//! not lock; callers that mutate an event hold an [`EventLock`] for the whole
//! operation. Different events never contend.

use crate::error::ErrorCode;
use crate::model::guest::EventId;
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("event {event} is held by another writer (gave up after {waited:?})")]
    Busy { event: EventId, waited: Duration },

    #[error("lock file {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
}

impl LockError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Busy { .. } => ErrorCode::LockContention,
            Self::Io { .. } => ErrorCode::StoreFailure,
        }
    }

    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }
}

/// Exclusive write access to one event, released on drop.
#[derive(Debug)]
pub struct EventLock {
    file: File,
    path: PathBuf,
    event: EventId,
}

impl EventLock {
    /// Lock file used for `event` inside `lock_dir`.
    #[must_use]
    pub fn path_for(lock_dir: &Path, event: EventId) -> PathBuf {
        lock_dir.join(format!("event-{event}.lock"))
    }

    /// Take the lock for `event`, retrying until `timeout` has passed.
    /// A zero timeout tries exactly once.
    ///
    /// # Errors
    ///
    /// [`LockError::Busy`] when another holder keeps the lock past
    /// `timeout`; [`LockError::Io`] when the lock file cannot be created.
    pub fn acquire(lock_dir: &Path, event: EventId, timeout: Duration) -> Result<Self, LockError> {
        let path = Self::path_for(lock_dir, event);
        let io_err = |source| LockError::Io {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(lock_dir).map_err(io_err)?;
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(io_err)?;

        let started = Instant::now();
        while file.try_lock_exclusive().is_err() {
            let waited = started.elapsed();
            if waited >= timeout {
                warn!(event = %event, ?waited, "event lock busy");
                return Err(LockError::Busy { event, waited });
            }
            thread::sleep(POLL_INTERVAL);
        }

        debug!(event = %event, path = %path.display(), "acquired event lock");
        Ok(Self { file, path, event })
    }

    #[must_use]
    pub const fn event(&self) -> EventId {
        self.event
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for EventLock {
    fn drop(&mut self) {
        if FileExt::unlock(&self.file).is_ok() {
            debug!(event = %self.event, "released event lock");
        }
    }
}
