//! Shared store handle and snapshot persistence.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::JoinHandle;

use crate::collection::Collection;
use crate::error::{StoreError, StoreResult};
use crate::models::{Book, BookRequest, User};

/// The three collections, as held in memory and written to the snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Collections {
    #[serde(default)]
    pub users: Collection<User>,
    #[serde(default)]
    pub books: Collection<Book>,
    #[serde(default)]
    pub requests: Collection<BookRequest>,
}

/// Cloneable handle to the document store.
///
/// A store opened from a snapshot path starts unloaded: every accessor fails
/// with [`StoreError::NotInitialized`] until [`Store::load`] completes.
#[derive(Clone)]
pub struct Store {
    inner: Arc<Inner>,
}

struct Inner {
    snapshot_path: Option<PathBuf>,
    state: RwLock<Option<Collections>>,
    /// Bumped by every successful write, under the state write lock.
    generation: AtomicU64,
    /// Generation held by the snapshot on disk.
    flushed: AtomicU64,
    flush_lock: Mutex<()>,
    flush_seq: AtomicU64,
}

impl Store {
    /// Store backed by a snapshot file. Call [`Store::load`] before use.
    pub fn open(snapshot_path: impl Into<PathBuf>) -> Self {
        Self::with_state(Some(snapshot_path.into()), None)
    }

    /// Empty, already-loaded store that never touches the disk.
    pub fn in_memory() -> Self {
        Self::with_state(None, Some(Collections::default()))
    }

    fn with_state(snapshot_path: Option<PathBuf>, state: Option<Collections>) -> Self {
        Self {
            inner: Arc::new(Inner {
                snapshot_path,
                state: RwLock::new(state),
                generation: AtomicU64::new(0),
                flushed: AtomicU64::new(0),
                flush_lock: Mutex::new(()),
                flush_seq: AtomicU64::new(0),
            }),
        }
    }

    pub fn snapshot_path(&self) -> Option<&Path> {
        self.inner.snapshot_path.as_deref()
    }

    pub async fn is_loaded(&self) -> bool {
        self.inner.state.read().await.is_some()
    }

    /// Read the snapshot from disk. A missing file yields empty collections.
    pub async fn load(&self) -> StoreResult<()> {
        let collections = match &self.inner.snapshot_path {
            Some(path) => match tokio::fs::read(path).await {
                Ok(bytes) => {
                    let mut collections: Collections = serde_json::from_slice(&bytes)?;
                    collections.users.repair_next_id();
                    collections.books.repair_next_id();
                    collections.requests.repair_next_id();
                    tracing::info!(
                        path = %path.display(),
                        users = collections.users.len(),
                        books = collections.books.len(),
                        requests = collections.requests.len(),
                        "snapshot loaded"
                    );
                    collections
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    tracing::info!(path = %path.display(), "no snapshot found, starting empty");
                    Collections::default()
                }
                Err(e) => return Err(e.into()),
            },
            None => Collections::default(),
        };

        let mut guard = self.inner.state.write().await;
        *guard = Some(collections);
        let generation = self.inner.generation.load(Ordering::SeqCst);
        self.inner.flushed.store(generation, Ordering::SeqCst);
        Ok(())
    }

    /// Run `f` against a shared view of the collections.
    pub async fn read<R, F>(&self, f: F) -> StoreResult<R>
    where
        F: FnOnce(&Collections) -> R,
    {
        let guard = self.inner.state.read().await;
        let collections = guard.as_ref().ok_or(StoreError::NotInitialized)?;
        Ok(f(collections))
    }

    /// Run `f` with exclusive access to the collections.
    ///
    /// The closure runs atomically with respect to every other store
    /// operation. A successful write marks the store dirty for the next flush.
    pub async fn write<R, E, F>(&self, f: F) -> Result<R, E>
    where
        F: FnOnce(&mut Collections) -> Result<R, E>,
        E: From<StoreError>,
    {
        let mut guard = self.inner.state.write().await;
        let collections = guard.as_mut().ok_or(StoreError::NotInitialized)?;
        let out = f(collections)?;
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        Ok(out)
    }

    /// Whether writes happened since the snapshot on disk was taken.
    pub fn is_dirty(&self) -> bool {
        self.inner.generation.load(Ordering::SeqCst) != self.inner.flushed.load(Ordering::SeqCst)
    }

    /// Write the snapshot if anything changed since the last flush.
    ///
    /// Returns whether a file was written. The snapshot goes to a sibling
    /// temp file first and is renamed over the target. Flushes run one at a
    /// time, and the store only counts as clean once the rename has landed,
    /// so a flush that fails or is cancelled leaves it dirty.
    pub async fn flush(&self) -> StoreResult<bool> {
        let Some(path) = &self.inner.snapshot_path else {
            return Ok(false);
        };
        let _flushing = self.inner.flush_lock.lock().await;
        if !self.is_dirty() {
            return Ok(false);
        }

        let generation = self.write_snapshot(path).await?;
        self.inner.flushed.store(generation, Ordering::SeqCst);
        Ok(true)
    }

    /// Returns the generation the written snapshot holds.
    async fn write_snapshot(&self, path: &Path) -> StoreResult<u64> {
        let (bytes, generation) = {
            let guard = self.inner.state.read().await;
            let collections = guard.as_ref().ok_or(StoreError::NotInitialized)?;
            let generation = self.inner.generation.load(Ordering::SeqCst);
            (serde_json::to_vec(collections)?, generation)
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let seq = self.inner.flush_seq.fetch_add(1, Ordering::SeqCst);
        let tmp = path.with_extension(format!("json.{seq}.tmp"));
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, path).await?;

        tracing::debug!(path = %path.display(), bytes = bytes.len(), generation, "snapshot flushed");
        Ok(generation)
    }

    /// Flush on a fixed interval until [`Autosave::stop`] is called.
    pub fn spawn_autosave(&self, interval: Duration) -> Autosave {
        let store = self.clone();
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = store.flush().await {
                            tracing::error!(error = %e, "autosave failed");
                        }
                    }
                    _ = shutdown_rx.changed() => break,
                }
            }
            tracing::debug!("autosave stopped");
        });
        Autosave {
            shutdown_tx,
            handle,
        }
    }
}

/// Running autosave loop. Dropping it also ends the loop, without waiting
/// for it.
#[derive(Debug)]
pub struct Autosave {
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl Autosave {
    /// Signal the loop and wait for it to exit. A flush already in progress
    /// runs to completion first.
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.handle.await {
            tracing::warn!(error = %e, "autosave task ended abnormally");
        }
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("snapshot_path", &self.inner.snapshot_path)
            .finish_non_exhaustive()
    }
}
