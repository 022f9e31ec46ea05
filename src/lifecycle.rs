/*!
 * Ownership of transient pipeline resources.
 *
 * Two kinds of resources live only for part of a run:
 * - engine workers, held by a `WorkerGuard` for the duration of one phase
 * - uploaded images, held as `ImageResource` handles issued by an `ImageStore`
 *
 * Both release themselves on every exit path. A guard that is released
 * explicitly terminates its worker inline; a guard that is dropped instead
 * (early return, cancelled future, panic) schedules the termination on the
 * current runtime.
 */

use bytes::Bytes;
use log::{debug, warn};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::engine::{EngineFactory, Recognition, ScriptReport, Worker, WorkerMode};
use crate::errors::EngineError;

/// Scoped ownership of a single engine worker
#[derive(Debug)]
pub struct WorkerGuard {
    worker: Option<Box<dyn Worker>>,
    mode: WorkerMode,
    engine: &'static str,
}

impl WorkerGuard {
    /// Create a worker and take ownership of it
    pub async fn acquire(factory: &dyn EngineFactory, mode: WorkerMode) -> Result<Self, EngineError> {
        let worker = factory.create_worker(mode).await?;
        debug!("Acquired {} worker ({})", factory.name(), mode);

        Ok(Self {
            worker: Some(worker),
            mode,
            engine: factory.name(),
        })
    }

    pub fn mode(&self) -> WorkerMode {
        self.mode
    }

    fn worker(&mut self) -> Result<&mut (dyn Worker + 'static), EngineError> {
        self.worker.as_deref_mut()
            .ok_or_else(|| EngineError::Failed("worker already released".to_string()))
    }

    /// Run a detection call on the guarded worker
    pub async fn detect(&mut self, image: &[u8]) -> Result<ScriptReport, EngineError> {
        self.worker()?.detect(image).await
    }

    /// Run a recognition call on the guarded worker
    pub async fn recognize(&mut self, image: &[u8]) -> Result<Recognition, EngineError> {
        self.worker()?.recognize(image).await
    }

    /// Terminate the worker. Consumes the guard, so it can only happen once.
    pub async fn release(mut self) -> Result<(), EngineError> {
        match self.worker.take() {
            Some(mut worker) => {
                let result = worker.terminate().await;
                debug!("Released {} worker ({})", self.engine, self.mode);
                result
            }
            None => Ok(()),
        }
    }
}

impl Drop for WorkerGuard {
    fn drop(&mut self) {
        let Some(mut worker) = self.worker.take() else {
            return;
        };

        warn!("{} worker ({}) dropped without release, terminating in background", self.engine, self.mode);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let mode = self.mode;
                handle.spawn(async move {
                    if let Err(e) = worker.terminate().await {
                        warn!("Background termination of {} worker failed: {}", mode, e);
                    }
                });
            }
            Err(_) => {
                warn!("No async runtime available, {} worker could not be terminated", self.mode);
            }
        }
    }
}

/// Identifier of an issued image handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageId(u64);

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "image-{}", self.0)
    }
}

#[derive(Debug, Default)]
struct StoreState {
    next_id: u64,
    live: HashSet<ImageId>,
    revoked: u64,
}

/// Issues image handles and tracks which ones are still live
#[derive(Debug, Clone, Default)]
pub struct ImageStore {
    state: Arc<Mutex<StoreState>>,
}

impl ImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new handle over the given image bytes
    pub fn issue(&self, bytes: impl Into<Bytes>) -> ImageResource {
        let mut state = self.state.lock();
        state.next_id += 1;
        let id = ImageId(state.next_id);
        state.live.insert(id);
        drop(state);

        let bytes = bytes.into();
        debug!("Issued {} ({} bytes)", id, bytes.len());
        ImageResource {
            id,
            bytes,
            store: self.clone(),
        }
    }

    /// Number of handles issued and not yet revoked
    pub fn live_handles(&self) -> usize {
        self.state.lock().live.len()
    }

    pub fn is_live(&self, id: ImageId) -> bool {
        self.state.lock().live.contains(&id)
    }

    /// Number of handles revoked so far
    pub fn revoked(&self) -> u64 {
        self.state.lock().revoked
    }

    fn revoke(&self, id: ImageId) {
        let mut state = self.state.lock();
        if state.live.remove(&id) {
            state.revoked += 1;
            debug!("Revoked {}", id);
        }
    }
}

/// Opaque handle over an uploaded image. Dropping it revokes it.
#[derive(Debug)]
pub struct ImageResource {
    id: ImageId,
    bytes: Bytes,
    store: ImageStore,
}

impl ImageResource {
    pub fn id(&self) -> ImageId {
        self.id
    }

    /// Raw image bytes
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl Drop for ImageResource {
    fn drop(&mut self) {
        self.store.revoke(self.id);
    }
}

/// Holds the one image currently selected by the caller
#[derive(Debug)]
pub struct ImageSlot {
    store: ImageStore,
    current: Option<ImageResource>,
}

impl ImageSlot {
    pub fn new(store: ImageStore) -> Self {
        Self { store, current: None }
    }

    /// Revoke the current image, if any, then bind a new one
    pub fn replace(&mut self, bytes: impl Into<Bytes>) -> &ImageResource {
        if let Some(previous) = self.current.take() {
            debug!("Replacing {}", previous.id());
            drop(previous);
        }

        self.current.insert(self.store.issue(bytes))
    }

    /// Currently bound image
    pub fn current(&self) -> Option<&ImageResource> {
        self.current.as_ref()
    }

    /// Revoke the current image
    pub fn clear(&mut self) {
        self.current = None;
    }
}
