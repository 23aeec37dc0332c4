use std::sync::{Arc, PoisonError, RwLock};

use videojob_core::JobResult;
use videojob_logging::{videojob_debug, videojob_info, videojob_warn};

use crate::session::SessionStorage;

/// Session key holding the serialized latest result.
pub const LAST_RESULT_KEY: &str = "video_job.last_result";

/// Latest known result for the active session.
///
/// Readers get an `Arc` snapshot; every write swaps the whole value, so a
/// reader never observes a half-applied merge. Each write is persisted to the
/// session backend before the lock is released; persistence failures are
/// logged and the in-memory value stays authoritative.
pub struct ResultStore {
    current: RwLock<Option<Arc<JobResult>>>,
    storage: Arc<dyn SessionStorage>,
}

impl ResultStore {
    /// Empty store that ignores anything already in `storage`.
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            current: RwLock::new(None),
            storage,
        }
    }

    /// Store initialized from the value persisted in `storage`, if any.
    pub fn load(storage: Arc<dyn SessionStorage>) -> Self {
        let restored = read_persisted(storage.as_ref());
        Self {
            current: RwLock::new(restored.map(Arc::new)),
            storage,
        }
    }

    pub fn get(&self) -> Option<Arc<JobResult>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set(&self, result: JobResult) {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        self.persist(Some(&result));
        *current = Some(Arc::new(result));
    }

    /// Shallow-merge `patch` over the stored value and return the new value.
    /// Against an empty store the patch becomes the value as given.
    pub fn merge(&self, patch: &JobResult) -> Arc<JobResult> {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let merged = match current.as_deref() {
            Some(existing) => existing.merged(patch),
            None => patch.clone(),
        };
        self.persist(Some(&merged));
        let merged = Arc::new(merged);
        *current = Some(merged.clone());
        merged
    }

    /// Discard the stored result, e.g. when a new job starts.
    pub fn clear(&self) {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        self.persist(None);
        *current = None;
    }

    fn persist(&self, value: Option<&JobResult>) {
        let text = match serde_json::to_string(&value) {
            Ok(text) => text,
            Err(err) => {
                videojob_warn!("Failed to serialize session result: {}", err);
                return;
            }
        };
        if let Err(err) = self.storage.set(LAST_RESULT_KEY, &text) {
            videojob_warn!("Failed to persist session result: {}", err);
        }
    }
}

fn read_persisted(storage: &dyn SessionStorage) -> Option<JobResult> {
    let text = match storage.get(LAST_RESULT_KEY) {
        Ok(Some(text)) => text,
        Ok(None) => {
            videojob_debug!("No persisted session result");
            return None;
        }
        Err(err) => {
            videojob_warn!("Failed to read persisted session result: {}", err);
            return None;
        }
    };

    match serde_json::from_str::<Option<JobResult>>(&text) {
        Ok(Some(result)) => {
            videojob_info!(
                "Restored session result for job {}",
                result.job_id.as_deref().unwrap_or("<none>")
            );
            Some(result)
        }
        Ok(None) => None,
        Err(err) => {
            videojob_warn!("Ignoring unreadable session result: {}", err);
            None
        }
    }
}
