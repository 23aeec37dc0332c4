use std::sync::{Arc, Mutex, PoisonError};

use videojob_core::JobResult;
use videojob_logging::{videojob_debug, videojob_info};

use crate::cancel::SessionCancel;
use crate::poller::{JobPoller, PollHandle, PollSink};

/// Consumer-facing entry point: tracks at most one job per session.
///
/// Starting a new job cancels the previous session and discards its stored
/// result, so a stale poll can never deliver into the new one.
pub struct SessionTracker {
    poller: JobPoller,
    active: Mutex<Option<SessionCancel>>,
}

impl SessionTracker {
    pub fn new(poller: JobPoller) -> Self {
        Self {
            poller,
            active: Mutex::new(None),
        }
    }

    pub fn poller(&self) -> &JobPoller {
        &self.poller
    }

    /// Latest result known for the session.
    pub fn current(&self) -> Option<Arc<JobResult>> {
        self.poller.store().get()
    }

    pub fn start_tracking(
        &self,
        job_id: impl Into<String>,
        initial: Option<JobResult>,
        sink: Arc<dyn PollSink>,
    ) -> PollHandle {
        self.cancel();
        self.activate(self.poller.start(job_id, initial, sink))
    }

    /// Track a submission response; the job id, if any, comes from the result.
    pub fn track_submission(&self, result: JobResult, sink: Arc<dyn PollSink>) -> PollHandle {
        let job_id = result.job_id.clone().unwrap_or_default();
        self.start_tracking(job_id, Some(result), sink)
    }

    /// Pick up the job persisted in session storage, e.g. after a reload.
    /// Returns `None` when the session holds nothing to track.
    pub fn resume(&self, sink: Arc<dyn PollSink>) -> Option<PollHandle> {
        let stored = self.current()?;
        let job_id = stored.job_id.clone().unwrap_or_default();
        if job_id.trim().is_empty() && !stored.has_playable_video() {
            videojob_debug!("Stored result has no job id; nothing to resume");
            return None;
        }

        videojob_info!("Resuming job {} from session", job_id);
        self.cancel();
        let handle = self
            .poller
            .start(job_id, Some(JobResult::clone(&stored)), sink);
        Some(self.activate(handle))
    }

    /// Cancel the active session, if any.
    pub fn cancel(&self) {
        let previous = self
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(token) = previous {
            token.cancel();
        }
    }

    fn activate(&self, handle: PollHandle) -> PollHandle {
        *self.active.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle.cancel_token());
        handle
    }
}
