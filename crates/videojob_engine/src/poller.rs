use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use videojob_core::{
    update, JobResult, JobStatus, PollEffect, PollError, PollMsg, PollPhase, PollSettings,
    PollState, StatusSnapshot, TransportError,
};
use videojob_logging::{videojob_debug, videojob_info, videojob_warn};

use crate::cancel::SessionCancel;
use crate::client::StatusClient;
use crate::store::ResultStore;

/// Notification delivered to a [`PollSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollEvent {
    /// A status query finished; `status` is `None` when the request failed.
    Progress {
        job_id: String,
        tick: u32,
        status: Option<JobStatus>,
    },
    /// The store now holds this value.
    Updated(Arc<JobResult>),
    /// Terminal outcome, emitted at most once per poll session.
    Done(Result<JobResult, PollError>),
}

pub trait PollSink: Send + Sync {
    fn emit(&self, event: PollEvent);
}

/// Sink for callers that only care about [`PollHandle::wait`].
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl PollSink for NullSink {
    fn emit(&self, _event: PollEvent) {}
}

pub struct ChannelPollSink {
    tx: mpsc::UnboundedSender<PollEvent>,
}

impl ChannelPollSink {
    pub fn new(tx: mpsc::UnboundedSender<PollEvent>) -> Self {
        Self { tx }
    }

    pub fn channel() -> (Self, mpsc::UnboundedReceiver<PollEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl PollSink for ChannelPollSink {
    fn emit(&self, event: PollEvent) {
        let _ = self.tx.send(event);
    }
}

/// Starts poll sessions. Each session runs as its own tokio task, so
/// [`JobPoller::start`] must be called from within a tokio runtime.
#[derive(Clone)]
pub struct JobPoller {
    client: Arc<dyn StatusClient>,
    store: Arc<ResultStore>,
    settings: PollSettings,
}

impl JobPoller {
    pub fn new(
        client: Arc<dyn StatusClient>,
        store: Arc<ResultStore>,
        settings: PollSettings,
    ) -> Self {
        Self {
            client,
            store,
            settings,
        }
    }

    pub fn store(&self) -> &Arc<ResultStore> {
        &self.store
    }

    pub fn settings(&self) -> PollSettings {
        self.settings
    }

    /// Begin a poll session. The store is reset to the session's merge base
    /// (`initial`, or just the job id) before this returns, so nothing from
    /// an earlier job survives into this one.
    pub fn start(
        &self,
        job_id: impl Into<String>,
        initial: Option<JobResult>,
        sink: Arc<dyn PollSink>,
    ) -> PollHandle {
        let (state, effects) = PollState::start(job_id, initial, self.settings);
        let job_id = state.job_id().to_string();
        match state.phase() {
            PollPhase::Idle => videojob_debug!("Nothing to poll: no job id"),
            PollPhase::Succeeded => {
                videojob_info!("Job {} already has a playable video", job_id)
            }
            _ => videojob_info!(
                "Polling job {} every {:?} (ceiling {} ticks)",
                job_id,
                state.settings().interval,
                state.settings().max_ticks
            ),
        }

        match state.latest() {
            Some(base) => self.store.set(base.clone()),
            None => self.store.clear(),
        }

        let cancel = SessionCancel::new();
        let (phase_tx, phase_rx) = watch::channel(state.phase());
        let (done_tx, done_rx) = oneshot::channel();
        let driver = Driver {
            client: self.client.clone(),
            store: self.store.clone(),
            sink,
            cancel: cancel.clone(),
            phase: phase_tx,
        };
        let task = tokio::spawn(driver.run(state, effects, done_tx));

        PollHandle {
            job_id,
            cancel,
            phase: phase_rx,
            done: done_rx,
            task,
        }
    }
}

/// Handle to one running poll session.
///
/// Dropping the handle does not stop the session; call [`PollHandle::cancel`].
pub struct PollHandle {
    job_id: String,
    cancel: SessionCancel,
    phase: watch::Receiver<PollPhase>,
    done: oneshot::Receiver<Result<JobResult, PollError>>,
    task: JoinHandle<()>,
}

impl PollHandle {
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn phase(&self) -> PollPhase {
        *self.phase.borrow()
    }

    /// Stop scheduling ticks. A request already in flight is allowed to
    /// finish but its response is dropped; no store write or sink event
    /// follows the cancellation, even when called from another thread.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Terminal outcome, or `None` if the session was idle or cancelled.
    pub async fn wait(self) -> Option<Result<JobResult, PollError>> {
        self.done.await.ok()
    }

    pub(crate) fn cancel_token(&self) -> SessionCancel {
        self.cancel.clone()
    }
}

struct Driver {
    client: Arc<dyn StatusClient>,
    store: Arc<ResultStore>,
    sink: Arc<dyn PollSink>,
    cancel: SessionCancel,
    phase: watch::Sender<PollPhase>,
}

impl Driver {
    /// Runs effects strictly one after another; the next tick is only
    /// scheduled once the previous response has been fully processed.
    async fn run(
        self,
        mut state: PollState,
        effects: Vec<PollEffect>,
        done_tx: oneshot::Sender<Result<JobResult, PollError>>,
    ) {
        let mut queue: VecDeque<PollEffect> = effects.into();

        while let Some(effect) = queue.pop_front() {
            if self.cancel.is_cancelled() {
                videojob_debug!("Poll of job {} cancelled", state.job_id());
                return;
            }

            let msg = match effect {
                PollEffect::FetchStatus { job_id, tick } => {
                    let response = self.client.fetch_status(&job_id).await;
                    if self.discard_if_cancelled(&job_id) {
                        return;
                    }
                    if self.report_tick(&job_id, tick, &response).is_none() {
                        return;
                    }
                    PollMsg::StatusReceived(response)
                }
                PollEffect::FetchFinalResult { job_id } => {
                    videojob_info!("Job {} completed without a video; fetching final result", job_id);
                    let response = self.client.fetch_final_result(&job_id).await;
                    if self.discard_if_cancelled(&job_id) {
                        return;
                    }
                    if let Err(err) = &response {
                        videojob_warn!("Final result fetch for job {} failed: {}", job_id, err);
                    }
                    PollMsg::FinalResultReceived(response)
                }
                PollEffect::Merge(patch) => {
                    let merged = self.cancel.unless_cancelled(|| {
                        let merged = self.store.merge(&patch);
                        self.sink.emit(PollEvent::Updated(merged.clone()));
                        merged
                    });
                    let Some(merged) = merged else {
                        return self.discard(state.job_id());
                    };
                    PollMsg::Merged(JobResult::clone(&merged))
                }
                PollEffect::Wait(delay) => {
                    tokio::select! {
                        _ = self.cancel.cancelled() => {
                            videojob_debug!("Poll of job {} cancelled while waiting", state.job_id());
                            return;
                        }
                        _ = tokio::time::sleep(delay) => PollMsg::TickDue,
                    }
                }
                PollEffect::Finish(outcome) => {
                    match &outcome {
                        Ok(result) => videojob_info!(
                            "Job {} finished after {} ticks: {}",
                            state.job_id(),
                            state.ticks(),
                            result.video_url.as_deref().unwrap_or_default()
                        ),
                        Err(err) => videojob_warn!("Job {} failed: {}", state.job_id(), err),
                    }
                    let delivered = self.cancel.unless_cancelled(|| {
                        self.sink.emit(PollEvent::Done(outcome.clone()));
                        let _ = done_tx.send(outcome);
                    });
                    if delivered.is_none() {
                        self.discard(state.job_id());
                    }
                    return;
                }
            };

            let (next, effects) = update(state, msg);
            state = next;
            self.phase.send_replace(state.phase());
            queue.extend(effects);
        }
    }

    fn discard_if_cancelled(&self, job_id: &str) -> bool {
        if self.cancel.is_cancelled() {
            self.discard(job_id);
            return true;
        }
        false
    }

    fn discard(&self, job_id: &str) {
        videojob_debug!("Discarding response for cancelled job {}", job_id);
    }

    fn report_tick(
        &self,
        job_id: &str,
        tick: u32,
        response: &Result<StatusSnapshot, TransportError>,
    ) -> Option<()> {
        let status = match response {
            Ok(snapshot) => {
                videojob_debug!("Job {} tick {}: {:?}", job_id, tick, snapshot.status);
                Some(snapshot.status)
            }
            Err(err) => {
                videojob_warn!("Status check {} for job {} failed: {}", tick, job_id, err);
                None
            }
        };
        let progress = PollEvent::Progress {
            job_id: job_id.to_string(),
            tick,
            status,
        };
        let reported = self.cancel.unless_cancelled(|| self.sink.emit(progress));
        if reported.is_none() {
            self.discard(job_id);
        }
        reported
    }
}
