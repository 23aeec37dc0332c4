use crate::state::MergeOrigin;
use crate::{
    JobResult, JobStatus, PollEffect, PollError, PollMsg, PollPhase, PollState, StatusSnapshot,
    TransportError,
};

const DEFAULT_SERVER_ERROR: &str = "error generating video";

/// Pure update function: applies a message to the poll state and returns the
/// effects to run next. Messages arriving outside `Polling` are ignored.
pub fn update(mut state: PollState, msg: PollMsg) -> (PollState, Vec<PollEffect>) {
    if state.phase != PollPhase::Polling {
        return (state, Vec::new());
    }

    let effects = match msg {
        PollMsg::TickDue => vec![state.next_tick()],
        PollMsg::StatusReceived(Ok(snapshot)) => state.apply_snapshot(snapshot),
        PollMsg::StatusReceived(Err(err)) => state.retry_after(err),
        PollMsg::FinalResultReceived(Ok(result)) => {
            state.pending_merge = Some(MergeOrigin::FinalResult);
            vec![PollEffect::Merge(state.pin_job_id(result))]
        }
        PollMsg::FinalResultReceived(Err(err)) => state.retry_after(err),
        PollMsg::Merged(result) => state.apply_merged(result),
    };

    (state, effects)
}

impl PollState {
    fn apply_snapshot(&mut self, snapshot: StatusSnapshot) -> Vec<PollEffect> {
        self.last_status = Some(snapshot.status);
        self.last_error = None;

        if snapshot.status == JobStatus::Error {
            let message = snapshot
                .error
                .filter(|text| !text.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SERVER_ERROR.to_string());
            return self.finish(Err(PollError::ServerReported { message }));
        }

        let completed = snapshot.status == JobStatus::Completed;
        match snapshot.result {
            Some(patch) => {
                self.pending_merge = Some(MergeOrigin::Snapshot { completed });
                vec![PollEffect::Merge(self.pin_job_id(patch))]
            }
            None if completed => self.fetch_final_result(),
            None => self.wait_or_time_out(),
        }
    }

    fn apply_merged(&mut self, merged: JobResult) -> Vec<PollEffect> {
        let origin = self.pending_merge.take();
        self.latest = Some(merged.clone());

        if merged.has_playable_video() {
            return self.finish(Ok(merged));
        }

        match origin {
            Some(MergeOrigin::Snapshot { completed: true }) => self.fetch_final_result(),
            Some(MergeOrigin::Snapshot { completed: false }) => self.wait_or_time_out(),
            Some(MergeOrigin::FinalResult) => self.finish(Err(PollError::IncompleteResult {
                job_id: self.job_id.clone(),
            })),
            // Nothing was requested; keep whatever is already scheduled.
            None => Vec::new(),
        }
    }

    fn retry_after(&mut self, err: TransportError) -> Vec<PollEffect> {
        self.last_error = Some(err);
        self.wait_or_time_out()
    }

    fn fetch_final_result(&mut self) -> Vec<PollEffect> {
        vec![PollEffect::FetchFinalResult {
            job_id: self.job_id.clone(),
        }]
    }

    fn wait_or_time_out(&mut self) -> Vec<PollEffect> {
        if self.ticks >= self.settings.max_ticks {
            let err = PollError::Timeout {
                job_id: self.job_id.clone(),
                ticks: self.ticks,
                last_error: self.last_error.as_ref().map(ToString::to_string),
            };
            return self.finish(Err(err));
        }
        vec![PollEffect::Wait(self.settings.interval)]
    }

    fn finish(&mut self, outcome: Result<JobResult, PollError>) -> Vec<PollEffect> {
        self.phase = match &outcome {
            Ok(_) => PollPhase::Succeeded,
            Err(PollError::Timeout { .. }) => PollPhase::TimedOut,
            Err(_) => PollPhase::Failed,
        };
        vec![PollEffect::Finish(outcome)]
    }

    /// The tracked job id wins over whatever a patch carries.
    fn pin_job_id(&self, mut patch: JobResult) -> JobResult {
        patch.job_id = Some(self.job_id.clone());
        patch
    }
}
