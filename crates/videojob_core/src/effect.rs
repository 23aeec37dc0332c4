use std::time::Duration;

use crate::{JobResult, PollError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollEffect {
    FetchStatus { job_id: String, tick: u32 },
    FetchFinalResult { job_id: String },
    /// Merge the patch into the result store and answer with `PollMsg::Merged`.
    Merge(JobResult),
    /// Sleep, then answer with `PollMsg::TickDue`.
    Wait(Duration),
    /// Terminal outcome; delivered exactly once per poll session.
    Finish(Result<JobResult, PollError>),
}
