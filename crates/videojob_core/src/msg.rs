use crate::{JobResult, StatusSnapshot, TransportError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollMsg {
    /// The inter-tick delay elapsed.
    TickDue,
    /// Answer to `PollEffect::FetchStatus`.
    StatusReceived(Result<StatusSnapshot, TransportError>),
    /// Answer to `PollEffect::FetchFinalResult`.
    FinalResultReceived(Result<JobResult, TransportError>),
    /// The store applied a `PollEffect::Merge`; carries the merged value.
    Merged(JobResult),
}
