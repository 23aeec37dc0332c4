//! Videojob core: data model and the pure poll state machine.
mod effect;
mod error;
mod msg;
mod result;
mod snapshot;
mod state;
mod update;

pub use effect::PollEffect;
pub use error::{PollError, TransportError, TransportFailure};
pub use msg::PollMsg;
pub use result::{is_playable_video_url, JobResult, JobStatus, SourceDocument};
pub use snapshot::StatusSnapshot;
pub use state::{PollPhase, PollSettings, PollState, DEFAULT_MAX_TICKS, DEFAULT_POLL_INTERVAL};
pub use update::update;
