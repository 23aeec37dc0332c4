//! Videojob engine: status transport, session persistence and the poll driver.
mod cancel;
mod client;
mod persist;
mod poller;
mod session;
mod store;
mod tracker;

pub use client::{ClientSettings, ReqwestStatusClient, StatusClient, DEFAULT_API_URL};
pub use persist::{ensure_dir, AtomicFileWriter, PersistError};
pub use poller::{ChannelPollSink, JobPoller, NullSink, PollEvent, PollHandle, PollSink};
pub use session::{FileSessionStorage, MemorySessionStorage, SessionStorage, StorageError};
pub use store::{ResultStore, LAST_RESULT_KEY};
pub use tracker::SessionTracker;

pub use videojob_core::{
    JobResult, JobStatus, PollError, PollPhase, PollSettings, SourceDocument, StatusSnapshot,
    TransportError, TransportFailure, DEFAULT_MAX_TICKS, DEFAULT_POLL_INTERVAL,
};
