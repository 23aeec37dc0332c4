#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

use tokio::sync::Notify;
use videojob_engine::{
    JobPoller, JobResult, JobStatus, MemorySessionStorage, PollEvent, PollSettings, PollSink,
    ResultStore, SessionStorage, StatusClient, StatusSnapshot, StorageError, TransportError,
    TransportFailure,
};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(videojob_logging::initialize_for_tests);
}

pub type StatusReply = Result<StatusSnapshot, TransportError>;
pub type ResultReply = Result<JobResult, TransportError>;

pub fn pending() -> StatusReply {
    Ok(StatusSnapshot::new(JobStatus::Pending))
}

pub fn completed_with_video(url: &str) -> StatusReply {
    Ok(StatusSnapshot::new(JobStatus::Completed).with_result(JobResult {
        video_url: Some(url.to_string()),
        ..JobResult::default()
    }))
}

pub fn network_down() -> StatusReply {
    Err(TransportError::new(TransportFailure::Network, "connection refused"))
}

/// Gate that parks one specific status call until released.
pub struct Gate {
    pub call: u32,
    pub entered: Notify,
    pub release: Notify,
}

/// Replays scripted replies per job; an exhausted script answers `pending`.
#[derive(Default)]
pub struct ScriptedClient {
    statuses: Mutex<HashMap<String, VecDeque<StatusReply>>>,
    finals: Mutex<HashMap<String, VecDeque<ResultReply>>>,
    status_calls: Mutex<HashMap<String, u32>>,
    final_calls: AtomicU32,
    gate: Option<Arc<Gate>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_gate(mut self, call: u32) -> (Self, Arc<Gate>) {
        let gate = Arc::new(Gate {
            call,
            entered: Notify::new(),
            release: Notify::new(),
        });
        self.gate = Some(gate.clone());
        (self, gate)
    }

    pub fn script_status(self, job_id: &str, replies: Vec<StatusReply>) -> Self {
        self.statuses
            .lock()
            .unwrap()
            .entry(job_id.to_string())
            .or_default()
            .extend(replies);
        self
    }

    pub fn script_final(self, job_id: &str, replies: Vec<ResultReply>) -> Self {
        self.finals
            .lock()
            .unwrap()
            .entry(job_id.to_string())
            .or_default()
            .extend(replies);
        self
    }

    pub fn status_calls(&self, job_id: &str) -> u32 {
        self.status_calls
            .lock()
            .unwrap()
            .get(job_id)
            .copied()
            .unwrap_or(0)
    }

    pub fn final_calls(&self) -> u32 {
        self.final_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl StatusClient for ScriptedClient {
    async fn fetch_status(&self, job_id: &str) -> Result<StatusSnapshot, TransportError> {
        let call = {
            let mut calls = self.status_calls.lock().unwrap();
            let count = calls.entry(job_id.to_string()).or_insert(0);
            *count += 1;
            *count
        };
        let reply = self
            .statuses
            .lock()
            .unwrap()
            .get_mut(job_id)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(pending);

        if let Some(gate) = self.gate.as_ref().filter(|gate| gate.call == call) {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        reply
    }

    async fn fetch_final_result(&self, job_id: &str) -> Result<JobResult, TransportError> {
        self.final_calls.fetch_add(1, Ordering::SeqCst);
        self.finals
            .lock()
            .unwrap()
            .get_mut(job_id)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Ok(JobResult::default()))
    }
}

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<PollEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<PollEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn done_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|event| matches!(event, PollEvent::Done(_)))
            .count()
    }
}

impl PollSink for RecordingSink {
    fn emit(&self, event: PollEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Memory storage that counts writes and can be told to fail them.
#[derive(Default)]
pub struct CountingStorage {
    inner: MemorySessionStorage,
    writes: AtomicUsize,
    pub fail_writes: std::sync::atomic::AtomicBool,
}

impl CountingStorage {
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl SessionStorage for CountingStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("quota exceeded".into()));
        }
        self.inner.set(key, value)
    }
}

pub fn poller_with(client: Arc<ScriptedClient>, storage: Arc<CountingStorage>) -> JobPoller {
    let store = Arc::new(ResultStore::load(storage));
    JobPoller::new(client, store, PollSettings::default())
}
