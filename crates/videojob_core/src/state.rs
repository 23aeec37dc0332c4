use std::time::Duration;

use crate::{JobResult, JobStatus, PollEffect, TransportError};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);
/// About ten minutes at the default interval.
pub const DEFAULT_MAX_TICKS: u32 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub max_ticks: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_ticks: DEFAULT_MAX_TICKS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollPhase {
    Idle,
    Polling,
    Succeeded,
    Failed,
    TimedOut,
}

impl PollPhase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            PollPhase::Succeeded | PollPhase::Failed | PollPhase::TimedOut
        )
    }
}

/// What the next `PollMsg::Merged` answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MergeOrigin {
    Snapshot { completed: bool },
    FinalResult,
}

/// State of one poll session for a single job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollState {
    pub(crate) job_id: String,
    pub(crate) phase: PollPhase,
    pub(crate) settings: PollSettings,
    pub(crate) ticks: u32,
    pub(crate) latest: Option<JobResult>,
    pub(crate) pending_merge: Option<MergeOrigin>,
    pub(crate) last_status: Option<JobStatus>,
    pub(crate) last_error: Option<TransportError>,
}

impl PollState {
    /// Decide whether a job needs polling at all and return the first effects.
    ///
    /// A playable initial result finishes immediately; a blank job id leaves
    /// the session idle with nothing to do.
    pub fn start(
        job_id: impl Into<String>,
        initial: Option<JobResult>,
        mut settings: PollSettings,
    ) -> (Self, Vec<PollEffect>) {
        settings.max_ticks = settings.max_ticks.max(1);
        let job_id = job_id.into().trim().to_string();
        let mut state = Self {
            job_id,
            phase: PollPhase::Idle,
            settings,
            ticks: 0,
            latest: None,
            pending_merge: None,
            last_status: None,
            last_error: None,
        };

        let base = state.merge_base(initial);
        match base {
            Some(result) if result.has_playable_video() => {
                state.phase = PollPhase::Succeeded;
                state.latest = Some(result.clone());
                (state, vec![PollEffect::Finish(Ok(result))])
            }
            base if state.job_id.is_empty() => {
                state.latest = base;
                (state, Vec::new())
            }
            base => {
                state.latest = base;
                state.phase = PollPhase::Polling;
                let first = state.next_tick();
                (state, vec![first])
            }
        }
    }

    /// The value every later merge applies over: the submission response, or
    /// a bare record of the job when there is none. The tracked id wins over
    /// whatever id the response carries.
    fn merge_base(&self, initial: Option<JobResult>) -> Option<JobResult> {
        if self.job_id.is_empty() {
            return initial;
        }
        let mut base = initial.unwrap_or_default();
        base.job_id = Some(self.job_id.clone());
        Some(base)
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn phase(&self) -> PollPhase {
        self.phase
    }

    pub fn settings(&self) -> PollSettings {
        self.settings
    }

    /// Number of status queries issued so far.
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    /// Latest merged result known to this session; right after
    /// [`PollState::start`] this is the merge base the store must hold.
    pub fn latest(&self) -> Option<&JobResult> {
        self.latest.as_ref()
    }

    pub fn last_status(&self) -> Option<JobStatus> {
        self.last_status
    }

    pub fn last_error(&self) -> Option<&TransportError> {
        self.last_error.as_ref()
    }

    pub(crate) fn next_tick(&mut self) -> PollEffect {
        self.ticks += 1;
        PollEffect::FetchStatus {
            job_id: self.job_id.clone(),
            tick: self.ticks,
        }
    }
}
