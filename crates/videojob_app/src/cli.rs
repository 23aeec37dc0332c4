use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use log::LevelFilter;
use videojob_engine::{
    ClientSettings, JobResult, PollSettings, DEFAULT_API_URL, DEFAULT_MAX_TICKS,
    DEFAULT_POLL_INTERVAL,
};

use crate::logging::LogDestination;

/// Follow a video generation job until its video is ready.
///
/// Without JOB_ID or --result the job stored in the session directory is
/// resumed. Exit status: 0 success, 2 service error, 3 result unavailable,
/// 4 timed out, 130 interrupted.
#[derive(Debug, Parser)]
#[command(name = "videojob-track", version)]
pub struct Args {
    /// Job identifier returned by the submission call.
    pub job_id: Option<String>,

    /// Submission response (JSON) to start from.
    #[arg(long, value_name = "JSON")]
    pub result: Option<String>,

    /// Root URL of the generation service.
    #[arg(long, env = "VIDEOJOB_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Directory holding the session state used for resuming.
    #[arg(long, env = "VIDEOJOB_SESSION_DIR", default_value = ".videojob_session")]
    pub session_dir: PathBuf,

    /// Delay between status checks, in milliseconds.
    #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL.as_millis() as u64)]
    pub interval_ms: u64,

    /// Number of status checks before giving up.
    #[arg(long, default_value_t = DEFAULT_MAX_TICKS)]
    pub max_ticks: u32,

    #[arg(long, value_enum, default_value_t = LogTarget::Terminal)]
    pub log: LogTarget,

    /// Log every tick.
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogTarget {
    Terminal,
    File,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::File => LogDestination::File,
            LogTarget::Both => LogDestination::Both,
        }
    }
}

impl Args {
    pub fn log_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }

    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            base_url: self.api_url.clone(),
            ..ClientSettings::default()
        }
    }

    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            interval: Duration::from_millis(self.interval_ms),
            max_ticks: self.max_ticks,
        }
    }

    pub fn initial_result(&self) -> anyhow::Result<Option<JobResult>> {
        self.result
            .as_deref()
            .map(|text| serde_json::from_str(text).context("--result is not a valid job result"))
            .transpose()
    }
}
