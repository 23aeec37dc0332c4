use std::fmt::Write as _;

use videojob_engine::{JobResult, JobStatus, PollError, PollEvent};

pub fn status_label(status: JobStatus) -> &'static str {
    match status {
        JobStatus::Pending => "pending",
        JobStatus::Processing => "processing",
        JobStatus::Completed => "completed",
        JobStatus::Error => "error",
        JobStatus::Unknown => "unknown",
    }
}

/// One line per event; `None` for events that are reported elsewhere.
pub fn event_line(event: &PollEvent) -> Option<String> {
    match event {
        PollEvent::Progress {
            job_id,
            tick,
            status: Some(status),
        } => Some(format!("[{tick:>3}] {job_id}: {}", status_label(*status))),
        PollEvent::Progress {
            job_id,
            tick,
            status: None,
        } => Some(format!("[{tick:>3}] {job_id}: status check failed, retrying")),
        PollEvent::Updated(result) => Some(format!("      {}", artifacts(result))),
        PollEvent::Done(_) => None,
    }
}

fn artifacts(result: &JobResult) -> String {
    let mut ready = Vec::new();
    if result.script.as_deref().is_some_and(|s| !s.trim().is_empty()) {
        ready.push("script");
    }
    if result.audio_url.as_deref().is_some_and(|s| !s.trim().is_empty()) {
        ready.push("audio");
    }
    if result.has_playable_video() {
        ready.push("video");
    }
    if ready.is_empty() {
        "nothing ready yet".to_string()
    } else {
        format!("ready: {}", ready.join(", "))
    }
}

pub fn result_summary(result: &JobResult) -> String {
    let mut out = String::new();
    if let Some(job_id) = &result.job_id {
        let _ = writeln!(out, "Job:    {job_id}");
    }
    if let Some(topic) = &result.topic {
        let _ = writeln!(out, "Topic:  {topic}");
    }
    if let Some(audio) = &result.audio_url {
        let _ = writeln!(out, "Audio:  {audio}");
    }
    if let Some(video) = result.video_url.as_deref().filter(|_| result.has_playable_video()) {
        let _ = writeln!(out, "Video:  {video}");
    }
    if let Some(document) = result.source_document() {
        let _ = writeln!(out, "Source: {} ({})", document.name, document.location);
    }
    if let Some(message) = &result.message {
        let _ = writeln!(out, "Note:   {message}");
    }
    if let Some(script) = &result.script {
        let _ = writeln!(out, "\n{script}");
    }
    out
}

pub fn failure_exit_code(err: &PollError) -> u8 {
    match err {
        PollError::ServerReported { .. } => 2,
        PollError::IncompleteResult { .. } => 3,
        PollError::Timeout { .. } => 4,
    }
}
