use serde::{Deserialize, Serialize};

/// Lifecycle status reported by the generation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Error,
    /// Any status string this client does not recognize.
    #[default]
    #[serde(other)]
    Unknown,
}

/// The user-facing artifact of a video generation job.
///
/// Every field is optional: a result may be built up from a submission
/// response, a persisted session value and any number of partial snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JobResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(rename = "pdf_name", skip_serializing_if = "Option::is_none")]
    pub source_document_name: Option<String>,
    #[serde(rename = "pdf_blob_url", skip_serializing_if = "Option::is_none")]
    pub source_document_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

/// Uploaded input document offered for download next to the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceDocument<'a> {
    pub name: &'a str,
    pub location: &'a str,
}

impl JobResult {
    /// Result carrying only a job identifier.
    pub fn for_job(job_id: impl Into<String>) -> Self {
        Self {
            job_id: Some(job_id.into()),
            ..Self::default()
        }
    }

    /// True once the final video can be played back.
    pub fn has_playable_video(&self) -> bool {
        is_playable_video_url(self.video_url.as_deref())
    }

    /// Shallow override: every field set in `patch` wins, unset fields keep
    /// their current value.
    pub fn merged(&self, patch: &JobResult) -> JobResult {
        JobResult {
            job_id: pick(&patch.job_id, &self.job_id),
            status: patch.status.or(self.status),
            message: pick(&patch.message, &self.message),
            script: pick(&patch.script, &self.script),
            audio_url: pick(&patch.audio_url, &self.audio_url),
            video_url: pick(&patch.video_url, &self.video_url),
            source_document_name: pick(&patch.source_document_name, &self.source_document_name),
            source_document_ref: pick(&patch.source_document_ref, &self.source_document_ref),
            topic: pick(&patch.topic, &self.topic),
        }
    }

    /// Download affordance for the source document; needs both name and location.
    pub fn source_document(&self) -> Option<SourceDocument<'_>> {
        match (&self.source_document_name, &self.source_document_ref) {
            (Some(name), Some(location)) if !name.is_empty() && !location.is_empty() => {
                Some(SourceDocument {
                    name: name.as_str(),
                    location: location.as_str(),
                })
            }
            _ => None,
        }
    }
}

fn pick(patch: &Option<String>, current: &Option<String>) -> Option<String> {
    patch.as_ref().or(current.as_ref()).cloned()
}

/// The backend reports "not ready yet" as a missing field, an empty string or
/// the literal text `null`; none of those is a failure.
pub fn is_playable_video_url(url: Option<&str>) -> bool {
    match url.map(str::trim) {
        None | Some("") | Some("null") => false,
        Some(_) => true,
    }
}
