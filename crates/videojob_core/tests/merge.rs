use pretty_assertions::assert_eq;
use videojob_core::{JobResult, JobStatus, StatusSnapshot};

fn sample() -> JobResult {
    JobResult {
        job_id: Some("job-1".into()),
        status: Some(JobStatus::Processing),
        script: Some("Photosynthesis in sixty seconds".into()),
        audio_url: Some("https://blob.example/audio/job-1_es.mp3".into()),
        video_url: None,
        source_document_name: Some("job-1_notes.pdf".into()),
        source_document_ref: Some("https://blob.example/files/job-1_notes.pdf".into()),
        ..JobResult::default()
    }
}

#[test]
fn merge_overrides_present_fields_only() {
    let patch = JobResult {
        status: Some(JobStatus::Completed),
        video_url: Some("https://blob.example/videos/job-1.mp4".into()),
        ..JobResult::default()
    };

    let merged = sample().merged(&patch);

    assert_eq!(merged.status, Some(JobStatus::Completed));
    assert_eq!(
        merged.video_url.as_deref(),
        Some("https://blob.example/videos/job-1.mp4")
    );
    assert_eq!(merged.script, sample().script);
    assert_eq!(merged.audio_url, sample().audio_url);
    assert_eq!(merged.source_document_ref, sample().source_document_ref);
}

#[test]
fn merge_with_empty_patch_is_identity() {
    let base = sample();
    assert_eq!(base.merged(&JobResult::default()), base);
}

#[test]
fn merge_is_idempotent() {
    let patch = JobResult {
        script: Some("rewritten".into()),
        video_url: Some(String::new()),
        topic: Some("biology".into()),
        ..JobResult::default()
    };

    let once = sample().merged(&patch);
    let twice = once.merged(&patch);
    assert_eq!(twice, once);
}

#[test]
fn merge_into_empty_keeps_missing_fields_missing() {
    let patch = JobResult {
        audio_url: Some("a".into()),
        ..JobResult::default()
    };
    let merged = JobResult::default().merged(&patch);
    assert_eq!(merged, patch);
    assert_eq!(merged.script, None);
}

#[test]
fn result_uses_backend_wire_names() {
    let json = r#"{
        "job_id": "abc",
        "status": "processing",
        "script": "hello",
        "audio_url": "https://blob.example/a.mp3",
        "video_url": null,
        "pdf_name": "abc_doc.pdf",
        "pdf_blob_url": "https://blob.example/files/abc_doc.pdf"
    }"#;

    let result: JobResult = serde_json::from_str(json).unwrap();
    assert_eq!(result.job_id.as_deref(), Some("abc"));
    assert_eq!(result.status, Some(JobStatus::Processing));
    assert_eq!(result.video_url, None);
    assert_eq!(result.source_document_name.as_deref(), Some("abc_doc.pdf"));
    assert!(!result.has_playable_video());

    let back = serde_json::to_value(&result).unwrap();
    assert_eq!(back["pdf_blob_url"], "https://blob.example/files/abc_doc.pdf");
    assert!(back.get("video_url").is_none());
    assert!(back.get("topic").is_none());
}

#[test]
fn snapshot_tolerates_unknown_status_and_missing_fields() {
    let snapshot: StatusSnapshot = serde_json::from_str(r#"{"status":"queued"}"#).unwrap();
    assert_eq!(snapshot.status, JobStatus::Unknown);
    assert_eq!(snapshot.result, None);
    assert_eq!(snapshot.error, None);

    let snapshot: StatusSnapshot = serde_json::from_str(
        r#"{"status":"completed","result":{"script":"s","audio_url":"a","video_url":"null"}}"#,
    )
    .unwrap();
    assert_eq!(snapshot.status, JobStatus::Completed);
    let result = snapshot.result.unwrap();
    assert_eq!(result.video_url.as_deref(), Some("null"));
    assert!(!result.has_playable_video());
}
