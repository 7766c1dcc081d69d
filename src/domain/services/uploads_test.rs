use std::sync::Arc;
use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use tokio::sync::mpsc;
use tokio::time;
use tokio::time::Instant;

use super::UploadSimulator;
use super::UploadTimings;
use crate::domain::models::Document;
use crate::domain::models::DocumentStatus;
use crate::domain::models::Event;
use crate::domain::models::FileUpload;
use crate::domain::models::SubmitError;
use crate::domain::models::UploadEvent;
use crate::domain::models::ValidationError;
use crate::domain::services::testing::FixedClock;
use crate::domain::services::testing::ScriptedRandom;
use crate::domain::services::DocumentStore;

fn pdf_document(id: &str) -> Document {
    return Document::new(id, "12th Marksheet", &["PDF"], 5.0);
}

fn simulator(
    documents: Vec<Document>,
    random: ScriptedRandom,
) -> (UploadSimulator, mpsc::UnboundedReceiver<Event>) {
    let (tx, rx) = mpsc::unbounded_channel::<Event>();
    let simulator = UploadSimulator::new(DocumentStore::new(documents), UploadTimings::default())
        .with_random(Arc::new(random))
        .with_clock(Arc::new(FixedClock::new(2026, 2, 20)))
        .with_events(tx);

    return (simulator, rx);
}

async fn next_upload_event(rx: &mut mpsc::UnboundedReceiver<Event>) -> Result<UploadEvent> {
    match rx.recv().await {
        Some(Event::Upload(event)) => return Ok(event),
        _ => bail!("Wrong event from recv"),
    }
}

async fn events_until_settled(rx: &mut mpsc::UnboundedReceiver<Event>) -> Result<Vec<UploadEvent>> {
    let mut events = vec![];
    loop {
        let event = next_upload_event(rx).await?;
        let settled = matches!(event, UploadEvent::Settled { .. });
        events.push(event);
        if settled {
            return Ok(events);
        }
    }
}

fn progress_values(events: &[UploadEvent]) -> Vec<f64> {
    return events
        .iter()
        .filter_map(|event| {
            if let UploadEvent::Progress { progress, .. } = event {
                return Some(*progress);
            }
            return None;
        })
        .collect();
}

#[tokio::test(start_paused = true)]
async fn it_fails_for_unknown_document() {
    let (simulator, _rx) = simulator(vec![], ScriptedRandom::constant(0.5));
    let res = simulator.submit("doc-404", FileUpload::with_size_mb("a.pdf", 1.0));

    assert_eq!(
        res.err(),
        Some(SubmitError::UnknownDocument("doc-404".to_string()))
    );
}

#[tokio::test(start_paused = true)]
async fn it_rejects_wrong_type_without_touching_document() {
    let (simulator, mut rx) = simulator(vec![pdf_document("doc-2")], ScriptedRandom::constant(0.5));
    let before = simulator.store().get("doc-2").unwrap();

    let err = simulator
        .submit("doc-2", FileUpload::with_size_mb("marks.jpg", 1.0))
        .err()
        .unwrap();

    assert!(matches!(
        err,
        SubmitError::Validation(ValidationError::InvalidType { .. })
    ));
    assert!(err.to_string().contains("Accepted: PDF"));
    assert_eq!(simulator.store().get("doc-2").unwrap(), before);
    assert_eq!(before.status, DocumentStatus::NotUploaded);
    assert!(!simulator.is_active("doc-2"));
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn it_rejects_oversized_file() {
    let (simulator, _rx) = simulator(vec![pdf_document("doc-2")], ScriptedRandom::constant(0.5));
    let err = simulator
        .submit("doc-2", FileUpload::with_size_mb("marks.pdf", 5.01))
        .err()
        .unwrap();

    assert_eq!(err.to_string(), "File size exceeds 5MB limit.");
    assert_eq!(
        simulator.store().get("doc-2").unwrap().status,
        DocumentStatus::NotUploaded
    );
}

#[tokio::test(start_paused = true)]
async fn it_runs_the_full_lifecycle() -> Result<()> {
    // Eight ticks of 12.5%, a 4000ms review and a passing review draw.
    let mut script = vec![0.5; 8];
    script.push(0.5);
    script.push(0.3);
    let (simulator, mut rx) = simulator(vec![pdf_document("doc-2")], ScriptedRandom::new(script));

    let started_at = Instant::now();
    simulator.submit("doc-2", FileUpload::with_size_mb("marks.pdf", 1.2))?;

    let doc = simulator.store().get("doc-2").unwrap();
    assert!(doc.is_uploading());
    assert_eq!(doc.file_name, Some("marks.pdf".to_string()));
    assert_eq!(doc.file_type, Some("PDF".to_string()));

    assert_eq!(
        next_upload_event(&mut rx).await?,
        UploadEvent::Started {
            document_id: "doc-2".to_string(),
            file_name: "marks.pdf".to_string(),
        }
    );

    let mut events = vec![];
    let mut under_review_at = None;
    loop {
        let event = next_upload_event(&mut rx).await?;
        if let UploadEvent::UnderReview { .. } = event {
            under_review_at = Some(Instant::now());
            let doc = simulator.store().get("doc-2").unwrap();
            assert_eq!(doc.status, DocumentStatus::UnderReview);
            assert_eq!(doc.upload_progress, None);
            assert_eq!(doc.last_updated, Some(FixedClock::new(2026, 2, 20).date()));
        }
        let settled = matches!(event, UploadEvent::Settled { .. });
        events.push(event);
        if settled {
            break;
        }
    }
    let settled_at = Instant::now();

    assert_eq!(
        progress_values(&events),
        vec![12.5, 25.0, 37.5, 50.0, 62.5, 75.0, 87.5, 100.0]
    );

    let under_review_at = under_review_at.unwrap();
    assert!(under_review_at - started_at >= Duration::from_millis(2100));
    assert!(under_review_at - started_at < Duration::from_millis(2200));
    assert!(settled_at - under_review_at >= Duration::from_millis(4000));
    assert!(settled_at - under_review_at <= Duration::from_millis(5500));

    assert_eq!(
        events.last().unwrap(),
        &UploadEvent::Settled {
            document_id: "doc-2".to_string(),
            status: DocumentStatus::Verified,
        }
    );
    let doc = simulator.store().get("doc-2").unwrap();
    assert_eq!(doc.status, DocumentStatus::Verified);
    assert!(!doc.is_uploading());

    time::sleep(Duration::from_millis(1)).await;
    assert!(!simulator.is_active("doc-2"));

    return Ok(());
}

#[tokio::test(start_paused = true)]
async fn it_caps_progress_at_one_hundred() -> Result<()> {
    let script = vec![0.99, 0.99, 0.99, 0.99, 0.99, 0.0, 0.0];
    let (simulator, mut rx) = simulator(vec![pdf_document("doc-2")], ScriptedRandom::new(script));

    simulator.submit("doc-2", FileUpload::with_size_mb("marks.pdf", 1.0))?;
    let events = events_until_settled(&mut rx).await?;
    let progress = progress_values(&events);

    assert_eq!(progress.len(), 5);
    assert_eq!(*progress.last().unwrap(), 100.0);
    assert!(progress.windows(2).all(|pair| return pair[0] < pair[1]));

    return Ok(());
}

#[tokio::test(start_paused = true)]
async fn it_settles_as_uploaded_when_review_draw_fails() -> Result<()> {
    let mut script = vec![0.9; 5];
    script.push(0.0);
    script.push(0.95);
    let (simulator, mut rx) = simulator(vec![pdf_document("doc-2")], ScriptedRandom::new(script));

    simulator.submit("doc-2", FileUpload::with_size_mb("marks.pdf", 1.0))?;
    let events = events_until_settled(&mut rx).await?;

    assert_eq!(
        events.last().unwrap(),
        &UploadEvent::Settled {
            document_id: "doc-2".to_string(),
            status: DocumentStatus::Uploaded,
        }
    );
    assert_eq!(
        simulator.store().get("doc-2").unwrap().status,
        DocumentStatus::Uploaded
    );

    return Ok(());
}

#[tokio::test(start_paused = true)]
async fn it_only_settles_on_verified_or_uploaded() -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
    let documents = (1..=6)
        .map(|idx| return pdf_document(&format!("doc-{idx}")))
        .collect::<Vec<Document>>();
    let simulator =
        UploadSimulator::new(DocumentStore::new(documents), UploadTimings::default()).with_events(tx);

    for idx in 1..=6 {
        simulator.submit(&format!("doc-{idx}"), FileUpload::with_size_mb("a.pdf", 1.0))?;
    }

    let mut settled = 0;
    while settled < 6 {
        if let UploadEvent::Settled { status, .. } = next_upload_event(&mut rx).await? {
            assert!([DocumentStatus::Verified, DocumentStatus::Uploaded].contains(&status));
            settled += 1;
        }
    }

    for doc in simulator.store().list() {
        assert!([DocumentStatus::Verified, DocumentStatus::Uploaded].contains(&doc.status));
        assert!(doc.last_updated.is_some());
    }

    return Ok(());
}

#[tokio::test(start_paused = true)]
async fn it_replaces_an_in_flight_upload() -> Result<()> {
    let (simulator, mut rx) = simulator(vec![pdf_document("doc-2")], ScriptedRandom::constant(0.5));

    simulator.submit("doc-2", FileUpload::with_size_mb("first.pdf", 1.0))?;
    time::sleep(Duration::from_millis(450)).await;
    assert_eq!(
        simulator.store().get("doc-2").unwrap().upload_progress,
        Some(25.0)
    );

    simulator.submit("doc-2", FileUpload::with_size_mb("second.pdf", 2.0))?;
    let events = events_until_settled(&mut rx).await?;

    let cancelled_at = events
        .iter()
        .position(|event| return matches!(event, UploadEvent::Cancelled { .. }))
        .unwrap();
    assert_eq!(
        events[cancelled_at + 1],
        UploadEvent::Started {
            document_id: "doc-2".to_string(),
            file_name: "second.pdf".to_string(),
        }
    );
    // The second run starts again from zero.
    assert_eq!(
        progress_values(&events[cancelled_at..]),
        vec![12.5, 25.0, 37.5, 50.0, 62.5, 75.0, 87.5, 100.0]
    );

    time::sleep(Duration::from_secs(30)).await;
    assert!(rx.try_recv().is_err());

    let doc = simulator.store().get("doc-2").unwrap();
    assert_eq!(doc.file_name, Some("second.pdf".to_string()));
    assert_eq!(doc.file_size_mb, Some(2.0));
    assert_eq!(doc.status, DocumentStatus::Verified);

    return Ok(());
}

#[tokio::test(start_paused = true)]
async fn it_keeps_running_upload_when_new_file_is_invalid() -> Result<()> {
    let (simulator, mut rx) = simulator(vec![pdf_document("doc-2")], ScriptedRandom::constant(0.5));

    simulator.submit("doc-2", FileUpload::with_size_mb("first.pdf", 1.0))?;
    time::sleep(Duration::from_millis(250)).await;
    assert!(simulator
        .submit("doc-2", FileUpload::with_size_mb("photo.png", 1.0))
        .is_err());

    let events = events_until_settled(&mut rx).await?;
    assert!(!events
        .iter()
        .any(|event| return matches!(event, UploadEvent::Cancelled { .. })));
    assert_eq!(
        simulator.store().get("doc-2").unwrap().file_name,
        Some("first.pdf".to_string())
    );

    return Ok(());
}

#[tokio::test(start_paused = true)]
async fn it_cancels_an_upload() -> Result<()> {
    let (simulator, mut rx) = simulator(vec![pdf_document("doc-2")], ScriptedRandom::constant(0.5));

    simulator.submit("doc-2", FileUpload::with_size_mb("marks.pdf", 1.0))?;
    time::sleep(Duration::from_millis(650)).await;

    assert!(simulator.cancel("doc-2"));
    assert!(!simulator.cancel("doc-2"));
    assert!(!simulator.is_active("doc-2"));

    time::sleep(Duration::from_secs(30)).await;

    let doc = simulator.store().get("doc-2").unwrap();
    assert_eq!(doc.status, DocumentStatus::NotUploaded);
    assert_eq!(doc.upload_progress, None);
    assert_eq!(doc.file_name, Some("marks.pdf".to_string()));

    let mut saw_cancelled = false;
    while let Ok(event) = rx.try_recv() {
        match event {
            Event::Upload(UploadEvent::Cancelled { .. }) => saw_cancelled = true,
            Event::Upload(UploadEvent::UnderReview { .. }) => bail!("Cancelled upload reached review"),
            Event::Upload(UploadEvent::Settled { .. }) => bail!("Cancelled upload settled"),
            _ => {}
        }
    }
    assert!(saw_cancelled);

    return Ok(());
}

#[tokio::test(start_paused = true)]
async fn it_cancels_through_the_handle() -> Result<()> {
    let (simulator, _rx) = simulator(vec![pdf_document("doc-2")], ScriptedRandom::constant(0.5));

    let handle = simulator.submit("doc-2", FileUpload::with_size_mb("marks.pdf", 1.0))?;
    assert_eq!(handle.document_id(), "doc-2");
    time::sleep(Duration::from_millis(250)).await;

    assert!(handle.cancel());
    time::sleep(Duration::from_millis(1)).await;
    assert!(handle.is_finished());
    assert!(!simulator.is_active("doc-2"));

    return Ok(());
}

#[tokio::test(start_paused = true)]
async fn it_ignores_stale_handles() -> Result<()> {
    let (simulator, mut rx) = simulator(vec![pdf_document("doc-2")], ScriptedRandom::constant(0.5));

    let first = simulator.submit("doc-2", FileUpload::with_size_mb("first.pdf", 1.0))?;
    simulator.submit("doc-2", FileUpload::with_size_mb("second.pdf", 1.0))?;

    assert!(!first.cancel());
    assert!(simulator.is_active("doc-2"));

    events_until_settled(&mut rx).await?;
    assert_eq!(
        simulator.store().get("doc-2").unwrap().file_name,
        Some("second.pdf".to_string())
    );

    return Ok(());
}

#[tokio::test(start_paused = true)]
async fn it_reports_finished_handle_as_not_cancelled() -> Result<()> {
    let (simulator, mut rx) = simulator(vec![pdf_document("doc-2")], ScriptedRandom::constant(0.5));

    let handle = simulator.submit("doc-2", FileUpload::with_size_mb("marks.pdf", 1.0))?;
    events_until_settled(&mut rx).await?;
    time::sleep(Duration::from_millis(1)).await;

    assert!(handle.is_finished());
    assert!(!handle.cancel());
    assert_eq!(
        simulator.store().get("doc-2").unwrap().status,
        DocumentStatus::Verified
    );

    return Ok(());
}

#[tokio::test(start_paused = true)]
async fn it_stops_when_document_is_removed() -> Result<()> {
    let (simulator, mut rx) = simulator(vec![pdf_document("doc-2")], ScriptedRandom::constant(0.5));

    simulator.submit("doc-2", FileUpload::with_size_mb("marks.pdf", 1.0))?;
    time::sleep(Duration::from_millis(250)).await;
    simulator.store().remove("doc-2");

    time::sleep(Duration::from_secs(30)).await;
    assert!(!simulator.is_active("doc-2"));
    assert!(simulator.store().get("doc-2").is_none());

    while let Ok(event) = rx.try_recv() {
        if let Event::Upload(UploadEvent::Settled { .. }) = event {
            bail!("Removed document settled");
        }
    }

    return Ok(());
}

#[tokio::test(start_paused = true)]
async fn it_rejects_a_document_manually() -> Result<()> {
    let (simulator, mut rx) = simulator(vec![pdf_document("doc-2")], ScriptedRandom::constant(0.5));

    simulator.submit("doc-2", FileUpload::with_size_mb("marks.pdf", 1.0))?;
    time::sleep(Duration::from_millis(250)).await;
    simulator.reject("doc-2", "Blurry scan")?;

    time::sleep(Duration::from_secs(30)).await;

    let doc = simulator.store().get("doc-2").unwrap();
    assert_eq!(doc.status, DocumentStatus::Rejected);
    assert_eq!(doc.rejection_reason, Some("Blurry scan".to_string()));
    assert_eq!(doc.last_updated, Some(FixedClock::new(2026, 2, 20).date()));
    assert!(!doc.is_uploading());

    let mut events = vec![];
    while let Ok(Event::Upload(event)) = rx.try_recv() {
        events.push(event);
    }
    assert_eq!(
        events.last().unwrap(),
        &UploadEvent::Rejected {
            document_id: "doc-2".to_string(),
            reason: "Blurry scan".to_string(),
        }
    );

    assert_eq!(
        simulator.reject("doc-404", "Missing").err(),
        Some(SubmitError::UnknownDocument("doc-404".to_string()))
    );

    return Ok(());
}

#[tokio::test(start_paused = true)]
async fn it_keeps_aborted_file_metadata_when_rejected() -> Result<()> {
    let (simulator, _rx) = simulator(vec![pdf_document("doc-2")], ScriptedRandom::constant(0.5));

    simulator.submit("doc-2", FileUpload::with_size_mb("draft.pdf", 2.0))?;
    time::sleep(Duration::from_millis(250)).await;
    assert!(simulator.cancel("doc-2"));
    simulator.reject("doc-2", "Wrong file")?;

    let doc = simulator.store().get("doc-2").unwrap();
    assert_eq!(doc.status, DocumentStatus::Rejected);
    assert_eq!(doc.upload_progress, None);
    assert_eq!(doc.upload_token, None);
    assert_eq!(doc.file_name, Some("draft.pdf".to_string()));
    assert_eq!(doc.file_size_mb, Some(2.0));
    assert_eq!(doc.file_type, Some("PDF".to_string()));

    return Ok(());
}

#[tokio::test(start_paused = true)]
async fn it_clears_rejection_reason_on_review() -> Result<()> {
    let mut rejected = pdf_document("doc-3");
    rejected.status = DocumentStatus::Rejected;
    rejected.rejection_reason = Some("Document quality is poor.".to_string());
    let (simulator, mut rx) = simulator(vec![rejected], ScriptedRandom::constant(0.5));

    simulator.submit("doc-3", FileUpload::with_size_mb("retake.pdf", 1.0))?;
    events_until_settled(&mut rx).await?;

    let doc = simulator.store().get("doc-3").unwrap();
    assert_eq!(doc.status, DocumentStatus::Verified);
    assert_eq!(doc.rejection_reason, None);

    return Ok(());
}

#[tokio::test(start_paused = true)]
async fn it_submits_in_bulk() -> Result<()> {
    let (simulator, _rx) = simulator(
        vec![
            pdf_document("doc-1"),
            Document::new("doc-2", "Photo", &["PNG", "JPG"], 2.0),
            Document::new("doc-3", "Other photo", &["PNG"], 2.0),
        ],
        ScriptedRandom::constant(0.5),
    );

    let submission = simulator.submit_bulk(vec![
        FileUpload::with_size_mb("a.png", 1.0),
        FileUpload::with_size_mb("b.png", 1.0),
        FileUpload::with_size_mb("notes.txt", 1.0),
        FileUpload::with_size_mb("c.png", 1.0),
    ]);

    let targets = submission
        .handles
        .iter()
        .map(|handle| return handle.document_id().to_string())
        .collect::<Vec<String>>();
    assert_eq!(targets, vec!["doc-2", "doc-3"]);
    assert_eq!(
        submission
            .unmatched
            .iter()
            .map(|file| return file.name.as_str())
            .collect::<Vec<&str>>(),
        vec!["notes.txt", "c.png"]
    );
    assert!(simulator.is_active("doc-2"));
    assert!(simulator.is_active("doc-3"));
    assert!(!simulator.is_active("doc-1"));

    return Ok(());
}

#[test]
fn it_spreads_review_delay_over_the_window() {
    let timings = UploadTimings::default();

    assert_eq!(timings.review_delay(0.0), Duration::from_millis(3000));
    assert_eq!(timings.review_delay(0.5), Duration::from_millis(4000));
    assert!(timings.review_delay(0.999) < Duration::from_millis(5000));
}
