#[cfg(test)]
#[path = "uploads_test.rs"]
mod tests;

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tokio::time;

use super::Clock;
use super::DocumentStore;
use super::RandomSource;
use super::SystemClock;
use super::ThreadRandom;
use crate::domain::models::DocumentStatus;
use crate::domain::models::Event;
use crate::domain::models::FileUpload;
use crate::domain::models::SubmitError;
use crate::domain::models::UploadEvent;

#[derive(Clone, Debug, PartialEq)]
pub struct UploadTimings {
    pub tick: Duration,
    /// Upper bound (exclusive) of the progress added on each tick.
    pub max_increment: f64,
    pub settle_delay: Duration,
    pub review_delay_min: Duration,
    pub review_delay_max: Duration,
    pub verify_probability: f64,
}

impl Default for UploadTimings {
    fn default() -> UploadTimings {
        return UploadTimings {
            tick: Duration::from_millis(200),
            max_increment: 25.0,
            settle_delay: Duration::from_millis(500),
            review_delay_min: Duration::from_millis(3000),
            review_delay_max: Duration::from_millis(5000),
            verify_probability: 0.9,
        };
    }
}

impl UploadTimings {
    fn review_delay(&self, random: f64) -> Duration {
        let spread = self.review_delay_max.saturating_sub(self.review_delay_min);
        return self.review_delay_min + spread.mul_f64(random);
    }
}

struct ActiveUpload {
    token: u64,
    abort: AbortHandle,
}

fn emit(events: &Option<mpsc::UnboundedSender<Event>>, event: UploadEvent) {
    if let Some(tx) = events {
        if let Err(err) = tx.send(Event::Upload(event)) {
            tracing::debug!(error = ?err, "Upload event dropped, no listener");
        }
    }
}

/// Drives documents through upload, review and verification on timers.
///
/// Each submission runs as its own task. A document has at most one live
/// task; its abort handle is kept in `active` and every write the task makes
/// is checked against the upload token it was started with, so a replaced
/// run can never touch the document again.
#[derive(Clone)]
pub struct UploadSimulator {
    store: DocumentStore,
    timings: UploadTimings,
    random: Arc<dyn RandomSource>,
    clock: Arc<dyn Clock>,
    active: Arc<DashMap<String, ActiveUpload>>,
    tokens: Arc<AtomicU64>,
    events: Option<mpsc::UnboundedSender<Event>>,
}

pub struct UploadHandle {
    document_id: String,
    token: u64,
    abort: AbortHandle,
    simulator: UploadSimulator,
}

impl UploadHandle {
    pub fn document_id(&self) -> &str {
        return &self.document_id;
    }

    pub fn is_finished(&self) -> bool {
        return self.abort.is_finished();
    }

    /// Stops this submission. Returns false when it already finished or was
    /// replaced by a newer one.
    pub fn cancel(&self) -> bool {
        let cancelled = self
            .simulator
            .cancel_token(&self.document_id, Some(self.token));
        self.abort.abort();

        return cancelled;
    }
}

pub struct BulkSubmission {
    pub handles: Vec<UploadHandle>,
    pub unmatched: Vec<FileUpload>,
}

impl UploadSimulator {
    pub fn new(store: DocumentStore, timings: UploadTimings) -> UploadSimulator {
        return UploadSimulator {
            store,
            timings,
            random: Arc::new(ThreadRandom::default()),
            clock: Arc::new(SystemClock::default()),
            active: Arc::new(DashMap::new()),
            tokens: Arc::new(AtomicU64::new(0)),
            events: None,
        };
    }

    pub fn with_random(mut self, random: Arc<dyn RandomSource>) -> UploadSimulator {
        self.random = random;
        return self;
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> UploadSimulator {
        self.clock = clock;
        return self;
    }

    pub fn with_events(mut self, tx: mpsc::UnboundedSender<Event>) -> UploadSimulator {
        self.events = Some(tx);
        return self;
    }

    pub fn store(&self) -> &DocumentStore {
        return &self.store;
    }

    pub fn is_active(&self, document_id: &str) -> bool {
        return self.active.contains_key(document_id);
    }

    /// Validates the file against the document and starts a new upload run,
    /// replacing any run already in flight for it. Validation failures leave
    /// the document and any running upload untouched.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn submit(&self, document_id: &str, file: FileUpload) -> Result<UploadHandle, SubmitError> {
        let document = self
            .store
            .get(document_id)
            .ok_or_else(|| return SubmitError::UnknownDocument(document_id.to_string()))?;

        if let Err(err) = document.validate(&file) {
            tracing::warn!(document_id, file = file.name.as_str(), error = %err, "Upload failed validation");
            return Err(err.into());
        }

        let entry = self.active.entry(document_id.to_string());
        if let Entry::Occupied(previous) = &entry {
            previous.get().abort.abort();
            tracing::debug!(document_id, token = previous.get().token, "Replacing in-flight upload");
            emit(
                &self.events,
                UploadEvent::Cancelled {
                    document_id: document_id.to_string(),
                },
            );
        }

        let token = self.tokens.fetch_add(1, Ordering::SeqCst) + 1;
        if !self
            .store
            .update(document_id, |doc| doc.begin_upload(&file, token))
        {
            if let Entry::Occupied(previous) = entry {
                previous.remove();
            }
            return Err(SubmitError::UnknownDocument(document_id.to_string()));
        }

        tracing::info!(
            document_id,
            token,
            file = file.name.as_str(),
            size_mb = file.size_mb(),
            "Upload started"
        );
        emit(
            &self.events,
            UploadEvent::Started {
                document_id: document_id.to_string(),
                file_name: file.name.to_string(),
            },
        );

        let run = UploadRun {
            document_id: document_id.to_string(),
            token,
            store: self.store.clone(),
            timings: self.timings.clone(),
            random: self.random.clone(),
            clock: self.clock.clone(),
            active: self.active.clone(),
            events: self.events.clone(),
        };
        let worker = tokio::spawn(run.execute());
        entry.insert(ActiveUpload {
            token,
            abort: worker.abort_handle(),
        });

        return Ok(UploadHandle {
            document_id: document_id.to_string(),
            token,
            abort: worker.abort_handle(),
            simulator: self.clone(),
        });
    }

    /// Sends each file to the first idle, not yet uploaded document that
    /// accepts it. Files with no such document are handed back.
    pub fn submit_bulk(&self, files: Vec<FileUpload>) -> BulkSubmission {
        let mut submission = BulkSubmission {
            handles: vec![],
            unmatched: vec![],
        };

        for file in files {
            let target = self.store.find_bulk_target(&file);
            if let Some(document_id) = target {
                match self.submit(&document_id, file.clone()) {
                    Ok(handle) => submission.handles.push(handle),
                    Err(_) => submission.unmatched.push(file),
                }
            } else {
                submission.unmatched.push(file);
            }
        }

        return submission;
    }

    /// Aborts the in-flight upload for the document, if any. Progress and
    /// the upload token are cleared. Status, file name, size and type stay
    /// as the aborted run last wrote them.
    pub fn cancel(&self, document_id: &str) -> bool {
        return self.cancel_token(document_id, None);
    }

    fn cancel_token(&self, document_id: &str, token: Option<u64>) -> bool {
        let removed = self.active.remove_if(document_id, |_, upload| {
            return token.is_none() || token == Some(upload.token);
        });

        if let Some((_, upload)) = removed {
            upload.abort.abort();
            self.store
                .update_if_current(document_id, upload.token, |doc| {
                    doc.upload_progress = None;
                    doc.upload_token = None;
                });

            tracing::info!(document_id, token = upload.token, "Upload cancelled");
            emit(
                &self.events,
                UploadEvent::Cancelled {
                    document_id: document_id.to_string(),
                },
            );
            return true;
        }

        return false;
    }

    /// Manual review outcome. The timers never reject a document on their
    /// own, this is the only way into `rejected`.
    ///
    /// Only status, reason and progress change. After a cancelled upload the
    /// document still carries the aborted file's name, size and type.
    pub fn reject(&self, document_id: &str, reason: &str) -> Result<(), SubmitError> {
        if self.store.get(document_id).is_none() {
            return Err(SubmitError::UnknownDocument(document_id.to_string()));
        }

        self.cancel(document_id);

        let today = self.clock.today();
        self.store.update(document_id, |doc| {
            doc.status = DocumentStatus::Rejected;
            doc.rejection_reason = Some(reason.to_string());
            doc.last_updated = Some(today);
            doc.upload_progress = None;
            doc.upload_token = None;
        });

        tracing::info!(document_id, reason, "Document rejected");
        emit(
            &self.events,
            UploadEvent::Rejected {
                document_id: document_id.to_string(),
                reason: reason.to_string(),
            },
        );

        return Ok(());
    }
}

struct UploadRun {
    document_id: String,
    token: u64,
    store: DocumentStore,
    timings: UploadTimings,
    random: Arc<dyn RandomSource>,
    clock: Arc<dyn Clock>,
    active: Arc<DashMap<String, ActiveUpload>>,
    events: Option<mpsc::UnboundedSender<Event>>,
}

impl UploadRun {
    async fn execute(self) {
        if self.transfer().await && self.settle().await {
            self.review().await;
        }

        self.active.remove_if(&self.document_id, |_, upload| {
            return upload.token == self.token;
        });
    }

    async fn transfer(&self) -> bool {
        let mut progress: f64 = 0.0;
        while progress < 100.0 {
            time::sleep(self.timings.tick).await;
            progress = (progress + self.random.next_f64() * self.timings.max_increment).min(100.0);

            let written = self
                .store
                .update_if_current(&self.document_id, self.token, |doc| {
                    doc.upload_progress = Some(progress);
                });
            if !written {
                tracing::debug!(document_id = self.document_id.as_str(), token = self.token, "Upload superseded");
                return false;
            }

            emit(
                &self.events,
                UploadEvent::Progress {
                    document_id: self.document_id.to_string(),
                    progress,
                },
            );
        }

        return true;
    }

    async fn settle(&self) -> bool {
        time::sleep(self.timings.settle_delay).await;

        let today = self.clock.today();
        let written = self
            .store
            .update_if_current(&self.document_id, self.token, |doc| {
                doc.status = DocumentStatus::UnderReview;
                doc.upload_progress = None;
                doc.last_updated = Some(today);
                doc.rejection_reason = None;
            });
        if !written {
            return false;
        }

        tracing::info!(document_id = self.document_id.as_str(), "Upload under review");
        emit(
            &self.events,
            UploadEvent::UnderReview {
                document_id: self.document_id.to_string(),
            },
        );

        return true;
    }

    async fn review(&self) {
        let delay = self.timings.review_delay(self.random.next_f64());
        time::sleep(delay).await;

        let status = if self.random.next_f64() < self.timings.verify_probability {
            DocumentStatus::Verified
        } else {
            DocumentStatus::Uploaded
        };

        let written = self
            .store
            .update_if_current(&self.document_id, self.token, |doc| {
                doc.status = status;
                doc.upload_token = None;
            });
        if !written {
            return;
        }

        tracing::info!(document_id = self.document_id.as_str(), status = %status, "Review finished");
        emit(
            &self.events,
            UploadEvent::Settled {
                document_id: self.document_id.to_string(),
                status,
            },
        );
    }
}
