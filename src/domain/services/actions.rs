#[cfg(test)]
#[path = "actions_test.rs"]
mod tests;

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::UploadSimulator;
use crate::domain::models::Action;
use crate::domain::models::Backend;
use crate::domain::models::BackendBox;
use crate::domain::models::BackendPrompt;
use crate::domain::models::Event;
use crate::domain::models::FileUpload;

pub fn help_text() -> String {
    let text = r#"
COMMANDS:
- /login [ROLE] [EMAIL] [PASSWORD] - Signs in as a student or admin.
- /logout - Signs out and clears the chat.
- /docs (/d) [STATUS?] - Lists your documents, optionally filtered by status (not-uploaded, uploaded, under-review, verified, rejected).
- /upload (/u) [DOC_ID] [PATH] - Uploads a file for a document. A new upload replaces one still in progress.
- /bulk (/b) [PATH...] - Uploads several files at once, each to the first empty document that accepts it.
- /cancel (/c) [DOC_ID] - Cancels an upload in progress.
- /reject [DOC_ID] [REASON...] - Rejects a document. Admins only.
- /notifications (/n) - Shows your notifications and marks them read.
- /tasks (/t) - Shows your onboarding checklist, progress and upcoming events.
- /quit /exit (/q) - Exit CampusFlow.
- /help (/h) - Provides this help menu.

ASSISTANT:
Anything that isn't a command is sent to the CampusFlow assistant. Try asking about documents, fees, hostel allocation or course registration.
        "#;

    return text.trim().to_string();
}

fn bulk_unmatched(files: &[FileUpload], tx: &mpsc::UnboundedSender<Event>) -> Result<()> {
    for file in files {
        tx.send(Event::Notice(format!(
            "No pending document accepts {}, skipped.",
            file.name
        )))?;
    }

    return Ok(());
}

fn worker_error(err: anyhow::Error, tx: &mpsc::UnboundedSender<Event>) -> Result<()> {
    tx.send(Event::Failure(format!(
        "The assistant failed with the following error: {:?}",
        err
    )))?;

    return Ok(());
}

pub struct ActionsService {}

impl ActionsService {
    /// Runs until every `Action` sender is dropped.
    pub async fn start(
        backend: BackendBox,
        simulator: UploadSimulator,
        tx: mpsc::UnboundedSender<Event>,
        rx: &mut mpsc::UnboundedReceiver<Action>,
    ) -> Result<()> {
        let backend: Arc<dyn Backend + Send + Sync> = Arc::from(backend);

        // Lazy default.
        let mut worker: JoinHandle<Result<()>> = tokio::spawn(async {
            return Ok(());
        });

        loop {
            let action = match rx.recv().await {
                Some(action) => action,
                None => {
                    worker.abort();
                    return Ok(());
                }
            };

            match action {
                Action::BackendAbort() => {
                    worker.abort();
                }
                Action::BackendRequest(prompt) => {
                    worker.abort();
                    worker = ActionsService::spawn_completion(Arc::clone(&backend), prompt, &tx);
                }
                Action::UploadSubmit(document_id, file) => {
                    if let Err(err) = simulator.submit(&document_id, file) {
                        tx.send(Event::Failure(err.to_string()))?;
                    }
                }
                Action::UploadBulk(files) => {
                    let res = simulator.submit_bulk(files);
                    bulk_unmatched(&res.unmatched, &tx)?;
                }
                Action::UploadCancel(document_id) => {
                    if !simulator.cancel(&document_id) {
                        tx.send(Event::Notice(format!(
                            "No upload in progress for {document_id}."
                        )))?;
                    }
                }
                Action::DocumentReject(document_id, reason) => {
                    if let Err(err) = simulator.reject(&document_id, &reason) {
                        tx.send(Event::Failure(err.to_string()))?;
                    }
                }
            }
        }
    }

    fn spawn_completion(
        backend: Arc<dyn Backend + Send + Sync>,
        prompt: BackendPrompt,
        tx: &mpsc::UnboundedSender<Event>,
    ) -> JoinHandle<Result<()>> {
        let worker_tx = tx.clone();

        return tokio::spawn(async move {
            let res = backend.get_completion(prompt, &worker_tx).await;
            if let Err(err) = res {
                worker_error(err, &worker_tx)?;
            }

            return Ok(());
        });
    }
}
