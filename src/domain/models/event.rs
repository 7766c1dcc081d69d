use super::BackendResponse;
use super::DocumentStatus;

#[derive(Clone, Debug, PartialEq)]
pub enum UploadEvent {
    Started {
        document_id: String,
        file_name: String,
    },
    Progress {
        document_id: String,
        progress: f64,
    },
    UnderReview {
        document_id: String,
    },
    Settled {
        document_id: String,
        status: DocumentStatus,
    },
    Cancelled {
        document_id: String,
    },
    Rejected {
        document_id: String,
        reason: String,
    },
}

impl UploadEvent {
    pub fn document_id(&self) -> &str {
        match self {
            UploadEvent::Started { document_id, .. } => return document_id,
            UploadEvent::Progress { document_id, .. } => return document_id,
            UploadEvent::UnderReview { document_id } => return document_id,
            UploadEvent::Settled { document_id, .. } => return document_id,
            UploadEvent::Cancelled { document_id } => return document_id,
            UploadEvent::Rejected { document_id, .. } => return document_id,
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum Event {
    BackendPromptResponse(BackendResponse),
    Upload(UploadEvent),
    Notice(String),
    Failure(String),
}
