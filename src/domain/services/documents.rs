#[cfg(test)]
#[path = "documents_test.rs"]
mod tests;

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use dashmap::DashMap;

use crate::domain::models::seed_documents;
use crate::domain::models::Document;
use crate::domain::models::DocumentStatus;
use crate::domain::models::FileUpload;

struct StoredDocument {
    position: u64,
    document: Document,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DocumentSummary {
    pub verified: usize,
    pub required: usize,
    pub all_required_verified: bool,
}

/// In-memory document list shared between the front-end and upload tasks.
/// Cloning is cheap and every clone sees the same documents.
#[derive(Clone, Default)]
pub struct DocumentStore {
    documents: Arc<DashMap<String, StoredDocument>>,
    sequence: Arc<AtomicU64>,
}

impl DocumentStore {
    pub fn new(documents: Vec<Document>) -> DocumentStore {
        let store = DocumentStore::default();
        for document in documents {
            store.insert(document);
        }

        return store;
    }

    pub fn seeded() -> DocumentStore {
        return DocumentStore::new(seed_documents());
    }

    /// Inserting an existing id replaces the document but keeps its place in
    /// the list.
    pub fn insert(&self, document: Document) {
        let id = document.id.to_string();
        if let Some(mut entry) = self.documents.get_mut(&id) {
            entry.document = document;
            return;
        }

        let position = self.sequence.fetch_add(1, Ordering::SeqCst);
        self.documents
            .insert(id, StoredDocument { position, document });
    }

    pub fn get(&self, id: &str) -> Option<Document> {
        return self
            .documents
            .get(id)
            .map(|entry| return entry.document.clone());
    }

    pub fn remove(&self, id: &str) -> Option<Document> {
        return self
            .documents
            .remove(id)
            .map(|(_, entry)| return entry.document);
    }

    pub fn len(&self) -> usize {
        return self.documents.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.documents.is_empty();
    }

    pub fn list(&self) -> Vec<Document> {
        let mut entries = self
            .documents
            .iter()
            .map(|entry| return (entry.position, entry.document.clone()))
            .collect::<Vec<(u64, Document)>>();
        entries.sort_by_key(|(position, _)| return *position);

        return entries
            .into_iter()
            .map(|(_, document)| return document)
            .collect();
    }

    pub fn filter(&self, status: Option<DocumentStatus>) -> Vec<Document> {
        return self
            .list()
            .into_iter()
            .filter(|doc| {
                return status.is_none() || status == Some(doc.status);
            })
            .collect();
    }

    /// Applies `f` to the document in place. Returns false when the id is
    /// unknown.
    pub fn update<F: FnOnce(&mut Document)>(&self, id: &str, f: F) -> bool {
        if let Some(mut entry) = self.documents.get_mut(id) {
            f(&mut entry.document);
            return true;
        }

        return false;
    }

    /// Like `update`, but only while `token` still owns the document's upload.
    pub(crate) fn update_if_current<F: FnOnce(&mut Document)>(
        &self,
        id: &str,
        token: u64,
        f: F,
    ) -> bool {
        if let Some(mut entry) = self.documents.get_mut(id) {
            if entry.document.upload_token != Some(token) {
                return false;
            }
            f(&mut entry.document);
            return true;
        }

        return false;
    }

    pub fn summary(&self) -> DocumentSummary {
        let documents = self.list();
        let verified = documents
            .iter()
            .filter(|doc| return doc.status == DocumentStatus::Verified)
            .count();
        let required = documents.iter().filter(|doc| return doc.required).count();
        let all_required_verified = documents
            .iter()
            .all(|doc| return !doc.required || doc.status == DocumentStatus::Verified);

        return DocumentSummary {
            verified,
            required,
            all_required_verified,
        };
    }

    /// First idle, not yet uploaded document that accepts the file.
    pub fn find_bulk_target(&self, file: &FileUpload) -> Option<String> {
        return self
            .list()
            .into_iter()
            .find(|doc| {
                return doc.status == DocumentStatus::NotUploaded
                    && !doc.is_uploading()
                    && doc.validate(file).is_ok();
            })
            .map(|doc| return doc.id);
    }
}
