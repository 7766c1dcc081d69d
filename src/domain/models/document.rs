#[cfg(test)]
#[path = "document_test.rs"]
mod tests;

use chrono::NaiveDate;
use serde_derive::Deserialize;
use serde_derive::Serialize;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;

use super::ValidationError;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    EnumIter,
    EnumVariantNames,
    strum::Display,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum DocumentStatus {
    NotUploaded,
    Uploaded,
    UnderReview,
    Verified,
    Rejected,
}

impl DocumentStatus {
    pub fn parse(text: &str) -> Option<DocumentStatus> {
        return DocumentStatus::iter().find(|e| return e.to_string() == text);
    }
}

/// A file picked by the user. Only its metadata takes part in the upload
/// simulation.
#[derive(Clone, Debug, PartialEq)]
pub struct FileUpload {
    pub name: String,
    pub size_bytes: u64,
    pub extension: String,
}

impl FileUpload {
    /// The extension is everything after the last `.`, or the whole name when
    /// there is none.
    pub fn new(name: &str, size_bytes: u64) -> FileUpload {
        let extension = name.rsplit('.').next().unwrap_or_default();

        return FileUpload {
            name: name.to_string(),
            size_bytes,
            extension: extension.to_uppercase(),
        };
    }

    pub fn with_size_mb(name: &str, size_mb: f64) -> FileUpload {
        return FileUpload::new(name, (size_mb * BYTES_PER_MB).round() as u64);
    }

    pub fn size_mb(&self) -> f64 {
        return self.size_bytes as f64 / BYTES_PER_MB;
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub name: String,
    pub description: String,
    pub required: bool,
    pub accepted_types: Vec<String>,
    pub max_size_mb: f64,
    pub status: DocumentStatus,
    pub file_name: Option<String>,
    pub file_size_mb: Option<f64>,
    pub file_type: Option<String>,
    pub upload_progress: Option<f64>,
    pub last_updated: Option<NaiveDate>,
    pub rejection_reason: Option<String>,
    #[serde(skip)]
    pub(crate) upload_token: Option<u64>,
}

impl Document {
    pub fn new(id: &str, name: &str, accepted_types: &[&str], max_size_mb: f64) -> Document {
        return Document {
            id: id.to_string(),
            name: name.to_string(),
            description: "".to_string(),
            required: true,
            accepted_types: accepted_types
                .iter()
                .map(|e| return e.to_uppercase())
                .collect(),
            max_size_mb,
            status: DocumentStatus::NotUploaded,
            file_name: None,
            file_size_mb: None,
            file_type: None,
            upload_progress: None,
            last_updated: None,
            rejection_reason: None,
            upload_token: None,
        };
    }

    pub fn validate(&self, file: &FileUpload) -> Result<(), ValidationError> {
        let extension = file.extension.to_uppercase();
        if !self
            .accepted_types
            .iter()
            .any(|accepted| return accepted.eq_ignore_ascii_case(&extension))
        {
            return Err(ValidationError::InvalidType {
                extension,
                accepted: self.accepted_types.clone(),
            });
        }

        let size_mb = file.size_mb();
        if size_mb > self.max_size_mb {
            return Err(ValidationError::TooLarge {
                size_mb,
                max_size_mb: self.max_size_mb,
            });
        }

        return Ok(());
    }

    pub fn is_uploading(&self) -> bool {
        return self.upload_progress.is_some();
    }

    pub(crate) fn begin_upload(&mut self, file: &FileUpload, token: u64) {
        self.upload_token = Some(token);
        self.upload_progress = Some(0.0);
        self.file_name = Some(file.name.to_string());
        self.file_size_mb = Some(file.size_mb());
        self.file_type = Some(file.extension.to_uppercase());
    }
}

fn seed_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    return NaiveDate::from_ymd_opt(year, month, day);
}

/// The documents every new student starts with.
pub fn seed_documents() -> Vec<Document> {
    return vec![
        Document {
            description: "Your 10th standard marksheet (Class X)".to_string(),
            status: DocumentStatus::Verified,
            file_name: Some("10th_Marksheet.pdf".to_string()),
            file_size_mb: Some(1.2),
            file_type: Some("PDF".to_string()),
            last_updated: seed_date(2026, 2, 15),
            ..Document::new("doc-1", "10th Marksheet", &["PDF"], 5.0)
        },
        Document {
            description: "Your 12th standard marksheet (Class XII)".to_string(),
            status: DocumentStatus::UnderReview,
            last_updated: seed_date(2026, 2, 18),
            ..Document::new("doc-2", "12th Marksheet", &["PDF"], 5.0)
        },
        Document {
            description: "Aadhar, Passport, or Voter ID".to_string(),
            status: DocumentStatus::Rejected,
            rejection_reason: Some(
                "Document quality is poor. Please ensure proper lighting and clarity.".to_string(),
            ),
            last_updated: seed_date(2026, 2, 10),
            ..Document::new("doc-3", "ID Proof", &["PDF", "JPG", "JPEG", "PNG"], 5.0)
        },
        Document {
            description: "4x6 cm photo on white background".to_string(),
            status: DocumentStatus::Uploaded,
            file_name: Some("passport_photo.jpg".to_string()),
            file_size_mb: Some(0.8),
            file_type: Some("JPG".to_string()),
            last_updated: seed_date(2026, 2, 12),
            ..Document::new("doc-4", "Passport Photo", &["JPG", "JPEG", "PNG"], 2.0)
        },
    ];
}
