use thiserror::Error;

/// Reasons a file is refused before any upload state is touched.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ValidationError {
    #[error("Invalid file type. Accepted: {}", .accepted.join(", "))]
    InvalidType {
        extension: String,
        accepted: Vec<String>,
    },
    #[error("File size exceeds {max_size_mb}MB limit.")]
    TooLarge { size_mb: f64, max_size_mb: f64 },
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("No document found for id {0}")]
    UnknownDocument(String),
}
