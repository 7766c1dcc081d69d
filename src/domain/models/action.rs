use super::BackendPrompt;
use super::FileUpload;

pub enum Action {
    BackendAbort(),
    BackendRequest(BackendPrompt),
    DocumentReject(String, String),
    UploadBulk(Vec<FileUpload>),
    UploadCancel(String),
    UploadSubmit(String, FileUpload),
}
