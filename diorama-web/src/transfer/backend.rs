//! Transfer backend contract and the one-shot send/receive runner

use std::fmt;
use std::future::Future;

use thiserror::Error;

use super::grab::TransferMode;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransferError {
    #[error("Upload failed: {0}")]
    Upload(String),
    #[error("Could not fetch latest model: {0}")]
    FetchLatest(String),
    #[error("Download failed: {0}")]
    Download(String),
    #[error("No model available to receive")]
    NoRemoteModel,
    #[error("Could not export scene: {0}")]
    Export(String),
    #[error("Could not import model: {0}")]
    Import(String),
    #[error("JavaScript error: {0}")]
    Js(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    Sent { file_id: String },
    Received { file_id: String },
}

impl TransferOutcome {
    pub fn file_id(&self) -> &str {
        match self {
            TransferOutcome::Sent { file_id } | TransferOutcome::Received { file_id } => file_id,
        }
    }
}

impl fmt::Display for TransferOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferOutcome::Sent { file_id } => write!(f, "Model sent ({})", file_id),
            TransferOutcome::Received { file_id } => write!(f, "Model received ({})", file_id),
        }
    }
}

/// File store plus the scene hooks a transfer needs.
///
/// Futures are not required to be `Send`; everything runs on the browser's
/// single thread.
pub trait TransferBackend {
    type Blob;

    /// Serialize the current scene into an uploadable blob
    fn export_model(&self) -> impl Future<Output = Result<Self::Blob, TransferError>>;

    fn upload(&self, blob: Self::Blob) -> impl Future<Output = Result<String, TransferError>>;

    fn latest_file_id(&self) -> impl Future<Output = Result<Option<String>, TransferError>>;

    fn download(&self, file_id: &str) -> impl Future<Output = Result<Self::Blob, TransferError>>;

    /// Load a downloaded blob into the scene
    fn import_model(&self, blob: Self::Blob) -> impl Future<Output = Result<(), TransferError>>;
}

/// Run one transfer to completion. No retries; the first failing step ends it.
pub async fn run_transfer<B: TransferBackend>(
    backend: &B,
    mode: TransferMode,
) -> Result<TransferOutcome, TransferError> {
    match mode {
        TransferMode::Send => {
            let blob = backend.export_model().await?;
            let file_id = backend.upload(blob).await?;
            log::debug!("Uploaded model as {}", file_id);
            Ok(TransferOutcome::Sent { file_id })
        }
        TransferMode::Receive => {
            let file_id = backend
                .latest_file_id()
                .await?
                .ok_or(TransferError::NoRemoteModel)?;
            let blob = backend.download(&file_id).await?;
            backend.import_model(blob).await?;
            log::debug!("Imported model {}", file_id);
            Ok(TransferOutcome::Received { file_id })
        }
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::cell::RefCell;
    use std::future::ready;

    /// In-memory file store with injectable failures
    #[derive(Default)]
    pub struct MockBackend {
        pub scene: RefCell<Vec<u8>>,
        pub files: RefCell<Vec<(String, Vec<u8>)>>,
        pub fail_upload: bool,
        pub fail_download: bool,
        pub calls: RefCell<Vec<&'static str>>,
    }

    impl MockBackend {
        pub fn with_scene(bytes: &[u8]) -> Self {
            Self {
                scene: RefCell::new(bytes.to_vec()),
                ..Self::default()
            }
        }
    }

    impl TransferBackend for MockBackend {
        type Blob = Vec<u8>;

        fn export_model(&self) -> impl Future<Output = Result<Vec<u8>, TransferError>> {
            self.calls.borrow_mut().push("export");
            ready(Ok(self.scene.borrow().clone()))
        }

        fn upload(&self, blob: Vec<u8>) -> impl Future<Output = Result<String, TransferError>> {
            self.calls.borrow_mut().push("upload");
            let result = if self.fail_upload {
                Err(TransferError::Upload("503".into()))
            } else {
                let mut files = self.files.borrow_mut();
                let id = format!("file-{}", files.len() + 1);
                files.push((id.clone(), blob));
                Ok(id)
            };
            ready(result)
        }

        fn latest_file_id(&self) -> impl Future<Output = Result<Option<String>, TransferError>> {
            self.calls.borrow_mut().push("latest");
            ready(Ok(self.files.borrow().last().map(|(id, _)| id.clone())))
        }

        fn download(&self, file_id: &str) -> impl Future<Output = Result<Vec<u8>, TransferError>> {
            self.calls.borrow_mut().push("download");
            let result = if self.fail_download {
                Err(TransferError::Download("connection reset".into()))
            } else {
                self.files
                    .borrow()
                    .iter()
                    .find(|(id, _)| id == file_id)
                    .map(|(_, blob)| blob.clone())
                    .ok_or_else(|| TransferError::Download(format!("{} not found", file_id)))
            };
            ready(result)
        }

        fn import_model(&self, blob: Vec<u8>) -> impl Future<Output = Result<(), TransferError>> {
            self.calls.borrow_mut().push("import");
            *self.scene.borrow_mut() = blob;
            ready(Ok(()))
        }
    }
}
