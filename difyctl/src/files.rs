//! File upload endpoint.
//!
//! `POST /v1/files/upload` takes a `multipart/form-data` body with a `file` part and a `user`
//! field, stores the file on the service side and answers `201 Created` with the stored file's
//! metadata.

use crate::client::{Client, read_response_body};
use crate::errors::{Error, Result};
use crate::http::HttpSender;
use reqwest::multipart::{Form, Part};
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;
use tracing::{debug, error, info, instrument};

pub const UPLOAD_PATH: &str = "/v1/files/upload";

/// A local file to upload on behalf of an end user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadRequest {
    #[serde(rename = "file")]
    pub file_path: PathBuf,
    /// Opaque end-user identifier, forwarded unvalidated
    pub user: String,
}

impl UploadRequest {
    pub fn new(file_path: impl Into<PathBuf>, user: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            user: user.into(),
        }
    }
}

/// Metadata of a stored file, as returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    pub id: String,
    pub name: String,
    /// Size in bytes
    pub size: u64,
    pub extension: String,
    pub mime_type: String,
    pub created_by: String,
    /// Unix timestamp
    pub created_at: i64,
}

impl<S: HttpSender> Client<S> {
    /// Upload a local file.
    ///
    /// The whole file is read into memory before anything is sent, so a missing or unreadable
    /// file fails with [`Error::Io`] without touching the network.
    ///
    /// # Errors
    /// - [`Error::Io`] if the file cannot be opened or read
    /// - [`Error::Encoding`] if the multipart body cannot be assembled
    /// - [`Error::Transport`] if the request cannot be built or sent
    /// - [`Error::Api`] if the service answers anything other than `201 Created`
    /// - [`Error::Decode`] if the `201` body is not the expected JSON
    #[instrument(skip(self, request), fields(file = %request.file_path.display(), user = %request.user), err)]
    pub async fn upload_file(&self, request: &UploadRequest) -> Result<UploadResult> {
        let form = upload_form(request).await?;

        let upload = self.base_request(Method::POST, UPLOAD_PATH)?.multipart(form);
        let response = self.send(upload).await?;

        let status = response.status();
        if status != StatusCode::CREATED {
            let body = read_response_body(response).await;
            error!(%status, body = %body, "File upload rejected");
            return Err(Error::Api { status, body });
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::transport("read response body", e))?;
        debug!(body = %body, "File upload response body");

        let result: UploadResult = serde_json::from_str(&body)?;

        info!(id = %result.id, size = result.size, "File uploaded");
        Ok(result)
    }
}

/// Build the two-part upload form: the file contents under `file` and the user under `user`.
async fn upload_form(request: &UploadRequest) -> Result<Form> {
    let contents = read_file(&request.file_path).await?;
    let file_name = file_name(&request.file_path);
    let mime_type = mime_guess::from_path(&request.file_path).first_or_octet_stream();

    debug!(file_name = %file_name, mime_type = %mime_type, bytes = contents.len(), "Encoding upload form");

    let part = Part::bytes(contents)
        .file_name(file_name)
        .mime_str(mime_type.as_ref())
        .map_err(Error::Encoding)?;

    Ok(Form::new().part("file", part).text("user", request.user.clone()))
}

async fn read_file(path: &Path) -> Result<Vec<u8>> {
    let io_error = |source| Error::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut file = tokio::fs::File::open(path).await.map_err(io_error)?;
    let mut contents = Vec::new();
    file.read_to_end(&mut contents).await.map_err(io_error)?;
    Ok(contents)
}

/// Name declared for the file part: the last path component, not the full local path.
fn file_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or(path.as_os_str())
        .to_string_lossy()
        .into_owned()
}
