use async_trait::async_trait;
use reqwest::{multipart, Client};

use crate::error::AppError;
use crate::models::{StatusResponse, UploadErrorBody, UploadResponse};
use crate::services::upload::UploadFile;

/// The analysis service: accepts a file, then reports job status per session.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Sends the file and returns the new session with its quick analysis.
    ///
    /// Failures map to [`AppError::Upload`] carrying the message shown to the user.
    async fn upload(&self, file: UploadFile) -> Result<UploadResponse, AppError>;

    /// One status check. Transport failures and non-2xx responses map to
    /// [`AppError::PollTransport`].
    async fn fetch_status(&self, session_id: &str) -> Result<StatusResponse, AppError>;
}

#[derive(Debug, Clone)]
pub struct HttpAnalysisBackend {
    client: Client,
    base_url: String,
}

impl HttpAnalysisBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl AnalysisBackend for HttpAnalysisBackend {
    async fn upload(&self, file: UploadFile) -> Result<UploadResponse, AppError> {
        let url = format!("{}/upload", self.base_url);
        tracing::info!("Uploading {} ({} bytes) to {}", file.file_name, file.size(), url);

        let part = multipart::Part::bytes(file.data.to_vec())
            .file_name(file.file_name)
            .mime_str(file.kind.mime_type())
            .map_err(|e| AppError::Internal(format!("Invalid mime type: {}", e)))?;
        let form = multipart::Form::new().part("file", part);

        let response = self.client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Upload request failed: {}", e);
                AppError::Upload(format!("Upload failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.json::<UploadErrorBody>().await.unwrap_or_default();
            let message = body
                .detail
                .unwrap_or_else(|| format!("Upload failed ({})", status.as_u16()));
            tracing::error!("Upload rejected with {}: {}", status, message);
            return Err(AppError::Upload(message));
        }

        response
            .json::<UploadResponse>()
            .await
            .map_err(|e| AppError::Upload(format!("Failed to read upload response: {}", e)))
    }

    async fn fetch_status(&self, session_id: &str) -> Result<StatusResponse, AppError> {
        let url = format!("{}/analysis/{}", self.base_url, session_id);

        let response = self.client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::PollTransport(format!("Failed to fetch status: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::PollTransport(format!(
                "Analysis failed ({})",
                response.status().as_u16()
            )));
        }

        response
            .json::<StatusResponse>()
            .await
            .map_err(|e| AppError::PollTransport(format!("Failed to read status response: {}", e)))
    }
}
