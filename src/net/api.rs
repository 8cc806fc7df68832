//! REST client for the user-management backend.
//!
//! DESIGN
//! ======
//! `UserApi` is the seam between the state machines and the network. The
//! production implementation, `HttpUserApi`, issues plain `reqwest` calls
//! against a fixed base origin; tests substitute an in-memory backend.
//!
//! ERROR HANDLING
//! ==============
//! Transport failures and non-success statuses both come back as `ApiError`.
//! A rejected request keeps the parsed failure body so callers can surface
//! the server's own detail text or per-row upload errors. Nothing is retried
//! and no client-side timeout is applied.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use serde::de::DeserializeOwned;

use super::types::{ErrorBody, RowError, UploadReceipt, UserDraft, UserId, UserRecord};
use crate::config::ApiConfig;

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by backend calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// The request never produced a response (connection refused, reset, ...).
    #[error("request failed: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("server rejected request: status {status}")]
    Rejected { status: u16, body: ErrorBody },

    /// A success response body did not have the expected shape.
    #[error("response parse failed: {0}")]
    Decode(String),
}

impl ApiError {
    /// Server-supplied detail text, when the failure carried one.
    #[must_use]
    pub fn detail_text(&self) -> Option<String> {
        match self {
            Self::Rejected { body, .. } => body.detail_text(),
            _ => None,
        }
    }

    /// Per-row spreadsheet errors, when the failure carried them.
    #[must_use]
    pub fn row_errors(&self) -> Option<&[RowError]> {
        match self {
            Self::Rejected { body, .. } => body.errors.as_deref(),
            _ => None,
        }
    }
}

// =============================================================================
// TRAIT
// =============================================================================

/// Backend operations used by the table, form and upload panel.
#[async_trait::async_trait]
pub trait UserApi: Send + Sync {
    /// `GET /users`
    async fn list_users(&self) -> Result<Vec<UserRecord>, ApiError>;

    /// `POST /users`
    async fn create_user(&self, draft: &UserDraft) -> Result<UserRecord, ApiError>;

    /// `PUT /users/{id}`
    async fn update_user(&self, id: UserId, draft: &UserDraft) -> Result<UserRecord, ApiError>;

    /// `DELETE /users/{id}`
    async fn delete_user(&self, id: UserId) -> Result<(), ApiError>;

    /// `POST /upload-excel` with the file as multipart field `file`.
    async fn upload_spreadsheet(&self, file_name: &str, contents: Vec<u8>) -> Result<UploadReceipt, ApiError>;

    /// `GET /download-template`
    async fn download_template(&self) -> Result<Vec<u8>, ApiError>;
}

// =============================================================================
// ENDPOINTS
// =============================================================================

fn users_endpoint(base_url: &str) -> String {
    format!("{base_url}/users")
}

fn user_endpoint(base_url: &str, id: UserId) -> String {
    format!("{base_url}/users/{id}")
}

fn upload_endpoint(base_url: &str) -> String {
    format!("{base_url}/upload-excel")
}

fn template_endpoint(base_url: &str) -> String {
    format!("{base_url}/download-template")
}

// =============================================================================
// HTTP CLIENT
// =============================================================================

/// `reqwest`-backed implementation of [`UserApi`].
pub struct HttpUserApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpUserApi {
    /// Build a client for the configured base origin.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: config.base_url.clone() })
    }

    /// Send a request and return the response only if its status is a success.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), "backend rejected request");
        Err(ApiError::Rejected { status: status.as_u16(), body: ErrorBody::parse(&text) })
    }

    async fn send_json<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T, ApiError> {
        let response = self.send(request).await?;
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait::async_trait]
impl UserApi for HttpUserApi {
    async fn list_users(&self) -> Result<Vec<UserRecord>, ApiError> {
        let users: Vec<UserRecord> = self
            .send_json(self.http.get(users_endpoint(&self.base_url)))
            .await?;
        tracing::debug!(count = users.len(), "listed users");
        Ok(users)
    }

    async fn create_user(&self, draft: &UserDraft) -> Result<UserRecord, ApiError> {
        let created: UserRecord = self
            .send_json(self.http.post(users_endpoint(&self.base_url)).json(draft))
            .await?;
        tracing::info!(id = created.id, "created user");
        Ok(created)
    }

    async fn update_user(&self, id: UserId, draft: &UserDraft) -> Result<UserRecord, ApiError> {
        let updated: UserRecord = self
            .send_json(self.http.put(user_endpoint(&self.base_url, id)).json(draft))
            .await?;
        tracing::info!(id, "updated user");
        Ok(updated)
    }

    async fn delete_user(&self, id: UserId) -> Result<(), ApiError> {
        self.send(self.http.delete(user_endpoint(&self.base_url, id)))
            .await?;
        tracing::info!(id, "deleted user");
        Ok(())
    }

    async fn upload_spreadsheet(&self, file_name: &str, contents: Vec<u8>) -> Result<UploadReceipt, ApiError> {
        let part = reqwest::multipart::Part::bytes(contents)
            .file_name(file_name.to_owned())
            .mime_str(XLSX_MIME)
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("file", part);
        let receipt: UploadReceipt = self
            .send_json(self.http.post(upload_endpoint(&self.base_url)).multipart(form))
            .await?;
        tracing::info!(file_name, "uploaded spreadsheet");
        Ok(receipt)
    }

    async fn download_template(&self) -> Result<Vec<u8>, ApiError> {
        let response = self
            .send(self.http.get(template_endpoint(&self.base_url)))
            .await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}
