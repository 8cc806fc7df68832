//! Upload panel: one spreadsheet at a time, plus the template download.
//!
//! ERROR HANDLING
//! ==============
//! A rejected upload whose body lists per-row errors keeps them for display,
//! one line per row. Every other failure collapses to a single generic
//! message. Nothing is retried.

#[cfg(test)]
#[path = "upload_test.rs"]
mod upload_test;

use std::path::{Path, PathBuf};

use super::Signal;
use crate::net::api::{ApiError, UserApi};
use crate::net::types::RowError;

pub const UPLOAD_SUCCESS: &str = "Upload successful";
pub const UPLOAD_FAILURE: &str = "Upload failed";
pub const WRONG_EXTENSION: &str = "File must be .xlsx format";

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("File must be .xlsx format: {}", .0.display())]
    NotXlsx(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: std::io::Error },

    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: std::io::Error },

    #[error("{} spreadsheet row(s) rejected", .0.len())]
    Rows(Vec<RowError>),

    #[error(transparent)]
    Api(#[from] ApiError),
}

fn is_xlsx(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "xlsx")
}

#[derive(Clone, Debug, Default)]
pub struct UploadState {
    /// The single selected file, if any.
    pub file: Option<PathBuf>,
    pub message: Option<String>,
    pub errors: Vec<RowError>,
}

impl UploadState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Select `path`, replacing any previous selection.
    pub fn select_file(&mut self, path: impl Into<PathBuf>) {
        self.file = Some(path.into());
    }

    pub fn clear(&mut self) {
        self.file = None;
    }

    /// Row errors as display lines, e.g. `Row 3: invalid phone`.
    #[must_use]
    pub fn error_lines(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    /// Post the selected file. With nothing selected this does nothing.
    ///
    /// On success the selection is cleared and [`Signal::Success`] is
    /// returned for the root to refresh the table.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::Rows`] when the backend reported per-row
    /// problems, and another variant for local or transport failures.
    pub async fn upload(&mut self, api: &dyn UserApi) -> Result<Option<Signal>, UploadError> {
        self.errors.clear();
        self.message = None;

        let Some(path) = self.file.clone() else {
            return Ok(None);
        };
        if !is_xlsx(&path) {
            self.message = Some(WRONG_EXTENSION.to_owned());
            return Err(UploadError::NotXlsx(path));
        }

        let contents = match tokio::fs::read(&path).await {
            Ok(contents) => contents,
            Err(source) => {
                self.message = Some(UPLOAD_FAILURE.to_owned());
                return Err(UploadError::Read { path, source });
            }
        };
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        match api.upload_spreadsheet(&file_name, contents).await {
            Ok(receipt) => {
                tracing::info!(file = %path.display(), "spreadsheet accepted");
                self.message = Some(receipt.message.unwrap_or_else(|| UPLOAD_SUCCESS.to_owned()));
                self.file = None;
                Ok(Some(Signal::Success))
            }
            Err(err) => {
                let rows = err.row_errors().map(<[RowError]>::to_vec).unwrap_or_default();
                if rows.is_empty() {
                    tracing::warn!(error = %err, "spreadsheet upload failed");
                    self.message = Some(UPLOAD_FAILURE.to_owned());
                    return Err(UploadError::Api(err));
                }
                tracing::warn!(rows = rows.len(), "spreadsheet rows rejected");
                self.errors.clone_from(&rows);
                Err(UploadError::Rows(rows))
            }
        }
    }
}

/// Fetch the sample spreadsheet and write it to `dest`.
///
/// Returns the number of bytes written.
///
/// # Errors
///
/// Returns the backend error or the local write failure.
pub async fn download_template(api: &dyn UserApi, dest: &Path) -> Result<usize, UploadError> {
    let bytes = api.download_template().await?;
    tokio::fs::write(dest, &bytes)
        .await
        .map_err(|source| UploadError::Write { path: dest.to_path_buf(), source })?;
    tracing::info!(path = %dest.display(), bytes = bytes.len(), "template saved");
    Ok(bytes.len())
}
