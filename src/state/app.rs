//! Root coordinator wiring the form, table and upload panel together.
//!
//! DESIGN
//! ======
//! `App` is the single owner of the cross-component state: which record is
//! being edited and the refresh counter. Components report back with a
//! [`Signal`]; the table only reloads after a mutation has resolved
//! successfully.

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;

use std::path::Path;

use super::Signal;
use super::form::{FormError, FormState};
use super::table::{Confirm, TableState};
use super::upload::{self, UploadError, UploadState};
use crate::net::api::{ApiError, UserApi};
use crate::net::types::{UserId, UserRecord};

pub struct App<A: UserApi> {
    api: A,
    pub form: FormState,
    pub table: TableState,
    pub upload: UploadState,
    editing: Option<UserRecord>,
    refresh: u64,
}

impl<A: UserApi> App<A> {
    #[must_use]
    pub fn new(api: A) -> Self {
        Self {
            api,
            form: FormState::new(),
            table: TableState::new(),
            upload: UploadState::new(),
            editing: None,
            refresh: 0,
        }
    }

    #[must_use]
    pub fn api(&self) -> &A {
        &self.api
    }

    /// The record currently selected for editing.
    #[must_use]
    pub fn editing(&self) -> Option<&UserRecord> {
        self.editing.as_ref()
    }

    #[must_use]
    pub fn refresh(&self) -> u64 {
        self.refresh
    }

    pub fn dispatch(&mut self, signal: Signal) {
        match signal {
            Signal::Success => {
                self.editing = None;
                self.form.select(None);
                self.refresh = self.refresh.wrapping_add(1);
                tracing::debug!(refresh = self.refresh, "refresh requested");
            }
            Signal::Edit(record) => {
                self.form.select(Some(&record));
                self.editing = Some(record);
            }
        }
    }

    /// Drop the edit target without submitting.
    pub fn cancel_edit(&mut self) {
        self.editing = None;
        self.form.select(None);
    }

    /// Bring the table up to the current refresh value.
    ///
    /// # Errors
    ///
    /// Returns the backend error when the list request fails.
    pub async fn reload(&mut self) -> Result<bool, ApiError> {
        self.table.sync(&self.api, self.refresh).await
    }

    /// Select the table row with `id` for editing. Returns `false` if absent.
    pub fn edit(&mut self, id: UserId) -> bool {
        match self.table.edit(id) {
            Some(signal) => {
                self.dispatch(signal);
                true
            }
            None => false,
        }
    }

    /// Submit the form; on success signal the refresh and reload the table.
    ///
    /// # Errors
    ///
    /// Returns the form's validation or backend error. A failed reload after
    /// a successful submit is recorded on the table, not returned.
    pub async fn submit_form(&mut self) -> Result<UserRecord, FormError> {
        let record = self.form.submit(&self.api).await?;
        self.dispatch(Signal::Success);
        self.reload_after_mutation().await;
        Ok(record)
    }

    /// Delete a row after confirmation.
    ///
    /// # Errors
    ///
    /// Returns the backend error when the delete fails.
    pub async fn delete(&mut self, id: UserId, confirm: &dyn Confirm) -> Result<bool, ApiError> {
        let deleted = self.table.request_delete(id, confirm, &self.api).await?;
        if deleted && self.editing.as_ref().is_some_and(|record| record.id == id) {
            self.cancel_edit();
        }
        Ok(deleted)
    }

    /// Upload the selected spreadsheet; on success refresh the table.
    ///
    /// Returns `false` when no file was selected.
    ///
    /// # Errors
    ///
    /// Returns the upload panel's error.
    pub async fn upload(&mut self) -> Result<bool, UploadError> {
        let Some(signal) = self.upload.upload(&self.api).await? else {
            return Ok(false);
        };
        self.dispatch(signal);
        self.reload_after_mutation().await;
        Ok(true)
    }

    /// Save the backend's spreadsheet template to `dest`.
    ///
    /// # Errors
    ///
    /// Returns the backend or write error.
    pub async fn download_template(&self, dest: &Path) -> Result<usize, UploadError> {
        upload::download_template(&self.api, dest).await
    }

    async fn reload_after_mutation(&mut self) {
        if let Err(err) = self.reload().await {
            tracing::warn!(error = %err, "reload after mutation failed");
        }
    }
}
