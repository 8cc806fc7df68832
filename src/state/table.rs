//! Record table: the loaded user list, deletes, and edit selection.
//!
//! DESIGN
//! ======
//! The table reloads the full list whenever the root's refresh counter moves
//! past the value it last loaded. Deletes are applied locally by id after the
//! backend confirms them, without a re-fetch.

#[cfg(test)]
#[path = "table_test.rs"]
mod table_test;

use super::Signal;
use crate::net::api::{ApiError, UserApi};
use crate::net::types::{UserId, UserRecord};

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this user?";
pub const EMPTY_PLACEHOLDER: &str = "No users found.";
pub const LOAD_FAILURE: &str = "Failed to load users";
pub const DELETE_FAILURE: &str = "Failed to delete user";

/// Number of trailing characters left readable by [`mask_sensitive`].
const VISIBLE_TAIL: usize = 4;

/// Explicit yes/no answer to a destructive action.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Replace every character that has at least four characters after it.
#[must_use]
pub fn mask_sensitive(value: &str) -> String {
    let total = value.chars().count();
    value
        .chars()
        .enumerate()
        .map(|(index, ch)| if index + VISIBLE_TAIL < total { '*' } else { ch })
        .collect()
}

/// One rendered table line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableRow {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub pan: String,
}

impl From<&UserRecord> for TableRow {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            pan: mask_sensitive(&user.pan),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct TableState {
    pub users: Vec<UserRecord>,
    /// Refresh value the current `users` were loaded for.
    pub loaded_refresh: Option<u64>,
    pub loading: bool,
    pub error: Option<String>,
}

impl TableState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    #[must_use]
    pub fn ids(&self) -> Vec<UserId> {
        self.users.iter().map(|user| user.id).collect()
    }

    #[must_use]
    pub fn rows(&self) -> Vec<TableRow> {
        self.users.iter().map(TableRow::from).collect()
    }

    /// Reload when `refresh` differs from the last loaded value.
    ///
    /// Returns whether a reload happened.
    ///
    /// # Errors
    ///
    /// Returns the backend error when the list request fails.
    pub async fn sync(&mut self, api: &dyn UserApi, refresh: u64) -> Result<bool, ApiError> {
        if self.loaded_refresh == Some(refresh) {
            return Ok(false);
        }
        self.reload(api, refresh).await?;
        Ok(true)
    }

    /// Replace the whole list with the backend's current one.
    ///
    /// # Errors
    ///
    /// Returns the backend error; the previous rows are kept.
    pub async fn reload(&mut self, api: &dyn UserApi, refresh: u64) -> Result<(), ApiError> {
        self.loading = true;
        let result = api.list_users().await;
        self.loading = false;

        match result {
            Ok(users) => {
                tracing::debug!(count = users.len(), refresh, "table reloaded");
                self.users = users;
                self.loaded_refresh = Some(refresh);
                self.error = None;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "user list load failed");
                self.error = Some(LOAD_FAILURE.to_owned());
                Err(err)
            }
        }
    }

    /// Signal the root to start editing the row with `id`.
    #[must_use]
    pub fn edit(&self, id: UserId) -> Option<Signal> {
        self.users
            .iter()
            .find(|user| user.id == id)
            .map(|user| Signal::Edit(user.clone()))
    }

    /// Delete `id` after the user confirms, then drop it from the local list.
    ///
    /// Returns `false` when the user declined.
    ///
    /// # Errors
    ///
    /// Returns the backend error; the local list is left as it was.
    pub async fn request_delete(&mut self, id: UserId, confirm: &dyn Confirm, api: &dyn UserApi) -> Result<bool, ApiError> {
        if !confirm.confirm(DELETE_PROMPT) {
            tracing::debug!(id, "delete declined");
            return Ok(false);
        }

        if let Err(err) = api.delete_user(id).await {
            tracing::warn!(error = %err, id, "delete failed");
            self.error = Some(err.detail_text().unwrap_or_else(|| DELETE_FAILURE.to_owned()));
            return Err(err);
        }

        self.users.retain(|user| user.id != id);
        self.error = None;
        Ok(true)
    }
}
