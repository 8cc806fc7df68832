//! Record form: the editable draft and its submit lifecycle.
//!
//! DESIGN
//! ======
//! The form owns its draft outright. Selecting a record copies the five
//! editable fields, so typing never reaches the table's copy until a submit
//! succeeds and the table reloads.
//!
//! LIFECYCLE
//! =========
//! `Idle` (no target, empty draft) and `Editing` (target selected) are the
//! resting phases. `submit` moves to `Submitting` for the duration of the
//! network call and a drop guard puts the resting phase back, whether the
//! call succeeds, fails, or the future is dropped mid-flight.

#[cfg(test)]
#[path = "form_test.rs"]
mod form_test;

use crate::net::api::{ApiError, UserApi};
use crate::net::types::{Field, UserDraft, UserId, UserRecord};
use crate::validation::{self, Issue};

pub const CREATED_MESSAGE: &str = "User created";
pub const UPDATED_MESSAGE: &str = "User updated";
pub const GENERIC_FAILURE: &str = "Something went wrong";

/// Where the form is in its lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FormPhase {
    #[default]
    Idle,
    Editing,
    Submitting,
}

/// Errors returned by [`FormState::submit`].
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("a submit is already in flight")]
    Busy,

    #[error("{}", join_issues(.0))]
    Invalid(Vec<Issue>),

    #[error(transparent)]
    Api(#[from] ApiError),
}

fn join_issues(issues: &[Issue]) -> String {
    issues.iter().map(|issue| issue.message()).collect::<Vec<_>>().join("; ")
}

/// Restores the resting phase when the in-flight submit ends.
struct SubmitGuard<'a> {
    phase: &'a mut FormPhase,
    settled: FormPhase,
}

impl<'a> SubmitGuard<'a> {
    fn enter(phase: &'a mut FormPhase) -> Self {
        let settled = *phase;
        *phase = FormPhase::Submitting;
        Self { phase, settled }
    }
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        *self.phase = self.settled;
    }
}

/// Editable draft plus the messages shown under the form.
#[derive(Clone, Debug, Default)]
pub struct FormState {
    phase: FormPhase,
    target: Option<UserId>,
    draft: UserDraft,
    pan_visible: bool,
    error: Option<String>,
    success: Option<String>,
}

impl FormState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    /// Id of the record being edited, if any.
    #[must_use]
    pub fn target(&self) -> Option<UserId> {
        self.target
    }

    #[must_use]
    pub fn draft(&self) -> &UserDraft {
        &self.draft
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn success(&self) -> Option<&str> {
        self.success.as_deref()
    }

    /// Start editing `record`, or return to an empty create form on `None`.
    pub fn select(&mut self, record: Option<&UserRecord>) {
        match record {
            Some(record) => {
                self.target = Some(record.id);
                self.draft = record.to_draft();
                self.phase = FormPhase::Editing;
            }
            None => {
                self.target = None;
                self.draft = UserDraft::default();
                self.phase = FormPhase::Idle;
            }
        }
    }

    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        self.draft.set(field, value);
    }

    pub fn toggle_pan_visibility(&mut self) {
        self.pan_visible = !self.pan_visible;
    }

    #[must_use]
    pub fn pan_visible(&self) -> bool {
        self.pan_visible
    }

    /// The PAN as the input shows it: plain when revealed, starred otherwise.
    #[must_use]
    pub fn pan_display(&self) -> String {
        if self.pan_visible {
            self.draft.pan.clone()
        } else {
            "*".repeat(self.draft.pan.chars().count())
        }
    }

    #[must_use]
    pub fn heading(&self) -> &'static str {
        if self.target.is_some() { "Edit User" } else { "Add New User" }
    }

    #[must_use]
    pub fn submit_label(&self) -> &'static str {
        match (self.phase, self.target) {
            (FormPhase::Submitting, _) => "Processing...",
            (_, Some(_)) => "Update",
            (_, None) => "Create",
        }
    }

    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.phase != FormPhase::Submitting
    }

    /// Validate the draft and send it as an update (when editing) or a create.
    ///
    /// On success the server's record is returned; the caller is expected to
    /// raise the success signal so the table reloads. A create also resets
    /// the draft. On failure the draft is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::Invalid`] without touching the network when any
    /// rule fails, and [`FormError::Api`] when the backend call fails.
    pub async fn submit(&mut self, api: &dyn UserApi) -> Result<UserRecord, FormError> {
        if !self.can_submit() {
            return Err(FormError::Busy);
        }
        self.error = None;
        self.success = None;

        if let Err(issues) = validation::validate(&self.draft) {
            tracing::debug!(count = issues.len(), "draft failed validation");
            self.error = Some(join_issues(&issues));
            return Err(FormError::Invalid(issues));
        }

        let target = self.target;
        let result = {
            let _guard = SubmitGuard::enter(&mut self.phase);
            match target {
                Some(id) => api.update_user(id, &self.draft).await,
                None => api.create_user(&self.draft).await,
            }
        };

        match result {
            Ok(record) => {
                if target.is_some() {
                    self.success = Some(UPDATED_MESSAGE.to_owned());
                } else {
                    self.success = Some(CREATED_MESSAGE.to_owned());
                    self.draft = UserDraft::default();
                }
                Ok(record)
            }
            Err(err) => {
                tracing::warn!(error = %err, ?target, "submit failed");
                self.error = Some(err.detail_text().unwrap_or_else(|| GENERIC_FAILURE.to_owned()));
                Err(FormError::Api(err))
            }
        }
    }
}
