//! Client-side state for the user-management screen.
//!
//! DESIGN
//! ======
//! State is split by component (`form`, `table`, `upload`) so each owns its
//! data exclusively. Components never call each other; they hand a
//! [`Signal`] back to the root (`app`), which owns the only shared state:
//! the current edit target and the refresh counter.

pub mod app;
pub mod form;
pub mod table;
pub mod upload;

#[cfg(test)]
pub(crate) mod test_helpers;

use crate::net::types::UserRecord;

/// Component-to-root notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Signal {
    /// A mutation succeeded: clear the edit target and refresh the table.
    Success,
    /// Start editing this record.
    Edit(UserRecord),
}
