//! In-memory backend shared by the state-machine tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::net::api::{ApiError, UserApi};
use crate::net::types::{ErrorBody, RowError, UploadReceipt, UserDraft, UserId, UserRecord};

pub fn user(id: UserId) -> UserRecord {
    UserRecord {
        id,
        first_name: format!("First{id}"),
        last_name: format!("Last{id}"),
        email: format!("user{id}@example.com"),
        phone: "1234567890".into(),
        pan: "ABCDE1234F".into(),
    }
}

pub fn valid_draft() -> UserDraft {
    UserDraft {
        first_name: "Parichaye".into(),
        last_name: "Grover".into(),
        email: "parichaye@example.com".into(),
        phone: "9876543210".into(),
        pan: "PQRST6789Z".into(),
    }
}

pub fn rejected(status: u16, detail: &str) -> ApiError {
    ApiError::Rejected {
        status,
        body: ErrorBody { detail: Some(serde_json::Value::String(detail.to_owned())), ..ErrorBody::default() },
    }
}

pub fn row_rejection(rows: Vec<RowError>) -> ApiError {
    ApiError::Rejected { status: 400, body: ErrorBody { errors: Some(rows), ..ErrorBody::default() } }
}

/// Backend double that stores users in a vector and logs every call.
#[derive(Default)]
pub struct MockApi {
    users: Mutex<Vec<UserRecord>>,
    calls: Mutex<Vec<String>>,
    next_failure: Mutex<Option<ApiError>>,
    hang: AtomicBool,
}

impl MockApi {
    pub fn with_users(ids: &[UserId]) -> Self {
        let api = Self::default();
        *api.users.lock().unwrap() = ids.iter().copied().map(user).collect();
        api
    }

    /// Make the next call fail with `err`.
    pub fn fail_next(&self, err: ApiError) {
        *self.next_failure.lock().unwrap() = Some(err);
    }

    /// Make every mutating call wait forever.
    pub fn hang_mutations(&self) {
        self.hang.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn users(&self) -> Vec<UserRecord> {
        self.users.lock().unwrap().clone()
    }

    fn begin(&self, call: String) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(call);
        match self.next_failure.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn maybe_hang(&self) {
        if self.hang.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
    }
}

fn from_draft(id: UserId, draft: &UserDraft) -> UserRecord {
    UserRecord {
        id,
        first_name: draft.first_name.clone(),
        last_name: draft.last_name.clone(),
        email: draft.email.clone(),
        phone: draft.phone.clone(),
        pan: draft.pan.clone(),
    }
}

#[async_trait::async_trait]
impl UserApi for MockApi {
    async fn list_users(&self) -> Result<Vec<UserRecord>, ApiError> {
        self.begin("list".into())?;
        Ok(self.users())
    }

    async fn create_user(&self, draft: &UserDraft) -> Result<UserRecord, ApiError> {
        self.maybe_hang().await;
        self.begin("create".into())?;
        let mut users = self.users.lock().unwrap();
        let id = users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        let created = from_draft(id, draft);
        users.push(created.clone());
        Ok(created)
    }

    async fn update_user(&self, id: UserId, draft: &UserDraft) -> Result<UserRecord, ApiError> {
        self.maybe_hang().await;
        self.begin(format!("update:{id}"))?;
        let mut users = self.users.lock().unwrap();
        let Some(slot) = users.iter_mut().find(|u| u.id == id) else {
            return Err(rejected(404, "User not found"));
        };
        *slot = from_draft(id, draft);
        Ok(slot.clone())
    }

    async fn delete_user(&self, id: UserId) -> Result<(), ApiError> {
        self.begin(format!("delete:{id}"))?;
        self.users.lock().unwrap().retain(|u| u.id != id);
        Ok(())
    }

    async fn upload_spreadsheet(&self, file_name: &str, contents: Vec<u8>) -> Result<UploadReceipt, ApiError> {
        self.begin(format!("upload:{file_name}:{}", contents.len()))?;
        Ok(UploadReceipt { message: Some("2 users successfully added.".into()) })
    }

    async fn download_template(&self) -> Result<Vec<u8>, ApiError> {
        self.begin("template".into())?;
        Ok(b"PK\x03\x04template".to_vec())
    }
}
