use super::*;
use crate::state::test_helpers::{MockApi, rejected, row_rejection};

fn spreadsheet(dir: &tempfile::TempDir, name: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, b"PK\x03\x04rows").unwrap();
    path
}

// =============================================================
// Selection
// =============================================================

#[test]
fn select_replaces_previous_file() {
    let mut panel = UploadState::new();
    panel.select_file("a.xlsx");
    panel.select_file("b.xlsx");
    assert_eq!(panel.file, Some(PathBuf::from("b.xlsx")));
    panel.clear();
    assert!(panel.file.is_none());
}

#[tokio::test]
async fn upload_without_file_is_noop() {
    let api = MockApi::default();
    let mut panel = UploadState::new();
    assert!(panel.upload(&api).await.unwrap().is_none());
    assert!(api.calls().is_empty());
    assert!(panel.message.is_none());
}

#[tokio::test]
async fn non_xlsx_rejected_locally() {
    let api = MockApi::default();
    let mut panel = UploadState::new();
    panel.select_file("users.csv");

    let err = panel.upload(&api).await.unwrap_err();
    assert!(matches!(err, UploadError::NotXlsx(_)));
    assert_eq!(panel.message.as_deref(), Some(WRONG_EXTENSION));
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn unreadable_file_shows_generic_failure() {
    let dir = tempfile::tempdir().unwrap();
    let api = MockApi::default();
    let mut panel = UploadState::new();
    panel.select_file(dir.path().join("missing.xlsx"));

    let err = panel.upload(&api).await.unwrap_err();
    assert!(matches!(err, UploadError::Read { .. }));
    assert_eq!(panel.message.as_deref(), Some(UPLOAD_FAILURE));
    assert!(api.calls().is_empty());
}

// =============================================================
// Upload outcomes
// =============================================================

#[tokio::test]
async fn success_shows_message_clears_file_and_signals() {
    let dir = tempfile::tempdir().unwrap();
    let api = MockApi::default();
    let mut panel = UploadState::new();
    panel.select_file(spreadsheet(&dir, "users.xlsx"));

    let signal = panel.upload(&api).await.unwrap();
    assert_eq!(signal, Some(Signal::Success));
    assert_eq!(panel.message.as_deref(), Some("2 users successfully added."));
    assert!(panel.file.is_none());
    assert_eq!(api.calls(), vec!["upload:users.xlsx:8"]);
}

#[tokio::test]
async fn row_errors_render_one_line_each() {
    let dir = tempfile::tempdir().unwrap();
    let api = MockApi::default();
    api.fail_next(row_rejection(vec![
        RowError { row: 3, error: "invalid phone".into() },
        RowError { row: 5, error: "Invalid PAN format".into() },
    ]));
    let mut panel = UploadState::new();
    panel.select_file(spreadsheet(&dir, "users.xlsx"));

    let err = panel.upload(&api).await.unwrap_err();
    assert!(matches!(err, UploadError::Rows(ref rows) if rows.len() == 2));
    assert_eq!(panel.error_lines(), vec!["Row 3: invalid phone", "Row 5: Invalid PAN format"]);
    assert!(panel.message.is_none());
    assert!(panel.file.is_some());
}

#[tokio::test]
async fn rejection_without_rows_is_generic() {
    let dir = tempfile::tempdir().unwrap();
    let api = MockApi::default();
    api.fail_next(rejected(400, "File must be .xlsx format"));
    let mut panel = UploadState::new();
    panel.select_file(spreadsheet(&dir, "users.xlsx"));

    let err = panel.upload(&api).await.unwrap_err();
    assert!(matches!(err, UploadError::Api(_)));
    assert_eq!(panel.message.as_deref(), Some(UPLOAD_FAILURE));
    assert!(panel.errors.is_empty());
}

#[tokio::test]
async fn new_attempt_clears_old_row_errors() {
    let dir = tempfile::tempdir().unwrap();
    let api = MockApi::default();
    api.fail_next(row_rejection(vec![RowError { row: 2, error: "bad".into() }]));
    let mut panel = UploadState::new();
    panel.select_file(spreadsheet(&dir, "users.xlsx"));

    panel.upload(&api).await.unwrap_err();
    assert_eq!(panel.errors.len(), 1);
    panel.upload(&api).await.unwrap();
    assert!(panel.errors.is_empty());
}

// =============================================================
// Template
// =============================================================

#[tokio::test]
async fn template_written_to_destination() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("sample_template.xlsx");
    let api = MockApi::default();

    let written = download_template(&api, &dest).await.unwrap();
    assert_eq!(std::fs::read(&dest).unwrap().len(), written);
    assert_eq!(api.calls(), vec!["template"]);
}

#[tokio::test]
async fn template_failure_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("sample_template.xlsx");
    let api = MockApi::default();
    api.fail_next(ApiError::Transport("refused".into()));

    assert!(download_template(&api, &dest).await.is_err());
    assert!(!dest.exists());
}
