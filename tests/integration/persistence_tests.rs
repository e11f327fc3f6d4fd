//! Library service over JSON files

use std::{fs, path::PathBuf};

use shelfkeeper::{
    clock::Clock,
    models::UserPrefs,
    storage::{JsonStorage, LibraryStorage},
    AppError, LibraryService,
};

use crate::common::{borrower_id, sn, today, typical_model};

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("shelfkeeper-it-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    dir
}

fn open(dir: &PathBuf) -> LibraryService {
    let mut service = LibraryService::open(Box::new(JsonStorage::in_dir(dir)), UserPrefs::default()).unwrap();
    service.set_clock(Clock::Fixed(today()));
    service
}

#[test]
fn commands_are_persisted_across_sessions() {
    let dir = temp_dir("session");
    JsonStorage::in_dir(&dir).save_snapshot(&typical_model().snapshot()).unwrap();

    let mut service = open(&dir);
    for line in ["serve id/A0001", "loan sn/B0002", "set lp/7", "done", "delete 1"] {
        service.execute_line(line).unwrap();
    }
    let saved = service.model().snapshot();

    let reopened = open(&dir);
    assert_eq!(reopened.model().snapshot(), saved);
    assert!(!reopened.model().has_serial_number(&sn("B0001")));
    assert_eq!(reopened.model().user_settings().loan_period_days, 7);
    assert_eq!(reopened.model().borrower(&borrower_id("A0001")).unwrap().current_loans.len(), 1);
    // History and serve mode are not persisted
    assert!(!reopened.can_undo());
    assert!(!reopened.model().is_serve_mode());

    fs::remove_dir_all(dir).unwrap();
}

#[test]
fn undo_is_persisted() {
    let dir = temp_dir("undo");
    let mut service = open(&dir);
    service.execute_line("add t/Harry Botter a/J K Rowling").unwrap();
    service.execute_line("undo").unwrap();

    assert!(open(&dir).model().catalog().is_empty());
    fs::remove_dir_all(dir).unwrap();
}

#[test]
fn failed_command_reports_error() {
    let dir = temp_dir("failed");
    let mut service = open(&dir);
    let err = service.execute_line("loan 1").unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));
    assert_eq!(err.user_message(), "This command can only be used while serving a borrower");
    assert!(!dir.join("catalog.json").exists());
}
