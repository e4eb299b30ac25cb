//! Unit tests for scope-bound temp directories.

use std::fs;
use std::path::PathBuf;

use rstest::{fixture, rstest};
use tempfile::TempDir;

use crate::{CleanupPolicy, SafetyError, ScopeOutcome, TEMP_DIR_PREFIX, TempFileManager};

#[fixture]
fn manager() -> TempFileManager {
    TempFileManager::new(CleanupPolicy::default())
}

#[rstest]
fn enter_allocates_prefixed_directory(mut manager: TempFileManager) {
    let dir = manager.enter().expect("enter scope").to_path_buf();

    assert!(dir.is_dir());
    let name = dir
        .file_name()
        .and_then(|name| name.to_str())
        .expect("utf-8 dir name");
    assert!(name.starts_with(TEMP_DIR_PREFIX), "unexpected dir name {name}");

    manager.exit(ScopeOutcome::Completed).expect("exit scope");
    assert!(!dir.exists());
}

#[rstest]
fn entering_twice_is_misuse(mut manager: TempFileManager) {
    manager.enter().expect("enter scope");

    let error = manager.enter().expect_err("second enter should fail");

    assert!(error.is_misuse());
}

#[rstest]
fn allocation_outside_scope_is_misuse(mut manager: TempFileManager) {
    let error = manager
        .create_temp_file("draft.docx")
        .expect_err("no active scope");

    assert!(error.is_misuse());
    assert!(manager.temp_dir().is_err());
}

#[rstest]
fn temp_file_name_combines_token_and_logical_name(mut manager: TempFileManager) {
    manager.enter().expect("enter scope");

    let path = manager.create_temp_file("draft.docx").expect("allocate");

    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .expect("utf-8 file name");
    let (token, logical) = name.split_once('_').expect("token separator");
    assert_eq!(logical, "draft.docx");
    assert_eq!(token.len(), 32);
    assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    assert!(path.starts_with(manager.temp_dir().expect("active dir")));
    assert_eq!(fs::read(&path).expect("read").len(), 0);
}

#[rstest]
fn repeated_logical_names_do_not_collide(mut manager: TempFileManager) {
    manager.enter().expect("enter scope");

    let first = manager.create_temp_file("same.docx").expect("first");
    let second = manager.create_temp_file("same.docx").expect("second");

    assert_ne!(first, second);
    assert_eq!(manager.list_temp_files().len(), 2);
}

#[rstest]
#[case::parent("../escape.docx")]
#[case::nested("nested/draft.docx")]
#[case::current(".")]
fn logical_names_must_be_single_components(mut manager: TempFileManager, #[case] name: &str) {
    manager.enter().expect("enter scope");

    let error = manager.create_temp_file(name).expect_err("rejected name");

    assert!(matches!(error, SafetyError::InvalidInput { .. }));
}

#[rstest]
fn copy_to_temp_clones_source_bytes(mut manager: TempFileManager) {
    let sandbox = TempDir::new().expect("sandbox");
    let source = sandbox.path().join("report.docx");
    fs::write(&source, b"original bytes").expect("seed source");
    manager.enter().expect("enter scope");

    let copy = manager.copy_to_temp(&source).expect("copy");

    assert_eq!(fs::read(&copy).expect("read copy"), b"original bytes");
    let files = manager.list_temp_files();
    let info = files.first().expect("recorded file");
    assert_eq!(info.original_name(), "report.docx");
    assert_eq!(info.path(), copy.as_path());
}

#[rstest]
fn copy_to_temp_of_missing_source_is_not_found(mut manager: TempFileManager) {
    let sandbox = TempDir::new().expect("sandbox");
    manager.enter().expect("enter scope");

    let error = manager
        .copy_to_temp(&sandbox.path().join("absent.docx"))
        .expect_err("missing source");

    assert!(error.is_not_found());
}

#[rstest]
#[case::success_removed(CleanupPolicy::ALWAYS, ScopeOutcome::Completed, false)]
#[case::failure_removed(CleanupPolicy::ALWAYS, ScopeOutcome::Failed, false)]
#[case::success_kept(
    CleanupPolicy { on_success: false, on_error: true },
    ScopeOutcome::Completed,
    true
)]
#[case::failure_kept(
    CleanupPolicy { on_success: true, on_error: false },
    ScopeOutcome::Failed,
    true
)]
fn exit_honours_cleanup_policy(
    #[case] policy: CleanupPolicy,
    #[case] outcome: ScopeOutcome,
    #[case] kept: bool,
) {
    let mut manager = TempFileManager::new(policy);
    let dir = manager.enter().expect("enter scope").to_path_buf();
    manager.create_temp_file("draft.docx").expect("allocate");

    manager.exit(outcome).expect("exit scope");

    assert_eq!(dir.exists(), kept);
    if kept {
        fs::remove_dir_all(&dir).expect("remove kept dir");
    }
}

#[rstest]
fn run_returns_body_error_after_cleanup(mut manager: TempFileManager) {
    let mut seen: Option<PathBuf> = None;

    let result: Result<(), SafetyError> = manager.run(|scope| {
        seen = Some(scope.temp_dir()?.to_path_buf());
        Err(SafetyError::misuse("body failed"))
    });

    assert!(matches!(
        result,
        Err(SafetyError::TransactionMisuse {
            reason: "body failed"
        })
    ));
    assert!(!seen.expect("body ran").exists());
    assert!(!manager.is_active());
}

#[rstest]
fn dropping_an_active_manager_removes_its_directory() {
    let dir = {
        let mut manager = TempFileManager::new(CleanupPolicy::ALWAYS);
        manager.enter().expect("enter scope").to_path_buf()
    };

    assert!(!dir.exists());
}

#[rstest]
fn panicking_scope_still_removes_its_directory() {
    let mut seen: Option<PathBuf> = None;

    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let mut manager = TempFileManager::new(CleanupPolicy::ALWAYS);
        seen = Some(manager.enter().expect("enter scope").to_path_buf());
        panic!("scope body panicked");
    }));

    assert!(outcome.is_err());
    assert!(!seen.expect("scope entered").exists());
}
