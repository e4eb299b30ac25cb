//! Unit tests for copy-on-write document transactions.

use std::fs;
use std::path::{Path, PathBuf};

use rstest::{fixture, rstest};
use tempfile::TempDir;

use crate::{
    CleanupPolicy, DocumentTransaction, SafetyError, ScopeOutcome, TransactionOptions,
    backup_path_for,
};

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn document(&self) -> PathBuf {
        self.dir.path().join("report.docx")
    }

    fn seeded(&self, data: &[u8]) -> PathBuf {
        let path = self.document();
        fs::write(&path, data).expect("seed document");
        path
    }
}

#[fixture]
fn workspace() -> Workspace {
    Workspace {
        dir: TempDir::new().expect("create workspace"),
    }
}

fn begun(document: &Path, options: TransactionOptions) -> DocumentTransaction {
    let mut transaction = DocumentTransaction::new(document, options);
    transaction.begin().expect("begin");
    transaction
}

#[rstest]
fn working_copy_mirrors_existing_document(workspace: Workspace) {
    let document = workspace.seeded(b"original");
    let transaction = begun(&document, TransactionOptions::default());

    let working = transaction.get_working_path().expect("working path");

    assert_ne!(working, document.as_path());
    assert_eq!(fs::read(working).expect("read working"), b"original");
}

#[rstest]
fn missing_document_gets_empty_placeholder(workspace: Workspace) {
    let document = workspace.document();
    let transaction = begun(&document, TransactionOptions::default());

    let working = transaction.get_working_path().expect("working path");

    assert!(working.is_file());
    assert!(
        working
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with("_report.docx"))
    );
    assert!(!document.exists());
}

#[rstest]
fn working_path_requires_active_transaction(workspace: Workspace) {
    let transaction = DocumentTransaction::new(workspace.document(), TransactionOptions::default());

    let error = transaction.get_working_path().expect_err("not begun");

    assert!(error.is_misuse());
}

#[rstest]
fn commit_replaces_original_and_keeps_backup(workspace: Workspace) {
    let document = workspace.seeded(b"before");
    let mut transaction = begun(&document, TransactionOptions::default());
    let working = transaction.get_working_path().expect("working").to_path_buf();
    fs::write(&working, b"after").expect("edit working copy");

    transaction.commit().expect("commit");

    assert_eq!(fs::read(&document).expect("read document"), b"after");
    assert!(transaction.has_backup());
    assert_eq!(
        transaction.backup_path(),
        Some(backup_path_for(&document).as_path())
    );
    assert_eq!(
        fs::read(backup_path_for(&document)).expect("read backup"),
        b"before"
    );
    assert!(transaction.is_committed());
}

#[rstest]
fn commit_without_backup_leaves_no_bak_file(workspace: Workspace) {
    let document = workspace.seeded(b"before");
    let options = TransactionOptions {
        backup: false,
        ..TransactionOptions::default()
    };
    let mut transaction = begun(&document, options);

    transaction.commit().expect("commit");

    assert!(!transaction.has_backup());
    assert!(!backup_path_for(&document).exists());
}

#[rstest]
fn second_commit_is_misuse(workspace: Workspace) {
    let document = workspace.seeded(b"before");
    let mut transaction = begun(&document, TransactionOptions::default());
    transaction.commit().expect("first commit");

    let error = transaction.commit().expect_err("second commit");

    assert!(error.is_misuse());
}

#[rstest]
fn rollback_blocks_commit_and_writes_nothing(workspace: Workspace) {
    let document = workspace.seeded(b"before");
    let mut transaction = begun(&document, TransactionOptions::default());
    let working = transaction.get_working_path().expect("working").to_path_buf();
    fs::write(&working, b"after").expect("edit working copy");

    transaction.rollback().expect("rollback");

    assert!(transaction.is_committed());
    assert!(transaction.commit().expect_err("commit after rollback").is_misuse());
    assert_eq!(fs::read(&document).expect("read document"), b"before");
}

#[rstest]
fn restore_backup_reinstates_pre_commit_bytes(workspace: Workspace) {
    let document = workspace.seeded(b"before");
    let mut transaction = begun(&document, TransactionOptions::default());
    fs::write(transaction.get_working_path().expect("working"), b"after").expect("edit");
    transaction.commit().expect("commit");
    transaction
        .finish(ScopeOutcome::Completed)
        .expect("finish");

    transaction.restore_backup().expect("restore");

    assert_eq!(fs::read(&document).expect("read document"), b"before");
}

#[rstest]
fn restore_without_backup_is_misuse(workspace: Workspace) {
    let document = workspace.seeded(b"before");
    let transaction = begun(&document, TransactionOptions::default());

    let error = transaction.restore_backup().expect_err("no backup");

    assert!(error.is_misuse());
}

#[rstest]
fn restore_of_deleted_backup_is_not_found(workspace: Workspace) {
    let document = workspace.seeded(b"before");
    let mut transaction = begun(&document, TransactionOptions::default());
    transaction.commit().expect("commit");
    fs::remove_file(backup_path_for(&document)).expect("delete backup");

    let error = transaction.restore_backup().expect_err("backup gone");

    assert!(error.is_not_found());
    assert!(!transaction.has_backup());
}

#[rstest]
#[case::auto_commit_on(true, b"edited".as_slice())]
#[case::auto_commit_off(false, b"before".as_slice())]
fn completed_finish_honours_auto_commit(
    workspace: Workspace,
    #[case] auto_commit: bool,
    #[case] expected: &[u8],
) {
    let document = workspace.seeded(b"before");
    let options = TransactionOptions {
        auto_commit,
        ..TransactionOptions::default()
    };
    let mut transaction = begun(&document, options);
    fs::write(transaction.get_working_path().expect("working"), b"edited").expect("edit");

    transaction
        .finish(ScopeOutcome::Completed)
        .expect("finish");

    assert_eq!(fs::read(&document).expect("read document"), expected);
    assert_eq!(transaction.is_committed(), auto_commit);
}

#[rstest]
fn failed_finish_never_auto_commits(workspace: Workspace) {
    let document = workspace.seeded(b"before");
    let options = TransactionOptions {
        auto_commit: true,
        ..TransactionOptions::default()
    };
    let mut transaction = begun(&document, options);
    fs::write(transaction.get_working_path().expect("working"), b"edited").expect("edit");

    transaction.finish(ScopeOutcome::Failed).expect("finish");

    assert_eq!(fs::read(&document).expect("read document"), b"before");
    assert!(!transaction.is_committed());
}

#[rstest]
fn finish_releases_working_copy(workspace: Workspace) {
    let document = workspace.seeded(b"before");
    let mut transaction = begun(&document, TransactionOptions::default());
    let working = transaction.get_working_path().expect("working").to_path_buf();

    transaction
        .finish(ScopeOutcome::Completed)
        .expect("finish");

    assert!(!working.exists());
    assert!(transaction.get_working_path().is_err());
    assert!(
        transaction
            .finish(ScopeOutcome::Completed)
            .expect_err("already finished")
            .is_misuse()
    );
}

#[rstest]
fn kept_working_copy_survives_failed_scope(workspace: Workspace) {
    let document = workspace.seeded(b"before");
    let options = TransactionOptions {
        cleanup: CleanupPolicy {
            on_success: true,
            on_error: false,
        },
        ..TransactionOptions::default()
    };
    let mut transaction = begun(&document, options);
    let working = transaction.get_working_path().expect("working").to_path_buf();

    transaction.finish(ScopeOutcome::Failed).expect("finish");

    assert!(working.exists());
    let kept_dir = working.parent().expect("temp dir").to_path_buf();
    fs::remove_dir_all(kept_dir).expect("remove kept dir");
}

#[rstest]
fn run_propagates_body_error_and_leaves_original(workspace: Workspace) {
    let document = workspace.seeded(b"before");
    let mut working: Option<PathBuf> = None;

    let result: Result<(), SafetyError> =
        DocumentTransaction::run(&document, TransactionOptions::default(), |transaction| {
            let path = transaction.get_working_path()?;
            fs::write(path, b"edited").map_err(|err| SafetyError::io("write", path, err))?;
            working = Some(path.to_path_buf());
            Err(SafetyError::misuse("body failed"))
        });

    assert!(matches!(
        result,
        Err(SafetyError::TransactionMisuse {
            reason: "body failed"
        })
    ));
    assert_eq!(fs::read(&document).expect("read document"), b"before");
    assert!(!working.expect("body ran").exists());
}

#[rstest]
fn dropping_active_transaction_does_not_commit(workspace: Workspace) {
    let document = workspace.seeded(b"before");
    let options = TransactionOptions {
        auto_commit: true,
        ..TransactionOptions::default()
    };
    let working = {
        let transaction = begun(&document, options);
        let path = transaction.get_working_path().expect("working").to_path_buf();
        fs::write(&path, b"edited").expect("edit");
        path
    };

    assert!(!working.exists());
    assert_eq!(fs::read(&document).expect("read document"), b"before");
}
