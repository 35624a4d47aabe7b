//! Annotation pass over a summary directory: identifier selection,
//! appended-link format, and skip reporting.

use std::fs;
use tempfile::tempdir;

use rag_summarise::annotate::{annotate, AnnotateReport};
use rag_summarise::config::AnnotateConfig;

const PREFIX: &str = "https://example.com/browse/docs";

fn config(dir: &std::path::Path) -> AnnotateConfig {
    AnnotateConfig {
        summary_dir: dir.to_path_buf(),
        doc_url_prefix: PREFIX.to_string(),
    }
}

#[test]
fn appends_link_for_first_quoted_identifier() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("PROFILE.txt"),
        "The 'PROFILE' macro computes a matrix profile over a GTS.",
    )
    .unwrap();

    let report = annotate(&config(dir.path())).expect("annotation succeeds");
    assert_eq!(
        report,
        AnnotateReport {
            annotated: 1,
            skipped: 0
        }
    );

    let content = fs::read_to_string(dir.path().join("PROFILE.txt")).unwrap();
    assert!(content.ends_with(&format!(
        "\nMore information in the documentation [PROFILE]({PREFIX}/PROFILE.mc2)\n"
    )));
}

/// Earliest occurrence across pattern kinds wins: a bold identifier at
/// position 10 beats a quoted one at position 50.
#[test]
fn earliest_identifier_wins_regardless_of_pattern_kind() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("MP_ROW.txt"),
        "Summary:   **MP_ROW** extracts one row; it relates to 'PROFILE' closely.",
    )
    .unwrap();

    annotate(&config(dir.path())).expect("annotation succeeds");

    let content = fs::read_to_string(dir.path().join("MP_ROW.txt")).unwrap();
    assert!(content.contains(&format!("[MP_ROW]({PREFIX}/MP_ROW.mc2)")));
    assert!(!content.contains("[PROFILE]"));
}

/// Summaries without any identifier are left byte-identical and counted as
/// skipped.
#[test]
fn summary_without_identifier_is_untouched() {
    let dir = tempdir().unwrap();
    let original = "A summary that never marks an identifier.";
    fs::write(dir.path().join("plain.txt"), original).unwrap();

    let report = annotate(&config(dir.path())).expect("annotation succeeds");
    assert_eq!(
        report,
        AnnotateReport {
            annotated: 0,
            skipped: 1
        }
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("plain.txt")).unwrap(),
        original
    );
}

/// Non-summary files in the directory are ignored entirely.
#[test]
fn non_summary_files_are_ignored() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("notes.md"), "see 'REDUCE'").unwrap();

    let report = annotate(&config(dir.path())).expect("annotation succeeds");
    assert_eq!(
        report,
        AnnotateReport {
            annotated: 0,
            skipped: 0
        }
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("notes.md")).unwrap(),
        "see 'REDUCE'"
    );
}

/// The link carries the file stem, not the matched identifier, as the
/// document name.
#[test]
fn link_uses_file_stem_for_document_name() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("ATBUCKETINDEX.txt"),
        "The function `BUCKETINDEX.AT` resolves bucket indices.",
    )
    .unwrap();

    annotate(&config(dir.path())).expect("annotation succeeds");

    let content = fs::read_to_string(dir.path().join("ATBUCKETINDEX.txt")).unwrap();
    assert!(content.contains(&format!(
        "[BUCKETINDEX.AT]({PREFIX}/ATBUCKETINDEX.mc2)"
    )));
}

/// Re-running appends a second copy of the sentence; the pass makes no
/// attempt to detect its own output.
#[test]
fn rerun_appends_again() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("FLUSS.txt"), "'FLUSS' computes flux.").unwrap();

    annotate(&config(dir.path())).expect("first pass succeeds");
    annotate(&config(dir.path())).expect("second pass succeeds");

    let content = fs::read_to_string(dir.path().join("FLUSS.txt")).unwrap();
    assert_eq!(
        content
            .matches("More information in the documentation")
            .count(),
        2
    );
}

#[test]
fn missing_summary_directory_errors() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("absent");
    let err = annotate(&config(&missing)).unwrap_err();
    assert!(err.contains("summary directory"));
}
