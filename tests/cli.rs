use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::write;
use tempfile::{tempdir, NamedTempFile};

fn write_config(contents: &str) -> NamedTempFile {
    let config = NamedTempFile::new().expect("Creating temp config file failed");
    write(config.path(), contents).expect("Writing temp config failed");
    config
}

/// The missing-credential case aborts the whole run before any document is
/// touched.
#[test]
fn summarise_cli_fails_fast_without_credential() {
    let corpus = tempdir().unwrap();
    let out = tempdir().unwrap();
    write(corpus.path().join("foo.mc2"), "'foo' STORE text").unwrap();

    let config = write_config(&format!(
        "summarise:\n  input_dir: {}\n  output_dir: {}\n",
        corpus.path().display(),
        out.path().display()
    ));

    let mut cmd = Command::cargo_bin("rag-summarise").expect("Binary exists");
    cmd.arg("summarise")
        .arg("--config")
        .arg(config.path())
        .env_remove("OPENAI_API_KEY");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("OPENAI_API_KEY"));

    // Nothing was processed.
    assert!(!out.path().join("foo.txt").exists());
}

/// The annotation subcommand runs end-to-end without any network or
/// credential.
#[test]
fn annotate_cli_happy_flow_appends_links() {
    let summaries = tempdir().unwrap();
    write(
        summaries.path().join("REDUCE.txt"),
        "The 'REDUCE' function folds values of a GTS.",
    )
    .unwrap();

    let config = write_config(&format!(
        "annotate:\n  summary_dir: {}\n  doc_url_prefix: \"https://example.com/docs\"\n",
        summaries.path().display()
    ));

    let mut cmd = Command::cargo_bin("rag-summarise").expect("Binary exists");
    cmd.arg("annotate").arg("--config").arg(config.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Annotated 1 summaries"));

    let content = std::fs::read_to_string(summaries.path().join("REDUCE.txt")).unwrap();
    assert!(content.contains("[REDUCE](https://example.com/docs/REDUCE.mc2)"));
}

#[test]
fn cli_fails_for_missing_config_file() {
    let mut cmd = Command::cargo_bin("rag-summarise").expect("Binary exists");
    cmd.arg("annotate")
        .arg("--config")
        .arg("/nonexistent/config.yaml");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("config"));
}
