//! Integration tests for the marginalia binary.

use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

const DATASET: &str = concat!(
    r#"{"transcript_id":"work_0001","text":"Intro text\nAI: How do you use AI at work?\nUser: Mostly for drafting.\nAI:\nUser: And summaries.","split":"workforce"}"#,
    "\n",
    r#"{"transcript_id":"sci_0001","text":"Assistant: Tell me about your lab.","split":"scientists"}"#,
    "\n",
    r#"{"transcript_id":"work_0002","text":"A: Second interview","split":"workforce"}"#,
    "\n",
);

fn marginalia() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("marginalia");
    cmd.env_remove("GITHUB_TOKEN")
        .env_remove("MARGINALIA_REPO")
        .env_remove("MARGINALIA_PATH")
        .env_remove("MARGINALIA_BRANCH")
        .env_remove("MARGINALIA_API_BASE")
        .env_remove("RUST_LOG");
    cmd
}

fn dataset_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("interviews.jsonl"), DATASET).unwrap();
    dir
}

#[test]
fn test_parse_file_prints_jsonl() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("t.txt");
    fs::write(&file, "A: x\nUser: y\nA: z\n").unwrap();

    marginalia()
        .arg("parse")
        .arg(&file)
        .assert()
        .success()
        .stdout(
            "{\"role\":\"assistant\",\"content\":\"x\"}\n\
             {\"role\":\"user\",\"content\":\"y\"}\n\
             {\"role\":\"assistant\",\"content\":\"z\"}\n",
        );
}

#[test]
fn test_parse_stdin_text_format() {
    marginalia()
        .args(["parse", "-", "--format", "text"])
        .write_stdin("A: hello User: not a marker")
        .assert()
        .success()
        .stdout(predicate::str::contains("assistant: hello User: not a marker"));
}

#[test]
fn test_parse_without_markers_warns() {
    marginalia()
        .args(["parse", "-"])
        .write_stdin("no speakers here")
        .assert()
        .success()
        .stdout("")
        .stderr(predicate::str::contains("No A:/AI:/Assistant:/User: markers found"));
}

#[test]
fn test_status_without_repo() {
    marginalia()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("repository not configured"));
}

#[test]
fn test_status_without_token() {
    marginalia()
        .args(["status", "--repo", "acme/interviews"])
        .assert()
        .success()
        .stdout(predicate::str::contains("acme/interviews:data/comments.jsonl@main"))
        .stdout(predicate::str::contains("token not configured"));
}

#[test]
fn test_status_with_token() {
    marginalia()
        .args(["status", "--repo", "acme/interviews", "--branch", "notes"])
        .env("GITHUB_TOKEN", "ghp_test")
        .assert()
        .success()
        .stdout(predicate::str::contains("@notes"))
        .stdout(predicate::str::contains("Comments enabled"))
        .stdout(predicate::str::contains("ghp_test").not());
}

#[test]
fn test_list_without_token_is_a_notice() {
    marginalia()
        .args(["comments", "list", "--repo", "acme/interviews"])
        // Unroutable; must never be contacted without a token
        .args(["--api-base", "http://127.0.0.1:9"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Comments are disabled"));
}

#[test]
fn test_add_without_token_fails() {
    marginalia()
        .args(["comments", "add", "work_0001", "0", "nice", "--repo", "acme/interviews"])
        .args(["--api-base", "http://127.0.0.1:9"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Comments are disabled"));
}

#[test]
fn test_show_by_id() {
    let dir = dataset_dir();

    marginalia()
        .args(["show", "--id", "work_0001", "--dataset"])
        .arg(dir.path().join("interviews.jsonl"))
        .assert()
        .success()
        .stdout(predicate::str::contains("work_0001 · workforce · 1 of 3"))
        .stdout(predicate::str::contains("[0] assistant\n    How do you use AI at work?"))
        .stdout(predicate::str::contains("[2] user\n    And summaries."))
        .stdout(predicate::str::contains("Intro text").not())
        .stderr(predicate::str::contains(
            "Comments are disabled: repository not configured",
        ));
}

#[test]
fn test_show_by_index_within_split() {
    let dir = dataset_dir();

    marginalia()
        .args(["show", "--split", "workforce", "--index", "2", "--dataset"])
        .arg(dir.path().join("interviews.jsonl"))
        .assert()
        .success()
        .stdout(predicate::str::contains("work_0002 · workforce · 2 of 2"));
}

#[test]
fn test_show_index_out_of_range() {
    let dir = dataset_dir();

    marginalia()
        .args(["show", "--index", "9", "--dataset"])
        .arg(dir.path().join("interviews.jsonl"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));
}

#[test]
fn test_splits() {
    let dir = dataset_dir();

    marginalia()
        .args(["splits", "--dataset"])
        .arg(dir.path().join("interviews.jsonl"))
        .assert()
        .success()
        .stdout(predicate::str::contains("scientists   1"))
        .stdout(predicate::str::contains("workforce    2"))
        .stdout(predicate::str::contains("total        3"));
}
