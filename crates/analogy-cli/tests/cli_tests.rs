//! CLI integration tests using assert_cmd.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const BANK: &str = r#"{
  "meta": { "bank_version": "it-1" },
  "items": [
    { "ITEM_ID": "I10", "ITEM_TYPE": "FIXED", "ANSWER_KEY": "A", "P_PLUS": 0.4,
      "STEM_TR": "su:buz", "STEM_EN": "water:ice", "A_TR": "süt:peynir", "A_EN": "milk:cheese" },
    { "ITEM_ID": "I2", "ITEM_TYPE": "FIXED", "ANSWER_KEY": "C", "P_PLUS": 0.7,
      "STEM_TR": "el:eldiven", "STEM_EN": "hand:glove" },
    { "ITEM_ID": "R1", "ITEM_TYPE": "ROTATION",
      "STEM_TR": "gece:ay", "STEM_EN": "night:moon" }
  ]
}"#;

fn analogy(dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("analogy").unwrap();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env_remove("ANALOGY_BANK")
        .env_remove("RUST_LOG");
    cmd
}

fn write_bank(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("bank.json");
    std::fs::write(&path, BANK).unwrap();
    path
}

fn exports(dir: &Path) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .map(|entries| entries.filter_map(|e| e.ok()).map(|e| e.path()).collect())
        .unwrap_or_default();
    paths.sort();
    paths
}

fn attempt_file(dir: &Path) -> PathBuf {
    exports(dir)
        .into_iter()
        .find(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("att_"))
        })
        .expect("attempt export")
}

#[test]
fn info_prints_summary() {
    let dir = TempDir::new().unwrap();
    let bank = write_bank(&dir);

    analogy(&dir)
        .arg("info")
        .arg("--bank")
        .arg(&bank)
        .assert()
        .success()
        .stdout(predicate::str::contains("items: 3 • bank_version: it-1"))
        .stdout(predicate::str::contains("fixed: 2 • rotation: 1"));
}

#[test]
fn info_missing_bank_fails() {
    let dir = TempDir::new().unwrap();

    analogy(&dir)
        .arg("info")
        .arg("--bank")
        .arg("missing.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"))
        .stderr(predicate::str::contains("missing.json"));
}

#[test]
fn validate_reports_warnings() {
    let dir = TempDir::new().unwrap();
    let bank = write_bank(&dir);

    analogy(&dir)
        .arg("validate")
        .arg("--bank")
        .arg(&bank)
        .assert()
        .success()
        .stdout(predicate::str::contains("Bank: items: 3"))
        .stdout(predicate::str::contains("ROTATION"))
        .stdout(predicate::str::contains("warning(s) found"));
}

#[test]
fn review_session_exports_attempt_and_localization() {
    let dir = TempDir::new().unwrap();
    let bank = write_bank(&dir);
    let out = dir.path().join("out");

    // Natural order is I2, I10, R1.
    analogy(&dir)
        .arg("review")
        .arg("--bank")
        .arg(&bank)
        .arg("--output")
        .arg(&out)
        .write_stdin("c\n:stem el : eldiven (yeni)\nn\n<\nn\nn\nv\nn\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("[item 1 / 3] fixed TR"))
        .stdout(predicate::str::contains("el : eldiven :: ? : ?"))
        .stdout(predicate::str::contains("stem_tr updated"))
        .stdout(predicate::str::contains("ANSWER_KEY"))
        .stdout(predicate::str::contains("attempt saved to"));

    let files = exports(&out);
    assert_eq!(files.len(), 2, "{files:?}");

    let attempt: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(attempt_file(&out)).unwrap()).unwrap();
    let rows = attempt["responses"].as_array().unwrap();
    let ids: Vec<&str> = rows.iter().map(|r| r["item_id"].as_str().unwrap()).collect();
    assert_eq!(ids, ["I2", "I10", "R1"]);
    assert_eq!(rows[0]["chosen_key"], "C");
    assert_eq!(rows[0]["correct"], true);
    assert!(rows[1]["chosen_key"].is_null());
    assert_eq!(attempt["meta"]["bank_version"], "it-1");

    let localization = files
        .iter()
        .find(|p| p.to_string_lossy().contains("analogies_localization_"))
        .unwrap();
    let loc: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(localization).unwrap()).unwrap();
    assert_eq!(loc["count_items_with_edits"], 1);
    assert_eq!(loc["edits"][0]["item_id"], "I2");
    assert_eq!(loc["edits"][0]["STEM_TR_suggestion"], "el : eldiven (yeni)");
}

#[test]
fn review_versioned_localization_export() {
    let dir = TempDir::new().unwrap();
    let bank = write_bank(&dir);
    let out = dir.path().join("out");

    analogy(&dir)
        .arg("review")
        .arg("--bank")
        .arg(&bank)
        .arg("--output")
        .arg(&out)
        .write_stdin(":note ambiguous\nx\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("(1 edited items)"));

    assert!(out.join("analogies_localization_it-1.json").exists());
    assert_eq!(exports(&out).len(), 1, "quit does not export the attempt");
}

#[test]
fn take_requires_answers() {
    let dir = TempDir::new().unwrap();
    let bank = write_bank(&dir);
    let out = dir.path().join("out");

    analogy(&dir)
        .arg("take")
        .arg("--bank")
        .arg(&bank)
        .arg("--output")
        .arg(&out)
        .arg("--seed")
        .arg("7")
        .arg("--auto-advance-ms")
        .arg("0")
        .write_stdin("n\na\nn\n<\nn\nc\nn\ne\nn\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("must be answered before moving on"))
        .stdout(predicate::str::contains("Finished: 3 of 3 items answered."));

    let attempt: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(attempt_file(&out)).unwrap()).unwrap();
    assert_eq!(attempt["meta"]["assembled_counts"]["fixed"], 2);
    assert_eq!(attempt["meta"]["assembled_counts"]["rotation"], 1);
    assert_eq!(exports(&out).len(), 1, "no localization export outside review");
}

#[test]
fn take_rejects_localization_edits() {
    let dir = TempDir::new().unwrap();
    let bank = write_bank(&dir);

    analogy(&dir)
        .arg("take")
        .arg("--bank")
        .arg(&bank)
        .arg("--output")
        .arg(dir.path().join("out"))
        .write_stdin(":stem x\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("only available in review mode"));
}

#[test]
fn score_attempt_text_json_and_html() {
    let dir = TempDir::new().unwrap();
    let bank = write_bank(&dir);
    let out = dir.path().join("out");

    // I2 correct, I10 wrong, R1 answered.
    analogy(&dir)
        .arg("review")
        .arg("--bank")
        .arg(&bank)
        .arg("--output")
        .arg(&out)
        .write_stdin("c\nn\nb\nn\ne\nn\nf\n")
        .assert()
        .success();
    let attempt = attempt_file(&out);

    analogy(&dir)
        .arg("score")
        .arg("--attempt")
        .arg(&attempt)
        .assert()
        .success()
        .stdout(predicate::str::contains("1/2"))
        .stdout(predicate::str::contains("50.0%"));

    let html = dir.path().join("review.html");
    let output = analogy(&dir)
        .arg("score")
        .arg("--attempt")
        .arg(&attempt)
        .arg("--format")
        .arg("json")
        .arg("--html")
        .arg(&html)
        .output()
        .unwrap();
    assert!(output.status.success());

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["fixed_total"], 2);
    assert_eq!(summary["fixed_correct"], 1);
    assert_eq!(summary["rotation_answered"], 1);
    assert_eq!(summary["raw"], 1);
    assert!(std::fs::read_to_string(&html).unwrap().contains("<html"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    analogy(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created analogy.toml"))
        .stdout(predicate::str::contains("Created data/analogies_items_private.json"));

    assert!(dir.path().join("analogy.toml").exists());

    // The sample config points at the sample bank.
    analogy(&dir)
        .arg("info")
        .assert()
        .success()
        .stdout(predicate::str::contains("bank_version: sample-1"));
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    analogy(&dir).arg("init").assert().success();

    analogy(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}
