use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::tempdir;

fn chefai(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("chefai").unwrap();
    cmd.env("CHEFAI_ROOT", root)
        .env("XDG_CONFIG_HOME", root.join("xdg"))
        .env_remove("CHEFAI_CONFIG")
        .env_remove("CHEFAI_STORAGE_BACKEND")
        .env_remove("RUST_LOG")
        .arg("--quiet");
    cmd
}

fn robot(root: &Path, args: &[&str]) -> Value {
    let output = chefai(root).arg("--robot").args(args).output().unwrap();
    assert!(
        output.status.success(),
        "chefai {args:?} failed: {}",
        String::from_utf8_lossy(&output.stdout)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("chefai").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("suggest"));
}

#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("chefai").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_suggest_scenario_robot() {
    let dir = tempdir().unwrap();
    let json = robot(dir.path(), &["suggest", "garlic, chicken, onion"]);

    assert_eq!(json["status"], "ok");
    let suggestion = &json["suggestion"];
    assert_eq!(suggestion["template"]["id"], 1);
    assert_eq!(suggestion["template"]["name"], "Garlic Butter Chicken");
    assert!((suggestion["confidence"].as_f64().unwrap() - 0.6).abs() < 1e-9);
    assert_eq!(suggestion["reasoning"].as_array().unwrap().len(), 3);
    assert_eq!(json["skill"]["interaction_count"], 1);
    assert_eq!(json["skill"]["tier"], "beginner");
}

#[test]
fn test_suggest_human_output() {
    let dir = tempdir().unwrap();
    chefai(dir.path())
        .args(["suggest", "salmon, lemon, butter"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Thinking it through"))
        .stdout(predicate::str::contains("Pan-Seared Salmon with Lemon Butter"))
        .stdout(predicate::str::contains("Hard"));
}

#[test]
fn test_progress_survives_restarts_and_promotes_once() {
    let dir = tempdir().unwrap();
    for _ in 0..4 {
        robot(dir.path(), &["suggest", "potato, onion"]);
    }
    let fifth = robot(dir.path(), &["suggest", "potato, onion"]);
    assert_eq!(fifth["suggestion"]["tier"], "beginner");
    assert_eq!(fifth["suggestion"]["promoted_to"], "intermediate");

    let status = robot(dir.path(), &["status"]);
    assert_eq!(status["skill"]["interaction_count"], 5);
    assert_eq!(status["skill"]["tier"], "intermediate");
    assert_eq!(status["skill"]["next_threshold"], 15);
    assert_eq!(status["storage"]["backend"], "json");

    let sixth = robot(dir.path(), &["suggest", "potato, onion"]);
    assert!((sixth["suggestion"]["confidence"].as_f64().unwrap() - 0.75).abs() < 1e-9);
    assert!(sixth["suggestion"].get("promoted_to").is_none());
}

#[test]
fn test_no_match_is_reported_and_not_counted() {
    let dir = tempdir().unwrap();
    let json = robot(dir.path(), &["suggest", "marshmallow, licorice"]);
    assert_eq!(json["status"], "retry");
    assert_eq!(json["code"], "no_match");
    assert!(json["message"].as_str().unwrap().contains("try different ingredients"));

    let status = robot(dir.path(), &["status"]);
    assert_eq!(status["skill"]["interaction_count"], 0);
}

#[test]
fn test_blank_ingredients_are_a_validation_retry() {
    let dir = tempdir().unwrap();
    let json = robot(dir.path(), &["suggest", " , ,"]);
    assert_eq!(json["code"], "validation");

    chefai(dir.path())
        .args(["suggest", ","])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing was recorded"));
}

#[test]
fn test_history_is_most_recent_first() {
    let dir = tempdir().unwrap();
    robot(dir.path(), &["suggest", "eggs"]);
    robot(dir.path(), &["suggest", "tortilla, black beans"]);
    robot(dir.path(), &["suggest", "tofu, soy sauce, ginger"]);

    let json = robot(dir.path(), &["history", "--limit", "2"]);
    let entries = json["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["recipe"], "Ginger Soy Stir-Fry");
    assert_eq!(entries[1]["recipe"], "Black Bean Tacos");
    assert_eq!(json["total"], 3);
}

#[test]
fn test_feedback_and_pairings_flow() {
    let dir = tempdir().unwrap();
    robot(dir.path(), &["suggest", "rice, eggs, scallions"]);

    let json = robot(dir.path(), &["feedback", "--rating", "liked"]);
    assert_eq!(json["feedback"]["pairs_updated"], 3);

    let json = robot(dir.path(), &["pairings", "Eggs"]);
    let pairings = json["pairings"].as_array().unwrap();
    assert_eq!(pairings.len(), 2);
    assert!((pairings[0]["score"].as_f64().unwrap() - 1.0).abs() < 1e-9);

    // A suggestion can only be rated once.
    let output = chefai(dir.path())
        .args(["--robot", "feedback", "--rating", "disliked"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let err: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(err["error"], true);
    assert_eq!(err["code"], "validation");
}

#[test]
fn test_experiments_bridge_liked_pairs() {
    let dir = tempdir().unwrap();
    robot(dir.path(), &["suggest", "chicken, garlic"]);
    robot(dir.path(), &["feedback", "--rating", "liked"]);
    robot(dir.path(), &["suggest", "chicken, lemon"]);
    robot(dir.path(), &["feedback", "--rating", "liked"]);

    let json = robot(dir.path(), &["experiments"]);
    let experiments = json["experiments"].as_array().unwrap();
    assert_eq!(experiments.len(), 1);
    assert_eq!(experiments[0]["ingredients"], serde_json::json!(["garlic", "lemon"]));
    assert_eq!(experiments[0]["via"], "chicken");
    assert!((experiments[0]["confidence"].as_f64().unwrap() - 0.1).abs() < 1e-9);

    chefai(dir.path())
        .arg("experiments")
        .assert()
        .success()
        .stdout(predicate::str::contains("garlic + lemon"));
}

#[test]
fn test_feedback_without_history_fails() {
    let dir = tempdir().unwrap();
    chefai(dir.path())
        .args(["feedback", "--rating", "liked"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no suggestions to rate yet"));
}

#[test]
fn test_catalog_filters_by_cuisine() {
    let dir = tempdir().unwrap();
    let json = robot(dir.path(), &["catalog", "--cuisine", "italian"]);
    let templates = json["templates"].as_array().unwrap();
    assert!(!templates.is_empty());
    assert!(templates.iter().all(|t| t["cuisine"] == "italian"));

    chefai(dir.path())
        .args(["catalog", "--cuisine", "martian"])
        .assert()
        .failure();
}

#[test]
fn test_reset_returns_to_beginner() {
    let dir = tempdir().unwrap();
    for _ in 0..5 {
        robot(dir.path(), &["suggest", "beef, bread"]);
    }
    let json = robot(dir.path(), &["reset"]);
    assert_eq!(json["cleared_interactions"], 5);

    let status = robot(dir.path(), &["status"]);
    assert_eq!(status["skill"]["interaction_count"], 0);
    assert_eq!(status["skill"]["tier"], "beginner");
    assert_eq!(status["skill"]["history_count"], 0);
}

#[test]
fn test_sqlite_backend_persists() {
    let dir = tempdir().unwrap();
    for _ in 0..2 {
        chefai(dir.path())
            .env("CHEFAI_STORAGE_BACKEND", "sqlite")
            .args(["--robot", "suggest", "chickpeas, tomato"])
            .assert()
            .success();
    }
    assert!(dir.path().join("chefai.db").exists());
    assert!(!dir.path().join("state.json").exists());

    let output = chefai(dir.path())
        .env("CHEFAI_STORAGE_BACKEND", "sqlite")
        .args(["--robot", "status"])
        .output()
        .unwrap();
    let status: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(status["skill"]["interaction_count"], 2);
    assert_eq!(status["storage"]["backend"], "sqlite");
}

#[test]
fn test_corrupt_state_falls_back_to_fresh_session() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("state.json"), "{ definitely not json").unwrap();

    let json = robot(dir.path(), &["suggest", "chicken, garlic"]);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["skill"]["interaction_count"], 1);
    assert!(json["storage_warning"].as_str().unwrap().contains("persistence error"));

    // The next run reads the state the fallback session saved.
    let status = robot(dir.path(), &["status"]);
    assert_eq!(status["skill"]["interaction_count"], 1);
    assert!(status["storage"]["warning"].is_null());
}

#[test]
fn test_config_file_changes_thresholds() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("custom.toml");
    std::fs::write(&config, "[engine]\nthresholds = [1, 2, 3]\n").unwrap();

    let output = chefai(dir.path())
        .args(["--robot", "--config"])
        .arg(&config)
        .args(["suggest", "eggs"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["suggestion"]["promoted_to"], "intermediate");
}

#[test]
fn test_invalid_config_is_reported() {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join("config.toml"),
        "[engine]\nmultipliers = [1.0, 0.5, 0.5, 0.5]\n",
    )
    .unwrap();
    let output = chefai(dir.path()).args(["--robot", "status"]).output().unwrap();
    assert!(!output.status.success());
    let err: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(err["code"], "config");
}

#[test]
fn test_completions_generate_without_data_root() {
    let mut cmd = Command::cargo_bin("chefai").unwrap();
    cmd.args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("chefai"));
}
