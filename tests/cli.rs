//! End to end runs of the `facsent` binary over the files in `tests/data`.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

fn facsent(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_facsent"))
        .arg("--config")
        .arg(config)
        .args(args)
        .output()
        .expect("failed to run facsent")
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn setup() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");
    fs::write(&config, r#"{"outputSettings": {"uploadDirectory": "archive"}}"#).unwrap();
    (dir, config)
}

#[test]
fn csv_upload() {
    let (dir, config) = setup();
    assert!(facsent(&config, &["add", "Smith"]).status.success());

    let out = dir.path().join("report.json");
    let input = fixture("smith.csv");
    let res = facsent(
        &config,
        &["upload", input.to_str().unwrap(), "--out", out.to_str().unwrap()],
    );
    assert!(res.status.success(), "{}", String::from_utf8_lossy(&res.stderr));

    let report = read_json(&out);
    // 3 positive, 1 negative, 1 neutral: negative equals neutral.
    assert_eq!(report["summary"], serde_json::json!({"POSITIVE": 3, "NEGATIVE": 1, "NEUTRAL": 1}));
    assert_eq!(report["verdict"], "NEGATIVE");
    assert_eq!(report["results"].as_array().unwrap().len(), 5);

    let faculty = read_json(&dir.path().join("faculty.json"));
    assert_eq!(
        faculty,
        serde_json::json!({"faculty": [{"name": "Smith", "analyzed_feedback": 0}]})
    );
    let analyzed = read_json(&dir.path().join("Analyzed_feedback.json"));
    assert_eq!(analyzed["smith"], report["summary"]);
    assert!(dir.path().join("archive").join("smith.csv").exists());

    // The report is its own reference.
    let res = facsent(
        &config,
        &["upload", input.to_str().unwrap(), "--out", "stdout", "--reference", out.to_str().unwrap()],
    );
    assert!(res.status.success(), "{}", String::from_utf8_lossy(&res.stderr));
}

#[test]
fn xlsx_upload() {
    let (dir, config) = setup();
    assert!(facsent(&config, &["add", "JONES"]).status.success());
    let out = dir.path().join("report.json");
    let res = facsent(
        &config,
        &[
            "upload",
            fixture("jones.xlsx").to_str().unwrap(),
            "--worksheet",
            "Feedback",
            "--out",
            out.to_str().unwrap(),
        ],
    );
    assert!(res.status.success(), "{}", String::from_utf8_lossy(&res.stderr));
    let report = read_json(&out);
    assert_eq!(report["verdict"], "NEGATIVE");
    assert_eq!(report["verdictCode"], 0);
    assert_eq!(report["config"]["faculty"], "jones");
}

#[test]
fn roster_commands() {
    let (dir, config) = setup();
    assert!(facsent(&config, &["add", "Smith"]).status.success());
    assert!(!facsent(&config, &["add", "smith"]).status.success());
    assert!(facsent(&config, &["add", "Brown"]).status.success());
    assert!(facsent(&config, &["rename", "brown", "Green"]).status.success());
    assert!(!facsent(&config, &["delete", "brown"]).status.success());
    assert!(facsent(&config, &["delete", "SMITH"]).status.success());

    let list = facsent(&config, &["list"]);
    assert!(list.status.success());
    let stdout = String::from_utf8_lossy(&list.stdout);
    assert_eq!(stdout.lines().collect::<Vec<&str>>(), vec!["Green\t-\t"]);

    let faculty = read_json(&dir.path().join("faculty.json"));
    assert_eq!(
        faculty,
        serde_json::json!({"faculty": [{"name": "Green", "analyzed_feedback": -1}]})
    );
}

#[test]
fn upload_for_unknown_faculty_fails() {
    let (dir, config) = setup();
    let res = facsent(&config, &["upload", fixture("smith.csv").to_str().unwrap()]);
    assert!(!res.status.success());
    assert!(String::from_utf8_lossy(&res.stderr).contains("not found"));
    assert!(!dir.path().join("Analyzed_feedback.json").exists());
}
