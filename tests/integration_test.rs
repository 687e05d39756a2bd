//! Integration tests for the spark-defaults.conf updater and credentials discovery.
//!
//! These tests verify the public API against a real filesystem.

use gcs_connector::credentials::discover_credentials;
use gcs_connector::error::InstallError;
use gcs_connector::spark::{ENABLE_KEY, KEYFILE_KEY, spark_defaults_path};
use gcs_connector::{MatchMode, find_credentials, update_spark_defaults};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

fn temp_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(Uuid::new_v4().to_string());
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_key_file(path: &Path) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, "{\"type\": \"authorized_user\"}").unwrap();
}

#[test]
fn test_update_replaces_stale_keys_and_keeps_order() {
    let dir = temp_dir();
    let conf = dir.join("spark-defaults.conf");
    fs::write(
        &conf,
        format!(
            "spark.master local[4]\n{} /old/a.json\nspark.executor.memory 2g\n{} false\n{} /old/b.json\n# trailing comment\n",
            KEYFILE_KEY, ENABLE_KEY, KEYFILE_KEY
        ),
    )
    .unwrap();

    update_spark_defaults(&conf, Path::new("/x/y.json"), MatchMode::Substring).unwrap();

    let content = fs::read_to_string(&conf).unwrap();
    assert_eq!(
        content,
        format!(
            "{} true\n{} /x/y.json\nspark.master local[4]\nspark.executor.memory 2g\n# trailing comment\n",
            ENABLE_KEY, KEYFILE_KEY
        )
    );

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_update_creates_missing_file() {
    let dir = temp_dir();
    let conf = dir.join("spark-defaults.conf");

    update_spark_defaults(&conf, Path::new("/x/y.json"), MatchMode::Substring).unwrap();

    assert_eq!(
        fs::read_to_string(&conf).unwrap(),
        format!("{} true\n{} /x/y.json\n", ENABLE_KEY, KEYFILE_KEY)
    );

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_update_is_idempotent() {
    let dir = temp_dir();
    let conf = dir.join("spark-defaults.conf");
    fs::write(&conf, "foo.bar baz\n").unwrap();

    update_spark_defaults(&conf, Path::new("/x/y.json"), MatchMode::Substring).unwrap();
    let once = fs::read_to_string(&conf).unwrap();
    update_spark_defaults(&conf, Path::new("/x/y.json"), MatchMode::Substring).unwrap();
    let twice = fs::read_to_string(&conf).unwrap();

    assert_eq!(once, twice);
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_update_documented_example() {
    let dir = temp_dir();
    let conf = dir.join("spark-defaults.conf");
    fs::write(
        &conf,
        "foo.bar baz\nspark.hadoop.google.cloud.auth.service.account.enable false\n",
    )
    .unwrap();

    update_spark_defaults(&conf, Path::new("/x/y.json"), MatchMode::Substring).unwrap();

    assert_eq!(
        fs::read_to_string(&conf).unwrap(),
        "spark.hadoop.google.cloud.auth.service.account.enable true\n\
         spark.hadoop.google.cloud.auth.service.account.json.keyfile /x/y.json\n\
         foo.bar baz\n"
    );
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_exact_mode_keeps_comments() {
    let dir = temp_dir();
    let conf = dir.join("spark-defaults.conf");
    let comment = format!("# {} is managed by install-gcs-connector", ENABLE_KEY);
    fs::write(&conf, format!("{}\n{} false\n", comment, ENABLE_KEY)).unwrap();

    update_spark_defaults(&conf, Path::new("/x/y.json"), MatchMode::ExactKey).unwrap();

    let content = fs::read_to_string(&conf).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[2], comment);
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_update_reports_unwritable_path() {
    let dir = temp_dir();
    let conf = dir.join("no-such-dir").join("spark-defaults.conf");

    let err = update_spark_defaults(&conf, Path::new("/x/y.json"), MatchMode::Substring)
        .unwrap_err();
    assert!(matches!(err, InstallError::ConfigUpdate { .. }));

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_spark_defaults_path_creates_conf_dir() {
    let dir = temp_dir();

    let path = spark_defaults_path(&dir).unwrap();
    assert_eq!(path, dir.join("conf").join("spark-defaults.conf"));
    assert!(dir.join("conf").is_dir());

    // existing conf dir is reused
    assert_eq!(spark_defaults_path(&dir).unwrap(), path);
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_discovery_prefers_newest_within_pattern() {
    let dir = temp_dir();
    let older = dir.join("legacy/alice/adc.json");
    let newer = dir.join("legacy/bob/adc.json");
    write_key_file(&older);
    // ctime granularity differs between filesystems
    std::thread::sleep(Duration::from_millis(1100));
    write_key_file(&newer);

    let pattern = format!("{}/legacy/*/adc.json", dir.display());
    let found = find_credentials(&[pattern]).unwrap();
    assert_eq!(found.path, newer);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_discovery_respects_pattern_priority() {
    let dir = temp_dir();
    let primary = dir.join("application_default_credentials.json");
    let legacy = dir.join("legacy/bob/adc.json");
    write_key_file(&primary);
    std::thread::sleep(Duration::from_millis(1100));
    write_key_file(&legacy);

    let patterns = vec![
        primary.to_string_lossy().to_string(),
        format!("{}/legacy/*/adc.json", dir.display()),
    ];
    let found = find_credentials(&patterns).unwrap();
    assert_eq!(found.path, primary);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_discovery_falls_through_to_later_pattern() {
    let dir = temp_dir();
    let legacy = dir.join("legacy/carol/adc.json");
    write_key_file(&legacy);

    let patterns = vec![
        dir.join("application_default_credentials.json")
            .to_string_lossy()
            .to_string(),
        format!("{}/legacy/*/adc.json", dir.display()),
    ];
    assert_eq!(find_credentials(&patterns).unwrap().path, legacy);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_discovery_none_when_nothing_matches() {
    let dir = temp_dir();
    let patterns = vec![format!("{}/legacy/*/adc.json", dir.display())];

    assert!(find_credentials(&patterns).is_none());
    let err = discover_credentials(&patterns).unwrap_err();
    assert!(err.to_string().contains("gcloud auth application-default login"));

    fs::remove_dir_all(&dir).unwrap();
}
