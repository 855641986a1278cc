use std::{fs, path::Path};

use assert_cmd::Command;
use predicates::prelude::*;
use rusqlite::{Connection, params};
use tempfile::TempDir;

fn venuegraph() -> Command {
    let mut cmd = Command::cargo_bin("venuegraph").unwrap();
    cmd.env("NO_COLOR", "1").env("RUST_LOG", "warn");
    cmd
}

fn write_config(dir: &Path, extra: &str) -> std::path::PathBuf {
    let path = dir.join("config.toml");
    let body = format!(
        r#"
[author]
id = "1741101"
first_name = "Ada"
last_name = "Lovelace"

[zotero]
db_path = "zotero.sqlite"
root_collection = "My Publications"
citations_collection = "Citations"

[paths]
output_impact_graph = "out/impact_graph.json"
output_pubs = "out/publications.json"
output_diet = "out/citation_diet.json"
venue_map = "venue_map.json"
{extra}
"#
    );
    fs::write(&path, body).unwrap();
    path
}

/// Two authored papers, one of them cited from three venues, plus a container without the author.
fn write_library(path: &Path) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(
        r#"
        CREATE TABLE collections (
            collectionID INTEGER PRIMARY KEY,
            collectionName TEXT NOT NULL,
            parentCollectionID INTEGER
        );
        CREATE TABLE items (itemID INTEGER PRIMARY KEY);
        CREATE TABLE collectionItems (collectionID INTEGER, itemID INTEGER);
        CREATE TABLE creators (creatorID INTEGER PRIMARY KEY, firstName TEXT, lastName TEXT);
        CREATE TABLE itemCreators (itemID INTEGER, creatorID INTEGER, orderIndex INTEGER);
        CREATE TABLE fields (fieldID INTEGER PRIMARY KEY, fieldName TEXT);
        CREATE TABLE itemDataValues (valueID INTEGER PRIMARY KEY, value);
        CREATE TABLE itemData (itemID INTEGER, fieldID INTEGER, valueID INTEGER);

        INSERT INTO fields VALUES
            (1, 'title'), (2, 'date'), (3, 'publicationTitle'), (4, 'proceedingsTitle'),
            (5, 'url'), (6, 'DOI');
        INSERT INTO collections VALUES
            (1, 'My Publications', NULL),
            (2, 'Paper A', 1), (3, 'Citations', 2),
            (4, 'Paper B', 1),
            (5, 'Paper C', 1);
        INSERT INTO creators VALUES (1, 'Ada', 'Lovelace'), (2, 'Charles', 'Babbage');
        INSERT INTO items VALUES (10), (11), (20), (21), (22), (30);
        INSERT INTO collectionItems VALUES (2, 10), (4, 11), (3, 20), (3, 21), (3, 22), (5, 30);
        INSERT INTO itemCreators VALUES (10, 1, 0), (10, 2, 1), (11, 1, 0), (30, 2, 0);
        "#,
    )
    .unwrap();

    let data: &[(i64, i64, &str)] = &[
        (10, 1, "Engines of Analysis"),
        (10, 2, "2021-05-03"),
        (10, 4, "Proceedings of the 2021 CHI Conference on Human Factors in Computing Systems"),
        (10, 6, "10.1145/0000000"),
        (11, 1, "Notes on the Engine"),
        (11, 2, "March 2023"),
        (11, 3, "arXiv preprint arXiv:2303.00001"),
        (20, 3, "CoRR"),
        (21, 4, "Proceedings of the 17th ACM Conference on Recommender Systems (RecSys '23)"),
        (22, 3, "Journal of Difference Engines"),
        (30, 1, "Someone Else's Paper"),
    ];
    for (value_id, (item, field, value)) in data.iter().enumerate() {
        conn.execute(
            "INSERT INTO itemDataValues VALUES (?1, ?2)",
            params![value_id as i64, value],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO itemData VALUES (?1, ?2, ?3)",
            params![item, field, value_id as i64],
        )
        .unwrap();
    }
}

#[test]
fn normalize_without_config_uses_builtin_rules() {
    let dir = TempDir::new().unwrap();
    venuegraph()
        .current_dir(dir.path())
        .args(["normalize", "CoRR", "CHI '24", "Proceedings of the 24th International Conference on Foo 2023"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CoRR => arXiv"))
        .stdout(predicate::str::contains("CHI '24 => ACM CHI"))
        .stdout(predicate::str::contains("2023 => Foo"));
}

#[test]
fn normalize_applies_configured_overrides() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), "");
    fs::write(dir.path().join("venue_map.json"), r#"{"Foo": "The Foo Venue"}"#).unwrap();
    venuegraph()
        .arg("--config")
        .arg(&config)
        .args(["normalize", "Foo 2023"])
        .assert()
        .success()
        .stdout(predicate::str::diff("Foo 2023 => The Foo Venue\n"));
}

#[test]
fn malformed_venue_map_is_fatal() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), "");
    fs::write(dir.path().join("venue_map.json"), "[not a map").unwrap();
    venuegraph()
        .arg("--config")
        .arg(&config)
        .args(["normalize", "Foo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("malformed venue map"));
}

#[test]
fn missing_config_is_fatal() {
    let dir = TempDir::new().unwrap();
    venuegraph()
        .current_dir(dir.path())
        .arg("graph")
        .assert()
        .failure()
        .stderr(predicate::str::contains("config.example.toml"));
}

#[test]
fn missing_library_is_fatal() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), "");
    venuegraph()
        .arg("--config")
        .arg(&config)
        .arg("pubs")
        .assert()
        .failure()
        .stderr(predicate::str::contains("database not found"));
    assert!(!dir.path().join("out").exists());
}

#[test]
fn pubs_writes_publications_and_diet() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let config = write_config(dir.path(), "");
    write_library(&dir.path().join("zotero.sqlite"));

    let output = venuegraph().arg("--config").arg(&config).arg("pubs").output()?;
    assert!(output.status.success());
    let stderr = String::from_utf8(strip_ansi_escapes::strip(output.stderr))?;
    assert!(
        stderr.contains("✓ 2 publications (3 citations across 3 venues)") && stderr.contains("✗ 1 skipped"),
        "stderr summary mismatch. stderr=\n{stderr}"
    );

    let pubs: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("out/publications.json"))?)?;
    let pubs = pubs.as_array().unwrap();
    assert_eq!(pubs.len(), 2);
    assert_eq!(pubs[0]["title"], "Notes on the Engine");
    assert_eq!(pubs[0]["year"], "2023");
    assert_eq!(pubs[0]["venue"], "arXiv");
    assert_eq!(pubs[1]["venue"], "ACM CHI");
    assert_eq!(pubs[1]["doi"], "10.1145/0000000");
    assert_eq!(pubs[1]["authors"][1]["last"], "Babbage");

    let diet: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("out/citation_diet.json"))?)?;
    assert_eq!(diet["name"], "Citation Diet");
    let buckets: Vec<&str> = diet["children"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["name"].as_str().unwrap())
        .collect();
    assert_eq!(buckets, ["Journal", "Conference", "Preprint"]);
    Ok(())
}

#[test]
fn pubs_dry_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), "");
    write_library(&dir.path().join("zotero.sqlite"));

    venuegraph()
        .arg("--config")
        .arg(&config)
        .args(["pubs", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run complete."))
        .stdout(predicate::str::contains("Notes on the Engine"));
    assert!(!dir.path().join("out").exists());
}

#[test]
fn graph_survives_an_unreachable_api() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let config = write_config(
        dir.path(),
        "[api]\nbase_url = \"http://127.0.0.1:9\"\npage_delay_ms = 0\n",
    );

    let output = venuegraph().arg("--config").arg(&config).arg("graph").output()?;
    assert!(output.status.success());
    let stderr = String::from_utf8(strip_ansi_escapes::strip(output.stderr))?;
    assert!(stderr.contains("✓ 0 venues, 0 connections"), "stderr=\n{stderr}");

    let graph: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("out/impact_graph.json"))?)?;
    assert_eq!(graph["nodes"], serde_json::json!([]));
    assert_eq!(graph["links"], serde_json::json!([]));
    Ok(())
}
