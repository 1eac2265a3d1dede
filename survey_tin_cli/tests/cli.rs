use assert_cmd::Command;
use assert_fs::prelude::*;
use predicates::prelude::*;

const SQUARE: &str = r#"{
  "vertices": [
    {"x": 0.0, "y": 0.0},
    {"x": 1.0, "y": 0.0},
    {"x": 1.0, "y": 1.0},
    {"x": 0.0, "y": 1.0},
    {"x": 1e-12, "y": 0.0}
  ],
  "triangles": [
    {"v": [0, 1, 2]},
    {"v": [0, 2, 3]}
  ]
}"#;

#[test]
fn clean_merges_near_duplicate_vertices() {
    let dir = assert_fs::TempDir::new().unwrap();
    let input = dir.child("mesh.json");
    input.write_str(SQUARE).unwrap();
    let output = dir.child("clean.json");

    Command::cargo_bin("survey_tin_cli")
        .unwrap()
        .args([
            "clean",
            input.path().to_str().unwrap(),
            output.path().to_str().unwrap(),
            "--precision",
            "6",
        ])
        .assert()
        .success();

    output.assert(predicate::path::exists());
    let cleaned: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(output.path()).unwrap()).unwrap();
    assert_eq!(cleaned["vertices"].as_array().unwrap().len(), 4);
}

#[test]
fn boundary_reports_one_ring_for_a_square() {
    let dir = assert_fs::TempDir::new().unwrap();
    let input = dir.child("mesh.json");
    input.write_str(SQUARE).unwrap();
    let output = dir.child("boundary.json");

    Command::cargo_bin("survey_tin_cli")
        .unwrap()
        .args([
            "boundary",
            input.path().to_str().unwrap(),
            output.path().to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("ring 0: 4 vertices"));
}

#[test]
fn insert_reports_leftovers() {
    let dir = assert_fs::TempDir::new().unwrap();
    let input = dir.child("mesh.json");
    input.write_str(SQUARE).unwrap();
    let points = dir.child("points.json");
    points
        .write_str(r#"[{"x": 0.25, "y": 0.25}, {"x": 9.0, "y": 9.0}]"#)
        .unwrap();
    let output = dir.child("refined.json");

    Command::cargo_bin("survey_tin_cli")
        .unwrap()
        .args([
            "insert",
            input.path().to_str().unwrap(),
            points.path().to_str().unwrap(),
            output.path().to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("inserted 1 points, 1 leftover"));
}

#[test]
fn invalid_mesh_fails_with_message() {
    let dir = assert_fs::TempDir::new().unwrap();
    let input = dir.child("mesh.json");
    input
        .write_str(r#"{"vertices": [{"x": 0.0, "y": null}], "triangles": []}"#)
        .unwrap();
    let output = dir.child("out.json");

    Command::cargo_bin("survey_tin_cli")
        .unwrap()
        .args([
            "clean",
            input.path().to_str().unwrap(),
            output.path().to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}
