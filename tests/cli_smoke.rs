use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

fn write(root: &Path, rel: &str, body: &str) {
    let p = root.join(rel);
    if let Some(parent) = p.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(p, body).unwrap();
}

#[test]
fn cli_build_dot_and_json_smoke() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("proj");
    write(&root, "pkg/__init__.py", "");
    write(&root, "pkg/a.py", "import pkg.b\n");
    write(&root, "pkg/b.py", "");
    let out = dir.path().join("deps");

    let mut cmd = Command::cargo_bin("dep-graph-viz").unwrap();
    cmd.arg("build")
        .arg("--path").arg(&root)
        .arg("--output").arg(&out)
        .arg("--format").arg("dot")
        .arg("--json").arg(dir.path().join("graph.json"));
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Built graph with 4 nodes"));

    let dot = fs::read_to_string(dir.path().join("deps.dot")).unwrap();
    assert!(dot.contains("\"pkg.b\" -> \"pkg.a\""));
    let json = fs::read_to_string(dir.path().join("graph.json")).unwrap();
    assert!(json.contains("\"package_name\": \"proj\""));
}

#[test]
fn cli_build_html_with_overrides() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("proj");
    write(&root, "main.py", "import requests\n");
    let out = dir.path().join("page");

    let mut cmd = Command::cargo_bin("dep-graph-viz").unwrap();
    cmd.arg("-q")
        .arg("build")
        .arg("--path").arg(&root)
        .arg("--output").arg(&out)
        .arg("--format").arg("html")
        .arg("--set").arg("graph.include_externals=true");
    cmd.assert().success().stdout(predicate::str::is_empty());

    let html = fs::read_to_string(dir.path().join("page.html")).unwrap();
    assert!(html.contains("\"requests\" -> \"main.py\""));
    assert!(dir.path().join("page.dot").exists());
}

#[test]
fn cli_build_missing_root_fails() {
    let dir = tempdir().unwrap();
    let mut cmd = Command::cargo_bin("dep-graph-viz").unwrap();
    cmd.arg("build")
        .arg("--path").arg(dir.path().join("nope"))
        .arg("--output").arg(dir.path().join("out"))
        .arg("--format").arg("dot");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Build failed"));
}

#[test]
fn cli_print_config_as_json() {
    let dir = tempdir().unwrap();
    let mut cmd = Command::cargo_bin("dep-graph-viz").unwrap();
    cmd.arg("print-config")
        .arg("--path").arg(dir.path())
        .arg("--set").arg("edge.uses.color=green");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"root_node_name\": \"ROOT\""))
        .stdout(predicate::str::contains("\"color\": \"green\""));
}

#[test]
fn cli_rejects_bad_override_and_format() {
    let mut cmd = Command::cargo_bin("dep-graph-viz").unwrap();
    cmd.arg("print-config").arg("--set").arg("missing-equals");
    cmd.assert().failure().stderr(predicate::str::contains("key=value"));

    let mut cmd = Command::cargo_bin("dep-graph-viz").unwrap();
    cmd.arg("build").arg("--format").arg("gif");
    cmd.assert().failure();
}

#[test]
fn cli_completions_bash() {
    let mut cmd = Command::cargo_bin("dep-graph-viz").unwrap();
    cmd.arg("completions").arg("bash");
    cmd.assert().success().stdout(predicate::str::contains("dep-graph-viz"));
}
