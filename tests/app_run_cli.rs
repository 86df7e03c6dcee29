use dep_graph_viz::app::run_cli;
use dep_graph_viz::cli::{Cli, Commands, FormatArg};
use std::fs;
use tempfile::tempdir;

fn build_cli(path: std::path::PathBuf, output: std::path::PathBuf, format: FormatArg, overrides: Vec<String>) -> Cli {
    Cli {
        verbose: 0,
        quiet: true,
        command: Commands::Build {
            path: Some(path),
            output,
            format,
            config: None,
            overrides,
            json: None,
            no_ignore: false,
        },
    }
}

#[test]
fn run_cli_build_writes_dot() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("src_tree");
    fs::create_dir_all(&root).unwrap();
    fs::write(root.join("app.py"), "import os\n").unwrap();

    let out = dir.path().join("graph");
    let code = run_cli(build_cli(root, out, FormatArg::Dot, Vec::new()));
    assert_eq!(code, 0);
    let dot = fs::read_to_string(dir.path().join("graph.dot")).unwrap();
    assert!(dot.contains("\"ROOT\" -> \"app.py\""));
}

#[test]
fn run_cli_reports_config_errors() {
    let dir = tempdir().unwrap();
    let code = run_cli(build_cli(
        dir.path().to_path_buf(),
        dir.path().join("graph"),
        FormatArg::Dot,
        vec!["graph.strict_names=sometimes".to_string()],
    ));
    assert_eq!(code, 1);
    assert!(!dir.path().join("graph.dot").exists());
}

#[test]
fn run_cli_strict_parse_failure_exits_nonzero() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("pkg")).unwrap();
    fs::write(dir.path().join("pkg/__init__.py"), "").unwrap();
    fs::write(dir.path().join("pkg/a.py"), "from . import b\n").unwrap();

    let out = dir.path().join("graph");
    let lenient = run_cli(build_cli(dir.path().to_path_buf(), out.clone(), FormatArg::Dot, Vec::new()));
    assert_eq!(lenient, 0);
    let strict = run_cli(build_cli(
        dir.path().to_path_buf(),
        out,
        FormatArg::Dot,
        vec!["graph.except_if_missing_edges=true".to_string()],
    ));
    assert_eq!(strict, 1);
}
