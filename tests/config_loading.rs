use dep_graph_viz::app::resolve_config;
use dep_graph_viz::errors::DepGraphError;
use dep_graph_viz::utils::config::{load_config_near, Config, CONFIG_FILE_NAME};
use std::fs;
use tempfile::tempdir;

#[test]
fn loads_config_near_root() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    assert!(load_config_near(root).unwrap().is_none());

    let toml = r#"
url_prefix = "https://example.com/tree/main/"

[graph]
include_externals = true

[edge.uses]
color = "green"
penwidth = 2

[node.script]
shape = "box"

[dot_attrs]
rankdir = "TB"
"#;
    fs::write(root.join(CONFIG_FILE_NAME), toml).unwrap();
    let cfg = resolve_config(root, None, &[]).unwrap();
    assert_eq!(cfg.url_prefix.as_deref(), Some("https://example.com/tree/main/"));
    assert!(cfg.graph.include_externals);
    assert!(cfg.graph.strict_names);
    assert_eq!(cfg.edge.uses.attrs["color"], "green");
    assert_eq!(cfg.edge.uses.attrs["penwidth"], "2");
    assert_eq!(cfg.edge.uses.attrs["style"], "solid");
    assert_eq!(cfg.node.script.attrs["shape"], "box");
    assert_eq!(cfg.node.script.attrs["color"], "green");
    assert_eq!(cfg.dot_attrs["rankdir"], "TB");
}

#[test]
fn explicit_file_and_overrides_apply_in_order() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join(CONFIG_FILE_NAME), "root_node_name = \"near\"\n").unwrap();
    let explicit = root.join("custom.toml");
    fs::write(&explicit, "root_node_name = \"explicit\"\n[edge]\ninits = \"none\"\n").unwrap();

    let cfg = resolve_config(root, Some(&explicit), &[]).unwrap();
    assert_eq!(cfg.root_node_name, "explicit");
    assert!(!cfg.edge.inits.enabled);

    let cfg = resolve_config(
        root,
        Some(&explicit),
        &["root_node_name=cli".to_string(), "edge.inits.enabled=true".to_string()],
    )
    .unwrap();
    assert_eq!(cfg.root_node_name, "cli");
    assert!(cfg.edge.inits.enabled);
}

#[test]
fn invalid_config_is_reported() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join(CONFIG_FILE_NAME), "this is = = not toml").unwrap();
    assert!(matches!(resolve_config(root, None, &[]), Err(DepGraphError::Config(_))));

    let missing = root.join("missing.toml");
    assert!(matches!(resolve_config(root, Some(&missing), &[]), Err(DepGraphError::Io(_))));

    let bad_type = root.join("bad.toml");
    fs::write(&bad_type, "[graph]\nstrict_names = \"sometimes\"\n").unwrap();
    assert!(matches!(resolve_config(root, Some(&bad_type), &[]), Err(DepGraphError::Config(_))));
}

#[test]
fn defaults_match_documented_styles() {
    let cfg = Config::default();
    assert_eq!(cfg.root_node_name, "ROOT");
    assert!(cfg.url_prefix.is_none());
    assert!(cfg.graph.include_local_imports);
    assert!(cfg.graph.strip_module_prefix);
    assert!(!cfg.graph.include_externals);
    assert!(!cfg.graph.except_if_missing_edges);
    assert_eq!(cfg.edge.inits.attrs["style"], "dashed");
    assert_eq!(cfg.edge.hierarchy.attrs["penwidth"], "3");
    assert_eq!(cfg.node.dir.attrs["color"], "blue");
    assert_eq!(cfg.node.module_root.attrs["shape"], "folder");
}
