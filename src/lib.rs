//! dep-graph-viz — Python module dependency graphs
//!
//! Scan a Python source tree, build a graph of its directories, modules and imports,
//! and render it with Graphviz or as a standalone HTML page.
//!
//! # Features
//! - File discovery with `.gitignore`/`.ignore` support; hidden entries are skipped
//! - Node kinds for package and plain directories, package modules and scripts
//! - Import extraction with tree-sitter, including imports nested in functions and classes
//! - Layered TOML configuration for edge/node styles and graph options
//! - DOT, SVG, PNG, HTML and JSON output
//!
//! # Quickstart (Library)
//! ```no_run
//! use dep_graph_viz::graph::DependencyGraph;
//! use dep_graph_viz::utils::config::Config;
//! use dep_graph_viz::visualization::DotGenerator;
//!
//! let root = std::path::Path::new(".");
//! let config = Config::default();
//! let graph = DependencyGraph::build(root, &config, /* no_ignore = */ false).expect("build graph");
//! println!("nodes: {} edges: {}", graph.node_count(), graph.edge_count());
//! let dot = DotGenerator::new().generate_dot(&graph, &config);
//! # let _ = dot;
//! ```
//!
//! # Quickstart (CLI)
//! ```text
//! dep-graph-viz build --path my_package --output deps --format svg
//! dep-graph-viz build --path my_package --format html --set graph.include_externals=true
//! dep-graph-viz print-config --set edge.uses.color=green
//! ```
pub mod app;
pub mod cli;
pub mod errors;
pub mod graph;
pub mod parser;
pub mod utils;
pub mod visualization;
