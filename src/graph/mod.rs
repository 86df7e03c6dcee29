//! Dependency graph model and builder.
//!
//! [`DependencyGraph::build`] scans a Python source tree and produces a directed
//! multigraph whose nodes are directories, Python files and (optionally) external
//! modules. Hierarchy edges run from a directory to its entries; import edges run
//! from the imported node to the importer.
use crate::errors::DepGraphError;
use crate::parser::PythonParser;
use crate::utils::config::Config;
use crate::utils::file_walker;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

pub mod node;

pub use node::{classify_node, Edge, EdgeKind, GraphNode, Node, NodeKind};

#[derive(Debug, Clone)]
pub struct DependencyGraph {
    graph: DiGraph<GraphNode, Edge>,
    by_path: HashMap<String, NodeIndex>,
    by_name: HashMap<String, NodeIndex>,
    externals: HashMap<String, NodeIndex>,
    package_name: String,
    root_node_name: String,
}

enum ImportTarget {
    Local(NodeIndex),
    External(String),
}

#[derive(Serialize)]
struct EdgeRecord<'a> {
    from: &'a str,
    to: &'a str,
    kind: EdgeKind,
    attrs: &'a std::collections::BTreeMap<String, String>,
}

#[derive(Serialize)]
struct GraphSnapshot<'a> {
    package_name: &'a str,
    root_node_name: &'a str,
    nodes: Vec<&'a GraphNode>,
    edges: Vec<EdgeRecord<'a>>,
}

impl DependencyGraph {
    #[must_use]
    pub fn new(package_name: impl Into<String>, root_node_name: impl Into<String>) -> Self {
        Self {
            graph: DiGraph::new(),
            by_path: HashMap::new(),
            by_name: HashMap::new(),
            externals: HashMap::new(),
            package_name: package_name.into(),
            root_node_name: root_node_name.into(),
        }
    }

    /// Build the dependency graph of the Python tree under `root`.
    ///
    /// Arguments:
    /// - `root`: directory to scan.
    /// - `config`: resolved configuration (styles and `graph.*` switches).
    /// - `no_ignore`: when true, `.gitignore`/`.ignore` rules are bypassed during the scan.
    ///
    /// # Errors
    /// Returns `DepGraphError` when the root or a parent node is missing, a node is
    /// duplicated, a file fails to parse, or (depending on `graph.strict_names` and
    /// `graph.except_if_missing_edges`) when a module name or module source is invalid.
    pub fn build(root: &Path, config: &Config, no_ignore: bool) -> Result<Self, DepGraphError> {
        let files = file_walker::python_files_with_options(root, no_ignore)?;
        let directories = file_walker::directories_of(&files);
        let package_name = config.package_name_for(root);
        let root_node_name = config.effective_root_node_name(&package_name);
        let mut graph = Self::new(package_name.clone(), root_node_name);

        // Root first so it gets index 0.
        let ordered_dirs = directories
            .iter()
            .filter(|d| d.as_str() == ".")
            .chain(directories.iter().filter(|d| d.as_str() != "."));
        for dir in ordered_dirs {
            graph.add_node(Node::from_path(root, dir, config, &package_name)?)?;
        }
        for dir in directories.iter().filter(|d| d.as_str() != ".") {
            graph.link_to_parent(dir, config)?;
        }

        for file in &files {
            if node::is_init_file(file) {
                continue;
            }
            let node = Node::from_path(root, file, config, &package_name)?;
            let rel_path = node.rel_path.clone();
            graph.add_node(node)?;
            graph.link_to_parent(&rel_path, config)?;
        }

        if config.graph.include_local_imports {
            graph.add_import_edges(root, config)?;
        }

        tracing::info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            files = files.len(),
            "built dependency graph"
        );
        Ok(graph)
    }

    /// Insert a local node.
    ///
    /// # Errors
    /// Returns `DepGraphError::DuplicateNode` if a node with the same `rel_path` exists.
    pub fn add_node(&mut self, node: Node) -> Result<NodeIndex, DepGraphError> {
        if self.by_path.contains_key(&node.rel_path) {
            return Err(DepGraphError::DuplicateNode { path: node.rel_path });
        }
        let rel_path = node.rel_path.clone();
        let name = node.display_name.clone();
        let idx = self.graph.add_node(GraphNode::Local(node));
        self.by_path.insert(rel_path.clone(), idx);
        if let Some(&existing) = self.by_name.get(&name) {
            tracing::warn!(
                name = %name,
                kept = %self.graph[existing].as_local().map_or("", |n| n.rel_path.as_str()),
                ignored = %rel_path,
                "display name collision, imports resolve to the first node"
            );
        } else {
            self.by_name.insert(name, idx);
        }
        Ok(idx)
    }

    /// Insert an external node, or return the existing one with that name.
    pub fn add_external(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.externals.get(name) {
            return idx;
        }
        let idx = self.graph.add_node(GraphNode::External { name: name.to_string() });
        self.externals.insert(name.to_string(), idx);
        idx
    }

    /// Add an edge styled by `config`; returns `false` when that edge kind is disabled.
    pub fn add_edge(&mut self, from: NodeIndex, to: NodeIndex, kind: EdgeKind, config: &Config) -> bool {
        let style = config.edge.get(kind);
        if !style.enabled {
            tracing::debug!(kind = kind.as_str(), "edge style disabled, skipping edge");
            return false;
        }
        self.graph.add_edge(from, to, Edge { kind, attrs: style.attrs.clone() });
        true
    }

    fn link_to_parent(&mut self, rel_path: &str, config: &Config) -> Result<(), DepGraphError> {
        let Some(&child) = self.by_path.get(rel_path) else {
            return Err(DepGraphError::NotFound { path: rel_path.into() });
        };
        let Some(GraphNode::Local(node)) = self.graph.node_weight(child) else {
            return Ok(());
        };
        let Some(parent_dir) = node.parent_dir.clone() else {
            return Ok(());
        };
        let child_kind = node.kind;
        let parent = *self.by_path.get(&parent_dir).ok_or_else(|| DepGraphError::MissingParent {
            node: rel_path.to_string(),
            parent: parent_dir.clone(),
        })?;
        let parent_kind = match &self.graph[parent] {
            GraphNode::Local(p) => p.kind,
            GraphNode::External { .. } => {
                return Err(DepGraphError::MissingParent { node: rel_path.to_string(), parent: parent_dir })
            }
        };
        self.add_edge(parent, child, EdgeKind::containment(parent_kind, child_kind), config);
        Ok(())
    }

    fn add_import_edges(&mut self, root: &Path, config: &Config) -> Result<(), DepGraphError> {
        let mut parser = PythonParser::new()
            .map_err(|source| DepGraphError::ParseError { file: root.to_path_buf(), source })?;
        let allow_missing = !config.graph.except_if_missing_edges;
        let mut pending: Vec<(ImportTarget, NodeIndex, EdgeKind)> = Vec::new();

        for idx in self.graph.node_indices() {
            let Some(node) = self.graph[idx].as_local() else { continue };
            let Some(source_rel) = node.source_path() else { continue };
            let source_path = root.join(&source_rel);
            let source = match fs::read_to_string(&source_path) {
                Ok(s) => s,
                Err(e) if allow_missing => {
                    tracing::warn!(path = %source_path.display(), error = %e, "could not read source code, skipping");
                    continue;
                }
                Err(_) => return Err(DepGraphError::MissingSource { path: source_path }),
            };
            let imports = parser
                .parse_imports(&source, allow_missing)
                .map_err(|source| DepGraphError::ParseError { file: source_path.clone(), source })?;

            let edge_kind = if node::is_init_file(&source_rel) { EdgeKind::Inits } else { EdgeKind::Uses };
            let mut seen = HashSet::new();
            for import in imports {
                if !seen.insert(import.module.clone()) {
                    continue;
                }
                let name = self.local_name(&import.module, config.graph.strip_module_prefix);
                if let Some(&target) = self.by_name.get(name.as_str()) {
                    pending.push((ImportTarget::Local(target), idx, edge_kind));
                } else if config.graph.include_externals {
                    pending.push((ImportTarget::External(name), idx, EdgeKind::External));
                } else {
                    tracing::debug!(module = %name, importer = %node.rel_path, "dropping external import");
                }
            }
        }

        for (target, importer, kind) in pending {
            let from = match target {
                ImportTarget::Local(idx) => idx,
                ImportTarget::External(name) => self.add_external(&name),
            };
            self.add_edge(from, importer, kind, config);
        }
        Ok(())
    }

    /// Map an imported module name onto the graph's display-name space.
    fn local_name(&self, module: &str, strip_prefix: bool) -> String {
        if !strip_prefix {
            return module.to_string();
        }
        let rest = if module == self.package_name {
            ""
        } else {
            module
                .strip_prefix(self.package_name.as_str())
                .and_then(|r| r.strip_prefix('.'))
                .unwrap_or(module)
        };
        if rest.is_empty() {
            self.root_node_name.clone()
        } else {
            rest.to_string()
        }
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    #[must_use]
    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    #[must_use]
    pub fn root_node_name(&self) -> &str {
        &self.root_node_name
    }

    /// Underlying petgraph graph.
    #[must_use]
    pub fn inner(&self) -> &DiGraph<GraphNode, Edge> {
        &self.graph
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.graph.node_weights()
    }

    /// Edges as `(from, to, edge)` in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (&GraphNode, &GraphNode, &Edge)> {
        self.graph
            .edge_references()
            .map(|e| (&self.graph[e.source()], &self.graph[e.target()], e.weight()))
    }

    #[must_use]
    pub fn node_by_path(&self, rel_path: &str) -> Option<&Node> {
        self.by_path.get(rel_path).and_then(|&idx| self.graph[idx].as_local())
    }

    /// Look up a node by display name (local) or external module name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&GraphNode> {
        self.by_name
            .get(name)
            .or_else(|| self.externals.get(name))
            .map(|&idx| &self.graph[idx])
    }

    /// Nodes with an edge of `kind` into the node called `name`.
    #[must_use]
    pub fn sources_of(&self, name: &str, kind: EdgeKind) -> Vec<&GraphNode> {
        let Some(&idx) = self.by_name.get(name).or_else(|| self.externals.get(name)) else {
            return Vec::new();
        };
        self.graph
            .edges_directed(idx, Direction::Incoming)
            .filter(|e| e.weight().kind == kind)
            .map(|e| &self.graph[e.source()])
            .collect()
    }

    /// Serialize nodes and edges as pretty-printed JSON.
    ///
    /// # Errors
    /// Returns `DepGraphError::Io` if serialization fails.
    pub fn to_json(&self) -> Result<String, DepGraphError> {
        let snapshot = GraphSnapshot {
            package_name: &self.package_name,
            root_node_name: &self.root_node_name,
            nodes: self.nodes().collect(),
            edges: self
                .edges()
                .map(|(from, to, edge)| EdgeRecord {
                    from: from.display_name(),
                    to: to.display_name(),
                    kind: edge.kind,
                    attrs: &edge.attrs,
                })
                .collect(),
        };
        serde_json::to_string_pretty(&snapshot)
            .map_err(|e| DepGraphError::Io(std::io::Error::other(e.to_string())))
    }

    /// Save the graph as pretty-printed JSON.
    ///
    /// # Errors
    /// Returns `DepGraphError::Io` if serialization or writing the file fails.
    pub fn save_json(&self, path: &Path) -> Result<(), DepGraphError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
