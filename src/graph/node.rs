//! Node and edge vocabulary of the dependency graph.
use crate::errors::DepGraphError;
use crate::utils::config::{Config, Style};
use crate::utils::paths::{normalize_path, parent_dir, path_to_module};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

const INIT_FILE: &str = "__init__.py";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Root directory containing `__init__.py`.
    ModuleRoot,
    /// Root directory without `__init__.py`.
    Root,
    /// Non-root directory containing `__init__.py`.
    ModuleDir,
    /// Non-root directory without `__init__.py`.
    Dir,
    /// Python file inside a package directory.
    ModuleFile,
    /// Standalone Python file.
    Script,
}

impl NodeKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ModuleRoot => "module_root",
            Self::Root => "root",
            Self::ModuleDir => "module_dir",
            Self::Dir => "dir",
            Self::ModuleFile => "module_file",
            Self::Script => "script",
        }
    }

    #[must_use]
    pub fn is_root(self) -> bool {
        matches!(self, Self::ModuleRoot | Self::Root)
    }

    #[must_use]
    pub fn is_module(self) -> bool {
        matches!(self, Self::ModuleRoot | Self::ModuleDir | Self::ModuleFile)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    ModuleHierarchy,
    Hierarchy,
    Uses,
    Inits,
    External,
}

impl EdgeKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ModuleHierarchy => "module_hierarchy",
            Self::Hierarchy => "hierarchy",
            Self::Uses => "uses",
            Self::Inits => "inits",
            Self::External => "external",
        }
    }

    /// Containment edge kind between a directory and one of its entries.
    #[must_use]
    pub fn containment(parent: NodeKind, child: NodeKind) -> Self {
        if parent.is_module() && child.is_module() {
            Self::ModuleHierarchy
        } else {
            Self::Hierarchy
        }
    }
}

fn fs_path(root: &Path, rel_path: &str) -> PathBuf {
    if rel_path == "." {
        root.to_path_buf()
    } else {
        root.join(rel_path)
    }
}

fn clean_rel(path: &str) -> String {
    let mut rel = normalize_path(path);
    while let Some(rest) = rel.strip_prefix("./") {
        rel = rest.to_string();
    }
    let rel = rel.trim_end_matches('/');
    if rel.is_empty() {
        ".".to_string()
    } else {
        rel.to_string()
    }
}

/// `true` for a path naming a package's `__init__.py`.
#[must_use]
pub fn is_init_file(rel_path: &str) -> bool {
    rel_path == INIT_FILE || rel_path.ends_with("/__init__.py")
}

/// Classify a path relative to `root` by looking at the filesystem.
///
/// # Errors
/// Returns `DepGraphError::NotFound` if the path or its parent directory is missing,
/// and `DepGraphError::UnknownPathType` for anything that is neither a directory nor
/// a `.py` file.
pub fn classify_node(root: &Path, path: &str) -> Result<NodeKind, DepGraphError> {
    let rel = clean_rel(path);
    let full = fs_path(root, &rel);
    if !full.exists() {
        return Err(DepGraphError::NotFound { path: full });
    }
    let parent = fs_path(root, &parent_dir(&rel));
    if !parent.is_dir() {
        return Err(DepGraphError::NotFound { path: parent });
    }

    if full.is_dir() {
        let has_init = full.join(INIT_FILE).is_file();
        let kind = match (rel == ".", has_init) {
            (true, true) => NodeKind::ModuleRoot,
            (true, false) => NodeKind::Root,
            (false, true) => NodeKind::ModuleDir,
            (false, false) => NodeKind::Dir,
        };
        Ok(kind)
    } else if full.is_file() && rel.ends_with(".py") {
        if parent.join(INIT_FILE).is_file() {
            Ok(NodeKind::ModuleFile)
        } else {
            Ok(NodeKind::Script)
        }
    } else {
        Err(DepGraphError::UnknownPathType { path: full })
    }
}

/// A directory or Python file of the scanned tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    /// Path as it was handed to [`Node::from_path`].
    pub orig_path: String,
    /// Posix path relative to the root; `pkg/__init__.py` collapses onto `pkg`.
    pub rel_path: String,
    pub aliases: BTreeSet<String>,
    pub display_name: String,
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// `None` for the root.
    pub parent_dir: Option<String>,
}

impl Node {
    /// Derive the node for `path` (relative to `root`).
    ///
    /// # Errors
    /// Propagates classification failures, and invalid module names when
    /// `graph.strict_names` is on.
    pub fn from_path(
        root: &Path,
        path: &str,
        config: &Config,
        package_name: &str,
    ) -> Result<Self, DepGraphError> {
        let orig_path = if path.is_empty() { "." } else { path };
        let mut aliases = BTreeSet::from([orig_path.to_string()]);

        let mut rel_path = clean_rel(orig_path);
        aliases.insert(rel_path.clone());
        if is_init_file(&rel_path) {
            rel_path = parent_dir(&rel_path);
            aliases.insert(rel_path.clone());
        }

        let kind = classify_node(root, &rel_path)?;
        let root_node_name = config.effective_root_node_name(package_name);

        let mut display_name = if kind.is_module() {
            let module = path_to_module(&rel_path, config.graph.strict_names)?;
            if kind == NodeKind::ModuleRoot {
                module
            } else {
                augment_module_name(module, config, package_name)
            }
        } else {
            rel_path.clone()
        };
        aliases.insert(display_name.clone());

        let mut parent = Some(parent_dir(&rel_path));
        if kind.is_root() {
            display_name = root_node_name;
            parent = None;
            aliases.insert(display_name.clone());
        }

        let url = config.url_prefix.as_ref().map(|prefix| {
            let mut url = format!("{prefix}{rel_path}");
            for (from, to) in &config.auto_url_replace {
                url = url.replace(from.as_str(), to);
            }
            url
        });

        Ok(Self {
            orig_path: orig_path.to_string(),
            rel_path,
            aliases,
            display_name,
            kind,
            url,
            parent_dir: parent,
        })
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.kind.is_root()
    }

    #[must_use]
    pub fn is_module(&self) -> bool {
        self.kind.is_module()
    }

    /// Layout rank: 10 for the root, one more per directory level below it.
    #[must_use]
    pub fn rank(&self) -> usize {
        if self.is_root() {
            10
        } else {
            self.rel_path.matches('/').count() + 11
        }
    }

    /// Identifier used in the DOT output.
    #[must_use]
    pub fn dot_id<'a>(&'a self, config: &'a Config) -> &'a str {
        if self.is_root() {
            config.git_remote_url.as_deref().unwrap_or(&self.display_name)
        } else {
            &self.display_name
        }
    }

    /// Relative path of the file holding this node's source, if it has one.
    #[must_use]
    pub fn source_path(&self) -> Option<String> {
        match self.kind {
            NodeKind::ModuleRoot => Some(INIT_FILE.to_string()),
            NodeKind::ModuleDir => Some(format!("{}/{INIT_FILE}", self.rel_path)),
            NodeKind::ModuleFile | NodeKind::Script => Some(self.rel_path.clone()),
            NodeKind::Root | NodeKind::Dir => None,
        }
    }
}

fn augment_module_name(module: String, config: &Config, package_name: &str) -> String {
    if config.graph.strip_module_prefix || module == "." || module == config.root_node_name {
        module
    } else {
        format!("{package_name}.{module}")
    }
}

/// A vertex of the dependency graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GraphNode {
    Local(Node),
    /// An imported module that is not part of the scanned tree.
    External { name: String },
}

impl GraphNode {
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self {
            Self::Local(node) => &node.display_name,
            Self::External { name } => name,
        }
    }

    #[must_use]
    pub fn rank(&self) -> usize {
        match self {
            Self::Local(node) => node.rank(),
            Self::External { .. } => 0,
        }
    }

    #[must_use]
    pub fn dot_id<'a>(&'a self, config: &'a Config) -> &'a str {
        match self {
            Self::Local(node) => node.dot_id(config),
            Self::External { name } => name,
        }
    }

    #[must_use]
    pub fn style<'a>(&self, config: &'a Config) -> &'a Style {
        match self {
            Self::Local(node) => config.node.get(node.kind),
            Self::External { .. } => &config.node.external,
        }
    }

    #[must_use]
    pub fn as_local(&self) -> Option<&Node> {
        match self {
            Self::Local(node) => Some(node),
            Self::External { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub kind: EdgeKind,
    pub attrs: BTreeMap<String, String>,
}
