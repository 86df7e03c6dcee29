//! Typed configuration with layered sources.
//!
//! The built-in defaults are serialized to a TOML table, then a config file and any
//! `--set key=value` overrides are deep-merged on top before the result is
//! deserialized back into [`Config`]. String values `none`/`null` (any case) remove
//! the key they are assigned to; assigned to a whole edge or node style they disable it.
use crate::errors::DepGraphError;
use crate::graph::node::{EdgeKind, NodeKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use toml::{Table, Value};

pub const CONFIG_FILE_NAME: &str = "dep-graph-viz.toml";

const NULL_STRINGS: [&str; 2] = ["none", "null"];

fn default_true() -> bool {
    true
}

/// Graphviz attributes for one edge or node kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Style {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(flatten)]
    pub attrs: BTreeMap<String, String>,
}

impl Style {
    #[must_use]
    pub fn new(attrs: &[(&str, &str)]) -> Self {
        Self {
            enabled: true,
            attrs: attrs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect(),
        }
    }
}

impl Default for Style {
    fn default() -> Self {
        Self { enabled: true, attrs: BTreeMap::new() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphOptions {
    pub include_local_imports: bool,
    pub strip_module_prefix: bool,
    pub include_externals: bool,
    pub except_if_missing_edges: bool,
    pub strict_names: bool,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            include_local_imports: true,
            strip_module_prefix: true,
            include_externals: false,
            except_if_missing_edges: false,
            strict_names: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeStyles {
    pub module_hierarchy: Style,
    pub hierarchy: Style,
    pub uses: Style,
    pub inits: Style,
    pub external: Style,
}

impl Default for EdgeStyles {
    fn default() -> Self {
        let tree = || Style::new(&[("color", "black"), ("penwidth", "3"), ("style", "solid")]);
        Self {
            module_hierarchy: tree(),
            hierarchy: tree(),
            uses: Style::new(&[("color", "red"), ("penwidth", "1"), ("style", "solid")]),
            inits: Style::new(&[("color", "blue"), ("penwidth", "1"), ("style", "dashed")]),
            external: Style::new(&[("color", "gray"), ("penwidth", "1"), ("style", "dotted")]),
        }
    }
}

impl EdgeStyles {
    #[must_use]
    pub fn get(&self, kind: EdgeKind) -> &Style {
        match kind {
            EdgeKind::ModuleHierarchy => &self.module_hierarchy,
            EdgeKind::Hierarchy => &self.hierarchy,
            EdgeKind::Uses => &self.uses,
            EdgeKind::Inits => &self.inits,
            EdgeKind::External => &self.external,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeStyles {
    pub module_root: Style,
    pub root: Style,
    pub module_dir: Style,
    pub dir: Style,
    pub module_file: Style,
    pub script: Style,
    pub external: Style,
}

impl Default for NodeStyles {
    fn default() -> Self {
        Self {
            module_root: Style::new(&[("shape", "folder"), ("color", "purple")]),
            root: Style::new(&[("shape", "folder"), ("color", "purple")]),
            module_dir: Style::new(&[("shape", "folder"), ("color", "black")]),
            dir: Style::new(&[("shape", "folder"), ("color", "blue")]),
            module_file: Style::new(&[("shape", "note"), ("color", "black")]),
            script: Style::new(&[("shape", "note"), ("color", "green")]),
            external: Style::new(&[("shape", "box"), ("color", "gray")]),
        }
    }
}

impl NodeStyles {
    #[must_use]
    pub fn get(&self, kind: NodeKind) -> &Style {
        match kind {
            NodeKind::ModuleRoot => &self.module_root,
            NodeKind::Root => &self.root,
            NodeKind::ModuleDir => &self.module_dir,
            NodeKind::Dir => &self.dir,
            NodeKind::ModuleFile => &self.module_file,
            NodeKind::Script => &self.script,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_prefix: Option<String>,
    pub auto_url_replace: BTreeMap<String, String>,
    pub root_node_name: String,
    /// Overrides the package name otherwise taken from the root directory's name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_remote_url: Option<String>,
    pub graph: GraphOptions,
    pub edge: EdgeStyles,
    pub node: NodeStyles,
    pub dot_attrs: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url_prefix: None,
            auto_url_replace: BTreeMap::from([(".git".to_string(), String::new())]),
            root_node_name: "ROOT".to_string(),
            package_name: None,
            git_remote_url: None,
            graph: GraphOptions::default(),
            edge: EdgeStyles::default(),
            node: NodeStyles::default(),
            dot_attrs: BTreeMap::from([("rankdir".to_string(), "LR".to_string())]),
        }
    }
}

impl Config {
    /// Resolve a config from the defaults plus `layers`, applied in order.
    ///
    /// # Errors
    /// Returns `DepGraphError::Config` if the merged table does not fit the typed config.
    pub fn from_layers<I>(layers: I) -> Result<Self, DepGraphError>
    where
        I: IntoIterator<Item = Table>,
    {
        let mut merged = match Value::try_from(Self::default()) {
            Ok(Value::Table(t)) => t,
            Ok(_) => return Err(DepGraphError::Config("defaults are not a table".to_string())),
            Err(e) => return Err(DepGraphError::Config(e.to_string())),
        };
        for layer in layers {
            merge_tables(&mut merged, layer);
        }
        normalize(&mut merged);
        Value::Table(merged).try_into().map_err(|e: toml::de::Error| DepGraphError::Config(e.to_string()))
    }

    /// Package name for `root`: the configured one, else the root directory's name.
    #[must_use]
    pub fn package_name_for(&self, root: &Path) -> String {
        if let Some(name) = &self.package_name {
            return name.clone();
        }
        let abs = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
        abs.file_name().map_or_else(|| "root".to_string(), |n| n.to_string_lossy().into_owned())
    }

    /// Name of the root node: the package name when module prefixes are kept.
    #[must_use]
    pub fn effective_root_node_name(&self, package_name: &str) -> String {
        if self.graph.strip_module_prefix {
            self.root_node_name.clone()
        } else {
            package_name.to_string()
        }
    }
}

/// Deep-merge `overlay` into `base`; tables merge key by key, anything else replaces.
pub fn merge_tables(base: &mut Table, overlay: Table) {
    for (key, value) in overlay {
        if let Value::Table(incoming) = value {
            if let Some(Value::Table(existing)) = base.get_mut(&key) {
                merge_tables(existing, incoming);
                continue;
            }
            base.insert(key, Value::Table(incoming));
        } else {
            base.insert(key, value);
        }
    }
}

fn is_null_string(value: &Value) -> bool {
    value.as_str().is_some_and(|s| NULL_STRINGS.contains(&s.to_ascii_lowercase().as_str()))
}

fn stringify_scalars(table: &mut Table, keep: &[&str]) {
    for (key, value) in table.iter_mut() {
        if keep.contains(&key.as_str()) {
            continue;
        }
        let text = match value {
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Datetime(d) => d.to_string(),
            _ => continue,
        };
        *value = Value::String(text);
    }
}

fn strip_nulls(table: &mut Table) {
    let nulls: Vec<String> =
        table.iter().filter(|(_, v)| is_null_string(v)).map(|(k, _)| k.clone()).collect();
    for key in nulls {
        table.remove(&key);
    }
    for (_, value) in table.iter_mut() {
        if let Value::Table(inner) = value {
            strip_nulls(inner);
        }
    }
}

fn normalize(root: &mut Table) {
    for section in ["edge", "node"] {
        if let Some(Value::Table(styles)) = root.get_mut(section) {
            for (_, style) in styles.iter_mut() {
                if is_null_string(style) {
                    *style = Value::Table(Table::from_iter([("enabled".to_string(), Value::Boolean(false))]));
                }
            }
        }
    }
    strip_nulls(root);
    for section in ["edge", "node"] {
        if let Some(Value::Table(styles)) = root.get_mut(section) {
            for (_, style) in styles.iter_mut() {
                if let Value::Table(attrs) = style {
                    stringify_scalars(attrs, &["enabled"]);
                }
            }
        }
    }
    for section in ["dot_attrs", "auto_url_replace"] {
        if let Some(Value::Table(attrs)) = root.get_mut(section) {
            stringify_scalars(attrs, &[]);
        }
    }
}

/// Parse a `dotted.key=value` override into a nested table.
///
/// The value is read as a TOML value when it parses as one (`true`, `3`, `"LR"`),
/// otherwise it is taken as a bare string.
///
/// # Errors
/// Returns `DepGraphError::Config` if there is no `=` or the key is empty.
pub fn parse_override(arg: &str) -> Result<Table, DepGraphError> {
    let (key, raw) = arg
        .split_once('=')
        .ok_or_else(|| DepGraphError::Config(format!("override '{arg}' is not of the form key=value")))?;
    let key = key.trim().trim_start_matches('-');
    if key.is_empty() || key.split('.').any(str::is_empty) {
        return Err(DepGraphError::Config(format!("invalid override key in '{arg}'")));
    }
    let raw = raw.trim();
    let value = toml::from_str::<Table>(&format!("value = {raw}"))
        .ok()
        .and_then(|mut t| t.remove("value"))
        .unwrap_or_else(|| Value::String(raw.to_string()));

    let mut parts: Vec<&str> = key.split('.').collect();
    let last = parts.pop().unwrap_or(key);
    let mut table = Table::from_iter([(last.to_string(), value)]);
    for part in parts.into_iter().rev() {
        table = Table::from_iter([(part.to_string(), Value::Table(table))]);
    }
    Ok(table)
}

fn default_config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE_NAME)
}

/// Read a TOML config file as a raw table layer.
///
/// # Errors
/// Returns `DepGraphError::Io` if the file cannot be read and `DepGraphError::Config`
/// if it is not valid TOML.
pub fn load_config_at(path: &Path) -> Result<Table, DepGraphError> {
    let data = fs::read_to_string(path)?;
    toml::from_str::<Table>(&data)
        .map_err(|e| DepGraphError::Config(format!("{}: {e}", path.display())))
}

/// Look for `dep-graph-viz.toml` in `root`.
///
/// # Errors
/// See [`load_config_at`].
pub fn load_config_near(root: &Path) -> Result<Option<Table>, DepGraphError> {
    let path = default_config_path(root);
    if path.is_file() {
        load_config_at(&path).map(Some)
    } else {
        Ok(None)
    }
}
