use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Syntax error at line {line}, column {column}")]
    Syntax { line: usize, column: usize },
    #[error("Indentation error at line {line}, column {column}: {reason}")]
    Indentation { line: usize, column: usize, reason: &'static str },
    #[error("Python 2 `{statement}` statement at line {line}")]
    LegacyStatement { line: usize, statement: &'static str },
    #[error("Relative import without a module name at line {line}")]
    MissingModule { line: usize },
    #[error("Failed to load the Python grammar: {0}")]
    Language(String),
    #[error("Parser produced no syntax tree")]
    NoTree,
}

#[derive(Debug, Error)]
pub enum DepGraphError {
    #[error("Parse error in file {file}: {source}")]
    ParseError { file: PathBuf, source: ParseError },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Path not found: '{path}'")]
    NotFound { path: PathBuf },

    #[error("Node '{path}' already exists in the graph")]
    DuplicateNode { path: String },

    #[error("Missing parent node '{parent}' for '{node}'")]
    MissingParent { node: String, parent: String },

    #[error("Could not read source code for '{path}'. Set `graph.except_if_missing_edges = false` to skip it")]
    MissingSource { path: PathBuf },

    #[error("Unknown path type: '{path}'")]
    UnknownPathType { path: PathBuf },

    #[error("Invalid module path '{path}': {reason}. Set `graph.strict_names = false` to continue anyway")]
    InvalidModuleName { path: String, reason: String },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Visualization error: {0}")]
    Visualization(String),
}
