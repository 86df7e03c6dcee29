//! Python import extraction.
//!
//! Source text is parsed with tree-sitter's Python grammar, so imports nested in
//! functions, classes or `try` blocks are found while comments and strings are never
//! mistaken for imports. Any syntax error in the file fails the whole extraction.
//!
//! The grammar recovers silently from a few inputs the interpreter rejects (stray
//! indentation, empty blocks, Python 2 `print`/`exec` statements), so the tree is
//! also checked for those before imports are collected.
use crate::errors::ParseError;
use tree_sitter::{Node, Parser, Tree};

/// One module reference found in an import statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// Dotted module name with any leading relative dots removed.
    pub module: String,
    /// Number of leading dots in a relative `from` import (0 for absolute imports).
    pub level: usize,
    /// 1-based line of the statement.
    pub line: usize,
}

pub struct PythonParser {
    parser: Parser,
}

impl std::fmt::Debug for PythonParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PythonParser").finish_non_exhaustive()
    }
}

impl PythonParser {
    /// # Errors
    /// Returns `ParseError::Language` if the grammar cannot be loaded into the parser.
    pub fn new() -> Result<Self, ParseError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| ParseError::Language(e.to_string()))?;
        Ok(Self { parser })
    }

    /// Extract every import in `source`, in source order.
    ///
    /// A relative import without a module (`from . import x`) is an error unless
    /// `allow_missing` is set, in which case it is logged and skipped.
    ///
    /// # Errors
    /// Returns `ParseError::Syntax` when the source does not parse cleanly and
    /// `ParseError::MissingModule` for module-less relative imports when not allowed.
    pub fn parse_imports(
        &mut self,
        source: &str,
        allow_missing: bool,
    ) -> Result<Vec<Import>, ParseError> {
        let tree = self.parse_tree(source)?;
        let root = tree.root_node();
        if root.has_error() {
            let bad = first_error(root).unwrap_or(root);
            let pos = bad.start_position();
            return Err(ParseError::Syntax { line: pos.row + 1, column: pos.column + 1 });
        }
        check_layout(root, source)?;
        let mut out = Vec::new();
        collect_imports(root, source, allow_missing, &mut out)?;
        Ok(out)
    }

    fn parse_tree(&mut self, source: &str) -> Result<Tree, ParseError> {
        self.parser.parse(source, None).ok_or(ParseError::NoTree)
    }
}

/// Convenience wrapper returning only the module names.
///
/// # Errors
/// See [`PythonParser::parse_imports`].
pub fn get_imports(source: &str, allow_missing: bool) -> Result<Vec<String>, ParseError> {
    let mut parser = PythonParser::new()?;
    Ok(parser.parse_imports(source, allow_missing)?.into_iter().map(|i| i.module).collect())
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error).or(Some(node))
}

fn check_layout(node: Node<'_>, source: &str) -> Result<(), ParseError> {
    match node.kind() {
        "print_statement" | "exec_statement" => {
            return Err(ParseError::LegacyStatement {
                line: node.start_position().row + 1,
                statement: if node.kind() == "print_statement" { "print" } else { "exec" },
            });
        }
        "module" => check_suite(node, source, Some(0))?,
        "block" => check_suite(node, source, None)?,
        _ => {}
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
    for child in children {
        check_layout(child, source)?;
    }
    Ok(())
}

// Statements of one suite that begin a line must share a column; a block needs a statement.
fn check_suite(suite: Node<'_>, source: &str, mut column: Option<usize>) -> Result<(), ParseError> {
    let mut cursor = suite.walk();
    let statements: Vec<Node<'_>> = suite
        .named_children(&mut cursor)
        .filter(|c| !matches!(c.kind(), "comment" | "line_continuation"))
        .collect();
    if suite.kind() == "block" && statements.is_empty() {
        let pos = suite.start_position();
        return Err(ParseError::Indentation {
            line: pos.row + 1,
            column: pos.column + 1,
            reason: "expected an indented block",
        });
    }
    for stmt in statements {
        if !starts_line(stmt, source) {
            continue;
        }
        let pos = stmt.start_position();
        match column {
            None => column = Some(pos.column),
            Some(expected) if expected != pos.column => {
                return Err(ParseError::Indentation {
                    line: pos.row + 1,
                    column: pos.column + 1,
                    reason: if pos.column > expected { "unexpected indent" } else { "unindent does not match any outer level" },
                });
            }
            Some(_) => {}
        }
    }
    Ok(())
}

fn starts_line(node: Node<'_>, source: &str) -> bool {
    let end = node.start_byte();
    let begin = end.saturating_sub(node.start_position().column);
    source.get(begin..end).is_some_and(|prefix| prefix.chars().all(char::is_whitespace))
}

fn collect_imports(
    node: Node<'_>,
    source: &str,
    allow_missing: bool,
    out: &mut Vec<Import>,
) -> Result<(), ParseError> {
    let line = node.start_position().row + 1;
    match node.kind() {
        "import_statement" => {
            let mut cursor = node.walk();
            for name in node.children_by_field_name("name", &mut cursor) {
                let dotted = if name.kind() == "aliased_import" {
                    name.child_by_field_name("name")
                } else {
                    Some(name)
                };
                if let Some(d) = dotted {
                    out.push(Import { module: dotted_name(d, source), level: 0, line });
                }
            }
            return Ok(());
        }
        "future_import_statement" => {
            out.push(Import { module: "__future__".to_string(), level: 0, line });
            return Ok(());
        }
        "import_from_statement" => {
            if let Some(module) = node.child_by_field_name("module_name") {
                match from_module(module, source) {
                    Some(import) => out.push(Import { line, ..import }),
                    None if allow_missing => {
                        tracing::warn!(line, "relative import without a module name, skipping");
                    }
                    None => return Err(ParseError::MissingModule { line }),
                }
            }
            return Ok(());
        }
        _ => {}
    }

    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
    for child in children {
        collect_imports(child, source, allow_missing, out)?;
    }
    Ok(())
}

// `None` when a relative import names no module (`from .. import x`)
fn from_module(module: Node<'_>, source: &str) -> Option<Import> {
    match module.kind() {
        "relative_import" => {
            let mut level = 0;
            let mut name = None;
            let mut cursor = module.walk();
            for child in module.children(&mut cursor) {
                match child.kind() {
                    "import_prefix" => level = text(child, source).trim().len(),
                    "dotted_name" => name = Some(dotted_name(child, source)),
                    _ => {}
                }
            }
            name.map(|module| Import { module, level, line: 0 })
        }
        _ => Some(Import { module: dotted_name(module, source), level: 0, line: 0 }),
    }
}

fn dotted_name(node: Node<'_>, source: &str) -> String {
    let mut cursor = node.walk();
    let parts: Vec<&str> = node
        .named_children(&mut cursor)
        .filter(|c| c.kind() == "identifier")
        .map(|c| text(c, source))
        .collect();
    if parts.is_empty() {
        text(node, source).trim().to_string()
    } else {
        parts.join(".")
    }
}

fn text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    source.get(node.byte_range()).unwrap_or("")
}
