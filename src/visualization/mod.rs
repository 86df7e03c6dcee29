use crate::errors::DepGraphError;
use crate::graph::DependencyGraph;
use crate::utils::config::Config;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

const DOT_PLACEHOLDER: &str = "$$DOT_CONTENT$$";

const HTML_TEMPLATE: &str = r##"<!DOCTYPE html>
<html>
<head>
    <title>Static Graphviz SVG</title>
    <script src="https://d3js.org/d3.v5.min.js"></script>
    <script src="https://unpkg.com/@hpcc-js/wasm@0.3.13/dist/index.min.js"></script>
    <script src="https://unpkg.com/d3-graphviz@3.1.0/build/d3-graphviz.min.js"></script>
    <style>
        .node:hover,
        .edge.highlighted {
            stroke: red;
            stroke-width: 2px;
        }
        .edge.highlighted[marker-end] {
            marker-end: url(#arrowhead-red);
        }
    </style>
</head>
<body>
    <div id="graph" style="width: 100%; height: 100vh;"></div>
    <script>
        const dot = `$$DOT_CONTENT$$`;

        d3.select("#graph").graphviz()
            .renderDot(dot)
            .on("end", function() {
                const graphviz = this;
                d3.selectAll(".node")
                    .on("mouseover", function(d) {
                        const nodeId = d3.select(this).attr("id");
                        const connectedEdges = graphviz.inEdges(nodeId).concat(graphviz.outEdges(nodeId));
                        d3.selectAll(".edge")
                            .classed("highlighted", function(d) {
                                return connectedEdges.includes(d3.select(this).node());
                            });
                    })
                    .on("mouseout", function(d) {
                        d3.selectAll(".edge").classed("highlighted", false);
                    });
            });
    </script>
</body>
</html>
"##;

/// Final artifact produced by a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    Html,
    /// Only the `.dot` file.
    Dot,
}

impl OutputFormat {
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
            Self::Html => "html",
            Self::Dot => "dot",
        }
    }
}

#[derive(Debug, Default)]
pub struct DotGenerator;

impl DotGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self {}
    }

    /// Render `graph` as DOT text.
    ///
    /// Graph attributes come from `dot_attrs`; every node carries its `rank`, its
    /// kind's style and its `URL` when one is set; every edge carries the attributes
    /// stored on it. Output order follows graph insertion order.
    #[must_use]
    pub fn generate_dot(&self, graph: &DependencyGraph, config: &Config) -> String {
        let mut s = String::new();
        s.push_str("digraph G {\n");
        for (key, value) in &config.dot_attrs {
            let _ = writeln!(s, "  {}={};", quote(key), quote(value));
        }

        for node in graph.nodes() {
            let mut attrs: BTreeMap<&str, String> = BTreeMap::new();
            attrs.insert("rank", node.rank().to_string());
            let style = node.style(config);
            if style.enabled {
                for (k, v) in &style.attrs {
                    attrs.insert(k.as_str(), v.clone());
                }
            }
            if let Some(url) = node.as_local().and_then(|n| n.url.as_ref()) {
                attrs.insert("URL", url.clone());
            }
            let _ = writeln!(s, "  {} [{}];", quote(node.dot_id(config)), attr_list(attrs.iter().map(|(k, v)| (*k, v.as_str()))));
        }

        for (from, to, edge) in graph.edges() {
            let _ = write!(s, "  {} -> {}", quote(from.dot_id(config)), quote(to.dot_id(config)));
            if edge.attrs.is_empty() {
                s.push_str(";\n");
            } else {
                let _ = writeln!(s, " [{}];", attr_list(edge.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str()))));
            }
        }

        s.push_str("}\n");
        s
    }

    /// Write the DOT text for `graph` to `path`.
    ///
    /// # Errors
    /// Returns `DepGraphError::Io` if the file cannot be written.
    pub fn write_dot(&self, graph: &DependencyGraph, config: &Config, path: &Path) -> Result<(), DepGraphError> {
        std::fs::write(path, self.generate_dot(graph, config))?;
        Ok(())
    }
}

fn attr_list<'a>(attrs: impl Iterator<Item = (&'a str, &'a str)>) -> String {
    attrs.map(|(k, v)| format!("{k}={}", quote(v))).collect::<Vec<_>>().join(", ")
}

fn quote(s: &str) -> String {
    format!("\"{}\"", escape_label(s))
}

fn escape_label(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

/// Embed DOT text into a self-contained d3-graphviz page.
#[must_use]
pub fn generate_html(dot: &str) -> String {
    HTML_TEMPLATE.replace(DOT_PLACEHOLDER, &dot.replace('`', "\\`"))
}

/// Read `dot_path` and write the HTML page to `html_path`.
///
/// # Errors
/// Returns `DepGraphError::Io` if reading or writing fails.
pub fn write_html(dot_path: &Path, html_path: &Path) -> Result<(), DepGraphError> {
    let dot = std::fs::read_to_string(dot_path)?;
    std::fs::write(html_path, generate_html(&dot))?;
    Ok(())
}

/// Runs Graphviz on a written DOT file.
#[derive(Debug, Clone)]
pub struct GraphvizRenderer {
    program: PathBuf,
    verbose: bool,
}

impl Default for GraphvizRenderer {
    fn default() -> Self {
        Self { program: PathBuf::from("dot"), verbose: false }
    }
}

impl GraphvizRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different Graphviz executable.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Pass `-v` to Graphviz.
    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Run `dot -T<format> <dot_file> -o <output>`.
    ///
    /// # Errors
    /// Returns `DepGraphError::Visualization` if the format is not an image format,
    /// if Graphviz cannot be started, or if it exits with a non-success status.
    pub fn render(&self, dot_file: &Path, output: &Path, format: OutputFormat) -> Result<(), DepGraphError> {
        if !matches!(format, OutputFormat::Svg | OutputFormat::Png) {
            return Err(DepGraphError::Visualization(format!(
                "Graphviz cannot produce '{}' output",
                format.extension()
            )));
        }
        let mut cmd = std::process::Command::new(&self.program);
        cmd.arg(format!("-T{}", format.extension())).arg(dot_file).arg("-o").arg(output);
        if self.verbose {
            cmd.arg("-v");
        }
        tracing::debug!(command = ?cmd, "running graphviz");
        let status = cmd.status().map_err(|e| {
            DepGraphError::Visualization(format!("Failed to run graphviz '{}': {e}", self.program.display()))
        })?;
        if !status.success() {
            return Err(DepGraphError::Visualization(format!(
                "Graphviz '{}' failed with code {:?}",
                self.program.display(),
                status.code()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_label_quotes() {
        assert_eq!(escape_label("a\"b\"c"), "a\\\"b\\\"c");
        assert_eq!(escape_label("line\nbreak"), "line\\nbreak");
        assert_eq!(quote("x"), "\"x\"");
    }

    #[test]
    fn test_generate_html_escapes_backticks() {
        let html = generate_html("digraph G { \"`a`\" }");
        assert!(html.contains("const dot = `digraph G { \"\\`a\\`\" }`;"));
        assert!(!html.contains(DOT_PLACEHOLDER));
    }

    #[test]
    fn test_renderer_rejects_non_image_formats() {
        let r = GraphvizRenderer::new();
        let err = r.render(Path::new("in.dot"), Path::new("out.html"), OutputFormat::Html).unwrap_err();
        assert!(matches!(err, DepGraphError::Visualization(_)));
    }

    #[test]
    fn test_renderer_reports_missing_program() {
        let r = GraphvizRenderer::new().with_program("definitely-not-a-graphviz-binary");
        let err = r.render(Path::new("in.dot"), Path::new("out.svg"), OutputFormat::Svg).unwrap_err();
        assert!(err.to_string().contains("Failed to run graphviz"));
    }
}
