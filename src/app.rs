use crate::cli::{Cli, Commands, FormatArg};
use crate::errors::DepGraphError;
use crate::graph::DependencyGraph;
use crate::utils::config::{self, Config};
use crate::visualization::{self, DotGenerator, GraphvizRenderer, OutputFormat};
use clap::CommandFactory;
use clap_complete::generate;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

impl From<FormatArg> for OutputFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Svg => Self::Svg,
            FormatArg::Png => Self::Png,
            FormatArg::Html => Self::Html,
            FormatArg::Dot => Self::Dot,
        }
    }
}

/// Resolve configuration for `root`: defaults, then the config file (explicit, or
/// `dep-graph-viz.toml` in `root`), then each `key=value` override in order.
///
/// # Errors
/// Returns `DepGraphError` if a file cannot be read or parsed, an override is malformed,
/// or the merged values do not fit the config types.
pub fn resolve_config(
    root: &Path,
    config_path: Option<&Path>,
    overrides: &[String],
) -> Result<Config, DepGraphError> {
    let mut layers = Vec::new();
    match config_path {
        Some(p) => layers.push(config::load_config_at(p)?),
        None => {
            if let Some(table) = config::load_config_near(root)? {
                layers.push(table);
            }
        }
    }
    for entry in overrides {
        layers.push(config::parse_override(entry)?);
    }
    Config::from_layers(layers)
}

fn with_suffix(base: &Path, ext: &str) -> PathBuf {
    let mut s = OsString::from(base.as_os_str());
    s.push(".");
    s.push(ext);
    PathBuf::from(s)
}

/// Run the CLI logic in-process.
///
/// Returns an exit code (0 = success).
#[must_use]
pub fn run_cli(cli: Cli) -> i32 {
    let quiet = cli.quiet;
    let verbose = cli.verbose > 0;
    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let bin_name = env!("CARGO_PKG_NAME");
            let mut out = io::stdout();
            generate(shell, &mut cmd, bin_name, &mut out);
            0
        }
        Commands::PrintConfig { path, config, overrides } => {
            let root = path.unwrap_or_else(|| PathBuf::from("."));
            let cfg = match resolve_config(&root, config.as_deref(), &overrides) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("{e}");
                    return 1;
                }
            };
            match serde_json::to_string_pretty(&cfg) {
                Ok(s) => {
                    println!("{s}");
                    0
                }
                Err(e) => {
                    eprintln!("JSON encode error: {e}");
                    1
                }
            }
        }
        Commands::Build { path, output, format, config, overrides, json, no_ignore } => {
            let root = path.unwrap_or_else(|| PathBuf::from("."));
            let cfg = match resolve_config(&root, config.as_deref(), &overrides) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("{e}");
                    return 1;
                }
            };

            let graph = match DependencyGraph::build(&root, &cfg, no_ignore) {
                Ok(g) => g,
                Err(e) => {
                    eprintln!("Build failed: {e}");
                    return 1;
                }
            };
            if !quiet {
                println!(
                    "Built graph with {} nodes and {} edges",
                    graph.node_count(),
                    graph.edge_count()
                );
            }

            if let Some(json_path) = json {
                if let Err(e) = graph.save_json(&json_path) {
                    eprintln!("Failed to write JSON output {}: {e}", json_path.display());
                    return 1;
                }
            }

            let dot_path = with_suffix(&output, "dot");
            if let Err(e) = DotGenerator::new().write_dot(&graph, &cfg, &dot_path) {
                eprintln!("Failed to write DOT output {}: {e}", dot_path.display());
                return 1;
            }

            let format = OutputFormat::from(format);
            let final_path = with_suffix(&output, format.extension());
            let rendered = match format {
                OutputFormat::Dot => Ok(()),
                OutputFormat::Html => visualization::write_html(&dot_path, &final_path),
                OutputFormat::Svg | OutputFormat::Png => GraphvizRenderer::new()
                    .with_verbose(verbose)
                    .render(&dot_path, &final_path, format),
            };
            if let Err(e) = rendered {
                eprintln!("{e}");
                return 1;
            }

            if !quiet {
                println!("Wrote {}", final_path.display());
            }
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_suffix_appends_extension() {
        assert_eq!(with_suffix(Path::new("out/graph"), "dot"), PathBuf::from("out/graph.dot"));
        assert_eq!(with_suffix(Path::new("graph.v1"), "svg"), PathBuf::from("graph.v1.svg"));
    }
}
