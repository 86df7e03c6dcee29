use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "dep-graph-viz",
    version,
    about = "Python module dependency graph visualizer",
    long_about = "Scan a Python source tree, build a graph of its directories, modules and imports, and render it with Graphviz. File discovery respects .gitignore and .ignore; hidden entries are always skipped. Use --no-ignore to bypass ignore rules."
)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    /// Only print errors
    #[arg(short, long, default_value_t = false, global = true)]
    pub quiet: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Svg,
    Png,
    Html,
    Dot,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build the dependency graph and render it
    Build {
        /// Root directory of the Python source tree
        #[arg(short, long)]
        path: Option<PathBuf>,
        /// Output file name without extension
        #[arg(short, long, default_value = "output")]
        output: PathBuf,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = FormatArg::Svg)]
        format: FormatArg,
        /// Path to a TOML configuration file (default: dep-graph-viz.toml in the root)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Override a config value, e.g. --set edge.uses.color=green (repeatable)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        overrides: Vec<String>,
        /// Also write the graph as JSON to this path
        #[arg(long)]
        json: Option<PathBuf>,
        /// Bypass ignore rules (.gitignore/.ignore) when discovering files
        #[arg(long, default_value_t = false)]
        no_ignore: bool,
    },
    /// Print the resolved configuration as JSON and exit
    PrintConfig {
        /// Root directory used to look for dep-graph-viz.toml
        #[arg(short, long)]
        path: Option<PathBuf>,
        /// Path to a TOML configuration file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Override a config value (repeatable)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        overrides: Vec<String>,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}
