use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8, quiet: bool) {
    let default = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_writer(std::io::stderr).with_env_filter(filter).init();
}

fn main() {
    use dep_graph_viz::cli::parse;
    let cli = parse();
    init_tracing(cli.verbose, cli.quiet);
    let code = dep_graph_viz::app::run_cli(cli);
    if code != 0 {
        std::process::exit(code);
    }
}
