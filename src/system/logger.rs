use tracing_subscriber::EnvFilter;

/// Checked in order; the first one that parses wins.
const LOG_ENV_VARS: [&str; 2] = ["SUSTAIN_LOG", "RUST_LOG"];

/// `--verbose` raises only this crate to debug.
const DEFAULT_FILTER: &str = "info";
const VERBOSE_FILTER: &str = "info,sustain=debug";

/// Installs the global subscriber on stderr.
///
/// Worker events carry their `worker{id, serial}` span; targets are shown
/// only in verbose mode, where they tell resolver and worker lines apart.
pub fn init_logging(verbose: bool, no_color: bool) {
    let from_env = LOG_ENV_VARS
        .iter()
        .find_map(|name| std::env::var(name).ok());
    let filter = build_filter(from_env.as_deref(), verbose);

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(!no_color)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set global default subscriber: {}", err);
    }
}

fn build_filter(directives: Option<&str>, verbose: bool) -> EnvFilter {
    let fallback = if verbose {
        VERBOSE_FILTER
    } else {
        DEFAULT_FILTER
    };
    directives
        .and_then(|value| EnvFilter::try_new(value).ok())
        .unwrap_or_else(|| EnvFilter::new(fallback))
}
