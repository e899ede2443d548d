use clap::Parser;
use std::time::Duration;

use super::defaults::DEFAULT_READ_LIMIT;
use super::parsers::{parse_bool_env, parse_duration_arg, parse_header, parse_positive_usize};
use super::types::{HttpMethod, PositiveUsize};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Async sustained-load runner - keeps a fixed worker pool hitting one endpoint for a bounded duration, following DNS changes and shutting down cleanly."
)]
pub struct RunArgs {
    /// Target URL (http:// or https://)
    #[arg(long, short)]
    pub url: Option<String>,

    /// Number of concurrent workers
    #[arg(
        long = "workers",
        short = 'w',
        default_value = "16",
        value_parser = parse_positive_usize
    )]
    pub workers: PositiveUsize,

    /// Duration of the run (supports ms/s/m/h, bare numbers are seconds)
    #[arg(
        long = "duration",
        short = 't',
        default_value = "30s",
        value_parser = parse_duration_arg
    )]
    pub duration: Duration,

    /// Override the Host header sent with each request
    #[arg(long = "host")]
    pub host_header: Option<String>,

    /// HTTP method to use
    #[arg(long, short = 'X', default_value = "get", ignore_case = true)]
    pub method: HttpMethod,

    /// HTTP headers in 'Key: Value' format (repeatable)
    #[arg(long = "header", short = 'H', value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Request body (sent with Content-Length)
    #[arg(long, short, default_value = "")]
    pub data: String,

    /// Per-request timeout covering connect, handshake, write and read (supports ms/s/m/h)
    #[arg(long = "timeout", default_value = "5s", value_parser = parse_duration_arg)]
    pub request_timeout: Duration,

    /// Timeout for establishing a new connection (supports ms/s/m/h)
    #[arg(
        long = "connect-timeout",
        default_value = "3s",
        value_parser = parse_duration_arg
    )]
    pub connect_timeout: Duration,

    /// How often the target hostname is re-resolved (supports ms/s/m/h)
    #[arg(
        long = "refresh-interval",
        default_value = "30s",
        value_parser = parse_duration_arg
    )]
    pub refresh_interval: Duration,

    /// Maximum number of response bytes read per request
    #[arg(
        long = "read-limit",
        default_value_t = DEFAULT_READ_LIMIT
    )]
    pub read_limit: usize,

    /// Only use IPv4 addresses for the target (the default)
    #[arg(long = "ipv4")]
    pub ipv4_only: bool,

    /// Use IPv6 addresses instead of IPv4
    #[arg(long = "ipv6")]
    pub ipv6_only: bool,

    /// Skip TLS certificate and hostname verification
    #[arg(long = "insecure", short = 'k')]
    pub insecure: bool,

    /// Disable the default User-Agent header (sustain-loadtest/<version>); requires --authorized
    #[arg(long = "no-ua")]
    pub no_ua: bool,

    /// Confirm you have authorization to load the target when disabling the default User-Agent
    #[arg(long = "authorized")]
    pub authorized: bool,

    /// Enable verbose logging (sets log level to debug unless overridden by SUSTAIN_LOG/RUST_LOG)
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Disable color output
    #[arg(long = "no-color", env = "NO_COLOR", value_parser = parse_bool_env)]
    pub no_color: bool,

    /// Do not print the start banner
    #[arg(long = "no-banner")]
    pub no_banner: bool,

    /// Path to config file (TOML/JSON). Defaults to ./sustain.toml or ./sustain.json if present.
    #[arg(long)]
    pub config: Option<String>,
}
