use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};

use super::parsers::{
    parse_basic_auth, parse_cookie, parse_duration_arg, parse_header, parse_positive_u64,
    parse_positive_usize,
};
use super::types::{PositiveU64, PositiveUsize};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Concurrent HTTP benchmarking tool - fixed-count or time-limited load campaigns with retry, timeout and nearest-rank latency percentiles.",
    next_help_heading = "Advanced Options"
)]
pub struct BenchArgs {
    /// Target URL (http or https)
    #[arg(value_name = "URL", help_heading = "Common Options")]
    pub url: Option<String>,

    /// Number of requests to perform (default: 1, or 50000 with -t)
    #[arg(
        long = "requests",
        short = 'n',
        value_parser = parse_positive_u64,
        help_heading = "Common Options"
    )]
    pub requests: Option<PositiveU64>,

    /// Number of requests to perform at a time
    #[arg(
        long = "concurrency",
        short = 'c',
        default_value = "1",
        value_parser = parse_positive_usize,
        help_heading = "Common Options"
    )]
    pub concurrency: PositiveUsize,

    /// Seconds to spend on benchmarking (0 disables the limit)
    #[arg(long = "timelimit", short = 't', help_heading = "Common Options")]
    pub time_limit: Option<u64>,

    /// Use HEAD instead of GET
    #[arg(long = "head", short = 'i')]
    pub head: bool,

    /// File containing data to POST
    #[arg(long = "post-file", short = 'p', conflicts_with = "put_file")]
    pub post_file: Option<PathBuf>,

    /// File containing data to PUT
    #[arg(long = "put-file", short = 'u')]
    pub put_file: Option<PathBuf>,

    /// Content-Type header for POST/PUT data
    #[arg(long = "content-type", short = 'T', default_value = "text/plain")]
    pub content_type: String,

    /// Extra header in 'Key: Value' format (repeatable)
    #[arg(long = "header", short = 'H', value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Cookie in 'name=value' format (repeatable)
    #[arg(long = "cookie", short = 'C', value_parser = parse_cookie)]
    pub cookies: Vec<(String, String)>,

    /// Basic authentication in 'username:password' format
    #[arg(long = "basic-auth", short = 'A', value_parser = parse_basic_auth)]
    pub basic_auth: Option<(String, String)>,

    /// Reuse connections (HTTP keep-alive)
    #[arg(long = "keep-alive", short = 'k')]
    pub keep_alive: bool,

    /// Accept gzip-compressed responses
    #[arg(long = "gzip", short = 'z')]
    pub gzip: bool,

    /// Proxy URL for all requests
    #[arg(long = "proxy", short = 'x')]
    pub proxy_url: Option<String>,

    /// Limit requests per second across all workers
    #[arg(long = "rate", value_parser = parse_positive_u64)]
    pub rate_limit: Option<PositiveU64>,

    /// Increase log verbosity (-v debug, -vv trace); BARRAGE_LOG/RUST_LOG win
    #[arg(short = 'v', action = ArgAction::Count)]
    pub verbosity: u8,

    /// Keep going when a request fails
    #[arg(long = "continue-on-error", short = 'r')]
    pub continue_on_error: bool,

    /// Discard the first response of every worker (connection warm-up)
    #[arg(long = "skip-first")]
    pub skip_first: bool,

    /// Per-request execution timeout (supports ms/s/m/h)
    #[arg(long = "timeout", default_value = "30s", value_parser = parse_duration_arg)]
    pub execution_timeout: Duration,

    /// Append '<name>=<index>' to every request's query string
    #[arg(long = "sequence-param", value_name = "NAME")]
    pub sequence_param: Option<String>,

    /// Path to config file (TOML/JSON). Defaults to ./barrage.toml or ./barrage.json if present.
    #[arg(long, env = "BARRAGE_CONFIG")]
    pub config: Option<String>,

    /// Write the final report as JSON to this path
    #[arg(long = "export-json")]
    pub export_json: Option<String>,

    /// Times an identical error message is logged before being suppressed
    #[arg(long = "diagnostics-repeat", default_value = "1")]
    pub diagnostics_repeat: u64,

    /// Disable ANSI colors in log output
    #[arg(long = "no-color")]
    pub no_color: bool,
}
