use std::path::PathBuf;

use clap::ArgMatches;

use crate::args::BenchArgs;
use crate::args::parsers::parse_basic_auth;
use crate::error::{AppError, AppResult, ConfigError};

use super::types::ConfigFile;

mod util;

use util::{ensure_positive_u64, ensure_positive_usize, is_cli, parse_cookies, parse_headers};

/// Applies configuration values to CLI arguments. Options given on the
/// command line are left untouched.
///
/// # Errors
///
/// Returns an error when config values are invalid or conflict.
pub fn apply_config(
    args: &mut BenchArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    if config.post_file.is_some() && config.put_file.is_some() {
        return Err(AppError::config(ConfigError::Conflict {
            left: "post_file",
            right: "put_file",
        }));
    }

    apply_load_shape(args, matches, config)?;
    apply_request(args, matches, config)?;
    apply_runtime(args, matches, config)?;
    Ok(())
}

fn apply_load_shape(
    args: &mut BenchArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    if !is_cli(matches, "url")
        && let Some(url) = config.url.clone()
    {
        args.url = Some(url);
    }

    if !is_cli(matches, "requests")
        && let Some(requests) = config.requests
    {
        args.requests = Some(ensure_positive_u64(requests, "requests")?);
    }

    if !is_cli(matches, "concurrency")
        && let Some(concurrency) = config.concurrency
    {
        args.concurrency = ensure_positive_usize(concurrency, "concurrency")?;
    }

    if !is_cli(matches, "time_limit")
        && let Some(time_limit) = config.time_limit
    {
        args.time_limit = Some(time_limit);
    }

    if !is_cli(matches, "rate_limit")
        && let Some(rate) = config.rate
    {
        args.rate_limit = Some(ensure_positive_u64(rate, "rate")?);
    }

    if !is_cli(matches, "execution_timeout")
        && let Some(timeout) = config.timeout.as_ref()
    {
        args.execution_timeout = timeout.to_duration().map_err(|err| {
            AppError::config(ConfigError::InvalidDuration {
                field: "timeout",
                source: err,
            })
        })?;
    }

    Ok(())
}

fn apply_request(
    args: &mut BenchArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    if !is_cli(matches, "head")
        && let Some(head) = config.head
    {
        args.head = head;
    }

    if !is_cli(matches, "post_file")
        && !is_cli(matches, "put_file")
        && let Some(path) = config.post_file.as_ref()
    {
        args.post_file = Some(PathBuf::from(path));
    }

    if !is_cli(matches, "put_file")
        && !is_cli(matches, "post_file")
        && let Some(path) = config.put_file.as_ref()
    {
        args.put_file = Some(PathBuf::from(path));
    }

    if !is_cli(matches, "content_type")
        && let Some(content_type) = config.content_type.clone()
    {
        args.content_type = content_type;
    }

    if !is_cli(matches, "headers")
        && let Some(headers) = config.headers.as_ref()
    {
        args.headers = parse_headers(headers)?;
    }

    if !is_cli(matches, "cookies")
        && let Some(cookies) = config.cookies.as_ref()
    {
        args.cookies = parse_cookies(cookies)?;
    }

    if !is_cli(matches, "basic_auth")
        && let Some(basic_auth) = config.basic_auth.as_deref()
    {
        args.basic_auth = Some(parse_basic_auth(basic_auth)?);
    }

    if !is_cli(matches, "keep_alive")
        && let Some(keep_alive) = config.keep_alive
    {
        args.keep_alive = keep_alive;
    }

    if !is_cli(matches, "gzip")
        && let Some(gzip) = config.gzip
    {
        args.gzip = gzip;
    }

    if !is_cli(matches, "proxy_url")
        && let Some(proxy_url) = config.proxy_url.clone()
    {
        args.proxy_url = Some(proxy_url);
    }

    if !is_cli(matches, "sequence_param")
        && let Some(param) = config.sequence_param.clone()
    {
        args.sequence_param = Some(param);
    }

    Ok(())
}

fn apply_runtime(
    args: &mut BenchArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    if !is_cli(matches, "verbosity")
        && let Some(verbosity) = config.verbosity
    {
        args.verbosity = verbosity;
    }

    if !is_cli(matches, "continue_on_error")
        && let Some(continue_on_error) = config.continue_on_error
    {
        args.continue_on_error = continue_on_error;
    }

    if !is_cli(matches, "skip_first")
        && let Some(skip_first) = config.skip_first
    {
        args.skip_first = skip_first;
    }

    if !is_cli(matches, "export_json")
        && let Some(path) = config.export_json.clone()
    {
        args.export_json = Some(path);
    }

    if !is_cli(matches, "diagnostics_repeat")
        && let Some(repeat) = config.diagnostics_repeat
    {
        args.diagnostics_repeat = repeat;
    }

    if !is_cli(matches, "no_color")
        && let Some(no_color) = config.no_color
    {
        args.no_color = no_color;
    }

    Ok(())
}
