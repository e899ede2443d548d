use std::time::Duration;

use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{PositiveUsize, RunArgs, parse_header};
use crate::error::{AppError, AppResult, ConfigError};

use super::types::{ConfigFile, DurationValue};

/// Applies configuration values to CLI arguments.
///
/// Values given on the command line always take precedence.
///
/// # Errors
///
/// Returns an error when config values are invalid.
pub fn apply_config(
    args: &mut RunArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    if !is_cli(matches, "url")
        && let Some(url) = config.url.clone()
    {
        args.url = Some(url);
    }

    if !is_cli(matches, "workers")
        && let Some(workers) = config.workers
    {
        args.workers = PositiveUsize::try_from(workers).map_err(|source| {
            AppError::config(ConfigError::FieldMustBePositive {
                field: "workers",
                source,
            })
        })?;
    }

    if !is_cli(matches, "duration")
        && let Some(duration) = config.duration.as_ref()
    {
        args.duration = duration_field(duration, "duration")?;
    }

    if !is_cli(matches, "host_header")
        && let Some(host) = config.host.clone()
    {
        args.host_header = Some(host);
    }

    if !is_cli(matches, "method")
        && let Some(method) = config.method
    {
        args.method = method;
    }

    if !is_cli(matches, "headers")
        && let Some(headers) = config.headers.as_ref()
    {
        let mut parsed = Vec::with_capacity(headers.len());
        for header in headers {
            parsed.push(
                parse_header(header)
                    .map_err(|source| AppError::config(ConfigError::InvalidHeader { source }))?,
            );
        }
        args.headers = parsed;
    }

    if !is_cli(matches, "data")
        && let Some(data) = config.data.clone()
    {
        args.data = data;
    }

    if !is_cli(matches, "request_timeout")
        && let Some(timeout) = config.timeout.as_ref()
    {
        args.request_timeout = duration_field(timeout, "timeout")?;
    }

    if !is_cli(matches, "connect_timeout")
        && let Some(timeout) = config.connect_timeout.as_ref()
    {
        args.connect_timeout = duration_field(timeout, "connect_timeout")?;
    }

    if !is_cli(matches, "refresh_interval")
        && let Some(interval) = config.refresh_interval.as_ref()
    {
        args.refresh_interval = duration_field(interval, "refresh_interval")?;
    }

    if !is_cli(matches, "read_limit")
        && let Some(limit) = config.read_limit
    {
        args.read_limit = limit;
    }

    apply_flag(matches, "ipv4_only", config.ipv4, &mut args.ipv4_only);
    apply_flag(matches, "ipv6_only", config.ipv6, &mut args.ipv6_only);
    apply_flag(matches, "insecure", config.insecure, &mut args.insecure);
    apply_flag(matches, "no_ua", config.no_ua, &mut args.no_ua);
    apply_flag(matches, "authorized", config.authorized, &mut args.authorized);
    apply_flag(matches, "verbose", config.verbose, &mut args.verbose);
    apply_flag(matches, "no_color", config.no_color, &mut args.no_color);
    apply_flag(matches, "no_banner", config.no_banner, &mut args.no_banner);

    Ok(())
}

fn is_cli(matches: &ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(ValueSource::CommandLine)
}

fn apply_flag(matches: &ArgMatches, name: &str, value: Option<bool>, target: &mut bool) {
    if !is_cli(matches, name)
        && let Some(value) = value
    {
        *target = value;
    }
}

fn duration_field(value: &DurationValue, field: &'static str) -> AppResult<Duration> {
    match value.to_duration() {
        Ok(duration) => Ok(duration),
        Err(AppError::Validation(source)) => {
            Err(AppError::config(ConfigError::InvalidDuration { field, source }))
        }
        Err(other) => Err(other),
    }
}
