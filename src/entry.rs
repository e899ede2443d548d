use std::sync::Arc;

use clap::{ArgMatches, CommandFactory, FromArgMatches};
use tokio_util::sync::CancellationToken;

use crate::args::{DEFAULT_USER_AGENT, MAX_READ_LIMIT, RunArgs};
use crate::config::{apply_config, load_config};
use crate::error::{AppError, AppResult, ValidationError};
use crate::http::{PlainSynthesizer, StreamTransport, build_tls_connector};
use crate::runner::{Collaborators, RunSettings, run_controller};
use crate::system::banner::print_cli_banner;
use crate::system::logger::init_logging;
use crate::system::shutdown_handlers::setup_signal_shutdown_handler;
use crate::system::summary_output::{completion_line, start_line};
use crate::target::{AddressFamily, Endpoint, SystemResolver};

/// A fully validated run, ready to execute.
struct RunPlan {
    settings: RunSettings,
    collaborators: Collaborators,
    no_color: bool,
    no_banner: bool,
}

/// Parses arguments, validates them and executes the run.
///
/// Usage errors exit through clap before anything else happens.
///
/// # Errors
///
/// Returns an error for invalid parameters or a failed startup resolution.
pub fn run() -> AppResult<()> {
    let (mut args, matches) = parse_args()?;
    if let Some(config) = load_config(args.config.as_deref())? {
        apply_config(&mut args, &matches, &config)?;
    }

    init_logging(args.verbose, args.no_color);

    let plan = build_plan(&args)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|source| AppError::validation(ValidationError::RuntimeBuildFailed { source }))?;

    runtime.block_on(execute_plan(plan))
}

fn parse_args() -> AppResult<(RunArgs, ArgMatches)> {
    let matches = RunArgs::command().get_matches();
    let args = RunArgs::from_arg_matches(&matches)?;
    Ok((args, matches))
}

fn build_plan(args: &RunArgs) -> AppResult<RunPlan> {
    let url = args
        .url
        .as_deref()
        .ok_or_else(|| AppError::validation(ValidationError::MissingUrl))?;
    if args.ipv4_only && args.ipv6_only {
        return Err(AppError::validation(ValidationError::Ipv4Ipv6Conflict));
    }
    if args.read_limit > MAX_READ_LIMIT {
        return Err(AppError::validation(ValidationError::ReadLimitTooLarge {
            value: args.read_limit,
            max: MAX_READ_LIMIT,
        }));
    }
    if args.no_ua && !args.authorized {
        return Err(AppError::validation(
            ValidationError::NoUserAgentWithoutAuthorization,
        ));
    }

    let endpoint = Endpoint::parse(url, args.host_header.as_deref())?;
    let user_agent = (!args.no_ua).then_some(DEFAULT_USER_AGENT);
    let synthesizer = PlainSynthesizer::new(args.method, user_agent, &args.headers, &args.data)?;
    let transport = StreamTransport::new(args.connect_timeout, build_tls_connector(args.insecure)?);
    let resolver = SystemResolver::new(AddressFamily::from_flags(args.ipv4_only, args.ipv6_only));

    Ok(RunPlan {
        settings: RunSettings {
            endpoint,
            workers: args.workers,
            duration: args.duration,
            request_timeout: args.request_timeout,
            refresh_interval: args.refresh_interval,
            read_limit: args.read_limit,
        },
        collaborators: Collaborators {
            resolver: Arc::new(resolver),
            transport: Arc::new(transport),
            synthesizer: Arc::new(synthesizer),
        },
        no_color: args.no_color,
        no_banner: args.no_banner,
    })
}

async fn execute_plan(plan: RunPlan) -> AppResult<()> {
    if !plan.no_banner {
        print_cli_banner(plan.no_color);
    }
    println!("{}", start_line(&plan.settings));

    let run_scope = CancellationToken::new();
    let signal_task = setup_signal_shutdown_handler(&run_scope);

    let result = run_controller(plan.settings, plan.collaborators, run_scope.clone()).await;

    run_scope.cancel();
    signal_task.await?;

    let report = result?;
    println!("{}", completion_line(&report));
    Ok(())
}
