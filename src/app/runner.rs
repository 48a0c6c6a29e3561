use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::args::{BenchArgs, PositiveU64};
use crate::diagnostics::Diagnostics;
use crate::domain::{LoadPlan, LoadShape, Target};
use crate::error::{AppError, AppResult, HttpError, ValidationError};
use crate::http::{
    ClientOptions, JobSource, ReqwestTransport, RequestSpec, SequenceStrategy, Transport,
    build_client, detect_host,
};
use crate::report::{Report, export_json, report_lines};
use crate::run::Campaign;
use crate::shutdown_handlers::{setup_signal_shutdown_handler, shutdown_channel};

/// Resolves the CLI/config values into an immutable load plan.
///
/// # Errors
///
/// Returns an error when the URL is missing or invalid, or the load shape
/// violates the plan invariants.
pub(crate) fn build_plan(args: &BenchArgs) -> AppResult<LoadPlan> {
    let url = args
        .url
        .as_deref()
        .ok_or_else(|| AppError::validation(ValidationError::MissingUrl))?;
    let target = Target::parse(url)?;
    if args.sequence_param.as_deref().is_some_and(str::is_empty) {
        return Err(AppError::validation(ValidationError::EmptySequenceParam));
    }
    let shape = LoadShape {
        requests: args.requests.map(PositiveU64::get),
        concurrency: args.concurrency.get(),
        time_limit: args.time_limit.map(Duration::from_secs),
    };

    Ok(LoadPlan::resolve(target, shape)?
        .with_execution_timeout(args.execution_timeout)
        .with_skip_first(args.skip_first)
        .with_continue_on_error(args.continue_on_error)
        .with_rate_limit(args.rate_limit.map(PositiveU64::get)))
}

/// Runs one campaign end to end: probe, load, report.
///
/// # Errors
///
/// Returns an error when the request or client cannot be built, a campaign
/// task panicked, or the JSON export cannot be written.
pub(crate) async fn run_local(args: BenchArgs) -> AppResult<Report> {
    let plan = build_plan(&args)?;
    debug!(
        requests = plan.requests,
        concurrency = plan.concurrency,
        time_limit = ?plan.time_limit,
        "Resolved load plan"
    );

    let spec = RequestSpec::from_args(&args, &plan.target)?;
    let client = build_client(&ClientOptions::from_args(&args))?;
    let request = spec.build(&client)?;
    let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::new(client));
    let diagnostics = Arc::new(Diagnostics::new(args.diagnostics_repeat));

    let campaign = Campaign::new(plan, Arc::clone(&transport), Arc::clone(&diagnostics));

    let probe_request = request
        .try_clone()
        .ok_or_else(|| AppError::http(HttpError::CloneRequestFailed))?;
    if let Err(err) = detect_host(transport.as_ref(), probe_request, campaign.context()).await {
        warn!("Probe request failed: {}", err);
    }
    let probe = campaign.context().probe_facts();
    let plan = Arc::clone(campaign.plan());

    let source = match args.sequence_param {
        Some(param) => JobSource::Strategy(Arc::new(SequenceStrategy::new(request, param))),
        None => JobSource::Cloned(request),
    };

    let (shutdown_tx, _) = shutdown_channel();
    let signal_handle = setup_signal_shutdown_handler(&shutdown_tx);
    let interrupt_rx = shutdown_tx.subscribe();

    let result = campaign.execute(source, interrupt_rx).await;

    drop(shutdown_tx.send(()));
    if let Err(err) = signal_handle.await {
        warn!("Signal handler task failed: {}", err);
    }

    let monitor = result?;
    diagnostics.log_summary();

    let report = Report::new(&plan, monitor, probe);
    println!();
    for line in report_lines(&report) {
        println!("{}", line);
    }

    if let Some(path) = args.export_json.as_deref() {
        export_json(path, &report).await?;
        info!("Report written to {}", path);
    }

    Ok(report)
}
