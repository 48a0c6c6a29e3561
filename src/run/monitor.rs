use std::future::pending;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep};
use tracing::{debug, info};

use crate::domain::LoadPlan;
use crate::metrics::{Outcome, RunningStats};
use crate::shutdown::ShutdownReceiver;

use super::context::RunContext;

/// Progress is logged every tenth of the planned count.
const PROGRESS_STEPS: u64 = 10;

/// Which termination condition ended the campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Every planned request produced an outcome.
    Completed,
    /// An outcome carried an error and the run is fail-fast.
    Failed,
    TimeLimit,
    Interrupted,
    /// The results queue closed before the planned count was reached.
    WorkersExited,
}

impl StopReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::TimeLimit => "time_limit",
            Self::Interrupted => "interrupted",
            Self::WorkersExited => "workers_exited",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorReport {
    pub stats: RunningStats,
    pub stop_reason: StopReason,
}

/// Spawns the single consumer of the results queue.
///
/// The task waits for the startup barrier, releases the workers, then
/// records outcomes until a termination condition fires. It stops the clock
/// and broadcasts the stop signal exactly once before returning.
pub fn setup_monitor(
    plan: Arc<LoadPlan>,
    run: Arc<RunContext>,
    mut results_rx: mpsc::Receiver<Outcome>,
    mut interrupt_rx: ShutdownReceiver,
) -> JoinHandle<MonitorReport> {
    tokio::spawn(async move {
        let mut stats = RunningStats::default();

        tokio::select! {
            () = run.await_ready() => {}
            () = interrupted(&mut interrupt_rx) => {
                run.signal_stop();
                return MonitorReport {
                    stats,
                    stop_reason: StopReason::Interrupted,
                };
            }
        }

        info!("Benchmarking {} (be patient)", plan.target.host);
        let started = Instant::now();
        run.release_start();

        let time_limit = plan.time_limit;
        let deadline = async move {
            match time_limit {
                Some(limit) => sleep(limit).await,
                None => pending::<()>().await,
            }
        };
        tokio::pin!(deadline);
        let progress_step = progress_step(plan.requests);

        let stop_reason = loop {
            tokio::select! {
                outcome = results_rx.recv() => {
                    let Some(outcome) = outcome else {
                        break StopReason::WorkersExited;
                    };
                    let failed = !outcome.is_success();
                    stats.record(outcome);

                    if failed && !plan.continue_on_error {
                        break StopReason::Failed;
                    }
                    if stats.total_requests >= plan.requests {
                        if progress_step.is_some() {
                            info!("Finished {} requests", plan.requests);
                        }
                        break StopReason::Completed;
                    }
                    if let Some(step) = progress_step
                        && stats.total_requests.checked_rem(step) == Some(0)
                    {
                        info!("Completed {} requests", stats.total_requests);
                    }
                }
                () = &mut deadline => break StopReason::TimeLimit,
                () = interrupted(&mut interrupt_rx) => break StopReason::Interrupted,
            }
        };

        stats.total_execution_time = started.elapsed();
        run.signal_stop();
        debug!(
            reason = stop_reason.as_str(),
            attempted = stats.total_requests,
            "Campaign stopped"
        );

        MonitorReport { stats, stop_reason }
    })
}

fn progress_step(requests: u64) -> Option<u64> {
    (requests >= PROGRESS_STEPS).then(|| requests.checked_div(PROGRESS_STEPS).unwrap_or(1))
}

/// Resolves on an interrupt. A closed channel never resolves.
async fn interrupted(interrupt_rx: &mut ShutdownReceiver) {
    match interrupt_rx.recv().await {
        Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => {}
        Err(broadcast::error::RecvError::Closed) => pending::<()>().await,
    }
}
