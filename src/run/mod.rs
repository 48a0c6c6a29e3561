//! One load campaign: coordination, the results monitor and the wiring
//! between them and the worker pool.
mod context;
mod monitor;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::diagnostics::Diagnostics;
use crate::domain::LoadPlan;
use crate::error::AppResult;
use crate::http::{Benchmark, JobSource, Transport};
use crate::metrics::Outcome;
use crate::shutdown::ShutdownReceiver;

pub use context::{FIELD_CONTENT_SIZE, FIELD_SERVER_NAME, ProbeFacts, RunContext};
pub use monitor::{MonitorReport, StopReason, setup_monitor};

/// Upper bound on buffered outcomes between the workers and the monitor.
const MAX_RESULTS_CAPACITY: u64 = 65_536;

/// A single-use campaign. Probe facts may be written to [`Campaign::context`]
/// before [`Campaign::execute`] is called.
pub struct Campaign {
    plan: Arc<LoadPlan>,
    context: Arc<RunContext>,
    diagnostics: Arc<Diagnostics>,
    transport: Arc<dyn Transport>,
}

impl Campaign {
    #[must_use]
    pub fn new(
        plan: LoadPlan,
        transport: Arc<dyn Transport>,
        diagnostics: Arc<Diagnostics>,
    ) -> Self {
        let context = Arc::new(RunContext::new(plan.concurrency));
        Self {
            plan: Arc::new(plan),
            context,
            diagnostics,
            transport,
        }
    }

    #[must_use]
    pub const fn plan(&self) -> &Arc<LoadPlan> {
        &self.plan
    }

    #[must_use]
    pub const fn context(&self) -> &Arc<RunContext> {
        &self.context
    }

    /// Runs the campaign to termination and returns what was accumulated.
    ///
    /// # Errors
    ///
    /// Returns an error only when the monitor or dispatcher task panicked.
    pub async fn execute(
        self,
        source: JobSource,
        interrupt_rx: ShutdownReceiver,
    ) -> AppResult<MonitorReport> {
        let capacity = self
            .plan
            .requests
            .saturating_add(u64::try_from(self.plan.concurrency).unwrap_or(u64::MAX))
            .min(MAX_RESULTS_CAPACITY);
        let (results_tx, results_rx) =
            mpsc::channel::<Outcome>(usize::try_from(capacity).unwrap_or(1).max(1));

        let monitor = setup_monitor(
            Arc::clone(&self.plan),
            Arc::clone(&self.context),
            results_rx,
            interrupt_rx,
        );
        let benchmark = Benchmark::new(
            Arc::clone(&self.plan),
            Arc::clone(&self.context),
            self.diagnostics,
            self.transport,
            results_tx,
        );
        let dispatcher = tokio::spawn(benchmark.run(source));

        let report = monitor.await?;
        dispatcher.await?;
        Ok(report)
    }
}
