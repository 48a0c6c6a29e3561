use std::num::NonZeroUsize;
use std::sync::Arc;

use reqwest::Request;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, error};

use crate::diagnostics::Diagnostics;
use crate::domain::LoadPlan;
use crate::metrics::Outcome;
use crate::run::RunContext;

use super::rate::RateLimiter;
use super::strategy::{CloneStrategy, RequestStrategy};
use super::transport::Transport;
use super::worker::{JobQueue, Worker, WorkerContext};

/// Upper bound on the job queue when a strategy pre-builds every job.
const MAX_QUEUE_CAPACITY: usize = 1 << 20;

/// Where the dispatcher gets its jobs from.
pub enum JobSource {
    /// Every job is a deep copy of one base request.
    Cloned(Request),
    /// Jobs are produced one by one by a strategy.
    Strategy(Arc<dyn RequestStrategy>),
}

impl JobSource {
    fn into_parts(self, plan: &LoadPlan) -> (Arc<dyn RequestStrategy>, usize) {
        match self {
            Self::Cloned(request) => {
                let parallelism = std::thread::available_parallelism().map_or(1, NonZeroUsize::get);
                let capacity = plan.concurrency.saturating_mul(parallelism).max(1);
                (Arc::new(CloneStrategy::new(request)), capacity)
            }
            Self::Strategy(strategy) => {
                let capacity = usize::try_from(plan.job_count())
                    .unwrap_or(MAX_QUEUE_CAPACITY)
                    .clamp(1, MAX_QUEUE_CAPACITY);
                (strategy, capacity)
            }
        }
    }
}

/// Launches the worker pool and feeds it jobs.
pub struct Benchmark {
    plan: Arc<LoadPlan>,
    run: Arc<RunContext>,
    diagnostics: Arc<Diagnostics>,
    transport: Arc<dyn Transport>,
    results_tx: mpsc::Sender<Outcome>,
}

impl Benchmark {
    #[must_use]
    pub fn new(
        plan: Arc<LoadPlan>,
        run: Arc<RunContext>,
        diagnostics: Arc<Diagnostics>,
        transport: Arc<dyn Transport>,
        results_tx: mpsc::Sender<Outcome>,
    ) -> Self {
        Self {
            plan,
            run,
            diagnostics,
            transport,
            results_tx,
        }
    }

    /// Runs until every worker exited. Reports ready to the startup barrier
    /// once all workers are launched, then enqueues
    /// [`LoadPlan::job_count`] jobs and closes the queue.
    pub async fn run(self, source: JobSource) {
        let (strategy, capacity) = source.into_parts(&self.plan);
        let (jobs_tx, jobs_rx) = mpsc::channel::<Request>(capacity);
        let jobs: JobQueue = Arc::new(Mutex::new(jobs_rx));

        let context = WorkerContext {
            plan: Arc::clone(&self.plan),
            run: Arc::clone(&self.run),
            diagnostics: self.diagnostics,
            transport: self.transport,
            strategy: Arc::clone(&strategy),
            rate_limiter: Arc::new(RateLimiter::new(self.plan.rate_limit)),
            results_tx: self.results_tx,
        };

        let mut worker_handles = Vec::with_capacity(self.plan.concurrency);
        for id in 0..self.plan.concurrency {
            let worker = Worker::new(id, context.clone(), Arc::clone(&jobs));
            worker_handles.push(tokio::spawn(worker.run()));
        }
        drop(context);
        drop(jobs);
        self.run.report_ready();

        let queued = feed_jobs(&self.plan, &self.run, strategy.as_ref(), &jobs_tx).await;
        drop(jobs_tx);
        debug!(queued, "Job queue closed");

        for handle in worker_handles {
            if let Err(err) = handle.await {
                error!("Worker task failed: {}", err);
            }
        }
    }
}

async fn feed_jobs(
    plan: &LoadPlan,
    run: &RunContext,
    strategy: &dyn RequestStrategy,
    jobs_tx: &mpsc::Sender<Request>,
) -> u64 {
    let base = match strategy.prepare(plan, None, 0) {
        Ok(base) => base,
        Err(err) => {
            error!("Failed to prepare the base request: {}", err);
            return 0;
        }
    };

    let mut queued: u64 = 0;
    for index in 0..plan.job_count() {
        let job = match strategy.prepare(plan, Some(&base), index) {
            Ok(job) => job,
            Err(err) => {
                error!("Failed to prepare request {}: {}", index, err);
                break;
            }
        };
        tokio::select! {
            biased;
            () = run.stopped() => break,
            sent = jobs_tx.send(job) => {
                if sent.is_err() {
                    break;
                }
            }
        }
        queued = queued.saturating_add(1);
    }
    queued
}
