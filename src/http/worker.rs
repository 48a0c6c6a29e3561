use std::sync::Arc;
use std::time::Duration;

use reqwest::{Request, Response};
use tokio::sync::{Mutex, mpsc};
use tokio::time::{Instant, sleep};
use tracing::{debug, warn};

use crate::diagnostics::Diagnostics;
use crate::domain::LoadPlan;
use crate::error::{RequestError, SendError};
use crate::metrics::Outcome;
use crate::run::{FIELD_CONTENT_SIZE, RunContext};

use super::rate::RateLimiter;
use super::strategy::RequestStrategy;
use super::transport::Transport;

/// Attempts per job, counting the first, before a connection failure is final.
pub const MAX_SEND_ATTEMPTS: u32 = 3;
/// Ceiling of the per-worker body scratch buffer.
pub const MAX_SCRATCH_SIZE: usize = 8192;
/// Floor of the per-worker body scratch buffer.
pub const MIN_SCRATCH_SIZE: usize = 512;

/// Multi-consumer side of the job queue.
pub type JobQueue = Arc<Mutex<mpsc::Receiver<Request>>>;

/// Scratch size for a probed document length, clamped to
/// `[MIN_SCRATCH_SIZE, MAX_SCRATCH_SIZE]`.
#[must_use]
pub fn scratch_len(probed: Option<u64>) -> usize {
    probed.map_or(MAX_SCRATCH_SIZE, |size| {
        usize::try_from(size)
            .unwrap_or(MAX_SCRATCH_SIZE)
            .clamp(MIN_SCRATCH_SIZE, MAX_SCRATCH_SIZE)
    })
}

/// Handles shared by every worker of one campaign.
#[derive(Clone)]
pub struct WorkerContext {
    pub plan: Arc<LoadPlan>,
    pub run: Arc<RunContext>,
    pub diagnostics: Arc<Diagnostics>,
    pub transport: Arc<dyn Transport>,
    pub strategy: Arc<dyn RequestStrategy>,
    pub rate_limiter: Arc<RateLimiter>,
    pub results_tx: mpsc::Sender<Outcome>,
}

enum Step {
    Continue,
    Stop,
}

/// One long-lived concurrency slot.
///
/// Takes jobs from the shared queue until it is closed and drained or the
/// stop signal fires. Each job is sent on its own task, raced against the
/// execution timeout and the stop signal.
pub struct Worker {
    id: usize,
    context: WorkerContext,
    jobs: JobQueue,
    scratch: Vec<u8>,
    scratch_len: usize,
    skip_pending: bool,
}

impl Worker {
    #[must_use]
    pub fn new(id: usize, context: WorkerContext, jobs: JobQueue) -> Self {
        let scratch_len = scratch_len(context.run.int(FIELD_CONTENT_SIZE));
        let skip_pending = context.plan.skip_first;
        Self {
            id,
            context,
            jobs,
            scratch: vec![0; scratch_len],
            scratch_len,
            skip_pending,
        }
    }

    pub async fn run(mut self) {
        let run = Arc::clone(&self.context.run);
        run.report_ready();
        tokio::select! {
            biased;
            () = run.stopped() => return,
            () = run.await_start() => {}
        }

        loop {
            let job = tokio::select! {
                biased;
                () = run.stopped() => break,
                job = next_job(&self.jobs) => job,
            };
            let Some(request) = job else {
                debug!(worker = self.id, "Job queue drained");
                break;
            };
            match self.execute(request).await {
                Step::Continue => {}
                Step::Stop => break,
            }
        }
    }

    async fn execute(&mut self, request: Request) -> Step {
        let run = Arc::clone(&self.context.run);
        tokio::select! {
            biased;
            () = run.stopped() => return Step::Stop,
            () = self.context.rate_limiter.acquire(self.id) => {}
        }

        let timeout = self.context.plan.execution_timeout;
        let started = Instant::now();
        let mut send_task = {
            let transport = Arc::clone(&self.context.transport);
            let strategy = Arc::clone(&self.context.strategy);
            let mut scratch = std::mem::take(&mut self.scratch);
            let worker_id = self.id;
            tokio::spawn(async move {
                let result = send_and_receive(
                    transport.as_ref(),
                    strategy.as_ref(),
                    &mut scratch,
                    request,
                    SendSettings { worker_id, timeout },
                )
                .await;
                (result, scratch)
            })
        };

        let result = tokio::select! {
            biased;
            () = run.stopped() => {
                send_task.abort();
                return Step::Stop;
            }
            joined = &mut send_task => match joined {
                Ok((result, scratch)) => {
                    self.scratch = scratch;
                    result
                }
                Err(err) => Err(RequestError::Exception {
                    message: err.to_string(),
                }),
            },
            () = sleep(timeout) => {
                send_task.abort();
                Err(RequestError::ResponseTimeout { timeout })
            }
        };
        let elapsed = started.elapsed();
        if self.scratch.is_empty() {
            self.scratch = vec![0; self.scratch_len];
        }

        let outcome = match result {
            Ok(bytes) => Outcome::success(elapsed, bytes),
            Err(error) => {
                self.context.diagnostics.report(&error);
                Outcome::failure(elapsed, error)
            }
        };

        if self.skip_pending {
            self.skip_pending = false;
            debug!(worker = self.id, "Discarding warm-up outcome");
            return Step::Continue;
        }

        tokio::select! {
            biased;
            () = run.stopped() => Step::Stop,
            sent = self.context.results_tx.send(outcome) => match sent {
                Ok(()) => Step::Continue,
                Err(_) => Step::Stop,
            },
        }
    }
}

async fn next_job(jobs: &JobQueue) -> Option<Request> {
    jobs.lock().await.recv().await
}

#[derive(Clone, Copy)]
struct SendSettings {
    worker_id: usize,
    timeout: Duration,
}

async fn send_and_receive(
    transport: &dyn Transport,
    strategy: &dyn RequestStrategy,
    scratch: &mut [u8],
    request: Request,
    settings: SendSettings,
) -> Result<u64, RequestError> {
    let response = send_with_retry(transport, request, settings).await?;
    let status = response.status();
    if !status.is_success() {
        return Err(RequestError::Response {
            status: status.as_u16(),
        });
    }
    strategy.handle_result(scratch, response).await
}

async fn send_with_retry(
    transport: &dyn Transport,
    request: Request,
    settings: SendSettings,
) -> Result<Response, RequestError> {
    let mut attempt: u32 = 1;
    let mut pending = request;
    loop {
        let retry = if attempt < MAX_SEND_ATTEMPTS {
            pending.try_clone()
        } else {
            None
        };
        let err = match transport.send(pending).await {
            Ok(response) => return Ok(response),
            Err(err) => err,
        };
        if err.is_retryable()
            && let Some(next) = retry
        {
            warn!(
                worker = settings.worker_id,
                attempt,
                "Connection failed, retrying: {}",
                err
            );
            attempt = attempt.saturating_add(1);
            pending = next;
            continue;
        }
        return Err(classify_send_error(err, attempt, settings.timeout));
    }
}

pub(super) fn classify_send_error(
    err: SendError,
    attempts: u32,
    timeout: Duration,
) -> RequestError {
    match err {
        SendError::Connect { message } => RequestError::Connect { attempts, message },
        SendError::Timeout { .. } => RequestError::ResponseTimeout { timeout },
        SendError::Other { message } => RequestError::Exception { message },
    }
}
