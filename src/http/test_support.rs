use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, Request, Response, StatusCode};
use tokio::time::sleep;

use crate::domain::{LoadPlan, LoadShape, Target};
use crate::error::{AppError, AppResult, SendError};

use super::transport::Transport;

pub(crate) const TEST_URL: &str = "http://127.0.0.1:8080/bench";

/// What a [`ScriptedTransport`] does for one call.
pub(crate) enum Step {
    Respond {
        status: StatusCode,
        body: &'static str,
        delay: Duration,
    },
    FailConnect,
    Hang,
}

impl Step {
    pub(crate) const fn ok(delay: Duration) -> Self {
        Self::Respond {
            status: StatusCode::OK,
            body: "hello",
            delay,
        }
    }
}

type Script = Box<dyn Fn(u64) -> Step + Send + Sync>;

/// Transport whose behavior is a function of the zero-based call index.
pub(crate) struct ScriptedTransport {
    calls: AtomicU64,
    urls: Mutex<Vec<String>>,
    script: Script,
}

impl ScriptedTransport {
    pub(crate) fn new<F>(script: F) -> Self
    where
        F: Fn(u64) -> Step + Send + Sync + 'static,
    {
        Self {
            calls: AtomicU64::new(0),
            urls: Mutex::new(Vec::new()),
            script: Box::new(script),
        }
    }

    pub(crate) fn always_ok(delay: Duration) -> Self {
        Self::new(move |_| Step::ok(delay))
    }

    pub(crate) fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn urls(&self) -> Vec<String> {
        self.urls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: Request) -> Result<Response, SendError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.urls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.url().to_string());

        match (self.script)(call) {
            Step::Respond {
                status,
                body,
                delay,
            } => {
                sleep(delay).await;
                let mut response = ::http::Response::new(body);
                *response.status_mut() = status;
                Ok(Response::from(response))
            }
            Step::FailConnect => Err(SendError::Connect {
                message: "connection refused".to_owned(),
            }),
            Step::Hang => std::future::pending().await,
        }
    }
}

pub(crate) fn get_request(url: &str) -> AppResult<Request> {
    Ok(Request::new(Method::GET, Target::parse(url)?.url))
}

pub(crate) fn test_plan(requests: u64, concurrency: usize) -> AppResult<LoadPlan> {
    Ok(LoadPlan::resolve(
        Target::parse(TEST_URL)?,
        LoadShape {
            requests: Some(requests),
            concurrency,
            time_limit: None,
        },
    )?)
}

pub(crate) fn run_async_test<F>(future: F) -> AppResult<()>
where
    F: Future<Output = AppResult<()>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::validation(format!("Failed to build runtime: {}", err)))?;
    runtime.block_on(future)
}

/// Like [`run_async_test`], with the clock paused so sleeps resolve
/// instantly and latencies are exact.
pub(crate) fn run_paused_test<F>(future: F) -> AppResult<()>
where
    F: Future<Output = AppResult<()>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .start_paused(true)
        .build()
        .map_err(|err| AppError::validation(format!("Failed to build runtime: {}", err)))?;
    runtime.block_on(future)
}
