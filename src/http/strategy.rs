use std::io;

use async_trait::async_trait;
use futures_util::{AsyncReadExt, TryStreamExt};
use reqwest::{Request, Response};

use crate::domain::LoadPlan;
use crate::error::{AppError, AppResult, HttpError, RequestError};

/// Used when a caller hands in an empty scratch buffer.
const FALLBACK_SCRATCH_SIZE: usize = 512;

/// Builds the jobs of a campaign and consumes their responses.
///
/// The dispatcher calls `prepare(plan, None, 0)` once for the base request,
/// then `prepare(plan, Some(&base), index)` for every job. Workers call
/// `handle_result` on every 2xx response.
#[async_trait]
pub trait RequestStrategy: Send + Sync {
    /// # Errors
    ///
    /// Returns an error when the request cannot be built or cloned.
    fn prepare(
        &self,
        plan: &LoadPlan,
        previous: Option<&Request>,
        index: u64,
    ) -> AppResult<Request>;

    /// Drains the body through `scratch` and returns the bytes read.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Receive`] or [`RequestError::Length`] when the
    /// body cannot be read to completion.
    async fn handle_result(
        &self,
        scratch: &mut [u8],
        response: Response,
    ) -> Result<u64, RequestError> {
        drain_body(scratch, response).await
    }
}

/// Every job is a deep copy of one template request.
#[derive(Debug)]
pub struct CloneStrategy {
    template: Request,
}

impl CloneStrategy {
    #[must_use]
    pub const fn new(template: Request) -> Self {
        Self { template }
    }
}

#[async_trait]
impl RequestStrategy for CloneStrategy {
    fn prepare(
        &self,
        _plan: &LoadPlan,
        previous: Option<&Request>,
        _index: u64,
    ) -> AppResult<Request> {
        clone_request(previous.unwrap_or(&self.template))
    }
}

/// Appends `param=<index>` to the template's query string.
#[derive(Debug)]
pub struct SequenceStrategy {
    template: Request,
    param: String,
}

impl SequenceStrategy {
    #[must_use]
    pub const fn new(template: Request, param: String) -> Self {
        Self { template, param }
    }
}

#[async_trait]
impl RequestStrategy for SequenceStrategy {
    fn prepare(
        &self,
        _plan: &LoadPlan,
        _previous: Option<&Request>,
        index: u64,
    ) -> AppResult<Request> {
        let mut request = clone_request(&self.template)?;
        request
            .url_mut()
            .query_pairs_mut()
            .append_pair(&self.param, &index.to_string());
        Ok(request)
    }
}

fn clone_request(request: &Request) -> AppResult<Request> {
    request
        .try_clone()
        .ok_or_else(|| AppError::http(HttpError::CloneRequestFailed))
}

/// Reads `response` to the end through `scratch`.
///
/// A read error, or a clean end of stream, before the declared
/// `Content-Length` was reached is a [`RequestError::Length`]; any other read
/// error is a [`RequestError::Receive`].
///
/// # Errors
///
/// See above.
pub async fn drain_body(scratch: &mut [u8], response: Response) -> Result<u64, RequestError> {
    let expected = response.content_length();
    let mut reader = Box::pin(response.bytes_stream().map_err(io::Error::other)).into_async_read();
    let mut fallback = [0u8; FALLBACK_SCRATCH_SIZE];
    let buffer: &mut [u8] = if scratch.is_empty() {
        &mut fallback
    } else {
        scratch
    };

    let mut total: u64 = 0;
    loop {
        match reader.read(buffer).await {
            Ok(0) => break,
            Ok(read) => total = total.saturating_add(u64::try_from(read).unwrap_or(u64::MAX)),
            Err(err) => {
                return Err(match expected {
                    Some(expected) if total < expected => RequestError::Length {
                        read: total,
                        expected,
                    },
                    Some(_) | None => RequestError::Receive {
                        message: err.to_string(),
                    },
                });
            }
        }
    }

    match expected {
        Some(expected) if total < expected => Err(RequestError::Length {
            read: total,
            expected,
        }),
        Some(_) | None => Ok(total),
    }
}
