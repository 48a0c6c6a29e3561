use reqwest::Request;
use reqwest::header::{CONTENT_LENGTH, SERVER};
use tracing::debug;

use crate::error::{AppError, AppResult, HttpError};
use crate::run::{FIELD_CONTENT_SIZE, FIELD_SERVER_NAME, RunContext};

use super::transport::Transport;

/// Sends one request ahead of the campaign and records the target's
/// `Server` header and document length in the probe-fact store.
///
/// The length comes from `Content-Length`, or from the body when the header
/// is missing.
///
/// # Errors
///
/// Returns an error when the request fails or its body cannot be read.
pub async fn detect_host(
    transport: &dyn Transport,
    request: Request,
    context: &RunContext,
) -> AppResult<()> {
    let response = transport.send(request).await.map_err(|err| {
        AppError::http(HttpError::ProbeSendFailed {
            message: err.to_string(),
        })
    })?;

    if let Some(server) = response
        .headers()
        .get(SERVER)
        .and_then(|value| value.to_str().ok())
    {
        context.set_text(FIELD_SERVER_NAME, server);
    }

    let declared = response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok());
    let content_size = match declared {
        Some(length) => length,
        None => {
            let body = response
                .bytes()
                .await
                .map_err(|source| AppError::http(HttpError::ProbeBodyFailed { source }))?;
            u64::try_from(body.len()).unwrap_or(u64::MAX)
        }
    };
    context.set_int(FIELD_CONTENT_SIZE, content_size);

    debug!(
        server = context.text(FIELD_SERVER_NAME).as_deref().unwrap_or(""),
        content_size, "Probed target"
    );
    Ok(())
}
