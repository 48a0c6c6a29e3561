use super::*;
use crate::run::{FIELD_CONTENT_SIZE, FIELD_SERVER_NAME, RunContext};
use async_trait::async_trait;
use reqwest::header::{CONTENT_LENGTH, SERVER};

use crate::error::SendError;

/// Replies with a fixed head and body.
struct FixedTransport {
    server: Option<&'static str>,
    content_length: Option<&'static str>,
    body: &'static str,
}

#[async_trait]
impl Transport for FixedTransport {
    async fn send(&self, _request: Request) -> Result<Response, SendError> {
        let mut response = ::http::Response::new(self.body);
        if let Some(server) = self.server {
            response
                .headers_mut()
                .insert(SERVER, HeaderValue::from_static(server));
        }
        if let Some(length) = self.content_length {
            response
                .headers_mut()
                .insert(CONTENT_LENGTH, HeaderValue::from_static(length));
        }
        Ok(Response::from(response))
    }
}

#[test]
fn probe_records_server_and_declared_length() -> AppResult<()> {
    run_async_test(async {
        let transport = FixedTransport {
            server: Some("nginx/1.25"),
            content_length: Some("1234"),
            body: "abc",
        };
        let context = RunContext::new(1);
        detect_host(&transport, get_request(TEST_URL)?, &context).await?;

        if context.text(FIELD_SERVER_NAME).as_deref() != Some("nginx/1.25") {
            return Err(AppError::validation("Expected server name"));
        }
        if context.int(FIELD_CONTENT_SIZE) != Some(1234) {
            return Err(AppError::validation("Expected declared content length"));
        }
        Ok(())
    })
}

#[test]
fn probe_measures_body_without_content_length() -> AppResult<()> {
    run_async_test(async {
        let transport = FixedTransport {
            server: None,
            content_length: None,
            body: "abcdef",
        };
        let context = RunContext::new(1);
        detect_host(&transport, get_request(TEST_URL)?, &context).await?;

        if context.text(FIELD_SERVER_NAME).is_some() {
            return Err(AppError::validation("Server name should stay unset"));
        }
        if context.int(FIELD_CONTENT_SIZE) != Some(6) {
            return Err(AppError::validation(format!(
                "Unexpected measured length: {:?}",
                context.int(FIELD_CONTENT_SIZE)
            )));
        }
        Ok(())
    })
}

#[test]
fn probe_failure_leaves_facts_empty() -> AppResult<()> {
    run_async_test(async {
        let transport = ScriptedTransport::new(|_| Step::FailConnect);
        let context = RunContext::new(1);
        match detect_host(&transport, get_request(TEST_URL)?, &context).await {
            Err(AppError::Http(HttpError::ProbeSendFailed { .. })) => {}
            Err(err) => {
                return Err(AppError::validation(format!("Unexpected error: {}", err)));
            }
            Ok(()) => return Err(AppError::validation("Expected the probe to fail")),
        }
        if context.probe_facts() != crate::run::ProbeFacts::default() {
            return Err(AppError::validation("Probe facts should stay empty"));
        }
        Ok(())
    })
}
