use async_trait::async_trait;
use reqwest::{Client, Request, Response};

use crate::error::SendError;

/// Sends one prepared request and yields the response head.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: Request) -> Result<Response, SendError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: Request) -> Result<Response, SendError> {
        Ok(self.client.execute(request).await?)
    }
}
