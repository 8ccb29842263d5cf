//! HTTP transport to the relay for the terminal client

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use railchat_core::error::{ChatError, ChatResult};
use railchat_core::submit::{ChatTransport, TransportResponse};
use railchat_core::wire::ChatRequest;

pub struct ReqwestTransport {
    http: Client,
    url: String,
}

impl ReqwestTransport {
    pub fn new(url: impl Into<String>, timeout: Duration) -> ChatResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChatError::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            url: url.into(),
        })
    }
}

#[async_trait(?Send)]
impl ChatTransport for ReqwestTransport {
    async fn post_chat(&self, request: &ChatRequest) -> ChatResult<TransportResponse> {
        let response = self
            .http
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ChatError::Transport(format!("request to {} timed out", self.url))
                } else if e.is_connect() {
                    ChatError::Transport(format!("could not connect to {}", self.url))
                } else {
                    ChatError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ChatError::Transport(e.to_string()))?;

        Ok(TransportResponse::new(
            status.as_u16(),
            status.canonical_reason().unwrap_or_default(),
            body,
        ))
    }
}
