pub mod repl;
pub mod session;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use thiserror::Error;

use crate::models::api::{ ChatRequest, ChatResponse };
use crate::server::api::CHAT_ROUTE;

pub use session::ChatSession;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP error! status: {0}")]
    Status(u16),

    #[error("invalid response body: {0}")]
    Decode(String),
}

/// Carries one chat exchange to the completion proxy.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, request: &ChatRequest) -> Result<String, ClientError>;
}

pub struct HttpTransport {
    http: HttpClient,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: HttpClient::new(),
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), CHAT_ROUTE),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn send(&self, request: &ChatRequest) -> Result<String, ClientError> {
        let resp = self.http.post(&self.endpoint).json(request).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ClientError::Status(status.as_u16()));
        }
        let body = resp
            .json::<ChatResponse>().await
            .map_err(|e| ClientError::Decode(e.to_string()))?;
        Ok(body.content)
    }
}
