//! Relay client for delivering payload records to the payload logging service
//!
//! The middleware only depends on the [`RelayClient`] trait. Delivery never
//! fails loudly: the outcome is a value the caller branches on.

use async_trait::async_trait;
use reqwest::Client;

use crate::config::Config;
use crate::error::PayloadLogError;
use crate::record::PayloadRecord;

/// Result of one relay attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayOutcome {
    pub is_successful: bool,
    /// Response text on success, failure detail otherwise
    pub content: String,
}

impl RelayOutcome {
    pub fn success(content: impl Into<String>) -> Self {
        Self {
            is_successful: true,
            content: content.into(),
        }
    }

    pub fn failure(content: impl Into<String>) -> Self {
        Self {
            is_successful: false,
            content: content.into(),
        }
    }
}

/// Delivers payload records to a remote service
#[async_trait]
pub trait RelayClient: Send + Sync {
    /// Post `record` to `method_name` on `remote_host`
    async fn post(&self, remote_host: &str, method_name: &str, record: &PayloadRecord)
        -> RelayOutcome;
}

/// [`RelayClient`] speaking JSON over HTTP
///
/// Each record is sent as `POST {remote_host}/{method_name}`. The underlying
/// connection pool is shared by all exchanges.
#[derive(Debug, Clone)]
pub struct HttpRelayClient {
    client: Client,
    api_key: Option<String>,
}

impl HttpRelayClient {
    pub fn new(config: &Config) -> Result<Self, PayloadLogError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(PayloadLogError::ClientInit)?;
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
        })
    }

    async fn send(
        &self,
        remote_host: &str,
        method_name: &str,
        record: &PayloadRecord,
    ) -> Result<String, PayloadLogError> {
        let body = serde_json::to_string(record)?;

        let mut request = self
            .client
            .post(endpoint(remote_host, method_name))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await?;
        let status = response.status();
        let content = response.text().await?;

        if !status.is_success() {
            return Err(PayloadLogError::SendFailed { status, content });
        }

        Ok(content)
    }
}

#[async_trait]
impl RelayClient for HttpRelayClient {
    async fn post(
        &self,
        remote_host: &str,
        method_name: &str,
        record: &PayloadRecord,
    ) -> RelayOutcome {
        match self.send(remote_host, method_name, record).await {
            Ok(content) => RelayOutcome::success(content),
            Err(err) => RelayOutcome::failure(err.to_string()),
        }
    }
}

fn endpoint(remote_host: &str, method_name: &str) -> String {
    format!(
        "{}/{}",
        remote_host.trim_end_matches('/'),
        method_name.trim_start_matches('/')
    )
}
