use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use tracing::debug;

use crate::error::Result;
use crate::providers::ProviderError;

const USER_AGENT: &str = concat!("maat/", env!("CARGO_PKG_VERSION"));

/// Shared outbound HTTP client.
///
/// Every request carries the configured timeout; a single attempt is made
/// per call.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    pub fn get(&self, url: &str) -> RequestBuilder {
        self.client.get(url).header(ACCEPT, "application/json")
    }

    /// Send `request` and decode the body as JSON.
    ///
    /// Non-success statuses, transport failures and undecodable bodies are
    /// reported as distinct [`ProviderError`] variants so callers can tell
    /// timeouts apart from everything else.
    pub async fn send_json(
        &self,
        service: &'static str,
        request: RequestBuilder,
    ) -> std::result::Result<Value, ProviderError> {
        let response = request
            .send()
            .await
            .map_err(|err| classify(service, err))?;

        let status = response.status();
        debug!(service, status = status.as_u16(), "provider responded");
        if !status.is_success() {
            return Err(ProviderError::Status {
                service,
                status: status.as_u16(),
            });
        }

        response.json::<Value>().await.map_err(|err| {
            if err.is_timeout() {
                ProviderError::Timeout { service }
            } else {
                ProviderError::Contract {
                    service,
                    message: format!("body is not valid JSON: {}", err),
                }
            }
        })
    }
}

fn classify(service: &'static str, err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout { service }
    } else {
        ProviderError::Transport {
            service,
            message: err.to_string(),
        }
    }
}
