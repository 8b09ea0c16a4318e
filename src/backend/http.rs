use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::Url;
use serde::Serialize;
use tracing::debug;

use super::ExtractionBackend;
use crate::config::ConfigError;
use crate::models::{EventCollection, Query};
use crate::processor::{parse_response, ExtractionError};
use crate::utils;

const USER_AGENT: &str = concat!("event-scout/", env!("CARGO_PKG_VERSION"));
const MAX_ERROR_BODY_CHARS: usize = 200;

#[derive(Debug, Serialize)]
struct ExtractRequest<'a> {
    query: &'a str,
    instruction: &'a str,
}

/// Posts each query to an extraction service that answers with the
/// `{ "events": [...] }` document.
pub struct HttpBackend {
    endpoint: Url,
    client: Client,
}

impl HttpBackend {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, ConfigError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|err| ConfigError::InvalidEndpoint(format!("{endpoint}: {err}")))?;
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| ConfigError::Client(err.to_string()))?;
        Ok(Self { endpoint, client })
    }
}

impl ExtractionBackend for HttpBackend {
    fn name(&self) -> &'static str {
        "http"
    }

    fn extract(
        &self,
        query: &Query,
        instruction: &str,
    ) -> Result<EventCollection, ExtractionError> {
        let payload = ExtractRequest {
            query: query.as_str(),
            instruction,
        };
        debug!(endpoint = %self.endpoint, "sending extraction request");

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&payload)
            .send()
            .map_err(|err| ExtractionError::Unavailable(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|err| ExtractionError::Unavailable(err.to_string()))?;

        if !status.is_success() {
            return Err(ExtractionError::Unavailable(format!(
                "HTTP {}: {}",
                status,
                utils::truncate_chars(body.trim(), MAX_ERROR_BODY_CHARS)
            )));
        }

        parse_response(&body)
    }
}
