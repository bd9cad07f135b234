use crate::config::Config;
use crate::errors::AppError;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Message prefix the provider uses to signal a valid-but-empty result set.
const NO_RESULTS_PREFIX: &str = "No result(s) found";

#[derive(Debug, Deserialize)]
struct Pagination {
    current_page: u32,
    #[serde(default)]
    has_more: bool,
}

/// Response envelope shared by every Sportmonks v3 endpoint.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    pagination: Option<Pagination>,
    #[serde(default)]
    message: Option<String>,
}

/// Client for the Sportmonks v3 API.
///
/// Owns the base URL and API token so tests can point it at a mock server.
#[derive(Clone)]
pub struct SportmonksClient {
    client: reqwest::Client,
    base_url: String,
    api_token: String,
}

impl SportmonksClient {
    /// Creates a new `SportmonksClient`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the Sportmonks API.
    /// * `api_token` - The API token for authentication.
    pub fn new(base_url: String, api_token: String) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create Sportmonks client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Self::new(config.base_url.clone(), config.api_token.clone())
    }

    /// Fetches every page of `endpoint` and returns the concatenated `data`
    /// arrays in page order.
    ///
    /// # Arguments
    ///
    /// * `endpoint` - Path segment below the base URL, e.g. `v3/football/teams`.
    /// * `params` - Query options; the API token and page cursor are appended here.
    /// * `limit` - Stop requesting further pages once this many records have
    ///   accumulated. The page in flight is never truncated, so the result may
    ///   overshoot by part of one page.
    ///
    /// A `"No result(s) found"` message from the provider is a valid empty
    /// result, not an error. Any other message is logged and processing
    /// continues; a response with neither `data` nor the sentinel is a
    /// contract violation and fails the call.
    pub async fn fetch(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
        limit: Option<usize>,
    ) -> Result<Vec<Value>, AppError> {
        let mut records: Vec<Value> = Vec::new();
        let mut page: Option<u32> = None;

        loop {
            let mut query: Vec<(&str, String)> = Vec::with_capacity(params.len() + 2);
            query.push(("api_token", self.api_token.clone()));
            for &(key, value) in params {
                query.push((key, value.to_string()));
            }
            if let Some(p) = page {
                query.push(("page", p.to_string()));
            }

            let url = reqwest::Url::parse_with_params(
                &format!("{}/{}", self.base_url, endpoint),
                &query,
            )
            .map_err(|e| AppError::ExternalApiError(format!("Failed to build URL: {}", e)))?;

            tracing::info!("Loading data from {}/{}", self.base_url, endpoint);

            let response = self.client.get(url).send().await.map_err(|e| {
                AppError::ExternalApiError(format!("Sportmonks request failed: {}", e))
            })?;

            if !response.status().is_success() {
                let status = response.status();
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                return Err(AppError::ExternalApiError(format!(
                    "Sportmonks returned {}: {}",
                    status, error_text
                )));
            }

            let envelope: Envelope = response.json().await.map_err(|e| {
                AppError::ExternalApiError(format!("Failed to parse Sportmonks response: {}", e))
            })?;

            if let Some(message) = envelope.message.as_deref().filter(|m| !m.is_empty()) {
                tracing::info!("{}", message);
                if message.starts_with(NO_RESULTS_PREFIX) {
                    return Ok(records);
                }
            }

            let data = envelope.data.ok_or_else(|| {
                AppError::ExternalApiError(format!(
                    "response from {} is missing the data field",
                    endpoint
                ))
            })?;

            match data {
                Value::Array(items) => records.extend(items),
                // Id-scoped endpoints return a bare object; treat it as a
                // one-record page so downstream processing stays uniform.
                single => records.push(single),
            }

            let has_more = envelope
                .pagination
                .as_ref()
                .map(|p| p.has_more)
                .unwrap_or(false);
            if !has_more {
                return Ok(records);
            }
            if limit.is_some_and(|limit| records.len() >= limit) {
                return Ok(records);
            }
            page = Some(envelope.pagination.map(|p| p.current_page).unwrap_or(1) + 1);
        }
    }
}
