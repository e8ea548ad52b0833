//! HTTP detail lookup.
//!
//! Fetches `GET {base_url}/{row_type}/{id}` and returns the JSON body as the
//! detail object. The id is read from the row field configured for the row
//! type. Transient failures are retried with exponential backoff.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::error::{LookupError, Result};
use super::DetailLookup;
use crate::config::LookupConfig;
use crate::table::{display_value, RowRecord};

/// Maximum number of attempts for transient failures.
const MAX_RETRIES: u32 = 3;

/// Base delay between retries in milliseconds.
const RETRY_DELAY_MS: u64 = 500;

/// Detail lookup backed by a REST service.
#[derive(Debug, Clone)]
pub struct HttpDetailLookup {
    client: Client,
    base_url: String,
    config: LookupConfig,
}

impl HttpDetailLookup {
    /// Build a lookup against `base_url`.
    pub fn new(base_url: &str, config: LookupConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(LookupError::Network)?;

        Ok(Self {
            client,
            base_url: normalize_base_url(base_url),
            config,
        })
    }

    /// Build a lookup from settings, or `None` when no base URL is set.
    pub fn from_config(config: &LookupConfig) -> Option<Result<Self>> {
        config
            .base_url
            .as_deref()
            .map(|url| Self::new(url, config.clone()))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of the detail for a row.
    pub fn detail_url<R: RowRecord>(&self, row: &R, row_type: &str) -> Result<String> {
        let field = self.config.id_field(row_type);
        let id = row
            .field(field)
            .filter(|value| !value.is_null())
            .map(display_value)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| LookupError::MissingId {
                row_type: row_type.to_string(),
                field: field.to_string(),
            })?;
        Ok(format!("{}/{}/{}", self.base_url, row_type, id))
    }

    #[instrument(skip(self), fields(url = %url))]
    async fn get(&self, url: &str) -> Result<Value> {
        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.execute_get(url).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempts < MAX_RETRIES => {
                    let delay = retry_delay(attempts);
                    warn!(
                        "Detail request failed (attempt {}), retrying in {}ms: {}",
                        attempts, delay, e
                    );
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn execute_get(&self, url: &str) -> Result<Value> {
        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;
        handle_response(response).await
    }
}

#[async_trait]
impl<R> DetailLookup<R> for HttpDetailLookup
where
    R: RowRecord + Sync,
{
    type Detail = Value;

    async fn lookup_detail(&self, row: &R, row_type: &str) -> Result<Value> {
        let url = self.detail_url(row, row_type)?;
        debug!(row_type, url = %url, "Fetching detail");
        self.get(&url).await
    }
}

async fn handle_response(response: Response) -> Result<Value> {
    let status = response.status();
    let url = response.url().to_string();

    if status.is_success() {
        response
            .json::<Value>()
            .await
            .map_err(|e| LookupError::InvalidResponse(format!("Failed to parse response: {}", e)))
    } else {
        let body = response.text().await.unwrap_or_default();
        debug!("Error response body: {}", body);
        Err(error_from_response(status, &url, &body))
    }
}

/// Map an error response, preferring a `message` or `error` field in the body.
fn error_from_response(status: StatusCode, url: &str, body: &str) -> LookupError {
    let context = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| {
            ["message", "error"]
                .iter()
                .find_map(|key| json.get(*key).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| url.to_string());
    LookupError::from_status(status, &context)
}

fn retry_delay(attempt: u32) -> u64 {
    RETRY_DELAY_MS * 2u64.pow(attempt - 1)
}

fn normalize_base_url(url: &str) -> String {
    let url = url.trim_end_matches('/');
    if !url.starts_with("https://") && !url.contains("localhost") {
        warn!("Detail service URL does not use HTTPS: {}", url);
    }
    url.to_string()
}
