use std::time::Duration;

use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION},
    Method, StatusCode,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, warn};

use shared_config::AppConfig;

use crate::error::StoreError;

const RETRY_BASE_DELAY_MS: u64 = 100;
const RETRY_MAX_DELAY_MS: u64 = 5_000;
const UNIQUE_VIOLATION: &str = "23505";
const RETURN_REPRESENTATION: &str = "return=representation";
const MERGE_DUPLICATES: &str = "resolution=merge-duplicates,return=representation";

/// Thin PostgREST client. Every request is bounded by the configured timeout;
/// retryable requests are retried on transient failures with exponential backoff.
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: String,
    max_retries: u32,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.store_timeout_secs))
            .build()
            .map_err(|e| StoreError::Unavailable(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            anon_key: config.supabase_anon_key.clone(),
            max_retries: config.store_max_retries,
        })
    }

    fn get_headers(&self, prefer: &'static str) -> Result<HeaderMap, StoreError> {
        let mut headers = HeaderMap::new();

        let key = HeaderValue::from_str(&self.anon_key)
            .map_err(|_| StoreError::Unavailable("Invalid Supabase key".to_string()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.anon_key))
            .map_err(|_| StoreError::Unavailable("Invalid Supabase key".to_string()))?;

        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("Prefer", HeaderValue::from_static(prefer));

        Ok(headers)
    }

    /// Issue a request against `path`. Non-POST requests are treated as idempotent
    /// and retried; inserts are sent once because a timed-out insert may have committed.
    pub async fn request<T>(&self, method: Method, path: &str, body: Option<Value>) -> Result<T, StoreError>
    where T: DeserializeOwned {
        let retryable = method != Method::POST;
        self.send(method, path, body, retryable, RETURN_REPRESENTATION).await
    }

    /// Insert or merge on the `on_conflict` columns. Safe to retry: a replayed
    /// upsert lands on the same row.
    pub async fn upsert<T>(&self, path: &str, on_conflict: &str, body: Value) -> Result<T, StoreError>
    where T: DeserializeOwned {
        let path = format!("{}?on_conflict={}", path, on_conflict);
        self.send(Method::POST, &path, Some(body), true, MERGE_DUPLICATES).await
    }

    /// Call a read-only SQL function exposed through `/rest/v1/rpc`.
    pub async fn rpc<T>(&self, function: &str, args: Value) -> Result<T, StoreError>
    where T: DeserializeOwned {
        let path = format!("/rest/v1/rpc/{}", function);
        self.send(Method::POST, &path, Some(args), true, RETURN_REPRESENTATION).await
    }

    async fn send<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        retryable: bool,
        prefer: &'static str,
    ) -> Result<T, StoreError>
    where T: DeserializeOwned {
        let attempts = if retryable { self.max_retries + 1 } else { 1 };
        let mut last_error = StoreError::Unavailable("No attempt made".to_string());

        for attempt in 0..attempts {
            if attempt > 0 {
                let delay = retry_delay_ms(attempt);
                warn!("Retrying {} {} in {}ms (attempt {}/{})", method, path, delay, attempt + 1, attempts);
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }

            match self.send_once(method.clone(), path, body.as_ref(), prefer).await {
                Ok(data) => return Ok(data),
                Err(e) if e.is_transient() => last_error = e,
                Err(e) => return Err(e),
            }
        }

        error!("Store request {} {} failed after {} attempt(s): {}", method, path, attempts, last_error);
        Err(last_error)
    }

    async fn send_once<T>(&self, method: Method, path: &str, body: Option<&Value>, prefer: &'static str) -> Result<T, StoreError>
    where T: DeserializeOwned {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making request to {}", url);

        let mut req = self.client.request(method, &url)
            .headers(self.get_headers(prefer)?);

        if let Some(body_data) = body {
            req = req.json(body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(classify_failure(status, &text));
        }

        let payload = if text.trim().is_empty() { "[]" } else { text.as_str() };
        Ok(serde_json::from_str(payload)?)
    }

    pub fn get_base_url(&self) -> &str {
        &self.base_url
    }
}

/// Exponential backoff before retry number `attempt` (1-based), capped.
fn retry_delay_ms(attempt: u32) -> u64 {
    2u64.checked_pow(attempt.saturating_sub(1))
        .and_then(|factor| RETRY_BASE_DELAY_MS.checked_mul(factor))
        .map_or(RETRY_MAX_DELAY_MS, |delay| delay.min(RETRY_MAX_DELAY_MS))
}

fn classify_failure(status: StatusCode, body: &str) -> StoreError {
    let code = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("code").and_then(Value::as_str).map(str::to_string));

    if status == StatusCode::CONFLICT || code.as_deref() == Some(UNIQUE_VIOLATION) {
        return StoreError::Conflict(body.to_string());
    }

    if status.is_server_error() || status == StatusCode::REQUEST_TIMEOUT || status == StatusCode::TOO_MANY_REQUESTS {
        error!("API error ({}): {}", status, body);
        return StoreError::Unavailable(format!("API error ({}): {}", status, body));
    }

    match status {
        StatusCode::NOT_FOUND => StoreError::NotFound(body.to_string()),
        _ => {
            warn!("API rejected request ({}): {}", status, body);
            StoreError::Rejected { status: status.as_u16(), message: body.to_string() }
        }
    }
}
