use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

pub const SLACK_API_BASE: &str = "https://slack.com/api";

#[derive(Error, Debug)]
pub enum SlackError {
    /// The body parsed but `ok` was missing or false
    #[error("{0}")]
    Api(String),

    #[error("HTTP {status}")]
    Status { status: u16 },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("invalid response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

pub type Result<T> = std::result::Result<T, SlackError>;

/// Thin wrapper over the Slack Web API.
///
/// Every call is a single GET attempt: no retries, no backoff. Whatever the
/// endpoint, success means the body says `"ok": true`.
pub struct SlackClient {
    client: reqwest::Client,
    base_url: String,
}

impl SlackClient {
    /// Point the client somewhere else (proxies, enterprise grid, tests)
    pub fn with_base_url(base_url: String, timeout: Duration) -> Result<Self> {
        Self::build(base_url, timeout, concat!("unreadbar/", env!("CARGO_PKG_VERSION")))
    }

    pub fn build(base_url: String, timeout: Duration, user_agent: &str) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        let agent = reqwest::header::HeaderValue::from_str(user_agent)
            .map_err(|e| SlackError::Client(e.to_string()))?;
        headers.insert(reqwest::header::USER_AGENT, agent);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| SlackError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Call `method` (e.g. `team.info`) with query parameters
    ///
    /// Returns the whole response body when `ok` is true.
    pub async fn request(&self, method: &str, token: &str, params: &[(&str, String)]) -> Result<Value> {
        let url = format!("{}/{}", self.base_url, method);
        debug!("GET /{} {:?}", method, param_names(params));

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(params)
            .send()
            .await
            .map_err(|e| {
                warn!("/{} failed: {}", method, e);
                SlackError::Network(e)
            })?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        interpret_body(status, &body).map_err(|e| {
            warn!("/{} failed: {}", method, e);
            e
        })
    }
}

/// Decide whether a response counts as success
///
/// An unreadable body on a non-2xx status reports the status; an unreadable
/// body on a 2xx is a parse failure. A readable body is judged only by `ok`.
pub fn interpret_body(status: u16, body: &str) -> Result<Value> {
    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) if !(200..300).contains(&status) => return Err(SlackError::Status { status }),
        Err(e) => return Err(SlackError::Parse(e)),
    };

    if value.get("ok").and_then(Value::as_bool) == Some(true) {
        return Ok(value);
    }

    let detail = value
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("request failed")
        .to_string();
    Err(SlackError::Api(detail))
}

// Parameter values can be ids we'd rather not spray into logs at debug level
fn param_names<'a>(params: &'a [(&'a str, String)]) -> Vec<&'a str> {
    params.iter().map(|(name, _)| *name).collect()
}
