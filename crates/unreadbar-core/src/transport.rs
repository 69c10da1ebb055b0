use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use unreadbar_api::{SlackClient, SlackError};

/// Query parameters for one call
pub type Params = Vec<(&'static str, String)>;

/// Anything that can answer a Slack Web API call
///
/// `SlackClient` is the real thing; tests plug in mocks so the whole pipeline
/// runs without a network.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SlackTransport: Send + Sync {
    async fn call(&self, method: &str, token: &str, params: Params) -> Result<Value, SlackError>;
}

#[async_trait]
impl SlackTransport for SlackClient {
    async fn call(&self, method: &str, token: &str, params: Params) -> Result<Value, SlackError> {
        self.request(method, token, &params).await
    }
}

/// Run-scoped, append-only list of request failures
///
/// Cloning hands out another handle to the same list, so concurrent fetches
/// can all write to it.
#[derive(Debug, Clone, Default)]
pub struct ErrorLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl ErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        // A poisoned lock only means another writer panicked mid-push
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Transport plus error log: a failed call is logged and comes back as `None`
#[derive(Clone)]
pub struct Requester {
    transport: Arc<dyn SlackTransport>,
    errors: ErrorLog,
}

impl Requester {
    pub fn new(transport: Arc<dyn SlackTransport>, errors: ErrorLog) -> Self {
        Self { transport, errors }
    }

    pub fn errors(&self) -> &ErrorLog {
        &self.errors
    }

    /// One attempt at `method`; failures land in the error log as `method: detail`
    pub async fn request(&self, method: &str, token: &str, params: Params) -> Option<Value> {
        let channel = params
            .iter()
            .find(|(name, _)| *name == "channel")
            .map(|(_, id)| id.clone());

        match self.transport.call(method, token, params).await {
            Ok(body) => Some(body),
            Err(e) => {
                match channel {
                    Some(id) => warn!("/{} ({}) failed: {}", method, id, e),
                    None => warn!("/{} failed: {}", method, e),
                }
                self.errors.push(format!("{}: {}", method, e));
                None
            }
        }
    }

    /// Like `request`, then decode `body[field]` into `T`
    ///
    /// An ok response without a usable `field` is logged like any other failure.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        method: &str,
        token: &str,
        params: Params,
        field: &str,
    ) -> Option<T> {
        let mut body = self.request(method, token, params).await?;
        match decode_field(&mut body, field) {
            Ok(value) => Some(value),
            Err(detail) => {
                debug!("/{} returned an unusable {}: {}", method, field, detail);
                self.errors.push(format!("{}: {}", method, detail));
                None
            }
        }
    }
}

/// Pull `field` out of a response body and decode it
pub(crate) fn decode_field<T: DeserializeOwned>(body: &mut Value, field: &str) -> Result<T, String> {
    let value = body
        .get_mut(field)
        .map(Value::take)
        .filter(|v| !v.is_null())
        .ok_or_else(|| format!("missing {}", field))?;

    serde_json::from_value(value).map_err(|e| format!("invalid {}: {}", field, e))
}
