//! JSON-RPC 2.0 transport shared by the EVM and Solana clients.
//!
//! Both chains (and the EVM wallet provider) speak the same envelope, so the
//! clients only see [`JsonRpc`]: a method name and params in, a `result`
//! value or an [`RpcError`] out.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;

/// A failed JSON-RPC exchange.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RpcError {
    /// The endpoint answered with an `error` object. The message is the
    /// node's own text.
    #[error("RPC error {code}: {message}")]
    Server {
        code: i64,
        message: String,
        data: Option<Value>,
    },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Malformed RPC response: {0}")]
    InvalidResponse(String),
}

impl RpcError {
    /// The JSON-RPC error code, when the endpoint returned one.
    pub fn code(&self) -> Option<i64> {
        match self {
            RpcError::Server { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Anything that can answer JSON-RPC requests.
#[async_trait]
pub trait JsonRpc: Send + Sync {
    /// Endpoint URL, for logging.
    fn endpoint(&self) -> &str;

    /// Send one request and return its `result` member.
    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError>;
}

/// Deserialize a `result` value into a typed response.
pub fn decode_result<T: DeserializeOwned>(method: &str, value: Value) -> Result<T, RpcError> {
    serde_json::from_value(value)
        .map_err(|e| RpcError::InvalidResponse(format!("{method}: {e}")))
}

/// [`JsonRpc`] over HTTP(S) POST.
pub struct HttpJsonRpc {
    url: String,
    client: Client,
    next_id: AtomicU64,
}

impl HttpJsonRpc {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, RpcError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RpcError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            url: url.into(),
            client,
            next_id: AtomicU64::new(1),
        })
    }

    /// Split a response envelope into its `result` or `error` member.
    pub fn parse_response(body: Value) -> Result<Value, RpcError> {
        if let Some(error) = body.get("error").filter(|e| !e.is_null()) {
            let code = error.get("code").and_then(Value::as_i64).unwrap_or(0);
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            return Err(RpcError::Server {
                code,
                message,
                data: error.get("data").cloned(),
            });
        }
        match body {
            Value::Object(mut map) => map
                .remove("result")
                .ok_or_else(|| RpcError::InvalidResponse("missing result".into())),
            other => Err(RpcError::InvalidResponse(format!(
                "expected an object, got {other}"
            ))),
        }
    }
}

#[async_trait]
impl JsonRpc for HttpJsonRpc {
    fn endpoint(&self) -> &str {
        &self.url
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let payload = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        debug!(url = %self.url, method, id, "rpc request");

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| RpcError::Transport(e.to_string()))?;

        let status = response.status();
        let body: Value = response.json().await.map_err(|e| {
            RpcError::InvalidResponse(format!("{method} (HTTP {status}): {e}"))
        })?;
        Self::parse_response(body)
    }
}
