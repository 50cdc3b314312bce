//! Minimal JSON-RPC 2.0 client over HTTP POST.
//!
//! Both the validator endpoint and the node endpoint speak plain JSON-RPC,
//! so one client type serves both.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

const JSON_CONTENT_TYPE: &str = "application/json;charset=utf-8";

/// Errors raised while talking to a JSON-RPC endpoint
#[derive(Error, Debug)]
pub enum RpcError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to encode request: {0}")]
    Encode(serde_json::Error),

    #[error("rpc error {code}: {message}")]
    Remote { code: i64, message: String },

    #[error("response to {0} carried neither result nor error")]
    MissingResult(String),

    #[error("unexpected result for {method}: {source}")]
    Decode {
        method: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Serialize)]
struct Request<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

/// JSON-RPC client bound to a single endpoint.
#[derive(Clone, Debug)]
pub struct RpcClient {
    url: String,
    client: reqwest::Client,
    next_id: Arc<AtomicU64>,
}

impl RpcClient {
    /// Create a client for `url` with a per-request timeout.
    pub fn new(url: &str, timeout: Duration) -> Result<Self, RpcError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            client,
            next_id: Arc::new(AtomicU64::new(1)),
        })
    }

    /// Endpoint URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Call `method` and return the raw `result` value (which may be `null`).
    pub async fn call_raw(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let request = Request {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        let body = serde_json::to_vec(&request).map_err(RpcError::Encode)?;
        tracing::trace!("rpc -> {} {}", self.url, method);

        let response: Value = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        parse_response(method, response)
    }

    /// Call `method` and deserialize its `result`.
    pub async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, RpcError> {
        let value = self.call_raw(method, params).await?;
        serde_json::from_value(value).map_err(|source| RpcError::Decode {
            method: method.to_string(),
            source,
        })
    }
}

/// Split a response envelope into its result or error object.
fn parse_response(method: &str, mut response: Value) -> Result<Value, RpcError> {
    if let Some(error) = response.get("error").filter(|e| !e.is_null()) {
        let code = error.get("code").and_then(Value::as_i64).unwrap_or_default();
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string();
        return Err(RpcError::Remote { code, message });
    }
    match response.get_mut("result") {
        Some(result) => Ok(result.take()),
        None => Err(RpcError::MissingResult(method.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn result_is_extracted() {
        let body = json!({"jsonrpc": "2.0", "id": 1, "result": "Ok: looks fine"});
        let value = parse_response("validate_domain", body).unwrap();
        assert_eq!(value, json!("Ok: looks fine"));
    }

    #[test]
    fn null_result_is_kept() {
        let body = json!({"jsonrpc": "2.0", "id": 7, "result": null});
        assert_eq!(parse_response("state_getStorage", body).unwrap(), Value::Null);
    }

    #[test]
    fn error_object_becomes_remote_error() {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": {"code": -32601, "message": "Method not found"}
        });
        match parse_response("validate_email", body) {
            Err(RpcError::Remote { code, message }) => {
                assert_eq!(code, -32601);
                assert_eq!(message, "Method not found");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn missing_result_is_reported() {
        let body = json!({"jsonrpc": "2.0", "id": 1});
        assert!(matches!(
            parse_response("system_name", body),
            Err(RpcError::MissingResult(m)) if m == "system_name"
        ));
    }
}
