//! JSON-RPC transport for the Odoo `/jsonrpc` endpoint.
//!
//! Every call is wrapped in the `call` envelope with a `service`/`method`/`args`
//! triple. The transport hands back the raw response document; interpreting
//! `result` and `error` is left to the caller.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;
use serde_json::{json, Value};

use crate::error::{OdooError, Result};

/// Authentication service name
pub const COMMON_SERVICE: &str = "common";
/// Generic model call service name
pub const OBJECT_SERVICE: &str = "object";

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'static str,
    params: RpcParams<'a>,
    id: u64,
}

#[derive(Debug, Serialize)]
struct RpcParams<'a> {
    service: &'a str,
    method: &'a str,
    args: &'a Value,
}

/// A single blocking-in-sequence request/response exchange with the server.
pub trait Transport: Send + Sync {
    /// Issue one call and return the raw response document.
    fn call(
        &self,
        service: &str,
        method: &str,
        args: Value,
    ) -> impl Future<Output = Result<Value>> + Send;
}

/// Build the positional arguments of an `execute_kw` call.
pub fn execute_kw_args(
    database: &str,
    uid: i64,
    password: &str,
    model: &str,
    method: &str,
    method_args: Value,
) -> Value {
    json!([database, uid, password, model, method, method_args])
}

/// reqwest-backed transport posting to `<server>/jsonrpc`
pub struct HttpTransport {
    endpoint: String,
    client: reqwest::Client,
    next_id: AtomicU64,
}

impl HttpTransport {
    pub fn new(server: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            endpoint: format!("{}/jsonrpc", server.trim_end_matches('/')),
            client,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Transport for HttpTransport {
    async fn call(&self, service: &str, method: &str, args: Value) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = RpcRequest {
            jsonrpc: "2.0",
            method: "call",
            params: RpcParams {
                service,
                method,
                args: &args,
            },
            id,
        };

        tracing::debug!(
            endpoint = %self.endpoint,
            service,
            method,
            request_id = id,
            "Sending JSON-RPC call"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = %status, "JSON-RPC endpoint returned non-success status");
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(status = %status, error = %e, "JSON-RPC response is not JSON");
            OdooError::MalformedResponse {
                status: status.as_u16(),
                reason: e.to_string(),
                body,
            }
        })
    }
}
