//! Common utilities for integration tests
//!
//! A wiremock-backed fake Odoo server plus a pre-isolated `odx` command.

#![allow(dead_code)] // Not every test file uses every helper

use assert_cmd::Command;
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

/// Create a Command for `odx` with connection env vars cleared
pub fn odx_command() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_odx"));
    for var in ["ODX_URL", "ODX_DB", "ODX_USER", "ODX_PASSWORD", "ODX_TIMEOUT", "RUST_LOG"] {
        cmd.env_remove(var);
    }
    cmd
}

/// `odx` pointed at `server` with full credentials
pub fn odx_against(server: &MockServer, database: &str) -> Command {
    let mut cmd = odx_command();
    cmd.args([
        "--url",
        &server.uri(),
        "--db",
        database,
        "--user",
        "admin",
        "--password",
        "admin",
    ]);
    cmd
}

/// Matches `search_read` calls whose field list contains `0`
pub struct RequestsField(pub &'static str);

impl Match for RequestsField {
    fn matches(&self, request: &Request) -> bool {
        requested_fields(request).iter().any(|f| f == self.0)
    }
}

/// Matches `execute_kw` calls on the given model
pub struct OnModel(pub &'static str);

impl Match for OnModel {
    fn matches(&self, request: &Request) -> bool {
        body(request)
            .and_then(|b| b.pointer("/params/args/3").cloned())
            .and_then(|m| m.as_str().map(|s| s == self.0))
            .unwrap_or(false)
    }
}

pub fn body(request: &Request) -> Option<Value> {
    serde_json::from_slice(&request.body).ok()
}

/// Field list of a `search_read` request body
pub fn requested_fields(request: &Request) -> Vec<String> {
    body(request)
        .and_then(|b| b.pointer("/params/args/5/1").cloned())
        .and_then(|f| f.as_array().cloned())
        .map(|fields| {
            fields
                .iter()
                .filter_map(|f| f.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

pub fn rpc_result(result: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"jsonrpc": "2.0", "id": 1, "result": result}))
}

pub fn invalid_field(field: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": 3,
        "error": {
            "code": 200,
            "message": "Odoo Server Error",
            "data": {
                "name": "builtins.ValueError",
                "message": format!("Invalid field '{}' on model 'project.task'", field)
            }
        }
    }))
}

pub fn access_denied() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": 3,
        "error": {
            "code": 200,
            "message": "Odoo Server Error",
            "data": {
                "name": "odoo.exceptions.AccessError",
                "message": "You are not allowed to access 'Task' (project.task) records."
            }
        }
    }))
}

/// Mount an authentication endpoint returning `uid` (`false` for bad credentials)
pub async fn mount_auth(server: &MockServer, uid: Value) {
    Mock::given(method("POST"))
        .and(path("/jsonrpc"))
        .and(body_partial_json(json!({"params": {"service": "common", "method": "authenticate"}})))
        .respond_with(rpc_result(uid))
        .mount(server)
        .await;
}

/// Requests the server received for the object service, in order
pub async fn object_calls(server: &MockServer) -> Vec<Request> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| {
            body(r)
                .and_then(|b| b.pointer("/params/service").cloned())
                .map(|s| s == "object")
                .unwrap_or(false)
        })
        .collect()
}
