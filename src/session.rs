use std::fmt;

use serde_json::{json, Value};

use crate::error::{OdooError, Result};
use crate::rpc::{Transport, COMMON_SERVICE};

/// Everything a model call needs after a successful login.
///
/// Built once by [`authenticate`] and passed by reference to every fetch.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionContext {
    server: String,
    database: String,
    uid: i64,
    password: String,
}

impl ConnectionContext {
    pub fn new(server: &str, database: &str, uid: i64, password: &str) -> Self {
        Self {
            server: server.to_string(),
            database: database.to_string(),
            uid,
            password: password.to_string(),
        }
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    /// Session identifier returned by the server
    pub fn uid(&self) -> i64 {
        self.uid
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for ConnectionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionContext")
            .field("server", &self.server)
            .field("database", &self.database)
            .field("uid", &self.uid)
            .field("password", &"***")
            .finish()
    }
}

/// Credentials for a single login attempt
#[derive(Clone)]
pub struct Credentials {
    pub server: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("server", &self.server)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Exchange credentials for a session identifier.
///
/// Any failure (network, malformed body, falsy uid) is an `AuthFailure`; the
/// caller must not retry.
pub async fn authenticate<T: Transport>(
    transport: &T,
    credentials: &Credentials,
) -> Result<ConnectionContext> {
    let args = json!([
        credentials.database,
        credentials.username,
        credentials.password,
        {}
    ]);

    let response = transport
        .call(COMMON_SERVICE, "authenticate", args)
        .await
        .map_err(|e| OdooError::AuthFailure {
            reason: e.to_string(),
            response: e.received_response(),
        })?;

    match session_uid(&response) {
        Some(uid) => {
            tracing::info!(
                uid,
                database = %credentials.database,
                username = %credentials.username,
                "Authenticated"
            );
            Ok(ConnectionContext::new(
                &credentials.server,
                &credentials.database,
                uid,
                &credentials.password,
            ))
        },
        None => {
            let reason = if response.get("error").is_some() {
                "server returned an error"
            } else {
                "no session identifier returned (check database, username and password)"
            };
            tracing::error!(database = %credentials.database, reason, "Authentication failed");
            Err(OdooError::AuthFailure {
                reason: reason.to_string(),
                response,
            })
        },
    }
}

/// Extract a truthy uid from an authentication response.
fn session_uid(response: &Value) -> Option<i64> {
    match response.get("result")? {
        Value::Number(n) => n.as_i64().filter(|uid| *uid > 0),
        _ => None,
    }
}
