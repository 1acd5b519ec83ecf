use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OdooError {
    #[error("Authentication failed: {reason}")]
    AuthFailure { reason: String, response: Value },

    #[error("Failed to fetch {model}: {reason}")]
    FetchFailure {
        model: String,
        reason: String,
        response: Value,
    },

    #[error("Failed to fetch {model}: every requested field was rejected ({})", .rejected.join(", "))]
    FetchExhausted { model: String, rejected: Vec<String> },

    #[error("Malformed response (HTTP {status}): {reason}")]
    MalformedResponse {
        status: u16,
        reason: String,
        body: String,
    },

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Prompt cancelled: {0}")]
    Prompt(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
}

impl OdooError {
    pub fn fetch_failure(model: &str, reason: impl Into<String>, response: Value) -> Self {
        OdooError::FetchFailure {
            model: model.to_string(),
            reason: reason.into(),
            response,
        }
    }

    pub fn to_error_code(&self) -> &'static str {
        match self {
            OdooError::AuthFailure { .. } => "AUTH_FAILURE",
            OdooError::FetchFailure { .. } => "FETCH_FAILURE",
            OdooError::FetchExhausted { .. } => "FETCH_EXHAUSTED",
            OdooError::MalformedResponse { .. } => "MALFORMED_RESPONSE",
            OdooError::MalformedInput(_) => "MALFORMED_INPUT",
            OdooError::InvalidInput(_) | OdooError::Prompt(_) => "INVALID_INPUT",
            _ => "INTERNAL_ERROR",
        }
    }

    /// Raw server response attached to the failure, if one was received.
    pub fn raw_response(&self) -> Option<&Value> {
        match self {
            OdooError::AuthFailure { response, .. } | OdooError::FetchFailure { response, .. }
                if !response.is_null() =>
            {
                Some(response)
            },
            _ => None,
        }
    }

    /// What the server sent back when a transport call failed: the undecodable
    /// body and its status for a malformed response, null if nothing arrived.
    pub fn received_response(&self) -> Value {
        match self {
            OdooError::MalformedResponse { status, body, .. } => {
                json!({"status": status, "body": body})
            },
            _ => Value::Null,
        }
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.to_string(),
            code: self.to_error_code().to_string(),
            response: self.raw_response().cloned(),
        }
    }
}

pub type Result<T> = std::result::Result<T, OdooError>;
