//! Field request sets and invalid-field detection.
//!
//! The server does not advertise its schema, so an unknown field is only
//! discovered through the error message of a failed read. Parsing that
//! free-text message is confined to [`parse_invalid_field`].

use serde_json::Value;

/// Marker the server puts in the error payload when a field does not exist
pub const INVALID_FIELD_MARKER: &str = "Invalid field";

/// Fields requested from `project.task` by default
pub const DEFAULT_TASK_FIELDS: &[&str] = &[
    "id",
    "name",
    "stage_id",
    "priority",
    "tag_ids",
    "create_uid",
    "child_ids",
    "project_id",
    "user_ids",
    "date_deadline",
    "create_date",
];

/// Fields requested from `project.project`
pub const PROJECT_FIELDS: &[&str] = &["id", "name", "user_id", "company_id", "create_date", "active"];

/// Ordered set of field names sent with a read request.
///
/// Only ever shrinks: there is no way to add a field after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRequestSet {
    fields: Vec<String>,
}

impl FieldRequestSet {
    /// Build from candidates, keeping the first occurrence of duplicates
    pub fn new<I, S>(candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut fields: Vec<String> = Vec::new();
        for candidate in candidates {
            let candidate = candidate.into();
            if !fields.contains(&candidate) {
                fields.push(candidate);
            }
        }
        Self { fields }
    }

    pub fn default_task_fields() -> Self {
        Self::new(DEFAULT_TASK_FIELDS.iter().copied())
    }

    pub fn as_slice(&self) -> &[String] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }

    /// Remove `field`; returns false if it was not present.
    pub fn remove(&mut self, field: &str) -> bool {
        match self.fields.iter().position(|f| f == field) {
            Some(index) => {
                self.fields.remove(index);
                true
            },
            None => false,
        }
    }
}

/// Outcome of inspecting a read error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The server rejected this field name
    InvalidField(String),
    /// The invalid-field marker is present but no field name could be parsed
    UnrecognizedInvalidField,
    /// Any other error (permissions, malformed domain, ...)
    Other,
}

/// Classify the `error` member of a failed response.
pub fn classify_error(error: &Value) -> ErrorKind {
    if !error.to_string().contains(INVALID_FIELD_MARKER) {
        return ErrorKind::Other;
    }

    match error_message(error).and_then(parse_invalid_field) {
        Some(field) => ErrorKind::InvalidField(field),
        None => ErrorKind::UnrecognizedInvalidField,
    }
}

/// Message text carrying the field name: the first of `data.message` and
/// `message` that mentions the marker.
fn error_message(error: &Value) -> Option<&str> {
    [error.pointer("/data/message"), error.get("message")]
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .find(|message| message.contains(INVALID_FIELD_MARKER))
}

/// Extract the rejected field name from an invalid-field message.
///
/// The name is the text between the first pair of single quotes, e.g.
/// `Invalid field 'ghost_field' on model 'project.task'` yields `ghost_field`.
/// Returns `None` when the message does not have that shape.
pub fn parse_invalid_field(message: &str) -> Option<String> {
    if !message.contains(INVALID_FIELD_MARKER) {
        return None;
    }

    let mut parts = message.split('\'');
    parts.next()?;
    let field = parts.next()?;
    // An unterminated quote has no closing segment
    parts.next()?;

    let field = field.trim();
    if field.is_empty() {
        None
    } else {
        Some(field.to_string())
    }
}
