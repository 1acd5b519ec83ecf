//! Project listing and adaptive task retrieval.
//!
//! Task reads start from a candidate field list and narrow it one field at a
//! time whenever the server reports an invalid field, so that deployments
//! missing some fields still return the rest.

use serde_json::{json, Value};

use crate::error::{OdooError, Result};
use crate::fields::{classify_error, ErrorKind, FieldRequestSet, PROJECT_FIELDS};
use crate::models::{Project, Record, Task};
use crate::rpc::{execute_kw_args, Transport, OBJECT_SERVICE};
use crate::session::ConnectionContext;

pub const PROJECT_MODEL: &str = "project.project";
pub const TASK_MODEL: &str = "project.task";

const SEARCH_READ: &str = "search_read";

/// Result of an adaptive read
#[derive(Debug, Clone)]
pub struct AdaptiveRead {
    pub records: Vec<Record>,
    /// Fields requested by the successful attempt
    pub fields: Vec<String>,
    /// Fields dropped after the server rejected them, in rejection order
    pub rejected: Vec<String>,
    /// Number of requests issued
    pub attempts: usize,
}

/// Tasks of one project plus the narrowing that produced them
#[derive(Debug, Clone)]
pub struct TaskFetch {
    pub tasks: Vec<Task>,
    pub fields: Vec<String>,
    pub rejected: Vec<String>,
    pub attempts: usize,
}

async fn search_read<T: Transport>(
    transport: &T,
    ctx: &ConnectionContext,
    model: &str,
    domain: &Value,
    fields: &[String],
) -> Result<Value> {
    let args = execute_kw_args(
        ctx.database(),
        ctx.uid(),
        ctx.password(),
        model,
        SEARCH_READ,
        json!([domain, fields]),
    );

    transport
        .call(OBJECT_SERVICE, "execute_kw", args)
        .await
        .map_err(|e| OdooError::fetch_failure(model, e.to_string(), e.received_response()))
}

/// Turn a `result` member into records; anything but an array of objects is malformed.
fn records_from_result(model: &str, result: &Value, response: &Value) -> Result<Vec<Record>> {
    let items = result.as_array().ok_or_else(|| {
        OdooError::fetch_failure(model, "result is not a list of records", response.clone())
    })?;

    items
        .iter()
        .map(|item| match item {
            Value::Object(map) => Ok(map.clone()),
            _ => Err(OdooError::fetch_failure(
                model,
                "result contains a non-record entry",
                response.clone(),
            )),
        })
        .collect()
}

/// List every project with the fixed project field set.
///
/// An empty list is a valid outcome. A response without `result` is a
/// `FetchFailure` carrying the raw response.
pub async fn list_projects<T: Transport>(
    transport: &T,
    ctx: &ConnectionContext,
) -> Result<Vec<Project>> {
    let fields: Vec<String> = PROJECT_FIELDS.iter().map(|f| f.to_string()).collect();
    let response = search_read(transport, ctx, PROJECT_MODEL, &json!([]), &fields).await?;

    let Some(result) = response.get("result") else {
        tracing::error!(model = PROJECT_MODEL, "Response has no result");
        return Err(OdooError::fetch_failure(
            PROJECT_MODEL,
            "response has no result",
            response,
        ));
    };

    let records = records_from_result(PROJECT_MODEL, result, &response)?;
    let projects = records
        .into_iter()
        .map(|record| serde_json::from_value::<Project>(Value::Object(record)))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| OdooError::fetch_failure(PROJECT_MODEL, e.to_string(), response.clone()))?;

    tracing::info!(count = projects.len(), "Fetched projects");
    Ok(projects)
}

/// `search_read` that drops fields the server rejects and retries.
///
/// Each attempt requests exactly the current candidate set. On an
/// invalid-field error the named field is removed and the read is retried;
/// any other error aborts. A parsed field name that is not in the current
/// set also aborts, which bounds the loop by the number of candidates.
pub async fn search_read_adaptive<T: Transport>(
    transport: &T,
    ctx: &ConnectionContext,
    model: &str,
    domain: &Value,
    candidates: FieldRequestSet,
) -> Result<AdaptiveRead> {
    let mut fields = candidates;
    let mut rejected: Vec<String> = Vec::new();
    let mut attempts = 0;

    while !fields.is_empty() {
        attempts += 1;
        tracing::debug!(
            model,
            attempt = attempts,
            fields = ?fields.as_slice(),
            "Reading records"
        );

        let response = search_read(transport, ctx, model, domain, fields.as_slice()).await?;

        if let Some(result) = response.get("result") {
            let records = records_from_result(model, result, &response)?;
            return Ok(AdaptiveRead {
                records,
                fields: fields.as_slice().to_vec(),
                rejected,
                attempts,
            });
        }

        let Some(error) = response.get("error") else {
            return Err(OdooError::fetch_failure(
                model,
                "response has neither result nor error",
                response,
            ));
        };

        match classify_error(error) {
            ErrorKind::InvalidField(field) => {
                if !fields.remove(&field) {
                    // Repeated or drifted rejection; stop rather than loop.
                    tracing::error!(model, field = %field, "Rejected field is not in the request");
                    return Err(OdooError::fetch_failure(
                        model,
                        format!("server rejected field '{}' which was not requested", field),
                        response,
                    ));
                }
                tracing::info!(
                    model,
                    field = %field,
                    remaining = fields.len(),
                    "Invalid field detected, retrying without it"
                );
                rejected.push(field);
            },
            ErrorKind::UnrecognizedInvalidField => {
                return Err(OdooError::fetch_failure(
                    model,
                    "invalid field error without a recognizable field name",
                    response,
                ));
            },
            ErrorKind::Other => {
                tracing::error!(model, "Read failed with a non-field error");
                return Err(OdooError::fetch_failure(
                    model,
                    "server returned an error",
                    response,
                ));
            },
        }
    }

    tracing::error!(model, rejected = ?rejected, "Every requested field was rejected");
    Err(OdooError::FetchExhausted {
        model: model.to_string(),
        rejected,
    })
}

/// Fetch the tasks of `project_id`, narrowing `candidates` on invalid fields.
pub async fn fetch_tasks<T: Transport>(
    transport: &T,
    ctx: &ConnectionContext,
    project_id: i64,
    candidates: FieldRequestSet,
) -> Result<TaskFetch> {
    let domain = json!([["project_id", "=", project_id]]);
    let read = search_read_adaptive(transport, ctx, TASK_MODEL, &domain, candidates).await?;

    tracing::info!(
        project_id,
        count = read.records.len(),
        attempts = read.attempts,
        "Fetched tasks"
    );

    Ok(TaskFetch {
        tasks: read.records.into_iter().map(Task::from_record).collect(),
        fields: read.fields,
        rejected: read.rejected,
        attempts: read.attempts,
    })
}
