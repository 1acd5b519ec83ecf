use std::path::{Path, PathBuf};

use crate::cli::ConnectionArgs;
use crate::config::ConnectionConfig;
use crate::error::{OdooError, Result};
use crate::export::{export_records, tasks_file_name, ExportOutcome, PROJECTS_FILE};
use crate::fetch::{fetch_tasks, list_projects};
use crate::filter::TaskFilter;
use crate::models::{Project, Record};
use crate::rpc::{HttpTransport, Transport};
use crate::session::{authenticate, ConnectionContext};

use super::utils::{render_projects, render_tasks, task_candidates};

/// What to fetch and how to present it for `odx tasks`
#[derive(Debug, Clone, Default)]
pub struct TaskQuery {
    pub project_id: i64,
    pub fields: Option<Vec<String>>,
    pub filter: TaskFilter,
    pub format: String,
    pub export: Option<Option<PathBuf>>,
}

/// Resolve settings, build the HTTP transport and log in.
pub async fn connect(args: &ConnectionArgs) -> Result<(HttpTransport, ConnectionContext)> {
    let config = ConnectionConfig::resolve_interactive(args)?;
    let transport = HttpTransport::new(&config.credentials.server, config.timeout)?;
    let ctx = authenticate(&transport, &config.credentials).await?;
    Ok((transport, ctx))
}

/// Print diagnostics for a failed fetch on stderr
pub fn report_failure(err: &OdooError) {
    eprintln!("✗ {}", err);
    if let Some(response) = err.raw_response() {
        if let Ok(pretty) = serde_json::to_string_pretty(response) {
            eprintln!("{}", pretty);
        }
    }
}

/// List projects; a failed listing is reported and treated as empty.
pub async fn load_projects<T: Transport>(transport: &T, ctx: &ConnectionContext) -> Vec<Project> {
    match list_projects(transport, ctx).await {
        Ok(projects) => projects,
        Err(e) => {
            tracing::error!(error = %e, "Project listing failed");
            report_failure(&e);
            Vec::new()
        },
    }
}

fn print_export_outcome(outcome: &ExportOutcome) {
    match outcome {
        ExportOutcome::Written { path, rows } => {
            eprintln!("✓ Exported {} rows to {}", rows, path.display());
        },
        ExportOutcome::NothingToExport => {
            eprintln!("⚠ Nothing to export");
        },
    }
}

fn export_path(requested: Option<&Path>, default: PathBuf) -> PathBuf {
    requested.map(Path::to_path_buf).unwrap_or(default)
}

pub fn handle_login(ctx: &ConnectionContext, format: &str) -> Result<()> {
    if format == "json" {
        let response = serde_json::json!({
            "server": ctx.server(),
            "database": ctx.database(),
            "uid": ctx.uid(),
        });
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        println!("✓ Authenticated on {} ({}), uid = {}", ctx.server(), ctx.database(), ctx.uid());
    }
    Ok(())
}

pub async fn handle_projects<T: Transport>(
    transport: &T,
    ctx: &ConnectionContext,
    format: &str,
    export: Option<Option<PathBuf>>,
) -> Result<()> {
    let projects = load_projects(transport, ctx).await;

    if let Some(requested) = export {
        let records: Vec<Record> = projects.iter().map(Project::to_record).collect();
        let path = export_path(requested.as_deref(), PathBuf::from(PROJECTS_FILE));
        print_export_outcome(&export_records(&records, &path)?);
        return Ok(());
    }

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&projects)?);
    } else if projects.is_empty() {
        println!("No projects found.");
    } else {
        print!("{}", render_projects(&projects));
    }
    Ok(())
}

pub async fn handle_tasks<T: Transport>(
    transport: &T,
    ctx: &ConnectionContext,
    query: TaskQuery,
) -> Result<()> {
    let candidates = task_candidates(query.fields.as_deref())?;

    let fetch = fetch_tasks(transport, ctx, query.project_id, candidates).await?;
    if !fetch.rejected.is_empty() {
        eprintln!(
            "⚠ Fields rejected by the server and skipped: {}",
            fetch.rejected.join(", ")
        );
    }

    let filtered = query.filter.apply(&fetch.tasks);

    if let Some(requested) = query.export {
        let records: Vec<Record> = filtered.iter().map(|t| t.record().clone()).collect();
        let path = export_path(requested.as_deref(), tasks_file_name(query.project_id));
        print_export_outcome(&export_records(&records, &path)?);
        return Ok(());
    }

    if query.format == "json" {
        println!("{}", serde_json::to_string_pretty(&filtered)?);
    } else if fetch.tasks.is_empty() {
        println!("No tasks found for project #{}.", query.project_id);
    } else if filtered.is_empty() {
        println!("No tasks match the filters ({} fetched).", fetch.tasks.len());
    } else {
        println!("Tasks found: {}\n", filtered.len());
        print!("{}", render_tasks(&filtered));
    }
    Ok(())
}

/// `odx export`: projects, or the tasks of one project with the default fields
pub async fn handle_export<T: Transport>(
    transport: &T,
    ctx: &ConnectionContext,
    project_id: Option<i64>,
    output: Option<PathBuf>,
) -> Result<()> {
    match project_id {
        Some(project_id) => {
            handle_tasks(
                transport,
                ctx,
                TaskQuery {
                    project_id,
                    format: "text".to_string(),
                    export: Some(output),
                    ..Default::default()
                },
            )
            .await
        },
        None => handle_projects(transport, ctx, "text", Some(output)).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_helpers::{invalid_field_error, test_context, ScriptedTransport};
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_export_tasks_after_narrowing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tasks.csv");
        let transport = ScriptedTransport::new(vec![
            invalid_field_error("project.task", "date_deadline"),
            json!({"result": [
                {"id": 1, "name": "Design", "stage_id": [1, "New"]},
                {"id": 2, "name": "Build", "stage_id": [2, "Done"]}
            ]}),
        ]);

        handle_export(&transport, &test_context(), Some(4), Some(path.clone()))
            .await
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("id,name,stage_id"));
        assert_eq!(lines.count(), 2);

        let calls = transport.calls();
        assert!(!calls[1].requested_fields().contains(&"date_deadline".to_string()));
    }

    #[tokio::test]
    async fn test_export_filtered_tasks() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("done.csv");
        let transport = ScriptedTransport::new(vec![json!({"result": [
            {"id": 1, "name": "Design", "stage_id": [1, "New"]},
            {"id": 2, "name": "Build", "stage_id": [2, "Done"]}
        ]})]);

        handle_tasks(
            &transport,
            &test_context(),
            TaskQuery {
                project_id: 4,
                filter: TaskFilter::from_selection(Some("Done"), None, None),
                export: Some(Some(path.clone())),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("Build"));
        assert!(!content.contains("Design"));
    }

    #[tokio::test]
    async fn test_export_projects_failure_is_nothing_to_export() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("projects.csv");
        let transport = ScriptedTransport::new(vec![json!({
            "error": {"message": "Access Denied"}
        })]);

        handle_export(&transport, &test_context(), None, Some(path.clone()))
            .await
            .unwrap();

        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_tasks_exhaustion_propagates() {
        let transport = ScriptedTransport::new(vec![invalid_field_error("project.task", "id")]);

        let err = handle_tasks(
            &transport,
            &test_context(),
            TaskQuery {
                project_id: 1,
                fields: Some(vec!["id".to_string()]),
                format: "text".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, OdooError::FetchExhausted { .. }));
    }

    #[tokio::test]
    async fn test_tasks_blank_field_list_is_malformed_input() {
        let transport = ScriptedTransport::new(vec![]);

        let err = handle_tasks(
            &transport,
            &test_context(),
            TaskQuery {
                project_id: 1,
                fields: Some(vec!["".to_string(), " ".to_string()]),
                format: "text".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, OdooError::MalformedInput(_)));
        assert!(transport.calls().is_empty());
    }
}
