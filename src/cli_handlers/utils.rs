//! Utility functions for CLI handlers
//!
//! Helpers for parsing user input and rendering projects and tasks as text.

use serde_json::Value;

use crate::error::{OdooError, Result};
use crate::fields::FieldRequestSet;
use crate::models::{Project, Task};

/// Columns of the task table, shown when present in the records
pub const TASK_TABLE_COLUMNS: &[&str] = &["id", "name", "stage_id", "priority", "create_uid", "child_ids"];

const MAX_CELL_WIDTH: usize = 40;

/// Parse a human-supplied project id
pub fn parse_project_id(input: &str) -> Result<i64> {
    let trimmed = input.trim();
    trimmed
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| {
            OdooError::MalformedInput(format!("project id must be a positive number, got '{}'", trimmed))
        })
}

/// Candidate task fields from `--fields`, or the defaults when absent
pub fn task_candidates(fields: Option<&[String]>) -> Result<FieldRequestSet> {
    let Some(fields) = fields else {
        return Ok(FieldRequestSet::default_task_fields());
    };

    let candidates = FieldRequestSet::new(
        fields
            .iter()
            .map(|f| f.trim())
            .filter(|f| !f.is_empty()),
    );
    if candidates.is_empty() {
        return Err(OdooError::MalformedInput(
            "--fields lists no field names".to_string(),
        ));
    }
    Ok(candidates)
}

/// Short text form of a field value for tables.
///
/// References show their label, id lists are comma-joined, `false` is blank.
pub fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => {
            if items.len() == 2 && items[0].is_i64() && items[1].is_string() {
                items[1].as_str().unwrap_or_default().to_string()
            } else {
                items
                    .iter()
                    .map(|item| display_value(Some(item)))
                    .collect::<Vec<_>>()
                    .join(",")
            }
        },
        Some(other) => other.to_string(),
    }
}

fn truncate(cell: &str) -> String {
    if cell.chars().count() <= MAX_CELL_WIDTH {
        cell.to_string()
    } else {
        let mut short: String = cell.chars().take(MAX_CELL_WIDTH - 1).collect();
        short.push('…');
        short
    }
}

/// Render a left-aligned text table
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(|cell| truncate(cell)).collect())
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let format_row = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| {
                let pad = width.saturating_sub(cell.chars().count());
                format!("{}{}", cell, " ".repeat(pad))
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();

    let mut out = String::new();
    out.push_str(&format_row(headers.to_vec()));
    out.push('\n');
    out.push_str(&format_row(separator.iter().map(String::as_str).collect()));
    out.push('\n');
    for row in &rows {
        out.push_str(&format_row(row.iter().map(String::as_str).collect()));
        out.push('\n');
    }
    out
}

pub fn render_projects(projects: &[Project]) -> String {
    let rows: Vec<Vec<String>> = projects
        .iter()
        .map(|p| {
            vec![
                p.id.to_string(),
                p.name.clone(),
                p.user_id.as_ref().map(|u| u.label.clone()).unwrap_or_default(),
                p.company_id.as_ref().map(|c| c.label.clone()).unwrap_or_default(),
                p.created_at()
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
                if p.active { "yes" } else { "no" }.to_string(),
            ]
        })
        .collect();

    render_table(&["id", "name", "manager", "company", "created", "active"], &rows)
}

/// Task table limited to the standard columns the records actually carry
pub fn render_tasks(tasks: &[&Task]) -> String {
    let columns: Vec<&str> = TASK_TABLE_COLUMNS
        .iter()
        .copied()
        .filter(|column| tasks.first().map(|t| t.has_field(column)).unwrap_or(true))
        .collect();

    let rows: Vec<Vec<String>> = tasks
        .iter()
        .map(|task| columns.iter().map(|column| display_value(task.get(column))).collect())
        .collect();

    render_table(&columns, &rows)
}

/// Detail view: the raw record followed by the child task references
pub fn render_task_detail(task: &Task) -> Result<String> {
    let mut out = String::new();
    out.push_str(&format!(
        "\nTask #{}: {}\n\n",
        task.id().map(|id| id.to_string()).unwrap_or_else(|| "?".to_string()),
        task.name().unwrap_or("(unnamed)")
    ));
    out.push_str(&serde_json::to_string_pretty(task.record())?);
    out.push('\n');

    let children = task.child_ids();
    if children.is_empty() {
        out.push_str("\nThis task has no subtasks.\n");
    } else {
        out.push_str("\nSubtasks (child_ids):\n");
        for child in children {
            out.push_str(&format!("  #{}\n", child));
        }
    }
    Ok(out)
}
