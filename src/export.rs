//! CSV export of fetched records.
//!
//! The header row is the key set of the first record in server order. Later
//! records are written against that header; keys they lack become empty cells.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::Result;
use crate::models::Record;

pub const PROJECTS_FILE: &str = "projects.csv";

/// Default export file for a project's tasks
pub fn tasks_file_name(project_id: i64) -> PathBuf {
    PathBuf::from(format!("tasks_project_{}.csv", project_id))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Written { path: PathBuf, rows: usize },
    /// Zero records: no file is created
    NothingToExport,
}

/// Render one cell: strings verbatim, null empty, everything else compact JSON.
pub fn render_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

pub fn write_records<W: std::io::Write>(records: &[Record], writer: W) -> Result<usize> {
    let Some(first) = records.first() else {
        return Ok(0);
    };
    let header: Vec<&str> = first.keys().map(String::as_str).collect();

    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(&header)?;
    for record in records {
        csv_writer.write_record(header.iter().map(|key| render_cell(record.get(*key))))?;
    }
    csv_writer.flush()?;

    Ok(records.len())
}

pub fn export_records(records: &[Record], path: &Path) -> Result<ExportOutcome> {
    if records.is_empty() {
        tracing::warn!(path = %path.display(), "Nothing to export");
        return Ok(ExportOutcome::NothingToExport);
    }

    let file = std::fs::File::create(path)?;
    let rows = write_records(records, file)?;

    tracing::info!(path = %path.display(), rows, "Exported records");
    Ok(ExportOutcome::Written {
        path: path.to_path_buf(),
        rows,
    })
}
