// CLI command handlers module
//
// Core: login, projects, tasks, export
// Interactive: explore

pub mod commands;
pub mod explore;
pub mod utils;

// Re-export commonly used functions
pub use commands::{
    connect, handle_export, handle_login, handle_projects, handle_tasks, report_failure,
    TaskQuery,
};
pub use explore::handle_explore;
pub use utils::{parse_project_id, task_candidates};
