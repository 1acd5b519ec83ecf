use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const LONG_ABOUT: &str = r#"
Odoo Explorer - browse Odoo projects and tasks from the terminal

Connects to an Odoo server over JSON-RPC, lists projects, fetches the tasks of
a project and prints them, exports them to CSV, or opens an interactive
explorer with stage / priority / creator filters.

Task fields the server does not know are dropped automatically: when a read
fails with "Invalid field 'x'", the request is retried without 'x'.

Connection settings:
  --url / ODX_URL             Server address (default: https://erp.cloudgenia.app)
  --db / ODX_DB               Database name
  --user / ODX_USER           Login
  --password / ODX_PASSWORD   Password
  Missing values are prompted for when running in a terminal.

Examples:
  odx login
  odx projects --export
  odx tasks 12 --stage "In Progress"
  odx tasks 12 --fields id,name,stage_id --format json
  odx explore
"#;

#[derive(Parser, Clone)]
#[command(name = "odx")]
#[command(about = "Browse and export Odoo projects and tasks over JSON-RPC")]
#[command(long_about = LONG_ABOUT)]
#[command(version)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Connection settings; unset values fall back to env vars, defaults, then prompts
#[derive(Args, Clone, Debug, Default)]
pub struct ConnectionArgs {
    /// Odoo server address
    #[arg(long, env = "ODX_URL", global = true)]
    pub url: Option<String>,

    /// Database name
    #[arg(long, env = "ODX_DB", global = true)]
    pub db: Option<String>,

    /// Login user name
    #[arg(long, env = "ODX_USER", global = true)]
    pub user: Option<String>,

    /// Password
    #[arg(long, env = "ODX_PASSWORD", hide_env_values = true, global = true)]
    pub password: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "ODX_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Authenticate and print the session uid
    Login {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// List all projects
    ///
    /// Examples:
    ///   odx projects
    ///   odx projects --format json
    ///   odx projects --export            # writes projects.csv
    Projects {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,

        /// Export to CSV (default file: projects.csv)
        #[arg(long, num_args = 0..=1)]
        export: Option<Option<PathBuf>>,
    },

    /// Fetch the tasks of a project
    ///
    /// Examples:
    ///   odx tasks 12
    ///   odx tasks 12 --priority 1 --creator "Mitchell Admin"
    ///   odx tasks 12 --export            # writes tasks_project_12.csv
    Tasks {
        /// Project ID
        project_id: String,

        /// Comma-separated candidate fields (default: the standard task fields)
        #[arg(long, value_delimiter = ',')]
        fields: Option<Vec<String>>,

        /// Only tasks in this stage ("All" for any)
        #[arg(long)]
        stage: Option<String>,

        /// Only tasks with this priority ("All" for any)
        #[arg(long)]
        priority: Option<String>,

        /// Only tasks created by this user ("All" for any)
        #[arg(long)]
        creator: Option<String>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,

        /// Export to CSV (default file: tasks_project_<ID>.csv)
        #[arg(long, num_args = 0..=1)]
        export: Option<Option<PathBuf>>,
    },

    /// Export projects, or the tasks of one project, to CSV
    ///
    /// Examples:
    ///   odx export                       # projects.csv
    ///   odx export --project 12          # tasks_project_12.csv
    ///   odx export --project 12 --output backlog.csv
    Export {
        /// Project ID whose tasks to export (projects are exported when omitted)
        #[arg(long)]
        project: Option<String>,

        /// Output file
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Interactive explorer: pick a project, filter its tasks, inspect details
    Explore,
}
