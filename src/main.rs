use clap::Parser;
use odoo_explorer::cli::{Cli, Commands};
use odoo_explorer::cli_handlers::{
    connect, handle_explore, handle_export, handle_login, handle_projects, handle_tasks,
    parse_project_id, task_candidates, TaskQuery,
};
use odoo_explorer::error::Result;
use odoo_explorer::filter::TaskFilter;
use odoo_explorer::logging::{init_logging, LoggingConfig};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_config = LoggingConfig::from_args(cli.quiet, cli.verbose, cli.json, cli.log_file.clone());
    if let Err(e) = init_logging(log_config) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(&cli).await {
        let error_response = e.to_error_response();
        match serde_json::to_string_pretty(&error_response) {
            Ok(json) => eprintln!("{}", json),
            Err(_) => eprintln!("{}", e),
        }
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<()> {
    match cli.command.clone() {
        Commands::Login { format } => {
            let (_transport, ctx) = connect(&cli.connection).await?;
            handle_login(&ctx, &format)?;
        },

        Commands::Projects { format, export } => {
            let (transport, ctx) = connect(&cli.connection).await?;
            handle_projects(&transport, &ctx, &format, export).await?;
        },

        Commands::Tasks {
            project_id,
            fields,
            stage,
            priority,
            creator,
            format,
            export,
        } => {
            // Validate before touching the network
            let project_id = parse_project_id(&project_id)?;
            task_candidates(fields.as_deref())?;
            let query = TaskQuery {
                project_id,
                fields,
                filter: TaskFilter::from_selection(
                    stage.as_deref(),
                    priority.as_deref(),
                    creator.as_deref(),
                ),
                format,
                export,
            };

            let (transport, ctx) = connect(&cli.connection).await?;
            handle_tasks(&transport, &ctx, query).await?;
        },

        Commands::Export { project, output } => {
            let project_id = project.as_deref().map(parse_project_id).transpose()?;
            let (transport, ctx) = connect(&cli.connection).await?;
            handle_export(&transport, &ctx, project_id, output).await?;
        },

        Commands::Explore => {
            let (transport, ctx) = connect(&cli.connection).await?;
            handle_explore(&transport, &ctx).await?;
        },
    }

    Ok(())
}
