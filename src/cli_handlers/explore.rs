//! Interactive explorer
//!
//! Terminal dashboard: project selector, stage / priority / creator filters,
//! the filtered task table and a per-task detail view.

use dialoguer::{theme::ColorfulTheme, Select};

use crate::error::{OdooError, Result};
use crate::fetch::fetch_tasks;
use crate::fields::FieldRequestSet;
use crate::filter::{FilterOptions, TaskFilter, ALL};
use crate::models::{Project, Task};
use crate::rpc::Transport;
use crate::session::ConnectionContext;

use super::commands::{load_projects, report_failure};
use super::utils::{render_task_detail, render_tasks};

/// Picks one entry out of a list
pub trait Chooser {
    fn choose(&self, prompt: &str, items: &[String]) -> Result<usize>;
}

/// Arrow-key selection on the terminal
pub struct TerminalChooser;

impl Chooser for TerminalChooser {
    fn choose(&self, prompt: &str, items: &[String]) -> Result<usize> {
        Select::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .items(items)
            .default(0)
            .interact()
            .map_err(|e| OdooError::Prompt(format!("Selection cancelled: {}", e)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Detail,
    Refilter,
    SwitchProject,
    Quit,
}

const ACTIONS: &[(Action, &str)] = &[
    (Action::Detail, "View task detail"),
    (Action::Refilter, "Change filters"),
    (Action::SwitchProject, "Choose another project"),
    (Action::Quit, "Quit"),
];

/// Where the explorer goes after a project view
#[derive(Debug, PartialEq, Eq)]
enum Next {
    Projects,
    Quit,
}

pub struct Explorer<'a, T: Transport, C: Chooser> {
    transport: &'a T,
    ctx: &'a ConnectionContext,
    chooser: &'a C,
}

impl<'a, T: Transport, C: Chooser> Explorer<'a, T, C> {
    pub fn new(transport: &'a T, ctx: &'a ConnectionContext, chooser: &'a C) -> Self {
        Self {
            transport,
            ctx,
            chooser,
        }
    }

    pub async fn run(&self) -> Result<()> {
        println!("\n🔎 Odoo Explorer - {} ({})\n", self.ctx.server(), self.ctx.database());

        let projects = load_projects(self.transport, self.ctx).await;
        if projects.is_empty() {
            println!("No projects found.");
            return Ok(());
        }

        loop {
            let Some(project) = self.choose_project(&projects)? else {
                return Ok(());
            };
            if self.explore_project(project).await? == Next::Quit {
                return Ok(());
            }
        }
    }

    fn choose_project<'p>(&self, projects: &'p [Project]) -> Result<Option<&'p Project>> {
        let mut items: Vec<String> = projects
            .iter()
            .map(|p| format!("{} (#{})", p.name, p.id))
            .collect();
        items.push("Quit".to_string());

        let selection = self.chooser.choose("Select a project", &items)?;
        Ok(projects.get(selection))
    }

    async fn explore_project(&self, project: &Project) -> Result<Next> {
        let fetch = match fetch_tasks(
            self.transport,
            self.ctx,
            project.id,
            FieldRequestSet::default_task_fields(),
        )
        .await
        {
            Ok(fetch) => fetch,
            Err(e) => {
                tracing::error!(project_id = project.id, error = %e, "Task fetch failed");
                report_failure(&e);
                return Ok(Next::Projects);
            },
        };

        for field in &fetch.rejected {
            println!("⚠ Invalid field detected: {}. It was skipped.", field);
        }

        if fetch.tasks.is_empty() {
            println!("No tasks found for this project.");
            return Ok(Next::Projects);
        }

        let options = FilterOptions::from_tasks(&fetch.tasks);
        let mut filter = self.choose_filter(&options)?;

        loop {
            let filtered = filter.apply(&fetch.tasks);
            println!("\nTasks found: {}\n", filtered.len());
            if filtered.is_empty() {
                println!("No tasks match the filters.");
            } else {
                print!("{}", render_tasks(&filtered));
            }

            let labels: Vec<String> = ACTIONS.iter().map(|(_, label)| label.to_string()).collect();
            let action = ACTIONS[self.chooser.choose("What next?", &labels)?.min(ACTIONS.len() - 1)].0;

            match action {
                Action::Detail => {
                    if let Some(task) = self.choose_task(&filtered)? {
                        print!("{}", render_task_detail(task)?);
                    }
                },
                Action::Refilter => filter = self.choose_filter(&options)?,
                Action::SwitchProject => return Ok(Next::Projects),
                Action::Quit => return Ok(Next::Quit),
            }
        }
    }

    fn choose_filter(&self, options: &FilterOptions) -> Result<TaskFilter> {
        let stage = self.choose_with_all("Stage", &options.stages)?;
        let priority = self.choose_with_all("Priority", &options.priorities)?;
        let creator = self.choose_with_all("Created by", &options.creators)?;
        Ok(TaskFilter::from_selection(
            stage.as_deref(),
            priority.as_deref(),
            creator.as_deref(),
        ))
    }

    /// Selector whose first entry is the "all" sentinel
    fn choose_with_all(&self, prompt: &str, values: &[String]) -> Result<Option<String>> {
        if values.is_empty() {
            return Ok(None);
        }

        let mut items = vec![ALL.to_string()];
        items.extend(values.iter().cloned());

        let selection = self.chooser.choose(prompt, &items)?;
        Ok(match selection {
            0 => None,
            i => values.get(i - 1).cloned(),
        })
    }

    fn choose_task<'t>(&self, tasks: &[&'t Task]) -> Result<Option<&'t Task>> {
        if tasks.is_empty() {
            return Ok(None);
        }

        let items: Vec<String> = tasks
            .iter()
            .map(|t| {
                format!(
                    "#{} {}",
                    t.id().map(|id| id.to_string()).unwrap_or_default(),
                    t.name().unwrap_or("(unnamed)")
                )
            })
            .collect();

        let selection = self.chooser.choose("Select a task", &items)?;
        Ok(tasks.get(selection).copied())
    }
}

pub async fn handle_explore<T: Transport>(transport: &T, ctx: &ConnectionContext) -> Result<()> {
    Explorer::new(transport, ctx, &TerminalChooser).run().await
}
