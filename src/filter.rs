//! Stage / priority / creator filtering of fetched tasks.

use std::collections::BTreeSet;

use crate::models::Task;

/// Selector label meaning "no filter"
pub const ALL: &str = "All";

/// Criteria applied to a task list; `None` matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub stage: Option<String>,
    pub priority: Option<String>,
    pub creator: Option<String>,
}

/// Distinct values present in a task list, sorted, for building selectors
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub stages: Vec<String>,
    pub priorities: Vec<String>,
    pub creators: Vec<String>,
}

impl TaskFilter {
    /// Build from selector values, treating the "all" sentinel (any case) as unset
    pub fn from_selection(stage: Option<&str>, priority: Option<&str>, creator: Option<&str>) -> Self {
        Self {
            stage: selection(stage),
            priority: selection(priority),
            creator: selection(creator),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stage.is_none() && self.priority.is_none() && self.creator.is_none()
    }

    /// A task lacking a filtered attribute never matches that filter.
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(stage) = &self.stage {
            if task.stage().map(|s| s.label).as_deref() != Some(stage.as_str()) {
                return false;
            }
        }
        if let Some(priority) = &self.priority {
            if task.priority() != Some(priority.as_str()) {
                return false;
            }
        }
        if let Some(creator) = &self.creator {
            if task.creator().map(|c| c.label).as_deref() != Some(creator.as_str()) {
                return false;
            }
        }
        true
    }

    pub fn apply<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        tasks.iter().filter(|task| self.matches(task)).collect()
    }
}

fn selection(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case(ALL))
        .map(str::to_string)
}

impl FilterOptions {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let mut stages = BTreeSet::new();
        let mut priorities = BTreeSet::new();
        let mut creators = BTreeSet::new();

        for task in tasks {
            if let Some(stage) = task.stage() {
                stages.insert(stage.label);
            }
            if let Some(priority) = task.priority() {
                priorities.insert(priority.to_string());
            }
            if let Some(creator) = task.creator() {
                creators.insert(creator.label);
            }
        }

        Self {
            stages: stages.into_iter().collect(),
            priorities: priorities.into_iter().collect(),
            creators: creators.into_iter().collect(),
        }
    }
}
