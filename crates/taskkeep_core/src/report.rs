use crate::error::TaskError;
use crate::manager::TaskManager;
use crate::model::{Category, Priority, Status, local_today};
use crate::storage::TaskStore;
use time::Date;

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionReport {
    pub total: usize,
    pub completed: usize,
    pub overdue: usize,
    pub completion_rate: f64,
}

/// Completed counts only tasks whose due date falls inside `[start, end]`;
/// the overdue count is intentionally not range-filtered.
pub fn completion_report<S: TaskStore>(
    manager: &TaskManager<S>,
    start: Date,
    end: Date,
) -> CompletionReport {
    completion_report_as_of(manager, start, end, local_today())
}

pub fn completion_report_as_of<S: TaskStore>(
    manager: &TaskManager<S>,
    start: Date,
    end: Date,
    today: Date,
) -> CompletionReport {
    let tasks = manager.list_all();
    let total = tasks.len();
    let completed = tasks
        .iter()
        .filter(|task| {
            task.status() == Status::Completed
                && task.due_date() >= start
                && task.due_date() <= end
        })
        .count();
    let overdue = manager.overdue_as_of(today).len();
    let completion_rate = if total == 0 {
        0.0
    } else {
        completed as f64 / total as f64
    };

    CompletionReport {
        total,
        completed,
        overdue,
        completion_rate,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistributionField {
    Category,
    Priority,
    Status,
}

impl DistributionField {
    pub fn parse(raw: &str) -> Result<DistributionField, TaskError> {
        match raw.trim().to_lowercase().as_str() {
            "category" => Ok(DistributionField::Category),
            "priority" => Ok(DistributionField::Priority),
            "status" => Ok(DistributionField::Status),
            other => Err(TaskError::invalid_argument(format!(
                "distribution criterion must be category, priority or status (got '{other}')"
            ))),
        }
    }
}

/// Counts tasks per value of the chosen field. Every possible value is
/// present in the result, zero included, in enum rank order.
pub fn distribution<S: TaskStore>(
    manager: &TaskManager<S>,
    field: DistributionField,
) -> Vec<(&'static str, usize)> {
    let tasks = manager.list_all();

    match field {
        DistributionField::Category => Category::ALL
            .iter()
            .map(|value| {
                let count = tasks
                    .iter()
                    .filter(|task| task.category() == *value)
                    .count();
                (value.label(), count)
            })
            .collect(),
        DistributionField::Priority => Priority::ALL
            .iter()
            .map(|value| {
                let count = tasks
                    .iter()
                    .filter(|task| task.priority() == *value)
                    .count();
                (value.label(), count)
            })
            .collect(),
        DistributionField::Status => Status::ALL
            .iter()
            .map(|value| {
                let count = tasks.iter().filter(|task| task.status() == *value).count();
                (value.label(), count)
            })
            .collect(),
    }
}
