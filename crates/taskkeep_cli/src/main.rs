mod cli;

use clap::Parser;
use cli::{Cli, Command, ListCommand};
use tabled::settings::Style;
use tabled::{Table, Tabled};
use taskkeep_core::error::TaskError;
use taskkeep_core::manager::{SortDirection, SortKey, TaskManager, sort_tasks};
use taskkeep_core::model::{Category, Priority, Status, Task, format_date, parse_date};
use taskkeep_core::report::{DistributionField, completion_report, distribution};
use taskkeep_core::storage::{ImportFormat, JsonStorage};

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: usize,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Due Date")]
    due_date: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl TaskRow {
    fn new(id: usize, task: &Task) -> Self {
        Self {
            id,
            title: task.title().to_string(),
            description: task.description().to_string(),
            due_date: format_date(task.due_date()),
            priority: task.priority().label().to_string(),
            category: task.category().label().to_string(),
            status: task.status().label().to_string(),
        }
    }
}

fn print_tasks(tasks: &[Task], json: bool) {
    if json {
        let records: Vec<serde_json::Value> = tasks
            .iter()
            .enumerate()
            .map(|(id, task)| {
                let mut value = serde_json::to_value(task.to_record())
                    .unwrap_or(serde_json::Value::Null);
                if let Some(object) = value.as_object_mut() {
                    object.insert("id".to_string(), serde_json::json!(id));
                }
                value
            })
            .collect();
        println!("{}", serde_json::Value::Array(records));
        return;
    }

    if tasks.is_empty() {
        println!("No tasks.");
        return;
    }

    let rows: Vec<TaskRow> = tasks
        .iter()
        .enumerate()
        .map(|(id, task)| TaskRow::new(id, task))
        .collect();
    println!("{}", Table::new(rows).with(Style::sharp()));
}

fn task_from_args(
    title: &str,
    description: &str,
    due: &str,
    priority: Option<&str>,
    category: Option<&str>,
    status: Option<&str>,
) -> Result<Task, TaskError> {
    let due_date = parse_date(due)?;
    let priority = match priority {
        Some(raw) => Priority::parse(raw)?,
        None => Priority::default(),
    };
    let category = match category {
        Some(raw) => Category::parse(raw)?,
        None => Category::default(),
    };
    let status = match status {
        Some(raw) => Status::parse(raw)?,
        None => Status::default(),
    };

    Task::new(title, description, due_date, priority, category, status)
}

fn run_command(cli: Cli) -> Result<(), TaskError> {
    let storage = JsonStorage::from_env()?;
    let mut manager = TaskManager::new(storage)?;

    match cli.command {
        Command::Add {
            title,
            description,
            due,
            priority,
            category,
            status,
        } => {
            let task = task_from_args(
                &title,
                &description,
                &due,
                priority.as_deref(),
                category.as_deref(),
                status.as_deref(),
            )?;
            manager.add(task)?;
            if cli.json {
                print_tasks(&manager.list_all()[manager.len() - 1..], true);
            } else {
                println!("Added task: {} (id {})", title.trim(), manager.len() - 1);
            }
        }
        Command::Show { id } => {
            let task = manager.get(id)?;
            print_tasks(std::slice::from_ref(&task), cli.json);
        }
        Command::Edit {
            id,
            title,
            description,
            due,
            priority,
            category,
            status,
        } => {
            let existing = manager.get(id)?;
            let draft = task_from_args(
                &title,
                &description,
                &due,
                priority.as_deref(),
                category.as_deref(),
                status.as_deref(),
            )?;
            // The replacement keeps the original creation date.
            let updated = Task::with_created_at(
                draft.title(),
                draft.description(),
                draft.due_date(),
                draft.priority(),
                draft.category(),
                draft.status(),
                existing.created_at(),
            )?;
            manager.edit(id, updated)?;
            if cli.json {
                let task = manager.get(id)?;
                print_tasks(std::slice::from_ref(&task), true);
            } else {
                println!("Updated task {id}");
            }
        }
        Command::Delete { id } => {
            manager.delete(id)?;
            if !cli.json {
                println!("Deleted task {id}");
            }
        }
        Command::List { list, sort, desc } => {
            let tasks = match list {
                ListCommand::All => manager.list_all(),
                ListCommand::Status { status } => {
                    manager.list_by_status(Status::parse(&status)?)
                }
                ListCommand::Category { category } => {
                    manager.list_by_category(Category::parse(&category)?)
                }
                ListCommand::Overdue => manager.list_overdue(),
            };

            let key = match sort.as_deref() {
                Some(raw) => SortKey::parse(raw)?,
                None => None,
            };
            let direction = if key.is_none() {
                SortDirection::Unspecified
            } else if desc {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            };
            let tasks = sort_tasks(&tasks, key, direction);

            print_tasks(&tasks, cli.json);
        }
        Command::Search { keyword } => {
            print_tasks(&manager.search(&keyword), cli.json);
        }
        Command::Report { start, end } => {
            let report = completion_report(&manager, parse_date(&start)?, parse_date(&end)?);
            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "total": report.total,
                        "completed": report.completed,
                        "overdue": report.overdue,
                        "completion_rate": report.completion_rate,
                    })
                );
            } else {
                println!("Total tasks:     {}", report.total);
                println!("Completed:       {}", report.completed);
                println!("Overdue:         {}", report.overdue);
                println!("Completion rate: {:.2}", report.completion_rate);
            }
        }
        Command::Distribution { criterion } => {
            let field = DistributionField::parse(&criterion)?;
            let counts = distribution(&manager, field);
            if cli.json {
                let mut object = serde_json::Map::new();
                for (label, count) in &counts {
                    object.insert(label.to_string(), serde_json::json!(count));
                }
                println!("{}", serde_json::Value::Object(object));
            } else {
                for (label, count) in &counts {
                    println!("{label}: {count}");
                }
            }
        }
        Command::Import { path, format } => {
            let format = ImportFormat::parse(&format)?;
            let count = manager.storage().import_merge(&path, format)?;
            manager.reload()?;
            if cli.json {
                println!("{}", serde_json::json!({ "imported": count }));
            } else {
                println!("Imported {count} task(s)");
            }
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run_command(cli) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
