use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "taskkeep", version, about = "Personal task list with JSON persistence", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new task
    ///
    /// Example: taskkeep add "Buy milk" "Two liters" 2026-09-01 --priority high
    Add {
        title: String,
        description: String,
        /// Due date as YYYY-MM-DD
        due: String,
        #[arg(long)]
        priority: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        status: Option<String>,
    },
    /// Show the task at a position
    ///
    /// Example: taskkeep show 0
    Show { id: usize },
    /// Replace the task at a position with a new value
    ///
    /// Example: taskkeep edit 0 "Buy milk" "Two liters, lactose free" 2026-09-02
    Edit {
        id: usize,
        title: String,
        description: String,
        /// Due date as YYYY-MM-DD
        due: String,
        #[arg(long)]
        priority: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        status: Option<String>,
    },
    /// Delete the task at a position
    ///
    /// Example: taskkeep delete 0
    Delete { id: usize },
    /// List tasks
    ///
    /// Example: taskkeep list all --sort priority --desc
    /// Example: taskkeep list overdue
    List {
        #[command(subcommand)]
        list: ListCommand,

        /// Sort key: title, description, due_date, priority, category, status
        #[arg(long, global = true)]
        sort: Option<String>,

        /// Sort in descending order
        #[arg(long, global = true)]
        desc: bool,
    },
    /// Search tasks by keyword (title, description, category, status)
    ///
    /// Example: taskkeep search milk
    Search { keyword: String },
    /// Completion report over an inclusive due-date range
    ///
    /// Example: taskkeep report 2026-01-01 2026-12-31
    Report { start: String, end: String },
    /// Task counts per category, priority or status
    ///
    /// Example: taskkeep distribution category
    Distribution { criterion: String },
    /// Import tasks from a JSON or CSV file, appending to the store
    ///
    /// Example: taskkeep import backlog.csv --format csv
    Import {
        path: PathBuf,
        #[arg(long, default_value = "json")]
        format: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ListCommand {
    /// List every task
    All,
    /// List tasks with the given status
    Status { status: String },
    /// List tasks in the given category
    Category { category: String },
    /// List unfinished tasks whose due date has passed
    Overdue,
}
