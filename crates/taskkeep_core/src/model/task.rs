use crate::error::TaskError;
use serde::{Deserialize, Serialize};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime, UtcOffset};

const DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

pub fn parse_date(raw: &str) -> Result<Date, TaskError> {
    Date::parse(raw.trim(), DATE_FORMAT)
        .map_err(|_| TaskError::format(format!("'{}' is not a valid YYYY-MM-DD date", raw.trim())))
}

pub fn format_date(date: Date) -> String {
    // The format description only contains infallible components.
    date.format(DATE_FORMAT).unwrap_or_else(|_| date.to_string())
}

pub fn local_today() -> Date {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    OffsetDateTime::now_utc().to_offset(offset).date()
}

/// Priority rank order is the declaration order: Low < Medium < High.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }

    pub fn parse(raw: &str) -> Result<Priority, TaskError> {
        match raw.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(TaskError::validation(format!(
                "priority must be one of Low, Medium, High (got '{other}')"
            ))),
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Work,
    Personal,
    Study,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Work, Category::Personal, Category::Study];

    pub fn label(self) -> &'static str {
        match self {
            Category::Work => "Work",
            Category::Personal => "Personal",
            Category::Study => "Study",
        }
    }

    pub fn parse(raw: &str) -> Result<Category, TaskError> {
        match raw.trim().to_lowercase().as_str() {
            "work" => Ok(Category::Work),
            "personal" => Ok(Category::Personal),
            "study" => Ok(Category::Study),
            other => Err(TaskError::validation(format!(
                "category must be one of Work, Personal, Study (got '{other}')"
            ))),
        }
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::Work
    }
}

/// Status rank order is the declaration order: InProgress < Completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Status {
    InProgress,
    Completed,
}

impl Status {
    pub const ALL: [Status; 2] = [Status::InProgress, Status::Completed];

    pub fn label(self) -> &'static str {
        match self {
            Status::InProgress => "In Progress",
            Status::Completed => "Completed",
        }
    }

    pub fn parse(raw: &str) -> Result<Status, TaskError> {
        match raw.trim().to_lowercase().as_str() {
            "in progress" | "in-progress" | "in_progress" | "inprogress" => Ok(Status::InProgress),
            "completed" => Ok(Status::Completed),
            other => Err(TaskError::validation(format!(
                "status must be one of In Progress, Completed (got '{other}')"
            ))),
        }
    }
}

impl Default for Status {
    fn default() -> Self {
        Status::InProgress
    }
}

/// A single task. Immutable once constructed; edits replace the whole value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    title: String,
    description: String,
    due_date: Date,
    priority: Priority,
    category: Category,
    status: Status,
    created_at: Date,
}

impl Task {
    pub fn new(
        title: &str,
        description: &str,
        due_date: Date,
        priority: Priority,
        category: Category,
        status: Status,
    ) -> Result<Task, TaskError> {
        Task::with_created_at(
            title,
            description,
            due_date,
            priority,
            category,
            status,
            local_today(),
        )
    }

    pub fn with_created_at(
        title: &str,
        description: &str,
        due_date: Date,
        priority: Priority,
        category: Category,
        status: Status,
        created_at: Date,
    ) -> Result<Task, TaskError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(TaskError::validation("title is required"));
        }

        let description = description.trim();
        if description.is_empty() {
            return Err(TaskError::validation("description is required"));
        }

        Ok(Task {
            title: title.to_string(),
            description: description.to_string(),
            due_date,
            priority,
            category,
            status,
            created_at,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn due_date(&self) -> Date {
        self.due_date
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn created_at(&self) -> Date {
        self.created_at
    }

    pub fn is_overdue(&self, today: Date) -> bool {
        self.due_date < today && self.status != Status::Completed
    }

    pub fn to_record(&self) -> TaskRecord {
        TaskRecord {
            title: self.title.clone(),
            description: self.description.clone(),
            due_date: format_date(self.due_date),
            priority: self.priority.label().to_string(),
            category: self.category.label().to_string(),
            status: self.status.label().to_string(),
            created_at: Some(format_date(self.created_at)),
        }
    }

    pub fn from_record(record: &TaskRecord) -> Result<Task, TaskError> {
        let due_date = parse_date(&record.due_date)?;
        let created_at = match record.created_at.as_deref() {
            Some(raw) => parse_date(raw)?,
            None => local_today(),
        };

        Task::with_created_at(
            &record.title,
            &record.description,
            due_date,
            Priority::parse(&record.priority)?,
            Category::parse(&record.category)?,
            Status::parse(&record.status)?,
            created_at,
        )
    }
}

fn default_priority() -> String {
    Priority::default().label().to_string()
}

fn default_category() -> String {
    Category::default().label().to_string()
}

fn default_status() -> String {
    Status::default().label().to_string()
}

/// Wire shape of a task: the element type of the persisted JSON array and
/// of JSON imports. All fields are primitives; dates are YYYY-MM-DD strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub title: String,
    pub description: String,
    pub due_date: String,
    #[serde(default = "default_priority")]
    pub priority: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub created_at: Option<String>,
}
