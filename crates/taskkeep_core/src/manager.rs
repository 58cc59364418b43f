use crate::error::TaskError;
use crate::model::{Category, Status, Task, local_today};
use crate::storage::TaskStore;
use std::cmp::Ordering;
use time::Date;

/// Owns the in-memory working copy of the task collection. The cache is
/// reloaded from storage after every successful mutation, so the persisted
/// file stays the source of truth. Callers only ever see copies.
pub struct TaskManager<S: TaskStore> {
    storage: S,
    tasks: Vec<Task>,
}

impl<S: TaskStore> TaskManager<S> {
    pub fn new(storage: S) -> Result<Self, TaskError> {
        let tasks = storage.load()?;
        Ok(Self { storage, tasks })
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn list_all(&self) -> Vec<Task> {
        self.tasks.clone()
    }

    pub fn add(&mut self, task: Task) -> Result<(), TaskError> {
        let mut tasks = self.tasks.clone();
        tasks.push(task);
        self.storage.save(&tasks)?;
        self.reload()
    }

    pub fn edit(&mut self, index: usize, updated: Task) -> Result<(), TaskError> {
        self.check_bounds(index)?;
        self.storage.edit_at(index, updated)?;
        self.reload()
    }

    pub fn delete(&mut self, index: usize) -> Result<(), TaskError> {
        self.check_bounds(index)?;
        let mut tasks = self.tasks.clone();
        tasks.remove(index);
        self.storage.save(&tasks)?;
        self.reload()
    }

    pub fn get(&self, index: usize) -> Result<Task, TaskError> {
        self.check_bounds(index)?;
        Ok(self.tasks[index].clone())
    }

    pub fn list_by_status(&self, status: Status) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|task| task.status() == status)
            .cloned()
            .collect()
    }

    pub fn list_by_category(&self, category: Category) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|task| task.category() == category)
            .cloned()
            .collect()
    }

    pub fn list_overdue(&self) -> Vec<Task> {
        self.overdue_as_of(local_today())
    }

    pub fn overdue_as_of(&self, today: Date) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|task| task.is_overdue(today))
            .cloned()
            .collect()
    }

    /// Case-insensitive substring match over title, description, category
    /// and status labels. Priority is deliberately not searched.
    pub fn search(&self, keyword: &str) -> Vec<Task> {
        let keyword = keyword.to_lowercase();
        self.tasks
            .iter()
            .filter(|task| {
                task.title().to_lowercase().contains(&keyword)
                    || task.description().to_lowercase().contains(&keyword)
                    || task.category().label().to_lowercase().contains(&keyword)
                    || task.status().label().to_lowercase().contains(&keyword)
            })
            .cloned()
            .collect()
    }

    /// Re-reads the cache from storage. Needed after storage-level writes
    /// performed outside the manager, such as bulk imports.
    pub fn reload(&mut self) -> Result<(), TaskError> {
        self.tasks = self.storage.load()?;
        Ok(())
    }

    fn check_bounds(&self, index: usize) -> Result<(), TaskError> {
        if index >= self.tasks.len() {
            return Err(TaskError::out_of_range(format!(
                "index {} is out of range (0..{})",
                index,
                self.tasks.len()
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Title,
    Description,
    DueDate,
    Priority,
    Category,
    Status,
}

impl SortKey {
    /// Empty input and "none" mean no sorting; any other unrecognized key
    /// is an error.
    pub fn parse(raw: &str) -> Result<Option<SortKey>, TaskError> {
        match raw.trim().to_lowercase().as_str() {
            "" | "none" => Ok(None),
            "title" => Ok(Some(SortKey::Title)),
            "description" => Ok(Some(SortKey::Description)),
            "due_date" | "due-date" | "due date" | "due" => Ok(Some(SortKey::DueDate)),
            "priority" => Ok(Some(SortKey::Priority)),
            "category" => Ok(Some(SortKey::Category)),
            "status" => Ok(Some(SortKey::Status)),
            other => Err(TaskError::invalid_argument(format!(
                "unknown sort key '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
    Unspecified,
}

/// Stable sort over a snapshot; the input is never mutated. Priority and
/// status compare by enum rank, every other key by the field's natural
/// order (labels lexicographically, dates chronologically).
pub fn sort_tasks(tasks: &[Task], key: Option<SortKey>, direction: SortDirection) -> Vec<Task> {
    let mut sorted = tasks.to_vec();

    let Some(key) = key else {
        return sorted;
    };
    if direction == SortDirection::Unspecified {
        return sorted;
    }

    sorted.sort_by(|a, b| {
        let ordering = compare_by_key(a, b, key);
        match direction {
            SortDirection::Descending => ordering.reverse(),
            _ => ordering,
        }
    });

    sorted
}

fn compare_by_key(a: &Task, b: &Task, key: SortKey) -> Ordering {
    match key {
        SortKey::Title => a.title().cmp(b.title()),
        SortKey::Description => a.description().cmp(b.description()),
        SortKey::DueDate => a.due_date().cmp(&b.due_date()),
        SortKey::Priority => a.priority().cmp(&b.priority()),
        SortKey::Category => a.category().label().cmp(b.category().label()),
        SortKey::Status => a.status().cmp(&b.status()),
    }
}
