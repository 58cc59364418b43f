use crate::error::TaskError;
use crate::model::Task;

mod json_store;

pub use json_store::{CSV_HEADER, ImportFormat, JsonStorage};

/// Persistence contract for the task collection. The store is the sole
/// authority over durable state; positional index is the task identity.
pub trait TaskStore {
    fn load(&self) -> Result<Vec<Task>, TaskError>;

    fn save(&self, tasks: &[Task]) -> Result<(), TaskError>;

    fn edit_at(&self, index: usize, updated: Task) -> Result<(), TaskError>;
}
