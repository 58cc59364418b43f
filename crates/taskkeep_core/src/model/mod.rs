mod task;

pub use task::{Category, Priority, Status, Task, TaskRecord, format_date, local_today, parse_date};
