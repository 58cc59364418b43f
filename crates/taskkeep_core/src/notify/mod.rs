use crate::error::TaskError;
use crate::manager::TaskManager;
use crate::model::{Task, format_date};
use crate::storage::TaskStore;

/// Delivery contract for reminder senders (email, chat, ...). Delivery is
/// fire-and-forget: the core reports failures but never retries.
pub trait Notifier {
    fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), TaskError>;
}

pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn send(&self, _recipient: &str, _subject: &str, _body: &str) -> Result<(), TaskError> {
        Ok(())
    }
}

#[derive(Debug)]
pub struct ReminderOutcome {
    pub sent: Vec<Task>,
    pub failures: Vec<ReminderFailure>,
}

#[derive(Debug)]
pub struct ReminderFailure {
    pub title: String,
    pub error: TaskError,
}

pub fn deadline_reminder(task: &Task) -> (String, String) {
    let subject = format!("Reminder: task '{}' is due", task.title());
    let body = format!(
        "Title: {}\nDescription: {}\nDue date: {}\nCategory: {}\nPriority: {}\n\nPlease complete the task.",
        task.title(),
        task.description(),
        format_date(task.due_date()),
        task.category().label(),
        task.priority().label(),
    );
    (subject, body)
}

/// Sends one reminder per overdue task. A failed send is recorded and the
/// remaining tasks are still attempted.
pub fn notify_overdue<S: TaskStore>(
    manager: &TaskManager<S>,
    notifier: &dyn Notifier,
    recipient: &str,
) -> ReminderOutcome {
    let mut sent = Vec::new();
    let mut failures = Vec::new();

    for task in manager.list_overdue() {
        let (subject, body) = deadline_reminder(&task);
        match notifier.send(recipient, &subject, &body) {
            Ok(()) => sent.push(task),
            Err(error) => failures.push(ReminderFailure {
                title: task.title().to_string(),
                error,
            }),
        }
    }

    ReminderOutcome { sent, failures }
}
