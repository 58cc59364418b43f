use crate::config;
use crate::error::TaskError;
use crate::model::{Task, TaskRecord};
use crate::storage::TaskStore;
use std::path::{Path, PathBuf};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

const BACKUP_STAMP: &[BorrowedFormatItem<'_>] =
    format_description!("[year][month][day]_[hour][minute][second]");

pub const CSV_HEADER: &str = "Title,Description,Due Date,Priority,Category,Status";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Json,
    Csv,
}

impl ImportFormat {
    pub fn parse(raw: &str) -> Result<ImportFormat, TaskError> {
        match raw.trim().to_lowercase().as_str() {
            "json" => Ok(ImportFormat::Json),
            "csv" => Ok(ImportFormat::Csv),
            other => Err(TaskError::invalid_argument(format!(
                "import format must be json or csv (got '{other}')"
            ))),
        }
    }
}

/// JSON-file backed store. Every save rewrites the whole file and drops a
/// timestamped copy of the new content into the backup directory.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    file_path: PathBuf,
    backup_dir: PathBuf,
}

impl JsonStorage {
    pub fn new(file_path: PathBuf, backup_dir: PathBuf) -> Self {
        Self {
            file_path,
            backup_dir,
        }
    }

    /// Resolves paths from `TASKKEEP_*` env vars, the config file, or
    /// platform defaults, in that order.
    pub fn from_env() -> Result<Self, TaskError> {
        let config = config::load_config_with_fallback().config;
        let file_path = config::store_path(&config)?;
        let backup_dir = config::backup_dir(&config, &file_path);
        Ok(Self::new(file_path, backup_dir))
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// Parses an external JSON or CSV file and appends its tasks to the
    /// currently persisted collection: existing tasks first, imported tasks
    /// after, in source order. Returns how many tasks were imported.
    pub fn import_merge(&self, source: &Path, format: ImportFormat) -> Result<usize, TaskError> {
        let existing = self.load()?;

        let content = std::fs::read_to_string(source)
            .map_err(|err| TaskError::io(format!("{}: {}", source.display(), err)))?;
        let imported = match format {
            ImportFormat::Json => parse_json_tasks(&content)?,
            ImportFormat::Csv => parse_csv_tasks(&content)?,
        };

        let count = imported.len();
        let mut combined = existing;
        combined.extend(imported);
        self.save(&combined)?;

        Ok(count)
    }

    fn write_backup(&self, content: &str) -> Result<(), TaskError> {
        std::fs::create_dir_all(&self.backup_dir)
            .map_err(|err| TaskError::io(err.to_string()))?;

        let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
        let stamp = OffsetDateTime::now_utc()
            .to_offset(offset)
            .format(BACKUP_STAMP)
            .map_err(|err| TaskError::io(err.to_string()))?;

        // Second-resolution stamps can collide within one run; suffix a
        // counter so every save still leaves its own artifact.
        let mut backup_path = self.backup_dir.join(format!("tasks_backup_{stamp}.json"));
        let mut attempt = 1;
        while backup_path.exists() {
            backup_path = self
                .backup_dir
                .join(format!("tasks_backup_{stamp}-{attempt}.json"));
            attempt += 1;
        }

        std::fs::write(&backup_path, content).map_err(|err| TaskError::io(err.to_string()))
    }
}

impl TaskStore for JsonStorage {
    fn load(&self) -> Result<Vec<Task>, TaskError> {
        if !self.file_path.exists() {
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&self.file_path)
            .map_err(|err| TaskError::io(err.to_string()))?;
        let records: Vec<TaskRecord> = serde_json::from_str(&content)
            .map_err(|err| TaskError::corrupt_data(err.to_string()))?;

        records
            .iter()
            .map(|record| {
                Task::from_record(record)
                    .map_err(|err| TaskError::corrupt_data(err.message().to_string()))
            })
            .collect()
    }

    fn save(&self, tasks: &[Task]) -> Result<(), TaskError> {
        if let Some(parent) = self.file_path.parent() {
            std::fs::create_dir_all(parent).map_err(|err| TaskError::io(err.to_string()))?;
        }

        let records: Vec<TaskRecord> = tasks.iter().map(Task::to_record).collect();
        let content = serde_json::to_string_pretty(&records)
            .map_err(|err| TaskError::io(err.to_string()))?;
        std::fs::write(&self.file_path, &content)
            .map_err(|err| TaskError::io(err.to_string()))?;

        self.write_backup(&content)
    }

    fn edit_at(&self, index: usize, updated: Task) -> Result<(), TaskError> {
        let mut tasks = self.load()?;
        if index >= tasks.len() {
            return Err(TaskError::out_of_range(format!(
                "index {} is out of range (0..{})",
                index,
                tasks.len()
            )));
        }

        tasks[index] = updated;
        self.save(&tasks)
    }
}

fn parse_json_tasks(content: &str) -> Result<Vec<Task>, TaskError> {
    let records: Vec<TaskRecord> =
        serde_json::from_str(content).map_err(|err| TaskError::format(err.to_string()))?;
    records.iter().map(Task::from_record).collect()
}

fn parse_csv_tasks(content: &str) -> Result<Vec<Task>, TaskError> {
    let mut lines = content.lines();
    let header = lines
        .next()
        .map(|line| line.trim_end_matches('\r'))
        .ok_or_else(|| TaskError::format("CSV import is empty"))?;

    if header != CSV_HEADER {
        return Err(TaskError::format(format!(
            "CSV header must be exactly '{CSV_HEADER}'"
        )));
    }

    let mut tasks = Vec::new();
    for (offset, line) in lines.enumerate() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }

        let fields = split_csv_line(line);
        let line_number = offset + 2;
        let [title, description, due_date, priority, category, status]: [String; 6] =
            fields.try_into().map_err(|fields: Vec<String>| {
                TaskError::format(format!(
                    "line {line_number}: expected 6 fields, got {}",
                    fields.len()
                ))
            })?;

        let record = TaskRecord {
            title,
            description,
            due_date,
            priority,
            category,
            status,
            created_at: None,
        };
        tasks.push(Task::from_record(&record)?);
    }

    Ok(tasks)
}

fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes && chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }

    fields.push(current);
    fields
}

#[cfg(test)]
mod tests {
    use super::{CSV_HEADER, ImportFormat, JsonStorage, split_csv_line};
    use crate::model::{Category, Priority, Status, Task};
    use crate::storage::TaskStore;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};
    use time::macros::date;

    fn temp_path(file_name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("taskkeep-{nanos}-{file_name}"))
    }

    fn temp_storage(name: &str) -> JsonStorage {
        let file_path = temp_path(&format!("{name}.json"));
        let backup_dir = temp_path(&format!("{name}-backup"));
        JsonStorage::new(file_path, backup_dir)
    }

    fn cleanup(storage: &JsonStorage) {
        fs::remove_file(storage.file_path()).ok();
        fs::remove_dir_all(storage.backup_dir()).ok();
    }

    fn sample_task(title: &str) -> Task {
        Task::with_created_at(
            title,
            "description",
            date!(2026 - 09 - 01),
            Priority::Medium,
            Category::Work,
            Status::InProgress,
            date!(2026 - 08 - 20),
        )
        .unwrap()
    }

    fn backup_count(storage: &JsonStorage) -> usize {
        match fs::read_dir(storage.backup_dir()) {
            Ok(entries) => entries.count(),
            Err(_) => 0,
        }
    }

    #[test]
    fn load_returns_empty_for_missing_file() {
        let storage = temp_storage("missing");
        assert!(storage.load().unwrap().is_empty());
        assert_eq!(backup_count(&storage), 0);
    }

    #[test]
    fn save_and_load_round_trip() {
        let storage = temp_storage("round-trip");
        let tasks = vec![sample_task("first"), sample_task("second")];

        storage.save(&tasks).unwrap();
        let loaded = storage.load().unwrap();
        cleanup(&storage);

        assert_eq!(loaded, tasks);
    }

    #[test]
    fn load_rejects_malformed_json() {
        let storage = temp_storage("malformed");
        fs::write(storage.file_path(), "{ not json ").unwrap();

        let err = storage.load().unwrap_err();
        cleanup(&storage);

        assert_eq!(err.code(), "corrupt_data");
    }

    #[test]
    fn load_rejects_bad_record_date() {
        let storage = temp_storage("bad-date");
        let content = "[{\"title\": \"t\", \"description\": \"d\", \"due_date\": \"someday\"}]";
        fs::write(storage.file_path(), content).unwrap();

        let err = storage.load().unwrap_err();
        cleanup(&storage);

        assert_eq!(err.code(), "corrupt_data");
    }

    #[test]
    fn every_save_writes_exactly_one_backup() {
        let storage = temp_storage("backups");

        storage.save(&[sample_task("one")]).unwrap();
        assert_eq!(backup_count(&storage), 1);

        storage.save(&[sample_task("one"), sample_task("two")]).unwrap();
        assert_eq!(backup_count(&storage), 2);

        cleanup(&storage);
    }

    #[test]
    fn backup_contains_the_new_content() {
        let storage = temp_storage("backup-content");
        storage.save(&[sample_task("persisted")]).unwrap();

        let entry = fs::read_dir(storage.backup_dir())
            .unwrap()
            .next()
            .unwrap()
            .unwrap();
        let backup = fs::read_to_string(entry.path()).unwrap();
        let main = fs::read_to_string(storage.file_path()).unwrap();
        cleanup(&storage);

        assert_eq!(backup, main);
        assert!(
            entry
                .file_name()
                .to_string_lossy()
                .starts_with("tasks_backup_")
        );
    }

    #[test]
    fn load_never_writes_a_backup() {
        let storage = temp_storage("load-no-backup");
        storage.save(&[sample_task("one")]).unwrap();
        let before = backup_count(&storage);

        storage.load().unwrap();
        let after = backup_count(&storage);
        cleanup(&storage);

        assert_eq!(before, after);
    }

    #[test]
    fn edit_at_replaces_and_persists() {
        let storage = temp_storage("edit-at");
        storage.save(&[sample_task("old")]).unwrap();

        storage.edit_at(0, sample_task("new")).unwrap();
        let loaded = storage.load().unwrap();
        cleanup(&storage);

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].title(), "new");
    }

    #[test]
    fn edit_at_rejects_out_of_range_index() {
        let storage = temp_storage("edit-oob");
        storage.save(&[sample_task("only")]).unwrap();

        let err = storage.edit_at(1, sample_task("new")).unwrap_err();
        cleanup(&storage);

        assert_eq!(err.code(), "out_of_range");
    }

    #[test]
    fn import_json_appends_after_existing_tasks() {
        let storage = temp_storage("import-json");
        storage.save(&[sample_task("existing")]).unwrap();

        let source = temp_path("import-source.json");
        let payload = serde_json::json!([
            {
                "title": "imported",
                "description": "from file",
                "due_date": "2026-09-15",
                "priority": "High",
                "category": "Study",
                "status": "In Progress",
                "created_at": "2026-08-01"
            }
        ]);
        fs::write(&source, serde_json::to_string_pretty(&payload).unwrap()).unwrap();

        let count = storage.import_merge(&source, ImportFormat::Json).unwrap();
        let loaded = storage.load().unwrap();
        fs::remove_file(&source).ok();
        cleanup(&storage);

        assert_eq!(count, 1);
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].title(), "existing");
        assert_eq!(loaded[1].title(), "imported");
        assert_eq!(loaded[1].priority(), Priority::High);
    }

    #[test]
    fn import_json_propagates_validation_errors() {
        let storage = temp_storage("import-json-invalid");
        let source = temp_path("import-invalid.json");
        let payload = "[{\"title\": \"\", \"description\": \"d\", \"due_date\": \"2026-09-01\"}]";
        fs::write(&source, payload).unwrap();

        let err = storage.import_merge(&source, ImportFormat::Json).unwrap_err();
        fs::remove_file(&source).ok();
        cleanup(&storage);

        assert_eq!(err.code(), "validation");
    }

    #[test]
    fn import_csv_parses_quoted_fields() {
        let storage = temp_storage("import-csv");
        let source = temp_path("import-source.csv");
        let content = format!(
            "{CSV_HEADER}\n\"Plan, revise, submit\",Final paper,2026-09-10,High,Study,In Progress\n"
        );
        fs::write(&source, content).unwrap();

        let count = storage.import_merge(&source, ImportFormat::Csv).unwrap();
        let loaded = storage.load().unwrap();
        fs::remove_file(&source).ok();
        cleanup(&storage);

        assert_eq!(count, 1);
        assert_eq!(loaded[0].title(), "Plan, revise, submit");
        assert_eq!(loaded[0].category(), Category::Study);
    }

    #[test]
    fn import_csv_rejects_wrong_header() {
        let storage = temp_storage("import-csv-header");
        let source = temp_path("bad-header.csv");
        fs::write(&source, "Name,Notes\nBuy milk,groceries\n").unwrap();

        let err = storage.import_merge(&source, ImportFormat::Csv).unwrap_err();
        fs::remove_file(&source).ok();
        cleanup(&storage);

        assert_eq!(err.code(), "format");
    }

    #[test]
    fn import_csv_rejects_wrong_field_count() {
        let storage = temp_storage("import-csv-fields");
        let source = temp_path("bad-fields.csv");
        fs::write(&source, format!("{CSV_HEADER}\nonly,three,fields\n")).unwrap();

        let err = storage.import_merge(&source, ImportFormat::Csv).unwrap_err();
        fs::remove_file(&source).ok();
        cleanup(&storage);

        assert_eq!(err.code(), "format");
    }

    #[test]
    fn import_csv_rejects_unparsable_date() {
        let storage = temp_storage("import-csv-date");
        let source = temp_path("bad-date.csv");
        fs::write(
            &source,
            format!("{CSV_HEADER}\nBuy milk,groceries,tomorrow,Low,Personal,In Progress\n"),
        )
        .unwrap();

        let err = storage.import_merge(&source, ImportFormat::Csv).unwrap_err();
        fs::remove_file(&source).ok();
        cleanup(&storage);

        assert_eq!(err.code(), "format");
    }

    #[test]
    fn import_format_parse_rejects_unknown() {
        assert_eq!(ImportFormat::parse("json").unwrap(), ImportFormat::Json);
        assert_eq!(ImportFormat::parse(" CSV ").unwrap(), ImportFormat::Csv);
        assert_eq!(
            ImportFormat::parse("xml").unwrap_err().code(),
            "invalid_argument"
        );
    }

    #[test]
    fn split_csv_line_handles_quotes_and_escapes() {
        assert_eq!(split_csv_line("a,b,c"), vec!["a", "b", "c"]);
        assert_eq!(split_csv_line("\"a,b\",c"), vec!["a,b", "c"]);
        assert_eq!(split_csv_line("\"say \"\"hi\"\"\",x"), vec!["say \"hi\"", "x"]);
        assert_eq!(split_csv_line("a,,c"), vec!["a", "", "c"]);
    }
}
