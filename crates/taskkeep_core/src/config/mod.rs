use crate::error::TaskError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "config.json";
const STORE_FILE_NAME: &str = "tasks.json";
const CONFIG_ENV_VAR: &str = "TASKKEEP_CONFIG_PATH";
const STORE_ENV_VAR: &str = "TASKKEEP_STORE_PATH";
const BACKUP_ENV_VAR: &str = "TASKKEEP_BACKUP_DIR";

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data_path: Option<String>,
    #[serde(default)]
    pub backup_dir: Option<String>,
}

/// Result of a config load that never fails outright: front ends get the
/// effective config plus the error, if any, to report as a warning.
#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<TaskError>,
}

fn app_dir() -> Result<PathBuf, TaskError> {
    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| TaskError::io("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join("taskkeep"))
    } else {
        let home = std::env::var("HOME").map_err(|_| TaskError::io("HOME is not set"))?;
        Ok(PathBuf::from(home).join(".config").join("taskkeep"))
    }
}

pub fn config_path() -> Result<PathBuf, TaskError> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    Ok(app_dir()?.join(CONFIG_FILE_NAME))
}

/// Store path resolution order: env var, config value, platform default.
pub fn store_path(config: &Config) -> Result<PathBuf, TaskError> {
    if let Ok(path) = std::env::var(STORE_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if let Some(path) = config.data_path.as_deref()
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    Ok(app_dir()?.join(STORE_FILE_NAME))
}

/// Backup dir resolution order: env var, config value, `backup` next to
/// the store file.
pub fn backup_dir(config: &Config, store_path: &Path) -> PathBuf {
    if let Ok(path) = std::env::var(BACKUP_ENV_VAR)
        && !path.trim().is_empty()
    {
        return PathBuf::from(path);
    }

    if let Some(path) = config.backup_dir.as_deref()
        && !path.trim().is_empty()
    {
        return PathBuf::from(path);
    }

    store_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join("backup")
}

pub fn load_config() -> Result<Config, TaskError> {
    let path = config_path()?;
    load_config_from_path(&path)
}

pub fn load_config_with_fallback() -> ConfigLoad {
    match config_path() {
        Ok(path) => load_config_with_fallback_from_path(&path),
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_with_fallback_from_path(path: &Path) -> ConfigLoad {
    if !path.exists() {
        return ConfigLoad {
            config: Config::default(),
            error: None,
        };
    }

    match load_config_from_path(path) {
        Ok(config) => ConfigLoad {
            config,
            error: None,
        },
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_from_path(path: &Path) -> Result<Config, TaskError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| TaskError::io(format!("{}: {}", path.display(), err)))?;
    serde_json::from_str(&content).map_err(|err| {
        TaskError::corrupt_data(format!("invalid JSON in {}: {}", path.display(), err))
    })
}

#[cfg(test)]
mod tests {
    use super::{Config, backup_dir, load_config_from_path, load_config_with_fallback_from_path};
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(file_name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("taskkeep-{nanos}-{file_name}"))
    }

    #[test]
    fn missing_config_falls_back_to_defaults() {
        let path = temp_path("missing-config.json");
        let result = load_config_with_fallback_from_path(&path);

        assert_eq!(result.config, Config::default());
        assert!(result.error.is_none());
    }

    #[test]
    fn invalid_config_falls_back_with_error() {
        let path = temp_path("invalid-config.json");
        fs::write(&path, "{ invalid json ").unwrap();

        let result = load_config_with_fallback_from_path(&path);
        fs::remove_file(&path).ok();

        assert_eq!(result.config, Config::default());
        assert!(result.error.is_some());
    }

    #[test]
    fn valid_config_is_read() {
        let path = temp_path("valid-config.json");
        let content = serde_json::json!({
            "data_path": "/tmp/tasks.json",
            "backup_dir": "/tmp/backups"
        });
        fs::write(&path, serde_json::to_string(&content).unwrap()).unwrap();

        let loaded = load_config_from_path(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(loaded.data_path.as_deref(), Some("/tmp/tasks.json"));
        assert_eq!(loaded.backup_dir.as_deref(), Some("/tmp/backups"));
    }

    #[test]
    fn backup_dir_defaults_next_to_store() {
        let config = Config::default();
        let resolved = backup_dir(&config, Path::new("/data/tasks.json"));
        assert_eq!(resolved, Path::new("/data/backup"));
    }

    #[test]
    fn backup_dir_prefers_config_value() {
        let config = Config {
            data_path: None,
            backup_dir: Some("/elsewhere/backups".to_string()),
        };
        let resolved = backup_dir(&config, Path::new("/data/tasks.json"));
        assert_eq!(resolved, Path::new("/elsewhere/backups"));
    }
}
