use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use directories::BaseDirs;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".the-choice";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "the-choice.sqlite";
/// Log file written while the TUI owns the terminal.
const LOG_FILE_NAME: &str = "the-choice.log";

/// Where the application keeps its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_path: PathBuf,
    pub log_path: PathBuf,
}

impl Config {
    /// Use `database_override` when given, otherwise `~/.the-choice/`. The log
    /// file always lives next to the database.
    pub fn resolve(database_override: Option<&Path>) -> Result<Self> {
        let database_path = match database_override {
            Some(path) => path.to_path_buf(),
            None => default_data_dir()?.join(DB_FILE_NAME),
        };
        Ok(Self::for_database(database_path))
    }

    pub fn for_database(database_path: PathBuf) -> Self {
        let log_path = database_path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(|parent| parent.join(LOG_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(LOG_FILE_NAME));
        Self {
            database_path,
            log_path,
        }
    }
}

fn default_data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_puts_log_next_to_database() {
        let config = Config::resolve(Some(Path::new("/tmp/choice/db.sqlite"))).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/choice/db.sqlite"));
        assert_eq!(config.log_path, PathBuf::from("/tmp/choice/the-choice.log"));
    }

    #[test]
    fn bare_file_name_logs_in_working_directory() {
        let config = Config::for_database(PathBuf::from("db.sqlite"));
        assert_eq!(config.log_path, PathBuf::from(LOG_FILE_NAME));
    }
}
