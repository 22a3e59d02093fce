//! # Process Settings
//!
//! Settings that belong to the process rather than to the data: where the
//! database lives and how chatty the logs are. They are loaded with
//! [`confique`] in priority order:
//!
//! 1. **Environment variables**: `TXT_DATA_DIR`, `TXT_LOG`.
//! 2. **Settings file**: `txt.toml` in the OS config directory (via the
//!    `directories` crate). A missing file is fine.
//! 3. **Compiled defaults**.
//!
//! The engine limits (page size, temporary cap, time offset, ...) are not
//! here: they are stored in the database itself, see [`crate::model::Config`].
//!
//! | Key | Env | Default |
//! |-----|-----|---------|
//! | `data_dir` | `TXT_DATA_DIR` | OS data directory |
//! | `log_filter` | `TXT_LOG` | `warn` |

use crate::error::Result;
use confique::Config;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const SETTINGS_FILE_NAME: &str = "txt.toml";

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TxtSettings {
    /// Folder holding the database file.
    #[config(env = "TXT_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// `tracing` filter directive, e.g. `"info"` or `"txtapp=debug"`.
    #[config(env = "TXT_LOG", default = "warn")]
    pub log_filter: String,
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "txt")
}

/// `<config dir>/txt.toml`, if the platform has a config directory.
pub fn settings_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(SETTINGS_FILE_NAME))
}

impl TxtSettings {
    /// Environment plus the default settings file.
    pub fn load() -> Result<Self> {
        Self::load_from(settings_path().as_deref())
    }

    /// Environment plus `file` when given.
    pub fn load_from(file: Option<&Path>) -> Result<Self> {
        let mut builder = Self::builder().env();
        if let Some(file) = file {
            builder = builder.file(file);
        }
        Ok(builder.load()?)
    }

    /// Where the database lives: `override_dir`, else `data_dir`, else the OS
    /// data directory, else the current directory.
    pub fn db_dir(&self, override_dir: Option<&Path>) -> PathBuf {
        override_dir
            .map(Path::to_path_buf)
            .or_else(|| self.data_dir.clone())
            .or_else(|| project_dirs().map(|dirs| dirs.data_dir().to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn settings_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE_NAME);
        fs::write(&path, "data_dir = \"/srv/txt\"\nlog_filter = \"debug\"\n").unwrap();

        let settings = TxtSettings::load_from(Some(&path)).unwrap();
        if std::env::var_os("TXT_DATA_DIR").is_none() {
            assert_eq!(settings.data_dir, Some(PathBuf::from("/srv/txt")));
        }
        if std::env::var_os("TXT_LOG").is_none() {
            assert_eq!(settings.log_filter, "debug");
        }
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings =
            TxtSettings::load_from(Some(&dir.path().join("absent.toml"))).unwrap();
        if std::env::var_os("TXT_LOG").is_none() {
            assert_eq!(settings.log_filter, "warn");
        }
    }

    #[test]
    fn override_wins_for_db_dir() {
        let settings = TxtSettings {
            data_dir: Some(PathBuf::from("/from/settings")),
            log_filter: "warn".into(),
        };
        assert_eq!(
            settings.db_dir(Some(Path::new("/from/flag"))),
            PathBuf::from("/from/flag")
        );
        assert_eq!(settings.db_dir(None), PathBuf::from("/from/settings"));
    }
}
