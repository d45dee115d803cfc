//! Where the journal and index live.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::ConfigError;

fn default_dir() -> String {
    ".keel".into()
}

fn default_journal_file() -> String {
    "decisions.jsonl".into()
}

fn default_index_file() -> String {
    "index.db".into()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Storage directory, relative to the project root unless absolute.
    #[serde(default = "default_dir")]
    pub dir: String,

    /// Journal file name inside `dir`. This is the file to commit.
    #[serde(default = "default_journal_file")]
    pub journal_file: String,

    /// Index file name inside `dir`. Derived data; safe to delete.
    #[serde(default = "default_index_file")]
    pub index_file: String,
}

impl StorageConfig {
    /// Absolute (or root-relative) storage directory for `project_root`.
    #[must_use]
    pub fn dir_in(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.dir)
    }

    #[must_use]
    pub fn journal_path(&self, project_root: &Path) -> PathBuf {
        self.dir_in(project_root).join(&self.journal_file)
    }

    #[must_use]
    pub fn index_path(&self, project_root: &Path) -> PathBuf {
        self.dir_in(project_root).join(&self.index_file)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("storage.dir", &self.dir),
            ("storage.journal_file", &self.journal_file),
            ("storage.index_file", &self.index_file),
        ];
        for (field, value) in fields {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: field.into(),
                    reason: "must not be empty".into(),
                });
            }
        }
        if self.journal_file == self.index_file {
            return Err(ConfigError::InvalidValue {
                field: "storage.index_file".into(),
                reason: "must differ from storage.journal_file".into(),
            });
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            journal_file: default_journal_file(),
            index_file: default_index_file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_paths() {
        let config = StorageConfig::default();
        let root = Path::new("/work/repo");
        assert_eq!(
            config.journal_path(root),
            PathBuf::from("/work/repo/.keel/decisions.jsonl")
        );
        assert_eq!(config.index_path(root), PathBuf::from("/work/repo/.keel/index.db"));
    }

    #[test]
    fn absolute_dir_ignores_root() {
        let config = StorageConfig {
            dir: "/var/keel".into(),
            ..StorageConfig::default()
        };
        assert_eq!(
            config.journal_path(Path::new("/work/repo")),
            PathBuf::from("/var/keel/decisions.jsonl")
        );
    }

    #[test]
    fn empty_or_clashing_names_are_rejected() {
        let empty = StorageConfig {
            journal_file: " ".into(),
            ..StorageConfig::default()
        };
        assert!(empty.validate().is_err());

        let clash = StorageConfig {
            index_file: "decisions.jsonl".into(),
            ..StorageConfig::default()
        };
        assert!(clash.validate().is_err());
        assert!(StorageConfig::default().validate().is_ok());
    }
}
