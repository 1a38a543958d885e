use super::backend::StorageBackend;
use crate::error::{Result, SutekhError};
use crate::schema::Database;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Stores the whole database as one JSON document.
pub struct FsBackend {
    data_file: PathBuf,
}

impl FsBackend {
    pub fn new(data_file: impl Into<PathBuf>) -> Self {
        Self {
            data_file: data_file.into(),
        }
    }

    pub fn data_file(&self) -> &Path {
        &self.data_file
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(dir) = self.data_file.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir).map_err(SutekhError::Io)?;
            }
        }
        Ok(())
    }
}

impl StorageBackend for FsBackend {
    fn load(&self) -> Result<Option<Database>> {
        if !self.data_file.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.data_file).map_err(SutekhError::Io)?;
        let mut db: Database = serde_json::from_str(&content).map_err(SutekhError::Serialization)?;
        db.rebuild_indexes();
        Ok(Some(db))
    }

    fn save(&self, db: &Database) -> Result<()> {
        self.ensure_parent_dir()?;
        let content = serde_json::to_string_pretty(db).map_err(SutekhError::Serialization)?;

        // Atomic write: a crash leaves either the old or the new document
        let dir = self
            .data_file
            .parent()
            .filter(|d| !d.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let tmp_file = dir.join(format!(".sutekh-{}.tmp", Uuid::new_v4()));
        fs::write(&tmp_file, content).map_err(SutekhError::Io)?;
        if let Err(err) = fs::rename(&tmp_file, &self.data_file) {
            let _ = fs::remove_file(&tmp_file);
            return Err(SutekhError::Io(err));
        }

        tracing::debug!(path = %self.data_file.display(), "database saved");
        Ok(())
    }

    fn location(&self) -> String {
        self.data_file.display().to_string()
    }
}
