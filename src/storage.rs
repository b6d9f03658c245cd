use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{RecurringTask, RecurringTaskId, Task, TaskId, UserSettings, Week};

/// Everything the board persists for one owner.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Database {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub recurring_tasks: Vec<RecurringTask>,
    #[serde(default)]
    pub weeks: Vec<Week>,
    #[serde(default)]
    pub settings: UserSettings,
    /// Highest ids ever handed out, so deleted ids are never reused.
    #[serde(default)]
    last_task_id: TaskId,
    #[serde(default)]
    last_recurring_id: RecurringTaskId,
}

impl Database {
    pub fn allocate_task_id(&mut self) -> TaskId {
        let max = self.tasks.iter().map(|t| t.id).max().unwrap_or(0);
        self.last_task_id = self.last_task_id.max(max) + 1;
        self.last_task_id
    }

    pub fn allocate_recurring_id(&mut self) -> RecurringTaskId {
        let max = self.recurring_tasks.iter().map(|t| t.id).max().unwrap_or(0);
        self.last_recurring_id = self.last_recurring_id.max(max) + 1;
        self.last_recurring_id
    }
}

/// JSON file holding a [`Database`].
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Store { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the database. A missing file is an empty board; an unreadable
    /// or corrupt file is an error.
    pub fn load(&self) -> Result<Database> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no database yet, starting empty");
            return Ok(Database::default());
        }
        let s = fs::read_to_string(&self.path).map_err(|source| Error::Io {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_str(&s).map_err(|source| Error::Json {
            path: self.path.clone(),
            source,
        })
    }

    /// Writes the database to a sibling temporary file and renames it over
    /// the previous snapshot.
    pub fn save(&self, db: &Database) -> Result<()> {
        let io_err = |source| Error::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(io_err)?;
        }
        let s = serde_json::to_string_pretty(db).map_err(|source| Error::Json {
            path: self.path.clone(),
            source,
        })?;
        let tmp = self.path.with_extension("json.tmp");
        let mut f = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp)
            .map_err(io_err)?;
        f.write_all(s.as_bytes()).map_err(io_err)?;
        f.sync_all().map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)?;
        debug!(path = %self.path.display(), tasks = db.tasks.len(), "database saved");
        Ok(())
    }

    /// Deletes the database file.
    pub fn delete(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|source| Error::Io {
                path: self.path.clone(),
                source,
            })?;
        }
        Ok(())
    }
}
