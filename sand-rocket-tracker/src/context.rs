//! TrackerContext provides access to the database for command execution

use crate::config::{TaskSettings, TrackerConfig};
use crate::error::{Result, TrackerError};
use crate::schema;
use crate::store::Store;
use crate::types::ActivityEntry;
use rusqlite::{Connection, TransactionBehavior};
use sand_rocket_operations::LogEntry;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, warn};

/// Context for tracker operations
///
/// Provides access to storage primitives. Commands do all the business
/// logic; the context only hands out connections.
///
/// Every write that touches more than one row goes through
/// [`TrackerContext::write_transaction`]. The connection mutex serializes
/// writers inside this process and the `IMMEDIATE` transaction takes SQLite's
/// write lock up front, so concurrent processes on the same file serialize too.
///
/// Both [`read`](Self::read) and [`write_transaction`](Self::write_transaction)
/// block the calling thread: on the mutex, and on SQLite's `busy_timeout`
/// when another process holds the write lock. Async callers that share a
/// context across tasks should run commands on a multi-thread runtime, or
/// move them to `spawn_blocking`, so a waiting writer does not stall the
/// executor.
pub struct TrackerContext {
    conn: Mutex<Connection>,
    settings: TaskSettings,
    path: Option<PathBuf>,
}

impl std::fmt::Debug for TrackerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackerContext")
            .field("path", &self.path)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl TrackerContext {
    /// Open (or create) a database file with default settings
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let config = TrackerConfig {
            database: crate::config::DatabaseConfig {
                path: path.as_ref().to_path_buf(),
                ..Default::default()
            },
            ..Default::default()
        };
        Self::open_with_config(&config)
    }

    /// Open the database named by a loaded configuration
    pub fn open_with_config(config: &TrackerConfig) -> Result<Self> {
        let path = config.database.path.clone();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&path)?;
        conn.busy_timeout(Duration::from_millis(config.database.busy_timeout_ms))?;
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        debug!(path = %path.display(), journal_mode = %mode, "opened database");

        Self::from_connection(conn, config.tasks.clone(), Some(path))
    }

    /// Private database, mostly for tests
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?, TaskSettings::default(), None)
    }

    fn from_connection(
        conn: Connection,
        settings: TaskSettings,
        path: Option<PathBuf>,
    ) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", true)?;
        schema::apply(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            settings,
            path,
        })
    }

    /// Replace the task settings
    pub fn with_settings(mut self, settings: TaskSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &TaskSettings {
        &self.settings
    }

    /// Database file, `None` for in-memory contexts
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| TrackerError::Poisoned)
    }

    // =========================================================================
    // Access
    // =========================================================================

    /// Run reads against the connection. Blocks while a writer holds it.
    pub fn read<T>(&self, f: impl FnOnce(&Store<'_>) -> Result<T>) -> Result<T> {
        let conn = self.lock()?;
        f(&Store::new(&conn))
    }

    /// Run `f` inside one `IMMEDIATE` transaction.
    ///
    /// Commits when `f` returns `Ok`; rolls back every write `f` made when
    /// it returns `Err`. Blocks until the connection mutex and the database
    /// write lock are both held, or fails with [`TrackerError::LockBusy`]
    /// once `busy_timeout` runs out.
    pub fn write_transaction<T>(&self, f: impl FnOnce(&Store<'_>) -> Result<T>) -> Result<T> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        match f(&Store::new(&tx)) {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(error) => {
                if let Err(rollback) = tx.rollback() {
                    warn!(%rollback, "rollback failed");
                }
                debug!(%error, "transaction rolled back");
                Err(error)
            }
        }
    }

    // =========================================================================
    // Activity log
    // =========================================================================

    /// Record an operation in the activity log
    pub fn append_activity(&self, entry: &LogEntry, affected: &[String]) -> Result<()> {
        self.read(|store| store.insert_activity(entry, affected))
    }

    /// Read activity, newest first
    pub fn read_activity(&self, limit: Option<usize>) -> Result<Vec<ActivityEntry>> {
        self.read(|store| store.list_activity(limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::TaskRepository;
    use crate::types::{NewTask, Project, ProjectId, TaskStatus};
    use chrono::Utc;
    use tempfile::TempDir;

    fn seed_project(store: &Store<'_>) -> ProjectId {
        let project = Project {
            id: ProjectId::new(),
            name: "P".into(),
            description: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        store.insert_project(&project).unwrap();
        project.id
    }

    #[test]
    fn test_open_creates_file_and_parent() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("tracker.db");

        let ctx = TrackerContext::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(ctx.path(), Some(path.as_path()));
    }

    #[test]
    fn test_reopen_keeps_data() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tracker.db");

        let id = {
            let ctx = TrackerContext::open(&path).unwrap();
            ctx.write_transaction(|store| Ok(seed_project(store))).unwrap()
        };

        let ctx = TrackerContext::open(&path).unwrap();
        let project = ctx.read(|store| store.get_project(&id)).unwrap();
        assert!(project.is_some());
    }

    #[test]
    fn test_write_transaction_rolls_back_on_error() {
        let ctx = TrackerContext::open_in_memory().unwrap();

        let result: Result<()> = ctx.write_transaction(|store| {
            seed_project(store);
            Err(TrackerError::parse("abort"))
        });
        assert!(result.is_err());

        let projects = ctx.read(|store| store.list_projects()).unwrap();
        assert!(projects.is_empty());
    }

    #[test]
    fn test_foreign_keys_enforced() {
        let ctx = TrackerContext::open_in_memory().unwrap();
        let result = ctx.read(|store| {
            store.tasks().create(
                &NewTask {
                    epic_id: "no-such-epic".into(),
                    title: "orphan".into(),
                    description: String::new(),
                    status: TaskStatus::Backlog,
                    creator_user_id: None,
                },
                0,
            )
        });
        assert!(matches!(result, Err(TrackerError::Database(_))));
    }

    #[test]
    fn test_activity_roundtrip_newest_first() {
        let ctx = TrackerContext::open_in_memory().unwrap();
        let first = LogEntry::new(
            "add task",
            serde_json::json!({}),
            serde_json::json!({}),
            None,
            1,
        );
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = LogEntry::new(
            "move task",
            serde_json::json!({"id": "t1"}),
            serde_json::json!({"id": "t1"}),
            Some("u1".into()),
            2,
        );
        ctx.append_activity(&first, &[]).unwrap();
        ctx.append_activity(&second, &["t1".to_string()]).unwrap();

        let entries = ctx.read_activity(None).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].op, "move task");
        assert_eq!(entries[0].actor.as_deref(), Some("u1"));
        assert_eq!(entries[0].affected, vec!["t1".to_string()]);

        let limited = ctx.read_activity(Some(1)).unwrap();
        assert_eq!(limited.len(), 1);
    }
}
