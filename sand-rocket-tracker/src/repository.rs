//! Task persistence primitives
//!
//! [`TaskRepository`] is the narrow surface the position ledger works
//! through. Each call is atomic on its own; callers that need several calls
//! to land together run them on a repository bound to a transaction.

use crate::error::Result;
use crate::types::{EpicId, NewTask, ProjectId, Task, TaskId, TaskPatch, TaskStatus};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

/// Storage operations on tasks
pub trait TaskRepository {
    /// Insert a task at an explicit position
    fn create(&self, input: &NewTask, position: u32) -> Result<Task>;

    /// Fetch one task
    fn get(&self, id: &TaskId) -> Result<Option<Task>>;

    /// All tasks of an epic ordered by (status, position, created_at)
    fn list_by_epic(&self, epic_id: &EpicId) -> Result<Vec<Task>>;

    /// All tasks of a project, ordered by epic and then as [`Self::list_by_epic`]
    fn list_by_project(&self, project_id: &ProjectId) -> Result<Vec<Task>>;

    /// Highest position in a column, `None` when the column is empty
    fn max_position(&self, epic_id: &EpicId, status: TaskStatus) -> Result<Option<u32>>;

    /// Apply a partial update; `None` when the task does not exist
    fn update(&self, patch: &TaskPatch) -> Result<Option<Task>>;

    /// Delete a task; `false` when it did not exist
    fn delete(&self, id: &TaskId) -> Result<bool>;

    /// One column in display order
    fn list_partition(&self, epic_id: &EpicId, status: TaskStatus) -> Result<Vec<Task>> {
        Ok(self
            .list_by_epic(epic_id)?
            .into_iter()
            .filter(|t| t.status == status)
            .collect())
    }
}

const TASK_COLUMNS: &str = "id, epic_id, title, description, status, position, \
     creator_user_id, last_edited_by_user_id, created_at, updated_at";

/// [`TaskRepository`] over a SQLite connection or transaction
pub struct SqliteTaskRepository<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteTaskRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    fn row_to_task(row: &Row<'_>) -> rusqlite::Result<Task> {
        Ok(Task {
            id: row.get("id")?,
            epic_id: row.get("epic_id")?,
            title: row.get("title")?,
            description: row.get("description")?,
            status: row.get("status")?,
            position: row.get("position")?,
            creator_user_id: row.get("creator_user_id")?,
            last_edited_by_user_id: row.get("last_edited_by_user_id")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create(&self, input: &NewTask, position: u32) -> Result<Task> {
        let now = Utc::now();
        let task = Task {
            id: TaskId::new(),
            epic_id: input.epic_id.clone(),
            title: input.title.clone(),
            description: input.description.clone(),
            status: input.status,
            position,
            creator_user_id: input.creator_user_id.clone(),
            last_edited_by_user_id: None,
            created_at: now,
            updated_at: now,
        };

        self.conn.execute(
            &format!(
                "INSERT INTO tasks ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                TASK_COLUMNS
            ),
            params![
                task.id,
                task.epic_id,
                task.title,
                task.description,
                task.status,
                task.position,
                task.creator_user_id,
                task.last_edited_by_user_id,
                task.created_at,
                task.updated_at,
            ],
        )?;
        Ok(task)
    }

    fn get(&self, id: &TaskId) -> Result<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!("SELECT {} FROM tasks WHERE id = ?1", TASK_COLUMNS))?;
        Ok(stmt.query_row([id], Self::row_to_task).optional()?)
    }

    fn list_by_epic(&self, epic_id: &EpicId) -> Result<Vec<Task>> {
        let mut stmt = self.conn.prepare_cached(&format!(
            "SELECT {} FROM tasks WHERE epic_id = ?1 \
             ORDER BY CASE status WHEN 'backlog' THEN 0 WHEN 'in_progress' THEN 1 ELSE 2 END, \
             position, created_at, id",
            TASK_COLUMNS
        ))?;
        let rows = stmt.query_map([epic_id], Self::row_to_task)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn list_by_project(&self, project_id: &ProjectId) -> Result<Vec<Task>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT t.id, t.epic_id, t.title, t.description, t.status, t.position, \
             t.creator_user_id, t.last_edited_by_user_id, t.created_at, t.updated_at \
             FROM tasks t JOIN epics e ON e.id = t.epic_id \
             WHERE e.project_id = ?1 \
             ORDER BY e.created_at, e.id, \
             CASE t.status WHEN 'backlog' THEN 0 WHEN 'in_progress' THEN 1 ELSE 2 END, \
             t.position, t.created_at, t.id",
        )?;
        let rows = stmt.query_map([project_id], Self::row_to_task)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn max_position(&self, epic_id: &EpicId, status: TaskStatus) -> Result<Option<u32>> {
        let max: Option<u32> = self.conn.query_row(
            "SELECT MAX(position) FROM tasks WHERE epic_id = ?1 AND status = ?2",
            params![epic_id, status],
            |row| row.get(0),
        )?;
        Ok(max)
    }

    fn update(&self, patch: &TaskPatch) -> Result<Option<Task>> {
        let changed = self.conn.execute(
            "UPDATE tasks SET \
                epic_id = COALESCE(?2, epic_id), \
                status = COALESCE(?3, status), \
                position = COALESCE(?4, position), \
                title = COALESCE(?5, title), \
                description = COALESCE(?6, description), \
                last_edited_by_user_id = COALESCE(?7, last_edited_by_user_id), \
                updated_at = ?8 \
             WHERE id = ?1",
            params![
                patch.id,
                patch.epic_id,
                patch.status,
                patch.position,
                patch.title,
                patch.description,
                patch.edited_by,
                Utc::now(),
            ],
        )?;

        if changed == 0 {
            return Ok(None);
        }
        self.get(&patch.id)
    }

    fn delete(&self, id: &TaskId) -> Result<bool> {
        let changed = self.conn.execute("DELETE FROM tasks WHERE id = ?1", [id])?;
        Ok(changed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        schema::apply(&conn).unwrap();
        conn.execute_batch(
            "INSERT INTO projects (id, name, created_at, updated_at) VALUES ('p1', 'P', '2024-01-01', '2024-01-01');
             INSERT INTO epics (id, project_id, name, created_at, updated_at) VALUES ('e1', 'p1', 'E', '2024-01-01', '2024-01-01');",
        )
        .unwrap();
        conn
    }

    fn new_task(title: &str, status: TaskStatus) -> NewTask {
        NewTask {
            epic_id: EpicId::from_string("e1"),
            title: title.into(),
            description: String::new(),
            status,
            creator_user_id: None,
        }
    }

    #[test]
    fn test_max_position_empty_is_none() {
        let conn = setup();
        let repo = SqliteTaskRepository::new(&conn);
        let max = repo
            .max_position(&EpicId::from_string("e1"), TaskStatus::Backlog)
            .unwrap();
        assert_eq!(max, None);
    }

    #[test]
    fn test_list_by_epic_orders_by_status_then_position() {
        let conn = setup();
        let repo = SqliteTaskRepository::new(&conn);
        repo.create(&new_task("done", TaskStatus::Done), 0).unwrap();
        repo.create(&new_task("b1", TaskStatus::Backlog), 1).unwrap();
        repo.create(&new_task("b0", TaskStatus::Backlog), 0).unwrap();
        repo.create(&new_task("ip", TaskStatus::InProgress), 0).unwrap();

        let titles: Vec<String> = repo
            .list_by_epic(&EpicId::from_string("e1"))
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["b0", "b1", "ip", "done"]);
        assert_eq!(
            repo.max_position(&EpicId::from_string("e1"), TaskStatus::Backlog)
                .unwrap(),
            Some(1)
        );
    }

    #[test]
    fn test_update_missing_returns_none() {
        let conn = setup();
        let repo = SqliteTaskRepository::new(&conn);
        let patch = TaskPatch::new("missing");
        assert!(repo.update(&patch).unwrap().is_none());
    }

    #[test]
    fn test_update_is_partial() {
        let conn = setup();
        let repo = SqliteTaskRepository::new(&conn);
        let task = repo.create(&new_task("keep", TaskStatus::Backlog), 0).unwrap();

        let mut patch = TaskPatch::new(task.id.clone());
        patch.position = Some(4);
        let updated = repo.update(&patch).unwrap().unwrap();

        assert_eq!(updated.title, "keep");
        assert_eq!(updated.status, TaskStatus::Backlog);
        assert_eq!(updated.position, 4);
        assert!(updated.updated_at >= task.updated_at);
    }

    #[test]
    fn test_delete() {
        let conn = setup();
        let repo = SqliteTaskRepository::new(&conn);
        let task = repo.create(&new_task("gone", TaskStatus::Backlog), 0).unwrap();

        assert!(repo.delete(&task.id).unwrap());
        assert!(!repo.delete(&task.id).unwrap());
        assert!(repo.get(&task.id).unwrap().is_none());
    }
}
