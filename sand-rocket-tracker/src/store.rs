//! Row-level I/O for everything except task ordering
//!
//! A [`Store`] borrows a connection (or a transaction, which derefs to one)
//! and offers plain reads and writes. No business rules live here beyond the
//! `require_*` lookups that turn a missing row into the matching not-found
//! error.

use crate::error::{Result, TrackerError};
use crate::repository::{SqliteTaskRepository, TaskRepository};
use crate::types::{
    ActivityEntry, Attachment, AttachmentId, Epic, EpicId, Invitation, InvitationId,
    InvitationStatus, Member, Project, ProjectId, Role, Task, TaskId, User, UserId,
};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use sand_rocket_operations::LogEntry;

/// Data access over one connection or transaction
pub struct Store<'c> {
    conn: &'c Connection,
}

impl<'c> Store<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// Task repository on the same connection
    pub fn tasks(&self) -> SqliteTaskRepository<'c> {
        SqliteTaskRepository::new(self.conn)
    }

    // =========================================================================
    // Lookups that fail with not-found
    // =========================================================================

    pub fn require_user(&self, id: &UserId) -> Result<User> {
        self.get_user(id)?
            .ok_or_else(|| TrackerError::UserNotFound { id: id.to_string() })
    }

    pub fn require_project(&self, id: &ProjectId) -> Result<Project> {
        self.get_project(id)?
            .ok_or_else(|| TrackerError::ProjectNotFound { id: id.to_string() })
    }

    pub fn require_epic(&self, id: &EpicId) -> Result<Epic> {
        self.get_epic(id)?
            .ok_or_else(|| TrackerError::EpicNotFound { id: id.to_string() })
    }

    pub fn require_task(&self, id: &TaskId) -> Result<Task> {
        self.tasks()
            .get(id)?
            .ok_or_else(|| TrackerError::TaskNotFound { id: id.to_string() })
    }

    pub fn require_invitation(&self, id: &InvitationId) -> Result<Invitation> {
        self.get_invitation(id)?
            .ok_or_else(|| TrackerError::InvitationNotFound { id: id.to_string() })
    }

    /// Check that `actor` belongs to the project, and is an owner when
    /// `owner_only` is set. No actor means a trusted caller; nothing to check.
    pub fn authorize(
        &self,
        project_id: &ProjectId,
        actor: Option<&UserId>,
        owner_only: bool,
    ) -> Result<()> {
        let Some(actor) = actor else {
            return Ok(());
        };

        match self.get_member(project_id, actor)? {
            Some(member) if !owner_only || member.role == Role::Owner => Ok(()),
            Some(_) => Err(TrackerError::forbidden(format!(
                "user {} is not an owner of project {}",
                actor, project_id
            ))),
            None => Err(TrackerError::forbidden(format!(
                "user {} is not a member of project {}",
                actor, project_id
            ))),
        }
    }

    // =========================================================================
    // Users
    // =========================================================================

    fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
        Ok(User {
            id: row.get("id")?,
            email: row.get("email")?,
            display_name: row.get("display_name")?,
            created_at: row.get("created_at")?,
        })
    }

    pub fn insert_user(&self, user: &User) -> Result<()> {
        self.conn.execute(
            "INSERT INTO users (id, email, display_name, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![user.id, user.email, user.display_name, user.created_at],
        )?;
        Ok(())
    }

    pub fn get_user(&self, id: &UserId) -> Result<Option<User>> {
        Ok(self
            .conn
            .query_row("SELECT * FROM users WHERE id = ?1", [id], Self::row_to_user)
            .optional()?)
    }

    /// Email match is case-insensitive
    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .conn
            .query_row(
                "SELECT * FROM users WHERE email = ?1",
                [email.trim()],
                Self::row_to_user,
            )
            .optional()?)
    }

    pub fn list_users(&self) -> Result<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT * FROM users ORDER BY email")?;
        let rows = stmt.query_map([], Self::row_to_user)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    // =========================================================================
    // Projects
    // =========================================================================

    fn row_to_project(row: &Row<'_>) -> rusqlite::Result<Project> {
        Ok(Project {
            id: row.get("id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    pub fn insert_project(&self, project: &Project) -> Result<()> {
        self.conn.execute(
            "INSERT INTO projects (id, name, description, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                project.id,
                project.name,
                project.description,
                project.created_at,
                project.updated_at
            ],
        )?;
        Ok(())
    }

    pub fn get_project(&self, id: &ProjectId) -> Result<Option<Project>> {
        Ok(self
            .conn
            .query_row(
                "SELECT * FROM projects WHERE id = ?1",
                [id],
                Self::row_to_project,
            )
            .optional()?)
    }

    pub fn list_projects(&self) -> Result<Vec<Project>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT * FROM projects ORDER BY created_at, id")?;
        let rows = stmt.query_map([], Self::row_to_project)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Projects the user is a member of
    pub fn list_projects_for_user(&self, user_id: &UserId) -> Result<Vec<Project>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT p.* FROM projects p \
             JOIN project_members m ON m.project_id = p.id \
             WHERE m.user_id = ?1 ORDER BY p.created_at, p.id",
        )?;
        let rows = stmt.query_map([user_id], Self::row_to_project)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn update_project(&self, project: &Project) -> Result<()> {
        self.conn.execute(
            "UPDATE projects SET name = ?2, description = ?3, updated_at = ?4 WHERE id = ?1",
            params![
                project.id,
                project.name,
                project.description,
                project.updated_at
            ],
        )?;
        Ok(())
    }

    pub fn delete_project(&self, id: &ProjectId) -> Result<bool> {
        Ok(self
            .conn
            .execute("DELETE FROM projects WHERE id = ?1", [id])?
            > 0)
    }

    // =========================================================================
    // Members
    // =========================================================================

    fn row_to_member(row: &Row<'_>) -> rusqlite::Result<Member> {
        Ok(Member {
            project_id: row.get("project_id")?,
            user_id: row.get("user_id")?,
            role: row.get("role")?,
            joined_at: row.get("joined_at")?,
        })
    }

    pub fn insert_member(&self, member: &Member) -> Result<()> {
        self.conn.execute(
            "INSERT INTO project_members (project_id, user_id, role, joined_at) \
             VALUES (?1, ?2, ?3, ?4)",
            params![
                member.project_id,
                member.user_id,
                member.role,
                member.joined_at
            ],
        )?;
        Ok(())
    }

    pub fn get_member(&self, project_id: &ProjectId, user_id: &UserId) -> Result<Option<Member>> {
        Ok(self
            .conn
            .query_row(
                "SELECT * FROM project_members WHERE project_id = ?1 AND user_id = ?2",
                params![project_id, user_id],
                Self::row_to_member,
            )
            .optional()?)
    }

    pub fn list_members(&self, project_id: &ProjectId) -> Result<Vec<Member>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT * FROM project_members WHERE project_id = ?1 ORDER BY joined_at, user_id",
        )?;
        let rows = stmt.query_map([project_id], Self::row_to_member)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn update_member_role(
        &self,
        project_id: &ProjectId,
        user_id: &UserId,
        role: Role,
    ) -> Result<bool> {
        Ok(self.conn.execute(
            "UPDATE project_members SET role = ?3 WHERE project_id = ?1 AND user_id = ?2",
            params![project_id, user_id, role],
        )? > 0)
    }

    pub fn delete_member(&self, project_id: &ProjectId, user_id: &UserId) -> Result<bool> {
        Ok(self.conn.execute(
            "DELETE FROM project_members WHERE project_id = ?1 AND user_id = ?2",
            params![project_id, user_id],
        )? > 0)
    }

    pub fn count_owners(&self, project_id: &ProjectId) -> Result<usize> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM project_members WHERE project_id = ?1 AND role = ?2",
            params![project_id, Role::Owner],
            |row| row.get(0),
        )?)
    }

    // =========================================================================
    // Invitations
    // =========================================================================

    fn row_to_invitation(row: &Row<'_>) -> rusqlite::Result<Invitation> {
        Ok(Invitation {
            id: row.get("id")?,
            project_id: row.get("project_id")?,
            email: row.get("email")?,
            role: row.get("role")?,
            invited_by: row.get("invited_by")?,
            status: row.get("status")?,
            created_at: row.get("created_at")?,
            responded_at: row.get("responded_at")?,
        })
    }

    pub fn insert_invitation(&self, invitation: &Invitation) -> Result<()> {
        self.conn.execute(
            "INSERT INTO invitations \
             (id, project_id, email, role, invited_by, status, created_at, responded_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                invitation.id,
                invitation.project_id,
                invitation.email,
                invitation.role,
                invitation.invited_by,
                invitation.status,
                invitation.created_at,
                invitation.responded_at,
            ],
        )?;
        Ok(())
    }

    pub fn get_invitation(&self, id: &InvitationId) -> Result<Option<Invitation>> {
        Ok(self
            .conn
            .query_row(
                "SELECT * FROM invitations WHERE id = ?1",
                [id],
                Self::row_to_invitation,
            )
            .optional()?)
    }

    pub fn list_invitations(
        &self,
        project_id: &ProjectId,
        status: Option<InvitationStatus>,
    ) -> Result<Vec<Invitation>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT * FROM invitations \
             WHERE project_id = ?1 AND (?2 IS NULL OR status = ?2) \
             ORDER BY created_at, id",
        )?;
        let rows = stmt.query_map(params![project_id, status], Self::row_to_invitation)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn find_pending_invitation(
        &self,
        project_id: &ProjectId,
        email: &str,
    ) -> Result<Option<Invitation>> {
        Ok(self
            .conn
            .query_row(
                "SELECT * FROM invitations WHERE project_id = ?1 AND email = ?2 AND status = ?3",
                params![project_id, email.trim(), InvitationStatus::Pending],
                Self::row_to_invitation,
            )
            .optional()?)
    }

    pub fn set_invitation_status(
        &self,
        id: &InvitationId,
        status: InvitationStatus,
        responded_at: DateTime<Utc>,
    ) -> Result<()> {
        self.conn.execute(
            "UPDATE invitations SET status = ?2, responded_at = ?3 WHERE id = ?1",
            params![id, status, responded_at],
        )?;
        Ok(())
    }

    // =========================================================================
    // Epics
    // =========================================================================

    fn row_to_epic(row: &Row<'_>) -> rusqlite::Result<Epic> {
        Ok(Epic {
            id: row.get("id")?,
            project_id: row.get("project_id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    pub fn insert_epic(&self, epic: &Epic) -> Result<()> {
        self.conn.execute(
            "INSERT INTO epics (id, project_id, name, description, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                epic.id,
                epic.project_id,
                epic.name,
                epic.description,
                epic.created_at,
                epic.updated_at
            ],
        )?;
        Ok(())
    }

    pub fn get_epic(&self, id: &EpicId) -> Result<Option<Epic>> {
        Ok(self
            .conn
            .query_row("SELECT * FROM epics WHERE id = ?1", [id], Self::row_to_epic)
            .optional()?)
    }

    pub fn list_epics(&self, project_id: &ProjectId) -> Result<Vec<Epic>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT * FROM epics WHERE project_id = ?1 ORDER BY created_at, id")?;
        let rows = stmt.query_map([project_id], Self::row_to_epic)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn update_epic(&self, epic: &Epic) -> Result<()> {
        self.conn.execute(
            "UPDATE epics SET name = ?2, description = ?3, updated_at = ?4 WHERE id = ?1",
            params![epic.id, epic.name, epic.description, epic.updated_at],
        )?;
        Ok(())
    }

    pub fn delete_epic(&self, id: &EpicId) -> Result<bool> {
        Ok(self.conn.execute("DELETE FROM epics WHERE id = ?1", [id])? > 0)
    }

    // =========================================================================
    // Attachments
    // =========================================================================

    fn row_to_attachment(row: &Row<'_>) -> rusqlite::Result<Attachment> {
        Ok(Attachment {
            id: row.get("id")?,
            task_id: row.get("task_id")?,
            name: row.get("name")?,
            path: row.get("path")?,
            mime_type: row.get("mime_type")?,
            size: row.get("size")?,
            uploaded_by: row.get("uploaded_by")?,
            created_at: row.get("created_at")?,
        })
    }

    pub fn insert_attachment(&self, attachment: &Attachment) -> Result<()> {
        self.conn.execute(
            "INSERT INTO attachments \
             (id, task_id, name, path, mime_type, size, uploaded_by, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                attachment.id,
                attachment.task_id,
                attachment.name,
                attachment.path,
                attachment.mime_type,
                attachment.size,
                attachment.uploaded_by,
                attachment.created_at,
            ],
        )?;
        Ok(())
    }

    pub fn get_attachment(&self, id: &AttachmentId) -> Result<Option<Attachment>> {
        Ok(self
            .conn
            .query_row(
                "SELECT * FROM attachments WHERE id = ?1",
                [id],
                Self::row_to_attachment,
            )
            .optional()?)
    }

    pub fn list_attachments(&self, task_id: &TaskId) -> Result<Vec<Attachment>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT * FROM attachments WHERE task_id = ?1 ORDER BY created_at, id",
        )?;
        let rows = stmt.query_map([task_id], Self::row_to_attachment)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn delete_attachment(&self, id: &AttachmentId) -> Result<bool> {
        Ok(self
            .conn
            .execute("DELETE FROM attachments WHERE id = ?1", [id])?
            > 0)
    }

    // =========================================================================
    // Activity
    // =========================================================================

    pub fn insert_activity(&self, entry: &LogEntry, affected: &[String]) -> Result<()> {
        self.conn.execute(
            "INSERT INTO activity (id, timestamp, op, input, output, actor, duration_ms, affected) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                entry.id,
                entry.timestamp,
                entry.op,
                serde_json::to_string(&entry.input)?,
                serde_json::to_string(&entry.output)?,
                entry.actor,
                entry.duration_ms,
                serde_json::to_string(affected)?,
            ],
        )?;
        Ok(())
    }

    /// Newest first
    pub fn list_activity(&self, limit: Option<usize>) -> Result<Vec<ActivityEntry>> {
        let limit = limit.map(|l| l as i64).unwrap_or(-1);
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, timestamp, op, input, output, actor, duration_ms, affected \
             FROM activity ORDER BY timestamp DESC, id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map([limit], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, DateTime<Utc>>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, Option<String>>(5)?,
                row.get::<_, u64>(6)?,
                row.get::<_, String>(7)?,
            ))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (id, timestamp, op, input, output, actor, duration_ms, affected) = row?;
            entries.push(ActivityEntry {
                id,
                timestamp,
                op,
                input: serde_json::from_str(&input)?,
                output: serde_json::from_str(&output)?,
                actor,
                duration_ms,
                affected: serde_json::from_str(&affected)?,
            });
        }
        Ok(entries)
    }
}
