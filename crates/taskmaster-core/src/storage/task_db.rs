//! SQLite-backed task store.
//!
//! Persists tasks and a small key-value area for application state (the
//! signed-in session). The schema is migrated on open. Notification flags
//! are stored as one column per alert so the monitor's write-back is a
//! single-column update, never a read-modify-write of the whole row.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::Mutex;

use crate::deadline::TaskStore;
use crate::error::{DatabaseError, Result};
use crate::task::{AlertKind, Category, NotifiedFlags, Priority, Task};

use super::data_dir;

/// SQLite database for task storage.
pub struct TaskDb {
    conn: Mutex<Connection>,
}

impl TaskDb {
    /// Open the database at `~/.config/taskmaster/taskmaster.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("taskmaster.db");
        Self::open_at(&path)
    }

    /// Open the database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS tasks (
                id                  TEXT PRIMARY KEY,
                owner_id            TEXT NOT NULL,
                description         TEXT NOT NULL,
                due_date            TEXT,
                due_time            TEXT,
                priority            TEXT NOT NULL DEFAULT 'medium',
                category            TEXT NOT NULL DEFAULT 'personal',
                notified_hour       INTEGER NOT NULL DEFAULT 0,
                notified_thirty_min INTEGER NOT NULL DEFAULT 0,
                notified_overdue    INTEGER NOT NULL DEFAULT 0,
                created_at          TEXT NOT NULL,
                updated_at          TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_tasks_owner ON tasks(owner_id);

            CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )
        .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(())
    }

    // ── Task CRUD ────────────────────────────────────────────────────

    /// Insert a new task.
    ///
    /// # Errors
    /// Returns a validation error for an empty description or owner, or a
    /// database error if the insert fails.
    pub fn create_task(&self, task: &Task) -> Result<()> {
        task.validate()?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO tasks (id, owner_id, description, due_date, due_time, priority,
                                category, notified_hour, notified_thirty_min, notified_overdue,
                                created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                task.id,
                task.owner_id,
                task.description,
                task.due_date.map(|d| d.format("%Y-%m-%d").to_string()),
                task.due_time.map(|t| t.format("%H:%M:%S").to_string()),
                task.priority.to_string(),
                task.category.to_string(),
                task.notified.hour as i32,
                task.notified.thirty_min as i32,
                task.notified.overdue as i32,
                task.created_at.to_rfc3339(),
                task.updated_at.to_rfc3339(),
            ],
        )
        .map_err(DatabaseError::from)?;
        Ok(())
    }

    /// Fetch a task by id.
    pub fn get_task(&self, id: &str) -> Result<Option<Task>> {
        let conn = self.conn.lock().unwrap();
        let task = conn
            .query_row("SELECT * FROM tasks WHERE id = ?1", params![id], row_to_task)
            .optional()
            .map_err(DatabaseError::from)?;
        Ok(task)
    }

    /// Update a task's user-editable fields.
    ///
    /// The stored notification flags are preserved -- the monitor is their
    /// only writer -- unless the edit changes the due date or time, in which
    /// case they reset so alerts re-arm for the new deadline. `updated_at`
    /// is stamped by the store. Returns the task as persisted.
    ///
    /// # Errors
    /// Returns `NotFound` if the id does not exist.
    pub fn update_task(&self, task: &Task) -> Result<Task> {
        task.validate()?;
        let existing = self
            .get_task(&task.id)?
            .ok_or_else(|| DatabaseError::NotFound(task.id.clone()))?;

        let due_changed =
            existing.due_date != task.due_date || existing.due_time != task.due_time;
        let notified = if due_changed {
            NotifiedFlags::default()
        } else {
            existing.notified
        };
        let updated_at = Utc::now();

        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE tasks SET description = ?2, due_date = ?3, due_time = ?4, priority = ?5,
                              category = ?6, notified_hour = ?7, notified_thirty_min = ?8,
                              notified_overdue = ?9, updated_at = ?10
             WHERE id = ?1",
            params![
                task.id,
                task.description,
                task.due_date.map(|d| d.format("%Y-%m-%d").to_string()),
                task.due_time.map(|t| t.format("%H:%M:%S").to_string()),
                task.priority.to_string(),
                task.category.to_string(),
                notified.hour as i32,
                notified.thirty_min as i32,
                notified.overdue as i32,
                updated_at.to_rfc3339(),
            ],
        )
        .map_err(DatabaseError::from)?;

        Ok(Task {
            notified,
            updated_at,
            created_at: existing.created_at,
            ..task.clone()
        })
    }

    /// Delete a task by id.
    ///
    /// # Errors
    /// Returns `NotFound` if the id does not exist.
    pub fn delete_task(&self, id: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let affected = conn
            .execute("DELETE FROM tasks WHERE id = ?1", params![id])
            .map_err(DatabaseError::from)?;
        if affected == 0 {
            return Err(DatabaseError::NotFound(id.to_string()).into());
        }
        Ok(())
    }

    /// All of one owner's tasks in insertion order.
    pub fn list_tasks(&self, owner_id: &str) -> Result<Vec<Task>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT * FROM tasks WHERE owner_id = ?1 ORDER BY rowid")
            .map_err(DatabaseError::from)?;
        let tasks = stmt
            .query_map(params![owner_id], row_to_task)
            .map_err(DatabaseError::from)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(DatabaseError::from)?;
        Ok(tasks)
    }

    // ── Session state ────────────────────────────────────────────────

    /// Record the signed-in owner.
    pub fn set_session_owner(&self, owner_id: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO kv (key, value) VALUES ('session.owner', ?1)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![owner_id],
        )
        .map_err(DatabaseError::from)?;
        Ok(())
    }

    /// The signed-in owner, if any.
    pub fn session_owner(&self) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap();
        let owner = conn
            .query_row(
                "SELECT value FROM kv WHERE key = 'session.owner'",
                [],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(DatabaseError::from)?;
        Ok(owner)
    }

    /// Sign out.
    pub fn clear_session(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM kv WHERE key = 'session.owner'", [])
            .map_err(DatabaseError::from)?;
        Ok(())
    }

    #[cfg(test)]
    fn raw_execute(&self, sql: &str) {
        self.conn.lock().unwrap().execute_batch(sql).unwrap();
    }
}

impl TaskStore for TaskDb {
    fn list(&self, owner_id: &str) -> Result<Vec<Task>> {
        self.list_tasks(owner_id)
    }

    fn mark_notified(&self, task_id: &str, kind: AlertKind) -> Result<()> {
        let column = match kind {
            AlertKind::Hour => "notified_hour",
            AlertKind::ThirtyMin => "notified_thirty_min",
            AlertKind::Overdue => "notified_overdue",
        };
        let conn = self.conn.lock().unwrap();
        let affected = conn
            .execute(
                &format!("UPDATE tasks SET {column} = 1, updated_at = ?2 WHERE id = ?1"),
                params![task_id, Utc::now().to_rfc3339()],
            )
            .map_err(DatabaseError::from)?;
        if affected == 0 {
            return Err(DatabaseError::NotFound(task_id.to_string()).into());
        }
        Ok(())
    }
}

fn row_to_task(row: &Row<'_>) -> rusqlite::Result<Task> {
    let due_date: Option<String> = row.get("due_date")?;
    let due_time: Option<String> = row.get("due_time")?;
    let priority: String = row.get("priority")?;
    let category: String = row.get("category")?;
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;

    Ok(Task {
        id: row.get("id")?,
        owner_id: row.get("owner_id")?,
        description: row.get("description")?,
        // Unparseable due fields degrade to "no deadline" instead of
        // failing the whole row; a bad record must not crash a tick.
        due_date: due_date.and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()),
        due_time: due_time.and_then(|s| parse_due_time(&s)),
        priority: priority.parse::<Priority>().unwrap_or_default(),
        category: category.parse::<Category>().unwrap_or_default(),
        notified: NotifiedFlags {
            hour: row.get::<_, i32>("notified_hour")? != 0,
            thirty_min: row.get::<_, i32>("notified_thirty_min")? != 0,
            overdue: row.get::<_, i32>("notified_overdue")? != 0,
        },
        created_at: parse_timestamp(&created_at),
        updated_at: parse_timestamp(&updated_at),
    })
}

fn parse_due_time(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .ok()
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deadline::{classify, Tier};

    fn sample_task(owner: &str, description: &str) -> Task {
        Task::new(owner, description).with_deadline(
            NaiveDate::from_ymd_opt(2024, 5, 20).unwrap(),
            NaiveTime::from_hms_opt(14, 30, 0).unwrap(),
        )
    }

    #[test]
    fn create_and_get_round_trip() {
        let db = TaskDb::open_memory().unwrap();
        let task = sample_task("user-1", "water plants");
        db.create_task(&task).unwrap();

        let loaded = db.get_task(&task.id).unwrap().unwrap();
        assert_eq!(loaded.description, "water plants");
        assert_eq!(loaded.deadline(), task.deadline());
        assert_eq!(loaded.priority, Priority::Medium);
        assert!(!loaded.notified.any());
    }

    #[test]
    fn create_rejects_empty_description() {
        let db = TaskDb::open_memory().unwrap();
        let task = Task::new("user-1", "   ");
        assert!(db.create_task(&task).is_err());
    }

    #[test]
    fn list_is_owner_scoped_and_insertion_ordered() {
        let db = TaskDb::open_memory().unwrap();
        db.create_task(&Task::new("alice", "first")).unwrap();
        db.create_task(&Task::new("bob", "intruder")).unwrap();
        db.create_task(&Task::new("alice", "second")).unwrap();

        let tasks = db.list_tasks("alice").unwrap();
        let names: Vec<_> = tasks.iter().map(|t| t.description.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn mark_notified_sets_one_flag_at_a_time() {
        let db = TaskDb::open_memory().unwrap();
        let task = sample_task("user-1", "submit report");
        db.create_task(&task).unwrap();

        db.mark_notified(&task.id, AlertKind::Hour).unwrap();
        let loaded = db.get_task(&task.id).unwrap().unwrap();
        assert!(loaded.notified.hour);
        assert!(!loaded.notified.thirty_min);

        db.mark_notified(&task.id, AlertKind::ThirtyMin).unwrap();
        let loaded = db.get_task(&task.id).unwrap().unwrap();
        assert!(loaded.notified.hour && loaded.notified.thirty_min);
    }

    #[test]
    fn mark_notified_unknown_task_is_not_found() {
        let db = TaskDb::open_memory().unwrap();
        assert!(db.mark_notified("missing", AlertKind::Hour).is_err());
    }

    #[test]
    fn due_edit_resets_flags() {
        let db = TaskDb::open_memory().unwrap();
        let task = sample_task("user-1", "pay rent");
        db.create_task(&task).unwrap();
        db.mark_notified(&task.id, AlertKind::Hour).unwrap();

        let mut edited = db.get_task(&task.id).unwrap().unwrap();
        edited.due_time = Some(NaiveTime::from_hms_opt(18, 0, 0).unwrap());
        let stored = db.update_task(&edited).unwrap();

        assert!(!stored.notified.any(), "deadline changed, alerts re-arm");
        assert!(!db.get_task(&task.id).unwrap().unwrap().notified.any());
    }

    #[test]
    fn non_due_edit_preserves_flags() {
        let db = TaskDb::open_memory().unwrap();
        let task = sample_task("user-1", "pay rent");
        db.create_task(&task).unwrap();
        db.mark_notified(&task.id, AlertKind::Hour).unwrap();

        let mut edited = db.get_task(&task.id).unwrap().unwrap();
        edited.description = "pay rent online".to_string();
        edited.priority = Priority::High;
        // Even if the caller hands in cleared flags, the stored ones win.
        edited.notified = NotifiedFlags::default();
        let stored = db.update_task(&edited).unwrap();

        assert!(stored.notified.hour, "flags belong to the monitor");
    }

    #[test]
    fn update_missing_task_is_not_found() {
        let db = TaskDb::open_memory().unwrap();
        let ghost = sample_task("user-1", "ghost");
        assert!(db.update_task(&ghost).is_err());
    }

    #[test]
    fn delete_removes_and_reports_missing() {
        let db = TaskDb::open_memory().unwrap();
        let task = Task::new("user-1", "old item");
        db.create_task(&task).unwrap();

        db.delete_task(&task.id).unwrap();
        assert!(db.get_task(&task.id).unwrap().is_none());
        assert!(db.delete_task(&task.id).is_err());
    }

    #[test]
    fn malformed_due_fields_degrade_to_no_deadline() {
        let db = TaskDb::open_memory().unwrap();
        let task = sample_task("user-1", "corrupted");
        db.create_task(&task).unwrap();
        db.raw_execute(&format!(
            "UPDATE tasks SET due_date = 'next tuesday' WHERE id = '{}'",
            task.id
        ));

        let loaded = db.get_task(&task.id).unwrap().unwrap();
        assert!(loaded.deadline().is_none());
        assert_eq!(
            classify(&loaded, Utc::now()).tier,
            Tier::NoDeadline,
            "bad record is exempt, not fatal"
        );
    }

    #[test]
    fn due_time_accepts_minutes_only() {
        assert_eq!(
            parse_due_time("09:30"),
            NaiveTime::from_hms_opt(9, 30, 0)
        );
        assert_eq!(
            parse_due_time("09:30:15"),
            NaiveTime::from_hms_opt(9, 30, 15)
        );
        assert_eq!(parse_due_time("soonish"), None);
    }

    #[test]
    fn session_lifecycle() {
        let db = TaskDb::open_memory().unwrap();
        assert!(db.session_owner().unwrap().is_none());

        db.set_session_owner("alice").unwrap();
        assert_eq!(db.session_owner().unwrap().as_deref(), Some("alice"));

        db.set_session_owner("bob").unwrap();
        assert_eq!(db.session_owner().unwrap().as_deref(), Some("bob"));

        db.clear_session().unwrap();
        assert!(db.session_owner().unwrap().is_none());
    }
}
