mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::Utc;
use rusqlite::{Connection, Row};
use uuid::Uuid;

use crate::error::ProgressError;
use crate::models::*;
use crate::progress::ProgressStore;
use crate::templates::phase_template;

const PROJECT_COLUMNS: &str =
    "id, name, description, current_phase, progress_percentage, status, created_at, updated_at";

const TASK_COLUMNS: &str =
    "id, project_id, title, description, status, priority, phase, created_at, updated_at";

pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Default on-disk location under the platform data directory.
    pub fn default_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "sitetrack")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        Ok(dirs.data_dir().join("sitetrack.db"))
    }

    pub fn open_default() -> Result<Self> {
        Self::open(Self::default_path()?)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let mut conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&mut conn)
    }

    // ============================================================
    // Project operations
    // ============================================================

    pub fn get_all_projects(&self) -> Result<Vec<Project>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY name"
        ))?;

        let projects = stmt
            .query_map([], project_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(projects)
    }

    pub fn get_project(&self, id: Uuid) -> Result<Option<Project>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?"
        ))?;

        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(project_from_row(row)?)),
            None => Ok(None),
        }
    }

    pub fn create_project(&self, input: CreateProjectInput) -> Result<Project> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();
        let current_phase = input.current_phase.unwrap_or(Phase::Concept);
        let status = input.status.unwrap_or(ProjectStatus::Planning);

        conn.execute(
            "INSERT INTO projects (id, name, description, current_phase, progress_percentage, status, created_at, updated_at)
             VALUES (?, ?, ?, ?, 0, ?, ?, ?)",
            (
                id.to_string(),
                &input.name,
                &input.description,
                current_phase.as_str(),
                status.as_str(),
                now.to_rfc3339(),
                now.to_rfc3339(),
            ),
        )?;

        Ok(Project {
            id,
            name: input.name,
            description: input.description,
            current_phase,
            progress_percentage: 0,
            status,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn update_project(&self, id: Uuid, input: UpdateProjectInput) -> Result<Option<Project>> {
        let Some(existing) = self.get_project(id)? else {
            return Ok(None);
        };

        let conn = self.conn.lock().expect("database lock poisoned");
        let now = Utc::now();
        let name = input.name.unwrap_or(existing.name);
        let description = input.description.or(existing.description);
        let current_phase = input.current_phase.unwrap_or(existing.current_phase);
        let status = input.status.unwrap_or(existing.status);

        conn.execute(
            "UPDATE projects SET name = ?, description = ?, current_phase = ?, status = ?, updated_at = ? WHERE id = ?",
            (
                &name,
                &description,
                current_phase.as_str(),
                status.as_str(),
                now.to_rfc3339(),
                id.to_string(),
            ),
        )?;

        Ok(Some(Project {
            id,
            name,
            description,
            current_phase,
            progress_percentage: existing.progress_percentage,
            status,
            created_at: existing.created_at,
            updated_at: now,
        }))
    }

    pub fn delete_project(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM projects WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }

    /// Sets one column of a project row, bumping `updated_at`.
    fn set_project_column(&self, id: Uuid, column: &str, value: &dyn rusqlite::ToSql) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let sql = format!("UPDATE projects SET {column} = ?, updated_at = ? WHERE id = ?");
        let rows = conn.execute(
            &sql,
            rusqlite::params![value, Utc::now().to_rfc3339(), id.to_string()],
        )?;
        if rows == 0 {
            return Err(ProgressError::ProjectNotFound(id).into());
        }
        Ok(())
    }

    // ============================================================
    // Task operations
    // ============================================================

    pub fn get_task(&self, id: Uuid) -> Result<Option<Task>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?"))?;

        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(task_from_row(row)?)),
            None => Ok(None),
        }
    }

    pub fn get_tasks_by_project(&self, project_id: Uuid) -> Result<Vec<Task>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE project_id = ? ORDER BY created_at, rowid"
        ))?;

        let tasks = stmt
            .query_map([project_id.to_string()], task_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(tasks)
    }

    pub fn get_tasks_by_phase(&self, project_id: Uuid, phase: Phase) -> Result<Vec<Task>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE project_id = ? AND phase = ? ORDER BY created_at, rowid"
        ))?;

        let tasks = stmt
            .query_map((project_id.to_string(), phase.as_str()), task_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(tasks)
    }

    pub fn create_task(&self, project_id: Uuid, input: CreateTaskInput) -> Result<Task> {
        // Verify project exists
        self.get_project(project_id)?
            .ok_or(ProgressError::ProjectNotFound(project_id))?;

        let conn = self.conn.lock().expect("database lock poisoned");
        insert_task(&conn, project_id, input)
    }

    /// Seeds `phase` with its default tasks. Returns the created tasks.
    pub fn apply_phase_template(&self, project_id: Uuid, phase: Phase) -> Result<Vec<Task>> {
        self.get_project(project_id)?
            .ok_or(ProgressError::ProjectNotFound(project_id))?;

        let mut conn = self.conn.lock().expect("database lock poisoned");
        let tx = conn.transaction()?;
        let mut tasks = Vec::new();
        for template in phase_template(phase) {
            tasks.push(insert_task(
                &tx,
                project_id,
                CreateTaskInput {
                    title: template.title.to_string(),
                    description: None,
                    status: None,
                    priority: Some(template.priority),
                    phase: Some(phase),
                },
            )?);
        }
        tx.commit()?;

        tracing::debug!(
            "Applied {} template ({} tasks) to project {}",
            phase,
            tasks.len(),
            project_id
        );
        Ok(tasks)
    }

    pub fn update_task(&self, id: Uuid, input: UpdateTaskInput) -> Result<Option<Task>> {
        let Some(existing) = self.get_task(id)? else {
            return Ok(None);
        };

        let conn = self.conn.lock().expect("database lock poisoned");
        let now = Utc::now();
        let title = input.title.unwrap_or(existing.title);
        let description = input.description.or(existing.description);
        let status = input.status.unwrap_or(existing.status);
        let priority = input.priority.or(existing.priority);
        let phase = input.phase.or(existing.phase);

        conn.execute(
            "UPDATE tasks SET title = ?, description = ?, status = ?, priority = ?, phase = ?, updated_at = ? WHERE id = ?",
            (
                &title,
                &description,
                status.as_str(),
                priority.map(|p| p.as_str()),
                phase.map(|p| p.as_str()),
                now.to_rfc3339(),
                id.to_string(),
            ),
        )?;

        Ok(Some(Task {
            id,
            project_id: existing.project_id,
            title,
            description,
            status,
            priority,
            phase,
            created_at: existing.created_at,
            updated_at: now,
        }))
    }

    pub fn delete_task(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM tasks WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }

    // ============================================================
    // Progress history operations
    // ============================================================

    pub fn create_progress_entry(&self, project_id: Uuid, progress: u8) -> Result<ProgressEntry> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO progress_entries (id, project_id, progress_percentage, created_at)
             VALUES (?, ?, ?, ?)",
            (
                id.to_string(),
                project_id.to_string(),
                progress,
                now.to_rfc3339(),
            ),
        )?;

        Ok(ProgressEntry {
            id,
            project_id,
            progress_percentage: progress,
            created_at: now,
        })
    }

    /// Progress history for a project, newest first.
    pub fn get_progress_history(&self, project_id: Uuid) -> Result<Vec<ProgressEntry>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, project_id, progress_percentage, created_at
             FROM progress_entries WHERE project_id = ? ORDER BY created_at DESC, rowid DESC",
        )?;

        let entries = stmt
            .query_map([project_id.to_string()], |row| {
                Ok(ProgressEntry {
                    id: parse_uuid(row.get::<_, String>(0)?),
                    project_id: parse_uuid(row.get::<_, String>(1)?),
                    progress_percentage: parse_percentage(row.get(2)?),
                    created_at: parse_datetime(row.get::<_, String>(3)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    // ============================================================
    // Activity operations
    // ============================================================

    pub fn create_activity(&self, input: CreateActivityInput) -> Result<Activity> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();
        let metadata = if input.metadata.is_null() {
            serde_json::json!({})
        } else {
            input.metadata
        };

        conn.execute(
            "INSERT INTO activities (id, project_id, type, description, metadata, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            (
                id.to_string(),
                input.project_id.to_string(),
                input.activity_type.as_str(),
                &input.description,
                serde_json::to_string(&metadata)?,
                now.to_rfc3339(),
            ),
        )?;

        Ok(Activity {
            id,
            project_id: input.project_id,
            activity_type: input.activity_type,
            description: input.description,
            metadata,
            created_at: now,
        })
    }

    /// Activity log for a project, newest first.
    pub fn get_activities(&self, project_id: Uuid) -> Result<Vec<Activity>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, project_id, type, description, metadata, created_at
             FROM activities WHERE project_id = ? ORDER BY created_at DESC, rowid DESC",
        )?;

        let entries = stmt
            .query_map([project_id.to_string()], |row| {
                let metadata_json: String = row.get(4)?;
                let metadata = serde_json::from_str(&metadata_json)
                    .unwrap_or_else(|_| serde_json::json!({}));

                Ok(Activity {
                    id: parse_uuid(row.get::<_, String>(0)?),
                    project_id: parse_uuid(row.get::<_, String>(1)?),
                    activity_type: ActivityType::from_str(&row.get::<_, String>(2)?)
                        .unwrap_or(ActivityType::TaskStatusChange),
                    description: row.get(3)?,
                    metadata,
                    created_at: parse_datetime(row.get::<_, String>(5)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

impl ProgressStore for Database {
    fn get_project(&self, id: Uuid) -> Result<Option<Project>> {
        Database::get_project(self, id)
    }

    fn get_tasks_by_phase(&self, project_id: Uuid, phase: Phase) -> Result<Vec<Task>> {
        Database::get_tasks_by_phase(self, project_id, phase)
    }

    fn set_current_phase(&self, project_id: Uuid, phase: Phase) -> Result<()> {
        self.set_project_column(project_id, "current_phase", &phase.as_str())
    }

    fn set_progress_percentage(&self, project_id: Uuid, progress: u8) -> Result<()> {
        self.set_project_column(project_id, "progress_percentage", &progress)
    }

    fn set_project_status(&self, project_id: Uuid, status: ProjectStatus) -> Result<()> {
        self.set_project_column(project_id, "status", &status.as_str())
    }

    fn create_progress_entry(&self, project_id: Uuid, progress: u8) -> Result<ProgressEntry> {
        Database::create_progress_entry(self, project_id, progress)
    }

    fn create_activity(&self, input: CreateActivityInput) -> Result<Activity> {
        Database::create_activity(self, input)
    }
}

fn insert_task(conn: &Connection, project_id: Uuid, input: CreateTaskInput) -> Result<Task> {
    let id = Uuid::new_v4();
    let now = Utc::now();
    let status = input.status.unwrap_or(TaskStatus::Pending);

    conn.execute(
        "INSERT INTO tasks (id, project_id, title, description, status, priority, phase, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        (
            id.to_string(),
            project_id.to_string(),
            &input.title,
            &input.description,
            status.as_str(),
            input.priority.map(|p| p.as_str()),
            input.phase.map(|p| p.as_str()),
            now.to_rfc3339(),
            now.to_rfc3339(),
        ),
    )?;

    Ok(Task {
        id,
        project_id,
        title: input.title,
        description: input.description,
        status,
        priority: input.priority,
        phase: input.phase,
        created_at: now,
        updated_at: now,
    })
}

fn project_from_row(row: &Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        id: parse_uuid(row.get::<_, String>(0)?),
        name: row.get(1)?,
        description: row.get(2)?,
        current_phase: Phase::from_str(&row.get::<_, String>(3)?).unwrap_or(Phase::Concept),
        progress_percentage: parse_percentage(row.get(4)?),
        status: ProjectStatus::from_str(&row.get::<_, String>(5)?)
            .unwrap_or(ProjectStatus::Planning),
        created_at: parse_datetime(row.get::<_, String>(6)?),
        updated_at: parse_datetime(row.get::<_, String>(7)?),
    })
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: parse_uuid(row.get::<_, String>(0)?),
        project_id: parse_uuid(row.get::<_, String>(1)?),
        title: row.get(2)?,
        description: row.get(3)?,
        status: TaskStatus::from_str(&row.get::<_, String>(4)?).unwrap_or(TaskStatus::Pending),
        priority: row
            .get::<_, Option<String>>(5)?
            .and_then(|p| TaskPriority::from_str(&p)),
        phase: row
            .get::<_, Option<String>>(6)?
            .and_then(|p| Phase::from_str(&p)),
        created_at: parse_datetime(row.get::<_, String>(7)?),
        updated_at: parse_datetime(row.get::<_, String>(8)?),
    })
}

fn parse_uuid(s: String) -> Uuid {
    Uuid::parse_str(&s).unwrap_or_else(|_| Uuid::nil())
}

fn parse_percentage(value: i64) -> u8 {
    value.clamp(0, 100) as u8
}

fn parse_datetime(s: String) -> chrono::DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
