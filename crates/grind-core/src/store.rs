//! External task store collaborators.
//!
//! The tracker only depends on the [`TaskStore`] trait. The store owns
//! mission documents; the core trusts its latest `update` eventually
//! applying and assumes nothing else. Three implementations:
//!
//! - [`HttpTaskStore`]: REST document store over reqwest.
//! - [`SqliteTaskStore`]: local SQLite fallback used by the CLI when no
//!   remote endpoint is configured.
//! - [`MemoryTaskStore`]: in-memory, for tests.

use std::sync::Mutex;

use chrono::NaiveDate;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use crate::error::{StorageError, StoreError};
use crate::task::Task;

/// Fields for a mission the store has not assigned an id to yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    pub is_urgent: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
    pub total_duration: u64,
    pub today_duration: u64,
    pub last_updated: NaiveDate,
}

impl NewTask {
    pub fn new(title: String, is_urgent: bool, deadline: Option<NaiveDate>, today: NaiveDate) -> Self {
        Self {
            title,
            is_urgent,
            deadline,
            total_duration: 0,
            today_duration: 0,
            last_updated: today,
        }
    }

    /// Materialize the task once the store has assigned an id.
    pub fn into_task(self, id: String) -> Task {
        Task {
            id,
            title: self.title,
            is_urgent: self.is_urgent,
            deadline: self.deadline,
            total_duration: self.total_duration,
            today_duration: self.today_duration,
            last_updated: self.last_updated,
        }
    }
}

/// Partial update for a mission document. `None` fields are left as-is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_duration: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub today_duration: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<NaiveDate>,
}

impl TaskPatch {
    /// Patch carrying a mission's current counters.
    pub fn counters(task: &Task) -> Self {
        Self {
            total_duration: Some(task.total_duration),
            today_duration: Some(task.today_duration),
            last_updated: Some(task.last_updated),
        }
    }

    /// Patch for a day rollover.
    pub fn rollover(today: NaiveDate) -> Self {
        Self {
            total_duration: None,
            today_duration: Some(0),
            last_updated: Some(today),
        }
    }
}

/// Contract required of the external mission store.
///
/// No ordering or transactional guarantees beyond eventual application
/// of the latest update.
pub trait TaskStore: Send + Sync {
    fn list_all(&self) -> Result<Vec<Task>, StoreError>;
    /// Create a mission; the store assigns and returns its id.
    fn create(&self, fields: &NewTask) -> Result<String, StoreError>;
    fn update(&self, id: &str, patch: &TaskPatch) -> Result<(), StoreError>;
    fn delete(&self, id: &str) -> Result<(), StoreError>;
}

// ── HTTP store ───────────────────────────────────────────────────────

/// REST document store client.
///
/// `GET /tasks`, `POST /tasks` (returns `{"id": ...}`),
/// `PATCH /tasks/{id}`, `DELETE /tasks/{id}`.
pub struct HttpTaskStore {
    base_url: String,
    client: reqwest::Client,
    runtime: tokio::runtime::Runtime,
}

impl HttpTaskStore {
    /// # Errors
    /// Returns an error if the internal runtime cannot be started.
    pub fn new(base_url: impl Into<String>) -> Result<Self, StoreError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(StoreError::Runtime)?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            runtime,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl TaskStore for HttpTaskStore {
    fn list_all(&self) -> Result<Vec<Task>, StoreError> {
        let url = self.url("/tasks");
        self.runtime.block_on(async {
            let tasks = self
                .client
                .get(&url)
                .send()
                .await?
                .error_for_status()?
                .json::<Vec<Task>>()
                .await?;
            Ok(tasks)
        })
    }

    fn create(&self, fields: &NewTask) -> Result<String, StoreError> {
        let url = self.url("/tasks");
        self.runtime.block_on(async {
            let body: serde_json::Value = self
                .client
                .post(&url)
                .json(fields)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            body["id"]
                .as_str()
                .map(str::to_owned)
                .ok_or(StoreError::MissingId)
        })
    }

    fn update(&self, id: &str, patch: &TaskPatch) -> Result<(), StoreError> {
        let url = self.url(&format!("/tasks/{id}"));
        self.runtime.block_on(async {
            self.client
                .patch(&url)
                .json(patch)
                .send()
                .await?
                .error_for_status()?;
            Ok(())
        })
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        let url = self.url(&format!("/tasks/{id}"));
        self.runtime.block_on(async {
            self.client
                .delete(&url)
                .send()
                .await?
                .error_for_status()?;
            Ok(())
        })
    }
}

// ── SQLite store ─────────────────────────────────────────────────────

/// Local SQLite-backed mission store.
///
/// Implements the same collaborator contract against the local database,
/// so the CLI works without a remote endpoint.
pub struct SqliteTaskStore {
    conn: Mutex<Connection>,
}

impl SqliteTaskStore {
    /// Open the store inside `~/.config/grind/grind.db`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StorageError> {
        let path = crate::storage::data_dir()?.join("grind.db");
        let conn = Connection::open(&path).map_err(|source| StorageError::OpenFailed {
            path: path.clone(),
            source,
        })?;
        Self::with_conn(conn)
    }

    /// In-memory store (for tests).
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(|source| StorageError::OpenFailed {
            path: ":memory:".into(),
            source,
        })?;
        Self::with_conn(conn)
    }

    fn with_conn(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS tasks (
                id             TEXT PRIMARY KEY,
                title          TEXT NOT NULL,
                is_urgent      INTEGER NOT NULL DEFAULT 0,
                deadline       TEXT,
                total_duration INTEGER NOT NULL DEFAULT 0,
                today_duration INTEGER NOT NULL DEFAULT 0,
                last_updated   TEXT NOT NULL
            );",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn row_to_task(row: &rusqlite::Row<'_>) -> rusqlite::Result<Task> {
        let deadline: Option<String> = row.get(3)?;
        let last_updated: String = row.get(6)?;
        Ok(Task {
            id: row.get(0)?,
            title: row.get(1)?,
            is_urgent: row.get::<_, i64>(2)? != 0,
            deadline: deadline.and_then(|d| d.parse().ok()),
            total_duration: row.get::<_, i64>(4)? as u64,
            today_duration: row.get::<_, i64>(5)? as u64,
            last_updated: last_updated.parse().unwrap_or_default(),
        })
    }
}

impl TaskStore for SqliteTaskStore {
    fn list_all(&self) -> Result<Vec<Task>, StoreError> {
        let conn = self.conn.lock().map_err(poisoned)?;
        let mut stmt = conn
            .prepare(
                "SELECT id, title, is_urgent, deadline, total_duration, today_duration,
                        last_updated
                 FROM tasks",
            )
            .map_err(sqlite_err)?;
        let tasks = stmt
            .query_map([], Self::row_to_task)
            .map_err(sqlite_err)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(sqlite_err)?;
        Ok(tasks)
    }

    fn create(&self, fields: &NewTask) -> Result<String, StoreError> {
        let id = uuid::Uuid::new_v4().to_string();
        let task = fields.clone().into_task(id.clone());
        let conn = self.conn.lock().map_err(poisoned)?;
        conn.execute(
            "INSERT INTO tasks (id, title, is_urgent, deadline, total_duration,
                                today_duration, last_updated)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                task.id,
                task.title,
                task.is_urgent as i64,
                task.deadline.map(|d| d.to_string()),
                task.total_duration as i64,
                task.today_duration as i64,
                task.last_updated.to_string(),
            ],
        )
        .map_err(sqlite_err)?;
        Ok(id)
    }

    fn update(&self, id: &str, patch: &TaskPatch) -> Result<(), StoreError> {
        let conn = self.conn.lock().map_err(poisoned)?;
        if let Some(total) = patch.total_duration {
            conn.execute(
                "UPDATE tasks SET total_duration = ?1 WHERE id = ?2",
                params![total as i64, id],
            )
            .map_err(sqlite_err)?;
        }
        if let Some(today) = patch.today_duration {
            conn.execute(
                "UPDATE tasks SET today_duration = ?1 WHERE id = ?2",
                params![today as i64, id],
            )
            .map_err(sqlite_err)?;
        }
        if let Some(date) = patch.last_updated {
            conn.execute(
                "UPDATE tasks SET last_updated = ?1 WHERE id = ?2",
                params![date.to_string(), id],
            )
            .map_err(sqlite_err)?;
        }
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock().map_err(poisoned)?;
        conn.execute("DELETE FROM tasks WHERE id = ?1", params![id])
            .map_err(sqlite_err)?;
        Ok(())
    }
}

fn sqlite_err(e: rusqlite::Error) -> StoreError {
    StoreError::UnexpectedResponse(e.to_string())
}

fn poisoned<T>(e: std::sync::PoisonError<T>) -> StoreError {
    StoreError::UnexpectedResponse(format!("lock failed: {e}"))
}

// ── In-memory store ──────────────────────────────────────────────────

/// In-memory mission store for tests.
#[derive(Default)]
pub struct MemoryTaskStore {
    tasks: Mutex<Vec<Task>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed a mission (tests).
    pub fn seed(&self, task: Task) {
        self.tasks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(task);
    }
}

impl TaskStore for MemoryTaskStore {
    fn list_all(&self) -> Result<Vec<Task>, StoreError> {
        Ok(self.tasks.lock().map_err(poisoned)?.clone())
    }

    fn create(&self, fields: &NewTask) -> Result<String, StoreError> {
        let id = uuid::Uuid::new_v4().to_string();
        let task = fields.clone().into_task(id.clone());
        self.tasks.lock().map_err(poisoned)?.push(task);
        Ok(id)
    }

    fn update(&self, id: &str, patch: &TaskPatch) -> Result<(), StoreError> {
        let mut tasks = self.tasks.lock().map_err(poisoned)?;
        if let Some(task) = tasks.iter_mut().find(|t| t.id == id) {
            if let Some(total) = patch.total_duration {
                task.total_duration = total;
            }
            if let Some(today) = patch.today_duration {
                task.today_duration = today;
            }
            if let Some(date) = patch.last_updated {
                task.last_updated = date;
            }
        }
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.tasks.lock().map_err(poisoned)?.retain(|t| t.id != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn today() -> NaiveDate {
        "2026-08-25".parse().unwrap()
    }

    #[test]
    fn sqlite_store_roundtrip() {
        let store = SqliteTaskStore::open_memory().unwrap();
        let id = store
            .create(&NewTask::new("deep work".into(), true, Some(today()), today()))
            .unwrap();

        let tasks = store.list_all().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, id);
        assert_eq!(tasks[0].title, "deep work");
        assert!(tasks[0].is_urgent);
        assert_eq!(tasks[0].deadline, Some(today()));

        store
            .update(
                &id,
                &TaskPatch {
                    total_duration: Some(120),
                    today_duration: Some(60),
                    last_updated: Some(today()),
                },
            )
            .unwrap();
        let tasks = store.list_all().unwrap();
        assert_eq!(tasks[0].total_duration, 120);
        assert_eq!(tasks[0].today_duration, 60);

        store.delete(&id).unwrap();
        assert!(store.list_all().unwrap().is_empty());
    }

    #[test]
    fn patch_serializes_only_set_fields() {
        let patch = TaskPatch::rollover(today());
        let json = serde_json::to_value(&patch).unwrap();
        assert!(json.get("totalDuration").is_none());
        assert_eq!(json["todayDuration"], 0);
        assert_eq!(json["lastUpdated"], "2026-08-25");
    }

    #[test]
    fn http_store_lists_tasks() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/tasks")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[{"id":"a1","title":"write","isUrgent":false,
                     "totalDuration":10,"todayDuration":5,
                     "lastUpdated":"2026-08-25"}]"#,
            )
            .create();

        let store = HttpTaskStore::new(server.url()).unwrap();
        let tasks = store.list_all().unwrap();
        mock.assert();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, "a1");
        assert_eq!(tasks[0].today_duration, 5);
    }

    #[test]
    fn http_store_creates_and_returns_id() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/tasks")
            .match_header("content-type", "application/json")
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"fresh-id"}"#)
            .create();

        let store = HttpTaskStore::new(server.url()).unwrap();
        let id = store
            .create(&NewTask::new("write".into(), false, None, today()))
            .unwrap();
        mock.assert();
        assert_eq!(id, "fresh-id");
    }

    #[test]
    fn http_store_patches_counters() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("PATCH", "/tasks/a1")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "todayDuration": 0,
                "lastUpdated": "2026-08-25"
            })))
            .with_status(200)
            .create();

        let store = HttpTaskStore::new(server.url()).unwrap();
        store.update("a1", &TaskPatch::rollover(today())).unwrap();
        mock.assert();
    }

    #[test]
    fn http_store_surfaces_server_errors() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("DELETE", "/tasks/a1")
            .with_status(500)
            .create();

        let store = HttpTaskStore::new(server.url()).unwrap();
        assert!(store.delete("a1").is_err());
    }
}
