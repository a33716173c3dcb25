use crate::deadline::Deadline;
use crate::error::{ServiceError, ServiceResult};
use crate::types::{Rate, StoredRate};
use log::{debug, info, warn};
use rusqlite::{params, Connection, InterruptHandle, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS cotacoes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    bid TEXT,
    timestamp DATETIME DEFAULT CURRENT_TIMESTAMP
)";
const INSERT_RATE: &str = "INSERT INTO cotacoes (bid) VALUES (?1)";
const SELECT_LATEST: &str = "SELECT id, bid, timestamp FROM cotacoes ORDER BY id DESC LIMIT 1";
const COUNT_ROWS: &str = "SELECT COUNT(*) FROM cotacoes";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Queued,
    Running,
    Done,
    Abandoned,
}

/// Process-wide SQLite handle. Writers serialize on the mutex and on SQLite's
/// own locking; the connection closes when the last owner drops the store.
pub struct RateStore {
    conn: Arc<Mutex<Connection>>,
    interrupt: InterruptHandle,
}

impl RateStore {
    pub fn open(path: &Path) -> rusqlite::Result<Self> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            if let Err(e) = std::fs::create_dir_all(dir) {
                warn!("unable to create database directory {}: {}", dir.display(), e);
            }
        }
        let conn = Connection::open(path)?;
        info!("opened database at {}", path.display());
        Self::init(conn)
    }

    pub fn open_in_memory() -> rusqlite::Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> rusqlite::Result<Self> {
        conn.execute(CREATE_TABLE, [])?;
        let interrupt = conn.get_interrupt_handle();
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            interrupt,
        })
    }

    /// Insert one row under `deadline`.
    ///
    /// The write runs on the blocking pool. On expiry the call returns without
    /// joining the task; a statement already executing is interrupted, and one
    /// still queued behind another writer never starts.
    pub async fn save(&self, rate: &Rate, deadline: Deadline) -> ServiceResult<()> {
        let conn = Arc::clone(&self.conn);
        let phase = Arc::new(Mutex::new(Phase::Queued));
        let task_phase = Arc::clone(&phase);
        let bid = rate.bid.clone();
        let task = tokio::task::spawn_blocking(move || -> Result<i64, String> {
            let conn = conn
                .lock()
                .map_err(|_| "connection lock poisoned".to_string())?;
            {
                let mut p = task_phase
                    .lock()
                    .map_err(|_| "phase lock poisoned".to_string())?;
                if *p == Phase::Abandoned || deadline.is_expired() {
                    return Err("deadline exceeded before write started".into());
                }
                *p = Phase::Running;
            }
            let res = conn.execute(INSERT_RATE, params![bid]);
            if let Ok(mut p) = task_phase.lock() {
                *p = Phase::Done;
            }
            res.map_err(|e| e.to_string())?;
            Ok(conn.last_insert_rowid())
        });

        match deadline.run(task).await {
            Ok(Ok(Ok(id))) => {
                debug!("saved rate as row {}", id);
                Ok(())
            }
            Ok(Ok(Err(e))) => Err(ServiceError::PersistenceFailed(e)),
            Ok(Err(join)) => Err(ServiceError::PersistenceFailed(join.to_string())),
            Err(_) => {
                // Holding the phase lock pins the task inside its own statement,
                // so the interrupt cannot land on another writer's insert.
                if let Ok(mut p) = phase.lock() {
                    if *p == Phase::Running {
                        self.interrupt.interrupt();
                    }
                    *p = Phase::Abandoned;
                }
                Err(ServiceError::PersistenceFailed(
                    "deadline exceeded during write".into(),
                ))
            }
        }
    }

    pub fn latest(&self) -> ServiceResult<Option<StoredRate>> {
        let conn = self.lock()?;
        conn.query_row(SELECT_LATEST, [], |row| {
            Ok(StoredRate {
                id: row.get(0)?,
                bid: row.get(1)?,
                timestamp: row.get(2)?,
            })
        })
        .optional()
        .map_err(|e| ServiceError::PersistenceFailed(e.to_string()))
    }

    pub fn count(&self) -> ServiceResult<i64> {
        let conn = self.lock()?;
        conn.query_row(COUNT_ROWS, [], |row| row.get(0))
            .map_err(|e| ServiceError::PersistenceFailed(e.to_string()))
    }

    fn lock(&self) -> ServiceResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| ServiceError::PersistenceFailed("connection lock poisoned".into()))
    }
}

impl Drop for RateStore {
    fn drop(&mut self) {
        debug!("closing database connection");
    }
}
