// Append-only conversation log on SQLite
//
// Every call opens its own connection and drops it before returning, so
// independent invocations never share a handle. The schema matches the
// `conversations` table older versions of the tool created, so existing
// databases keep working.

use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OpenFlags, Row};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::errors::{LlmError, Result};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS conversations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    conversation_id TEXT,
    model_name TEXT,
    prompt TEXT,
    answer TEXT,
    timestamp DATETIME DEFAULT CURRENT_TIMESTAMP
);
";

/// One logged prompt/answer pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    /// Assigned by the store
    pub sequence_id: i64,
    pub conversation_id: String,
    pub model_name: String,
    pub prompt: String,
    pub answer: String,
    /// Insert time as stored. The store writes `YYYY-MM-DD HH:MM:SS` in
    /// UTC, but rows from other writers may hold any text or nothing.
    pub created_at: Option<String>,
}

impl Exchange {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let created_at = match row.get_ref(5)? {
            ValueRef::Null => None,
            ValueRef::Integer(i) => Some(i.to_string()),
            ValueRef::Real(f) => Some(f.to_string()),
            ValueRef::Text(text) | ValueRef::Blob(text) => {
                Some(String::from_utf8_lossy(text).into_owned())
            }
        };

        Ok(Self {
            sequence_id: row.get(0)?,
            conversation_id: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            model_name: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            prompt: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
            answer: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
            created_at,
        })
    }
}

/// Handle to the conversation database at a fixed path
#[derive(Debug, Clone)]
pub struct ConversationLogStore {
    db_path: PathBuf,
}

impl ConversationLogStore {
    /// Point at `db_path` without touching the filesystem
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Create the parent directory, database file and table if missing.
    ///
    /// Safe to call on every start; existing rows are never touched.
    pub fn initialize(&self) -> Result<()> {
        if let Some(parent) = self.db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&self.db_path)?;
        conn.execute_batch(SCHEMA)?;

        info!("Conversation log ready: {}", self.db_path.display());
        Ok(())
    }

    /// Insert one exchange and return its sequence id.
    ///
    /// The insert runs in its own transaction; either the whole row lands
    /// or nothing does.
    pub fn append(
        &self,
        conversation_id: &str,
        model_name: &str,
        prompt: &str,
        answer: &str,
    ) -> Result<i64> {
        let mut conn = Connection::open(&self.db_path)?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO conversations (conversation_id, model_name, prompt, answer)
             VALUES (?1, ?2, ?3, ?4)",
            params![conversation_id, model_name, prompt, answer],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        debug!(
            "Logged exchange {} (conversation {}, {} chars)",
            id,
            conversation_id,
            answer.len()
        );
        Ok(id)
    }

    /// Every exchange, most recent first.
    ///
    /// Rows inserted within the same second keep insertion order reversed.
    pub fn list_all(&self) -> Result<Vec<Exchange>> {
        if !self.db_path.exists() {
            return Err(LlmError::StoreAbsent(self.db_path.clone()));
        }

        let conn = Connection::open_with_flags(&self.db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;

        let has_table: bool = conn.query_row(
            "SELECT EXISTS (
                 SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'conversations'
             )",
            [],
            |row| row.get(0),
        )?;
        if !has_table {
            return Ok(Vec::new());
        }

        let mut stmt = conn.prepare(
            "SELECT id, conversation_id, model_name, prompt, answer, timestamp
             FROM conversations
             ORDER BY timestamp DESC, id DESC",
        )?;
        let exchanges = stmt
            .query_map([], Exchange::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        debug!("Read {} exchanges from {}", exchanges.len(), self.db_path.display());
        Ok(exchanges)
    }
}
