//! SQLite store backing the chat state.
//!
//! One database file holds four relations: learned words, pattern surface
//! variants, canonical replies, and the conversation history. The connection
//! is opened once at startup and shared by the store components; every
//! mutation commits synchronously, so shutdown needs no extra flush.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use tracing::info;

use crate::error::Result;

/// Shared handle on the chat database.
pub struct ChatDb {
    conn: Arc<Mutex<Connection>>,
    db_path: PathBuf,
}

impl ChatDb {
    /// Open or create the database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
            db_path: path.to_path_buf(),
        };
        db.init_schema()?;
        info!("Chat database ready at {}", db.db_path.display());
        Ok(db)
    }

    /// Default database path under the user data directory.
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("dtbot")
            .join("chatbot.db")
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "CREATE TABLE IF NOT EXISTS words (
                word TEXT PRIMARY KEY,
                type TEXT NOT NULL,
                unli TEXT NOT NULL,
                kopluk TEXT NOT NULL,
                forms TEXT
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS patterns (
                word TEXT NOT NULL,
                pattern TEXT NOT NULL,
                UNIQUE(word, pattern)
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS responses (
                pattern TEXT PRIMARY KEY,
                response TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS conversation_history (
                user_input TEXT NOT NULL,
                response TEXT NOT NULL,
                timestamp TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    /// Clone of the shared connection handle, for store components.
    pub fn conn(&self) -> Arc<Mutex<Connection>> {
        Arc::clone(&self.conn)
    }

    /// Path the database was opened at.
    pub fn path(&self) -> &Path {
        &self.db_path
    }
}
