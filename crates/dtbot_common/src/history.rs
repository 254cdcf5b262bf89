//! Append-only conversation log.
//!
//! One row per resolver call, carrying the original user input, the reply,
//! and a UTC timestamp. Read back only for the "most recent turn" context
//! lookup. Rows are never updated or deleted; recency queries order by
//! rowid so same-second turns still come back in append order.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::Result;
use crate::store::ChatDb;

#[derive(Debug, Clone)]
pub struct ConversationTurn {
    pub user_input: String,
    pub reply: String,
    pub timestamp: DateTime<Utc>,
}

pub struct ConversationLog {
    conn: Arc<Mutex<Connection>>,
}

impl ConversationLog {
    pub fn new(db: &ChatDb) -> Self {
        Self { conn: db.conn() }
    }

    pub fn append(&self, user_input: &str, reply: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO conversation_history (user_input, response, timestamp)
             VALUES (?1, ?2, ?3)",
            params![user_input, reply, Utc::now()],
        )?;
        Ok(())
    }

    pub fn last_turn(&self) -> Result<Option<ConversationTurn>> {
        let conn = self.conn.lock().unwrap();
        let turn = conn
            .query_row(
                "SELECT user_input, response, timestamp FROM conversation_history
                 ORDER BY rowid DESC LIMIT 1",
                [],
                |row| {
                    Ok(ConversationTurn {
                        user_input: row.get(0)?,
                        reply: row.get(1)?,
                        timestamp: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(turn)
    }

    pub fn len(&self) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM conversation_history", [], |row| {
                row.get(0)
            })?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}
