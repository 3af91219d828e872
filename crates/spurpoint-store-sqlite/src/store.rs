//! [`SqliteStore`], the SQLite implementation of [`MessageStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use spurpoint_core::{
  message::{Message, NewMessage},
  store::MessageStore,
};

use crate::{
  Result,
  encode::{MESSAGE_COLUMNS, RawMessage, encode_received_at},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A SpurPoint message store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted, so every
/// clone shares the one handle.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, used by tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run raw SQL against the connection; lets tests install failure triggers.
  #[cfg(test)]
  pub(crate) async fn execute_batch(&self, sql: &'static str) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(sql)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── MessageStore impl ───────────────────────────────────────────────────────

impl MessageStore for SqliteStore {
  type Error = crate::Error;

  // ── Messages ──────────────────────────────────────────────────────────────

  async fn insert_if_absent(&self, message: NewMessage) -> Result<Option<Message>> {
    let received_at = encode_received_at(message.received_at);

    let raw: Option<RawMessage> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let known = tx
          .query_row(
            "SELECT 1 FROM messages WHERE external_id = ?1",
            rusqlite::params![message.external_id],
            |_| Ok(()),
          )
          .optional()?
          .is_some();

        if known {
          return Ok(None);
        }

        tx.execute(
          "INSERT INTO messages (external_id, received_at, source_callsign, body, acknowledged)
           VALUES (?1, ?2, ?3, ?4, 0)",
          rusqlite::params![
            message.external_id,
            received_at,
            message.source_callsign,
            message.body,
          ],
        )?;

        let id = tx.last_insert_rowid();
        let raw = tx.query_row(
          &format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1"),
          rusqlite::params![id],
          RawMessage::from_row,
        )?;

        tx.commit()?;
        Ok(Some(raw))
      })
      .await?;

    raw.map(RawMessage::into_message).transpose()
  }

  async fn list_messages(&self, show_all: bool) -> Result<Vec<Message>> {
    let sql = if show_all {
      format!(
        "SELECT {MESSAGE_COLUMNS} FROM messages
         ORDER BY acknowledged ASC, received_at ASC, id ASC"
      )
    } else {
      format!(
        "SELECT {MESSAGE_COLUMNS} FROM messages
         WHERE acknowledged = 0
         ORDER BY received_at ASC, id ASC"
      )
    };

    let raws: Vec<RawMessage> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], RawMessage::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMessage::into_message).collect()
  }

  async fn set_acknowledged(&self, id: i64, acknowledged: bool) -> Result<Option<Message>> {
    let raw: Option<RawMessage> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let changed = tx.execute(
          "UPDATE messages SET acknowledged = ?1 WHERE id = ?2",
          rusqlite::params![acknowledged, id],
        )?;
        if changed == 0 {
          return Ok(None);
        }

        let raw = tx.query_row(
          &format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1"),
          rusqlite::params![id],
          RawMessage::from_row,
        )?;

        tx.commit()?;
        Ok(Some(raw))
      })
      .await?;

    raw.map(RawMessage::into_message).transpose()
  }

  async fn purge_all(&self) -> Result<usize> {
    let removed = self
      .conn
      .call(|conn| Ok(conn.execute("DELETE FROM messages", [])?))
      .await?;
    Ok(removed)
  }

  async fn purge_acknowledged(&self) -> Result<usize> {
    let removed = self
      .conn
      .call(|conn| Ok(conn.execute("DELETE FROM messages WHERE acknowledged = 1", [])?))
      .await?;
    Ok(removed)
  }

  // ── Preferences ───────────────────────────────────────────────────────────

  async fn get_preference(&self, key: &str) -> Result<Option<String>> {
    let key = key.to_owned();

    let value: Option<Option<String>> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT value FROM preferences WHERE key = ?1",
              rusqlite::params![key],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    // A row holding NULL reads the same as no row at all.
    Ok(value.flatten())
  }

  async fn set_preference(&self, key: &str, value: &str) -> Result<()> {
    let key = key.to_owned();
    let value = value.to_owned();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO preferences (key, value) VALUES (?1, ?2)
           ON CONFLICT(key) DO UPDATE SET value = excluded.value",
          rusqlite::params![key, value],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
