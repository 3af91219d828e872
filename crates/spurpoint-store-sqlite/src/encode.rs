//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! `received_at` is stored as `YYYY-MM-DD HH:MM`, which sorts
//! chronologically as text. `acknowledged` is stored as 0/1.

use chrono::NaiveDateTime;
use spurpoint_core::message::{Message, RECEIVED_AT_FORMAT, format_received_at};

use crate::{Error, Result};

/// Column list matching [`RawMessage::from_row`].
pub const MESSAGE_COLUMNS: &str =
  "id, external_id, received_at, source_callsign, body, acknowledged";

// ─── received_at ─────────────────────────────────────────────────────────────

pub fn encode_received_at(at: NaiveDateTime) -> String { format_received_at(at) }

pub fn decode_received_at(s: &str) -> Result<NaiveDateTime> {
  NaiveDateTime::parse_from_str(s, RECEIVED_AT_FORMAT)
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `messages` row.
pub struct RawMessage {
  pub id:              i64,
  pub external_id:     String,
  pub received_at:     String,
  pub source_callsign: Option<String>,
  pub body:            Option<String>,
  pub acknowledged:    bool,
}

impl RawMessage {
  /// Read a row selected with [`MESSAGE_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:              row.get(0)?,
      external_id:     row.get(1)?,
      received_at:     row.get(2)?,
      source_callsign: row.get(3)?,
      body:            row.get(4)?,
      acknowledged:    row.get(5)?,
    })
  }

  pub fn into_message(self) -> Result<Message> {
    Ok(Message {
      id:              self.id,
      external_id:     self.external_id,
      received_at:     decode_received_at(&self.received_at)?,
      source_callsign: self.source_callsign.unwrap_or_default(),
      body:            self.body.unwrap_or_default(),
      acknowledged:    self.acknowledged,
    })
  }
}
