//! Message records: what the provider hands us, what we persist, and how the
//! provider's Unix timestamps become the minute-resolution `received_at`.

use chrono::{DateTime, Local, NaiveDateTime, Timelike as _, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Display and storage format of [`Message::received_at`].
pub const RECEIVED_AT_FORMAT: &str = "%Y-%m-%d %H:%M";

// ─── Time zone ───────────────────────────────────────────────────────────────

/// Zone used to render a provider timestamp as a wall-clock `received_at`.
///
/// The stored value carries no offset; every row in one database should be
/// written with the same zone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReceivedAtZone {
  /// The operator machine's local zone.
  #[default]
  #[serde(alias = "LOCAL", alias = "Local")]
  Local,
  #[serde(alias = "UTC", alias = "Utc")]
  Utc,
}

impl ReceivedAtZone {
  /// Convert a Unix timestamp into wall-clock time in this zone, truncated to
  /// the minute. Returns `None` when the timestamp is out of range.
  pub fn received_at(self, unix_timestamp: i64) -> Option<NaiveDateTime> {
    let utc = DateTime::from_timestamp(unix_timestamp, 0)?;
    let naive = match self {
      Self::Local => utc.with_timezone(&Local).naive_local(),
      Self::Utc => utc.naive_utc(),
    };
    naive.with_second(0)
  }
}

/// Render a `received_at` value as `YYYY-MM-DD HH:MM`.
pub fn format_received_at(at: NaiveDateTime) -> String {
  at.format(RECEIVED_AT_FORMAT).to_string()
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// One message as reported by the provider, before deduplication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
  /// Provider-assigned message id; the dedup key.
  pub external_id:     String,
  pub unix_timestamp:  i64,
  pub source_callsign: String,
  pub body:            String,
}

/// A message ready to be written by the ingest pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
  pub external_id:     String,
  pub received_at:     NaiveDateTime,
  pub source_callsign: String,
  pub body:            String,
}

impl NewMessage {
  /// Build the row for `candidate`, deriving `received_at` in `zone`.
  pub fn from_candidate(candidate: Candidate, zone: ReceivedAtZone) -> Result<Self> {
    let received_at = zone.received_at(candidate.unix_timestamp).ok_or_else(|| {
      Error::Protocol(format!(
        "message {} has an out-of-range timestamp: {}",
        candidate.external_id, candidate.unix_timestamp
      ))
    })?;

    Ok(Self {
      external_id: candidate.external_id,
      received_at,
      source_callsign: candidate.source_callsign,
      body: candidate.body,
    })
  }
}

/// A persisted APRS text message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
  /// Store-assigned, monotonic, never reused.
  pub id:              i64,
  pub external_id:     String,
  pub received_at:     NaiveDateTime,
  pub source_callsign: String,
  pub body:            String,
  pub acknowledged:    bool,
}

impl Message {
  pub fn received_at_display(&self) -> String { format_received_at(self.received_at) }
}
