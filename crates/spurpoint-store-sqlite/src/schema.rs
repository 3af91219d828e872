//! SQL schema for the SpurPoint SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- AUTOINCREMENT keeps ids monotonic: a purged id is never handed out again.
CREATE TABLE IF NOT EXISTS messages (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    external_id     TEXT    NOT NULL,            -- provider message id
    received_at     TEXT    NOT NULL,            -- 'YYYY-MM-DD HH:MM'
    source_callsign TEXT,
    body            TEXT,
    acknowledged    INTEGER NOT NULL DEFAULT 0
);

-- Dedup key: unique among retained rows only.
CREATE UNIQUE INDEX IF NOT EXISTS messages_external_id_idx ON messages(external_id);
CREATE INDEX IF NOT EXISTS messages_listing_idx ON messages(acknowledged, received_at);

CREATE TABLE IF NOT EXISTS preferences (
    key   TEXT PRIMARY KEY,
    value TEXT
);

PRAGMA user_version = 1;
";
