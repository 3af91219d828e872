//! The `MessageStore` trait.
//!
//! Implemented by storage backends (e.g. `spurpoint-store-sqlite`). The
//! service layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::message::{Message, NewMessage};

/// Abstraction over a SpurPoint message store backend.
///
/// A store is one explicitly opened handle; callers construct it and hand it
/// to [`MessageService`](crate::service::MessageService). Opening a different
/// database means constructing another store.
pub trait MessageStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Messages ──────────────────────────────────────────────────────────

  /// Insert `message` unless a row with the same `external_id` is already
  /// retained. The existence check and the insert are a single atomic step.
  ///
  /// Returns the stored row when inserted, `None` when it was a duplicate.
  fn insert_if_absent(
    &self,
    message: NewMessage,
  ) -> impl Future<Output = Result<Option<Message>, Self::Error>> + Send + '_;

  /// List messages for display.
  ///
  /// - `show_all = false`: unacknowledged only, oldest `received_at` first.
  /// - `show_all = true`: everything, unacknowledged first, then by
  ///   `received_at`.
  fn list_messages(
    &self,
    show_all: bool,
  ) -> impl Future<Output = Result<Vec<Message>, Self::Error>> + Send + '_;

  /// Set the acknowledged flag of one row. Returns the updated row, or `None`
  /// if `id` does not exist.
  fn set_acknowledged(
    &self,
    id: i64,
    acknowledged: bool,
  ) -> impl Future<Output = Result<Option<Message>, Self::Error>> + Send + '_;

  /// Delete every message. Returns the number of rows removed.
  fn purge_all(&self) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Delete acknowledged messages only. Returns the number of rows removed.
  fn purge_acknowledged(
    &self,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  // ── Preferences ───────────────────────────────────────────────────────

  fn get_preference<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + 'a;

  /// Insert or replace the value stored under `key`.
  fn set_preference<'a>(
    &'a self,
    key: &'a str,
    value: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
