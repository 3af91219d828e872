//! [`MessageService`]: the operations an operator surface calls.
//!
//! Every method runs to completion before returning; the caller is expected
//! not to issue a second fetch while one is still being awaited.

use std::fmt;

use crate::{
  Error, Result,
  fetch::{FetchRequest, MessageSource},
  message::{Candidate, Message, NewMessage, ReceivedAtZone},
  store::MessageStore,
};

/// Preference key holding the aprs.fi API key.
pub const API_KEY_PREFERENCE: &str = "aprs_api_key";

/// Preference key holding the last callsign fetched successfully.
pub const LAST_CALLSIGN_PREFERENCE: &str = "last_callsign";

// ─── Report ──────────────────────────────────────────────────────────────────

/// Outcome of one fetch-and-ingest pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
  /// Candidates returned by the provider, duplicates included.
  pub retrieved: usize,
  /// Rows actually inserted.
  pub new:       usize,
}

impl fmt::Display for IngestReport {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Retrieved: {}; New: {}", self.retrieved, self.new)
  }
}

// ─── Service ─────────────────────────────────────────────────────────────────

/// Binds a [`MessageStore`] and a [`MessageSource`] together.
pub struct MessageService<S, F> {
  store:  S,
  source: F,
  zone:   ReceivedAtZone,
}

impl<S, F> MessageService<S, F>
where
  S: MessageStore,
  F: MessageSource,
{
  /// Build a service rendering `received_at` in the local zone.
  pub fn new(store: S, source: F) -> Self {
    Self { store, source, zone: ReceivedAtZone::default() }
  }

  /// Override the zone used to derive `received_at`.
  pub fn with_zone(mut self, zone: ReceivedAtZone) -> Self {
    self.zone = zone;
    self
  }

  pub fn source(&self) -> &F { &self.source }

  // ── Fetch & ingest ────────────────────────────────────────────────────

  /// Poll the provider for `callsign` and persist every unseen message.
  ///
  /// Input is validated before any remote call. On success the callsign is
  /// remembered under [`LAST_CALLSIGN_PREFERENCE`]; failing to remember it
  /// is logged and does not fail the fetch, since the rows are committed.
  pub async fn fetch_and_ingest(&self, callsign: &str, api_key: &str) -> Result<IngestReport> {
    let request = FetchRequest::new(callsign, api_key)?;

    tracing::info!(callsign = request.callsign(), "fetching messages");
    let candidates = self.source.fetch(&request).await.map_err(Into::<Error>::into)?;

    let report = self.ingest(candidates).await?;
    tracing::info!(
      callsign = request.callsign(),
      retrieved = report.retrieved,
      new = report.new,
      "fetch complete"
    );

    if let Err(err) = self
      .store
      .set_preference(LAST_CALLSIGN_PREFERENCE, request.callsign())
      .await
    {
      tracing::warn!(error = %err, "failed to remember last callsign");
    }

    Ok(report)
  }

  /// Like [`fetch_and_ingest`](Self::fetch_and_ingest), reading the API key
  /// from the [`API_KEY_PREFERENCE`] preference first.
  pub async fn fetch_with_stored_key(&self, callsign: &str) -> Result<IngestReport> {
    let api_key = self.get_preference(API_KEY_PREFERENCE).await?.unwrap_or_default();
    self.fetch_and_ingest(callsign, &api_key).await
  }

  /// Deduplicate `candidates` against the store and insert the unseen ones.
  ///
  /// Every candidate is converted before the first write, so a malformed
  /// timestamp aborts the pass without touching the store. A store failure
  /// stops the pass; rows inserted before it stay committed.
  pub async fn ingest(&self, candidates: Vec<Candidate>) -> Result<IngestReport> {
    let retrieved = candidates.len();

    let rows = candidates
      .into_iter()
      .map(|c| NewMessage::from_candidate(c, self.zone))
      .collect::<Result<Vec<_>>>()?;

    let mut new = 0;
    for row in rows {
      let external_id = row.external_id.clone();
      match self.store.insert_if_absent(row).await.map_err(Error::storage)? {
        Some(stored) => {
          tracing::debug!(id = stored.id, %external_id, "stored new message");
          new += 1;
        }
        None => tracing::trace!(%external_id, "skipping known message"),
      }
    }

    Ok(IngestReport { retrieved, new })
  }

  // ── Reads ─────────────────────────────────────────────────────────────

  pub async fn list_messages(&self, show_all: bool) -> Result<Vec<Message>> {
    self.store.list_messages(show_all).await.map_err(Error::storage)
  }

  // ── Acknowledgment & purge ────────────────────────────────────────────

  /// Set the acknowledged flag of message `id`; idempotent.
  ///
  /// Returns the updated message, or [`Error::NotFound`] if `id` is unknown.
  pub async fn set_acknowledged(&self, id: i64, acknowledged: bool) -> Result<Message> {
    let message = self
      .store
      .set_acknowledged(id, acknowledged)
      .await
      .map_err(Error::storage)?
      .ok_or(Error::NotFound(id))?;

    tracing::info!(id, external_id = %message.external_id, acknowledged, "acknowledgment updated");
    Ok(message)
  }

  /// Delete every message. Confirmation is the caller's job.
  pub async fn purge_all(&self) -> Result<usize> {
    let removed = self.store.purge_all().await.map_err(Error::storage)?;
    tracing::info!(removed, "purged all messages");
    Ok(removed)
  }

  /// Delete acknowledged messages. Confirmation is the caller's job.
  pub async fn purge_acknowledged(&self) -> Result<usize> {
    let removed = self.store.purge_acknowledged().await.map_err(Error::storage)?;
    tracing::info!(removed, "purged acknowledged messages");
    Ok(removed)
  }

  // ── Preferences ───────────────────────────────────────────────────────

  pub async fn get_preference(&self, key: &str) -> Result<Option<String>> {
    self.store.get_preference(key).await.map_err(Error::storage)
  }

  pub async fn set_preference(&self, key: &str, value: &str) -> Result<()> {
    if key.trim().is_empty() {
      return Err(Error::Validation("preference key must not be empty".into()));
    }
    self.store.set_preference(key, value).await.map_err(Error::storage)?;
    tracing::debug!(key, "preference updated");
    Ok(())
  }
}
