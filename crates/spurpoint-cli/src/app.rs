//! Table-view state machine and key dispatcher.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use spurpoint_aprs::AprsClient;
use spurpoint_core::{
  message::Message,
  service::{API_KEY_PREFERENCE, LAST_CALLSIGN_PREFERENCE, MessageService},
};
use spurpoint_store_sqlite::SqliteStore;

pub type Service = MessageService<SqliteStore, AprsClient>;

// ─── Mode ─────────────────────────────────────────────────────────────────────

/// Which rows a purge removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurgeScope {
  Acknowledged,
  All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
  /// Moving through the table.
  Browse,
  /// Typing the callsign to fetch for.
  EnterCallsign,
  /// Typing a new aprs.fi API key.
  EnterApiKey,
  /// Waiting for `y` before an irreversible purge.
  ConfirmPurge(PurgeScope),
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  pub mode: Mode,

  /// Rows currently displayed, already filtered and ordered by the store.
  pub messages: Vec<Message>,

  /// Show acknowledged messages too.
  pub show_all: bool,

  /// Cursor position within `messages`.
  pub cursor: usize,

  /// Line editor contents while in an input mode.
  pub input: String,

  /// Last callsign fetched; pre-fills the callsign prompt.
  pub callsign: String,

  /// Callsign queued for fetching; picked up by the event loop after the
  /// "Fetching…" frame has been drawn.
  pub pending_fetch: Option<String>,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  pub service: Service,
}

impl App {
  pub fn new(service: Service) -> Self {
    Self {
      mode: Mode::Browse,
      messages: Vec::new(),
      show_all: false,
      cursor: 0,
      input: String::new(),
      callsign: String::new(),
      pending_fetch: None,
      status_msg: String::new(),
      service,
    }
  }

  // ── Data loading ──────────────────────────────────────────────────────────

  /// Restore the remembered callsign and load the table.
  pub async fn load(&mut self) -> anyhow::Result<()> {
    self.callsign = self
      .service
      .get_preference(LAST_CALLSIGN_PREFERENCE)
      .await?
      .unwrap_or_default();
    self.reload().await?;
    Ok(())
  }

  /// Re-read the table from the store, keeping the cursor in range.
  pub async fn reload(&mut self) -> anyhow::Result<()> {
    self.messages = self.service.list_messages(self.show_all).await?;
    self.cursor = self.cursor.min(self.messages.len().saturating_sub(1));
    Ok(())
  }

  pub fn selected(&self) -> Option<&Message> { self.messages.get(self.cursor) }

  pub fn is_fetching(&self) -> bool { self.pending_fetch.is_some() }

  /// Run a queued fetch to completion. Keys are not read meanwhile, so a
  /// second fetch cannot start while this one is in flight.
  pub async fn run_pending_fetch(&mut self) -> anyhow::Result<()> {
    let Some(callsign) = self.pending_fetch.take() else {
      return Ok(());
    };

    match self.service.fetch_with_stored_key(&callsign).await {
      Ok(report) => {
        self.callsign = callsign.trim().to_uppercase();
        self.reload().await?;
        self.status_msg = report.to_string();
      }
      Err(e) => self.status_msg = format!("Error: {e}"),
    }
    Ok(())
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Ok(false);
    }

    match self.mode {
      Mode::Browse => self.handle_browse_key(key).await,
      Mode::EnterCallsign | Mode::EnterApiKey => self.handle_input_key(key).await,
      Mode::ConfirmPurge(scope) => self.handle_confirm_key(key, scope).await,
    }
  }

  async fn handle_browse_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match key.code {
      KeyCode::Char('q') => return Ok(false),

      KeyCode::Down | KeyCode::Char('j') => {
        if self.cursor + 1 < self.messages.len() {
          self.cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.cursor = self.cursor.saturating_sub(1);
      }

      KeyCode::Char(' ') | KeyCode::Enter => self.toggle_selected().await?,

      KeyCode::Char('a') => {
        self.show_all = !self.show_all;
        self.reload().await?;
        self.status_msg = if self.show_all {
          "Showing all messages.".into()
        } else {
          "Showing unacknowledged messages.".into()
        };
      }

      KeyCode::Char('r') => {
        self.reload().await?;
        self.status_msg.clear();
      }

      KeyCode::Char('f') => {
        self.input = self.callsign.clone();
        self.mode = Mode::EnterCallsign;
      }
      KeyCode::Char('s') => {
        self.input.clear();
        self.mode = Mode::EnterApiKey;
      }

      KeyCode::Char('p') => self.mode = Mode::ConfirmPurge(PurgeScope::Acknowledged),
      KeyCode::Char('P') => self.mode = Mode::ConfirmPurge(PurgeScope::All),

      _ => {}
    }
    Ok(true)
  }

  async fn handle_input_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match key.code {
      KeyCode::Esc => {
        self.input.clear();
        self.mode = Mode::Browse;
      }
      KeyCode::Backspace => {
        self.input.pop();
      }
      KeyCode::Char(c) => self.input.push(c),
      KeyCode::Enter => {
        let value = std::mem::take(&mut self.input);
        let mode = std::mem::replace(&mut self.mode, Mode::Browse);
        match mode {
          Mode::EnterCallsign => {
            self.status_msg = format!("Fetching messages for {}…", value.trim().to_uppercase());
            self.pending_fetch = Some(value);
          }
          Mode::EnterApiKey => self.save_api_key(&value).await,
          _ => {}
        }
      }
      _ => {}
    }
    Ok(true)
  }

  async fn handle_confirm_key(&mut self, key: KeyEvent, scope: PurgeScope) -> anyhow::Result<bool> {
    self.mode = Mode::Browse;

    if !matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')) {
      self.status_msg = "Purge cancelled.".into();
      return Ok(true);
    }

    let result = match scope {
      PurgeScope::Acknowledged => self.service.purge_acknowledged().await,
      PurgeScope::All => self.service.purge_all().await,
    };
    match result {
      Ok(removed) => {
        self.reload().await?;
        self.status_msg = format!("Purged {removed} message(s).");
      }
      Err(e) => self.status_msg = format!("Error: {e}"),
    }
    Ok(true)
  }

  // ── Actions ───────────────────────────────────────────────────────────────

  /// Flip the acknowledged flag of the row under the cursor.
  async fn toggle_selected(&mut self) -> anyhow::Result<()> {
    let Some((id, acknowledged)) = self.selected().map(|m| (m.id, m.acknowledged)) else {
      return Ok(());
    };

    match self.service.set_acknowledged(id, !acknowledged).await {
      Ok(message) => {
        self.reload().await?;
        self.status_msg = if message.acknowledged {
          format!("MsgID {} acknowledged.", message.external_id)
        } else {
          format!("MsgID {} unacknowledged.", message.external_id)
        };
      }
      Err(e) => self.status_msg = format!("Error: {e}"),
    }
    Ok(())
  }

  async fn save_api_key(&mut self, value: &str) {
    let key = value.trim();
    if key.is_empty() {
      self.status_msg = "API key unchanged.".into();
      return;
    }
    self.status_msg = match self.service.set_preference(API_KEY_PREFERENCE, key).await {
      Ok(()) => "API key saved.".into(),
      Err(e) => format!("Error: {e}"),
    };
  }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use spurpoint_aprs::AprsConfig;
  use spurpoint_core::{
    message::{NewMessage, ReceivedAtZone},
    store::MessageStore,
  };

  use super::*;

  fn key(code: KeyCode) -> KeyEvent { KeyEvent::new(code, KeyModifiers::NONE) }

  /// An app over an in-memory store; the client points at a closed port so
  /// any accidental network call fails fast.
  async fn app_with(ids: &[&str]) -> App {
    let store = SqliteStore::open_in_memory().await.unwrap();
    for (i, ext) in ids.iter().enumerate() {
      store
        .insert_if_absent(NewMessage {
          external_id: (*ext).into(),
          received_at: ReceivedAtZone::Utc.received_at(1_741_270_079 + 60 * i as i64).unwrap(),
          source_callsign: "KD0XYZ-7".into(),
          body: "QSL?".into(),
        })
        .await
        .unwrap();
    }

    let client = AprsClient::new(AprsConfig {
      base_url: "http://127.0.0.1:9".into(),
      timeout:  Duration::from_millis(200),
    })
    .unwrap();

    let mut app = App::new(MessageService::new(store, client).with_zone(ReceivedAtZone::Utc));
    app.load().await.unwrap();
    app
  }

  #[tokio::test]
  async fn space_acknowledges_and_hides_row() {
    let mut app = app_with(&["m1", "m2"]).await;
    assert_eq!(app.messages.len(), 2);

    app.handle_key(key(KeyCode::Char(' '))).await.unwrap();
    assert_eq!(app.status_msg, "MsgID m1 acknowledged.");
    assert_eq!(app.messages.len(), 1);
    assert_eq!(app.messages[0].external_id, "m2");
  }

  #[tokio::test]
  async fn show_all_lists_acknowledged_last() {
    let mut app = app_with(&["m1", "m2"]).await;
    app.handle_key(key(KeyCode::Char(' '))).await.unwrap();

    app.handle_key(key(KeyCode::Char('a'))).await.unwrap();
    let order: Vec<_> = app.messages.iter().map(|m| m.external_id.as_str()).collect();
    assert_eq!(order, ["m2", "m1"]);

    // Toggling the acknowledged row back restores it.
    app.handle_key(key(KeyCode::Char('j'))).await.unwrap();
    app.handle_key(key(KeyCode::Char(' '))).await.unwrap();
    assert_eq!(app.status_msg, "MsgID m1 unacknowledged.");
    assert!(app.messages.iter().all(|m| !m.acknowledged));
  }

  #[tokio::test]
  async fn purge_requires_confirmation() {
    let mut app = app_with(&["m1", "m2"]).await;

    app.handle_key(key(KeyCode::Char('P'))).await.unwrap();
    assert_eq!(app.mode, Mode::ConfirmPurge(PurgeScope::All));
    app.handle_key(key(KeyCode::Char('n'))).await.unwrap();
    assert_eq!(app.status_msg, "Purge cancelled.");
    assert_eq!(app.messages.len(), 2);

    app.handle_key(key(KeyCode::Char('P'))).await.unwrap();
    app.handle_key(key(KeyCode::Char('y'))).await.unwrap();
    assert_eq!(app.mode, Mode::Browse);
    assert!(app.messages.is_empty());
    assert_eq!(app.status_msg, "Purged 2 message(s).");
  }

  #[tokio::test]
  async fn purge_acknowledged_keeps_open_rows() {
    let mut app = app_with(&["m1", "m2", "m3"]).await;
    app.handle_key(key(KeyCode::Char(' '))).await.unwrap();

    app.handle_key(key(KeyCode::Char('p'))).await.unwrap();
    app.handle_key(key(KeyCode::Char('y'))).await.unwrap();
    assert_eq!(app.status_msg, "Purged 1 message(s).");

    app.handle_key(key(KeyCode::Char('a'))).await.unwrap();
    assert_eq!(app.messages.len(), 2);
  }

  #[tokio::test]
  async fn blank_callsign_fetch_reports_validation_error() {
    let mut app = app_with(&[]).await;

    app.handle_key(key(KeyCode::Char('f'))).await.unwrap();
    assert_eq!(app.mode, Mode::EnterCallsign);
    app.handle_key(key(KeyCode::Enter)).await.unwrap();
    assert!(app.is_fetching());

    app.run_pending_fetch().await.unwrap();
    assert!(!app.is_fetching());
    assert!(app.status_msg.starts_with("Error: validation error"), "{}", app.status_msg);
  }

  #[tokio::test]
  async fn api_key_entry_is_stored() {
    let mut app = app_with(&[]).await;

    app.handle_key(key(KeyCode::Char('s'))).await.unwrap();
    for c in "abc".chars() {
      app.handle_key(key(KeyCode::Char(c))).await.unwrap();
    }
    app.handle_key(key(KeyCode::Backspace)).await.unwrap();
    app.handle_key(key(KeyCode::Enter)).await.unwrap();

    assert_eq!(app.status_msg, "API key saved.");
    assert_eq!(
      app.service.get_preference(API_KEY_PREFERENCE).await.unwrap().as_deref(),
      Some("ab")
    );
  }

  #[tokio::test]
  async fn cursor_stays_in_range_after_rows_disappear() {
    let mut app = app_with(&["m1", "m2"]).await;
    app.handle_key(key(KeyCode::Down)).await.unwrap();
    assert_eq!(app.cursor, 1);

    app.handle_key(key(KeyCode::Char(' '))).await.unwrap();
    assert_eq!(app.messages.len(), 1);
    assert_eq!(app.cursor, 0);
  }
}
