//! `spurpoint`: fetch and manage APRS text messages from aprs.fi.
//!
//! # Usage
//!
//! ```text
//! spurpoint api-key 12345.abcdef    # store the aprs.fi API key once
//! spurpoint                         # interactive message table
//! spurpoint fetch N0CALL            # Retrieved: 3; New: 1
//! spurpoint list --all
//! spurpoint ack 17
//! spurpoint purge --acknowledged --yes
//! ```

mod app;
mod settings;
mod ui;

use std::{fs::OpenOptions, io, path::PathBuf, sync::Mutex, time::Duration};

use anyhow::{Context, Result, bail};
use app::{App, Service};
use clap::{Parser, Subcommand};
use crossterm::{
  event::{self, Event, KeyEventKind},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use settings::Settings;
use spurpoint_aprs::AprsClient;
use spurpoint_core::{message::Message, service::{API_KEY_PREFERENCE, MessageService}};
use spurpoint_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "spurpoint", version, about = "Fetch and manage APRS messages from aprs.fi")]
struct Cli {
  /// Path to a TOML config file.
  #[arg(short, long, value_name = "FILE", default_value = "spurpoint.toml")]
  config: PathBuf,

  /// Open this database file instead of the configured one.
  #[arg(long, env = "SPURPOINT_DB", value_name = "FILE")]
  db: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Open the interactive message table (the default).
  Tui,

  /// Poll aprs.fi for messages addressed to CALLSIGN and store new ones.
  Fetch { callsign: String },

  /// Print stored messages.
  List {
    /// Include acknowledged messages (listed after unacknowledged ones).
    #[arg(long)]
    all: bool,
  },

  /// Mark a message as acknowledged.
  Ack { id: i64 },

  /// Clear the acknowledged flag of a message.
  Unack { id: i64 },

  /// Delete messages. Irreversible.
  Purge {
    /// Only delete acknowledged messages.
    #[arg(long)]
    acknowledged: bool,

    /// Confirm the deletion.
    #[arg(long)]
    yes: bool,
  },

  /// Store the aprs.fi API key.
  ApiKey { key: String },
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();

  let mut settings = Settings::load(&cli.config)?;
  if let Some(db) = cli.db {
    settings.database_path = db;
  }

  let command = cli.command.unwrap_or(Command::Tui);
  init_tracing(&settings, matches!(command, Command::Tui))?;

  let service = open_service(&settings).await?;

  match command {
    Command::Tui => run_tui(service).await,
    Command::Fetch { callsign } => {
      let report = service.fetch_with_stored_key(&callsign).await?;
      println!("{report}");
      Ok(())
    }
    Command::List { all } => {
      print_messages(&service.list_messages(all).await?);
      Ok(())
    }
    Command::Ack { id } => {
      let message = service.set_acknowledged(id, true).await?;
      println!("MsgID {} acknowledged.", message.external_id);
      Ok(())
    }
    Command::Unack { id } => {
      let message = service.set_acknowledged(id, false).await?;
      println!("MsgID {} unacknowledged.", message.external_id);
      Ok(())
    }
    Command::Purge { acknowledged, yes } => {
      if !yes {
        bail!("purging cannot be undone; re-run with --yes to confirm");
      }
      let removed = if acknowledged {
        service.purge_acknowledged().await?
      } else {
        service.purge_all().await?
      };
      println!("Purged {removed} message(s).");
      Ok(())
    }
    Command::ApiKey { key } => {
      service.set_preference(API_KEY_PREFERENCE, key.trim()).await?;
      println!("API key saved.");
      Ok(())
    }
  }
}

/// Subcommands log to stderr (warnings by default); the table view owns the
/// terminal, so it logs to the configured file instead.
fn init_tracing(settings: &Settings, interactive: bool) -> Result<()> {
  let default_level = if interactive { LevelFilter::INFO } else { LevelFilter::WARN };
  let filter = EnvFilter::builder()
    .with_default_directive(default_level.into())
    .from_env_lossy();

  if interactive {
    let path = settings.log_file();
    let file = OpenOptions::new()
      .create(true)
      .append(true)
      .open(&path)
      .with_context(|| format!("opening log file {}", path.display()))?;
    tracing_subscriber::fmt()
      .with_env_filter(filter)
      .with_ansi(false)
      .with_writer(Mutex::new(file))
      .init();
  } else {
    tracing_subscriber::fmt()
      .with_env_filter(filter)
      .with_writer(io::stderr)
      .init();
  }
  Ok(())
}

async fn open_service(settings: &Settings) -> Result<Service> {
  let db_path = settings.database_path();
  let store = SqliteStore::open(&db_path)
    .await
    .with_context(|| format!("failed to open store at {}", db_path.display()))?;
  let client = AprsClient::new(settings.aprs_config()).context("failed to build HTTP client")?;

  tracing::info!(db = %db_path.display(), zone = ?settings.time_zone, "store opened");
  Ok(MessageService::new(store, client).with_zone(settings.time_zone))
}

fn print_messages(messages: &[Message]) {
  println!("{:>5}  {:3}  {:<10}  {:<16}  {:<10}  MESSAGE", "ID", "ACK", "MSGID", "TIME", "FROM");
  for m in messages {
    println!(
      "{:>5}  {:3}  {:<10}  {:<16}  {:<10}  {}",
      m.id,
      if m.acknowledged { "[x]" } else { "[ ]" },
      m.external_id,
      m.received_at_display(),
      m.source_callsign,
      m.body,
    );
  }
}

// ─── Table view ───────────────────────────────────────────────────────────────

async fn run_tui(service: Service) -> Result<()> {
  let mut app = App::new(service);
  app.load().await?;

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  // Run the event loop; restore terminal even on error.
  let run_result = run_event_loop(&mut terminal, &mut app).await;

  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
) -> Result<()> {
  loop {
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // The "Fetching…" frame is on screen; run the fetch before reading keys.
    if app.is_fetching() {
      app.run_pending_fetch().await?;
      continue;
    }

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    match maybe_event {
      Some(Event::Key(key)) if key.kind == KeyEventKind::Press => {
        if !app.handle_key(key).await? {
          break;
        }
      }
      // Resize and other events: redraw on next iteration.
      _ => {}
    }
  }

  Ok(())
}
