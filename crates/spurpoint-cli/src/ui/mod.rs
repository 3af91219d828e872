//! TUI rendering: header, message table and status bar.

pub mod message_table;

use chrono::Local;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Paragraph},
};

use crate::app::{App, Mode, PurgeScope};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let area = f.area();

  // Vertical stack: header, body, status bar.
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(area);

  draw_header(f, rows[0], app);
  message_table::draw(f, rows[1], app);
  draw_status(f, rows[2], app);
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
  let date = Local::now().format("%Y-%m-%d %H:%M").to_string();

  let title = if app.callsign.is_empty() {
    " SpurPoint APRS messages".to_string()
  } else {
    format!(" SpurPoint APRS messages · {}", app.callsign)
  };
  let left = Span::styled(
    title,
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let right = Span::styled(
    format!("Data Source: aprs.fi  {date} "),
    Style::default().fg(Color::Gray),
  );

  // Simple left-right header: pad the middle.
  let left_width = left.width() as u16;
  let right_width = right.width() as u16;
  let pad = area
    .width
    .saturating_sub(left_width)
    .saturating_sub(right_width);

  let line = Line::from(vec![
    left,
    Span::raw(" ".repeat(pad as usize)),
    right,
  ]);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(line), inner);
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let (mode_label, text) = match app.mode {
    _ if app.is_fetching() => ("WAIT", app.status_msg.clone()),
    Mode::EnterCallsign => ("FETCH", format!("Callsign: {}_  Enter fetch  Esc cancel", app.input)),
    Mode::EnterApiKey => (
      "API KEY",
      format!("Key: {}_  Enter save  Esc cancel", "*".repeat(app.input.chars().count())),
    ),
    Mode::ConfirmPurge(PurgeScope::Acknowledged) => {
      ("CONFIRM", "Delete all acknowledged messages? This cannot be undone. [y/N]".into())
    }
    Mode::ConfirmPurge(PurgeScope::All) => {
      ("CONFIRM", "Delete ALL messages? This cannot be undone. [y/N]".into())
    }
    Mode::Browse if !app.status_msg.is_empty() => ("NORMAL", app.status_msg.clone()),
    Mode::Browse => (
      "NORMAL",
      "↑↓/jk move  Space ack  a all  f fetch  s api key  p purge acked  P purge all  q quit".into(),
    ),
  };

  let mode_style = match app.mode {
    Mode::ConfirmPurge(_) => Style::default().fg(Color::Black).bg(Color::Red),
    _ => Style::default().fg(Color::Black).bg(Color::Cyan),
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    mode_style.add_modifier(Modifier::BOLD),
  );
  let text_span = Span::styled(
    format!("  {text}"),
    Style::default().fg(Color::Gray),
  );

  let line = Line::from(vec![mode_span, text_span]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}
