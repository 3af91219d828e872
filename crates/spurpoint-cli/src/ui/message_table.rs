//! The message table, the main pane.

use ratatui::{
  Frame,
  layout::{Constraint, Rect},
  style::{Color, Modifier, Style},
  text::Line,
  widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
};

use crate::app::App;

/// Render the message table into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let title = if app.show_all {
    format!(" All messages ({}) ", app.messages.len())
  } else {
    format!(" Unacknowledged messages ({}) ", app.messages.len())
  };

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  if app.messages.is_empty() {
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
      Paragraph::new(Line::styled(
        "No messages. Press f to fetch from aprs.fi.",
        Style::default().fg(Color::DarkGray),
      )),
      inner,
    );
    return;
  }

  let header = Row::new(["ACK", "MsgID", "Time", "From", "Message"]).style(
    Style::default()
      .fg(Color::Yellow)
      .add_modifier(Modifier::BOLD),
  );

  let rows: Vec<Row> = app
    .messages
    .iter()
    .map(|m| {
      let ack = if m.acknowledged { "[x]" } else { "[ ]" };
      let style = if m.acknowledged {
        Style::default()
          .fg(Color::DarkGray)
          .add_modifier(Modifier::CROSSED_OUT)
      } else {
        Style::default()
      };
      Row::new(vec![
        Cell::from(ack),
        Cell::from(m.external_id.clone()),
        Cell::from(m.received_at_display()),
        Cell::from(m.source_callsign.clone()),
        Cell::from(m.body.clone()),
      ])
      .style(style)
    })
    .collect();

  let widths = [
    Constraint::Length(3),
    Constraint::Length(8),
    Constraint::Length(16),
    Constraint::Length(10),
    Constraint::Min(10),
  ];

  let table = Table::new(rows, widths)
    .header(header)
    .block(block)
    .column_spacing(2)
    .row_highlight_style(
      Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    );

  let mut state = TableState::default().with_selected(Some(app.cursor));
  f.render_stateful_widget(table, area, &mut state);
}
