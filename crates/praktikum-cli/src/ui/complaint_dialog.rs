//! Complaint dialog: a popup over the body.

use praktikum_core::complaint::MAX_COMPLAINT_CHARS;
use ratatui::{
  Frame,
  layout::{Constraint, Flex, Layout, Rect},
  style::{Color, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::app::App;

fn centered(area: Rect, width: u16, height: u16) -> Rect {
  let [row] = Layout::vertical([Constraint::Length(height)])
    .flex(Flex::Center)
    .areas(area);
  let [cell] = Layout::horizontal([Constraint::Length(width)])
    .flex(Flex::Center)
    .areas(row);
  cell
}

/// Render the dialog for the record it was opened on.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let dialog = &app.dialog;
  let Some(record) = dialog.record() else { return };

  let popup = centered(area, area.width.min(70), area.height.min(12));
  f.render_widget(Clear, popup);

  let block = Block::default()
    .title(format!(" Complaint · {} ", record.title))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Cyan));
  let inner = block.inner(popup);
  f.render_widget(block, popup);

  let [text_area, footer] =
    Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(inner);

  let text = if dialog.editable() {
    format!("{}_", dialog.text())
  } else {
    dialog.text().to_string()
  };
  let text_style = if dialog.editable() {
    Style::default()
  } else {
    Style::default().fg(Color::DarkGray)
  };
  f.render_widget(
    Paragraph::new(text).style(text_style).wrap(Wrap { trim: false }),
    text_area,
  );

  let state = if dialog.is_submitting() {
    "Sending…".to_string()
  } else if !dialog.editable() {
    "Read only".to_string()
  } else {
    format!("{}/{MAX_COMPLAINT_CHARS}", dialog.text().chars().count())
  };
  f.render_widget(
    Paragraph::new(Line::from(Span::styled(
      state,
      Style::default().fg(Color::DarkGray),
    ))),
    footer,
  );
}
