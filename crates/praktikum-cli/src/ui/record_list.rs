//! Record list pane: left panel.

use praktikum_core::lifecycle::Role;
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState},
};

use super::severity_color;
use crate::app::App;

/// Render the record list into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let block = Block::default()
    .title(format!(" Records ({}) ", app.records.len()))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let items: Vec<ListItem> = app
    .records
    .iter()
    .map(|view| {
      let (label, severity, dimmed) = match app.view.role {
        Role::Filer => (
          view.status.label.headline(view.record.reference_type),
          view.status.severity,
          !view.status.actionable,
        ),
        Role::Reviewer => (
          view.review_status.label.description(),
          view.review_status.severity,
          false,
        ),
      };
      let title_style = if dimmed {
        Style::default().fg(Color::DarkGray)
      } else {
        Style::default()
      };
      ListItem::new(Line::from(vec![
        Span::styled(format!("{:<20}", view.record.title), title_style),
        Span::styled(label, Style::default().fg(severity_color(severity))),
      ]))
    })
    .collect();

  let mut state = ListState::default();
  state.select((!app.records.is_empty()).then_some(app.list_cursor));

  f.render_stateful_widget(
    List::new(items)
      .block(block)
      .highlight_style(
        Style::default()
          .bg(Color::Blue)
          .fg(Color::White)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol(""),
    area,
    &mut state,
  );
}
