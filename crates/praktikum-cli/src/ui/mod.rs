//! TUI rendering: orchestrates all panes.

pub mod complaint_dialog;
pub mod record_list;

use praktikum_core::lifecycle::{Role, Severity};
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::{App, Screen};

/// Colour a derived status is drawn in.
pub fn severity_color(severity: Severity) -> Color {
  match severity {
    Severity::Neutral => Color::DarkGray,
    Severity::Informational => Color::Blue,
    Severity::Warning => Color::Yellow,
    Severity::Success => Color::Green,
    Severity::Error => Color::Red,
  }
}

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let area = f.area();

  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(area);

  draw_header(f, rows[0], app);
  draw_body(f, rows[1], app);
  draw_status(f, rows[2], app);

  if app.screen == Screen::Dialog {
    complaint_dialog::draw(f, rows[1], app);
  }
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
  let left = Span::styled(
    format!(" praktikum {}  [t] switch kind  [q] quit", app.view.praktikum_id),
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let right = Span::styled(
    format!("{} · {} ", app.view.student, app.view.reference_type),
    Style::default().fg(Color::Gray),
  );

  let left_width = left.content.chars().count() as u16;
  let right_width = right.content.chars().count() as u16;
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

// ─── Body ─────────────────────────────────────────────────────────────────────

fn draw_body(f: &mut Frame, area: Rect, app: &App) {
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
    .split(area);

  record_list::draw(f, cols[0], app);
  draw_detail(f, cols[1], app);
}

fn draw_detail(f: &mut Frame, area: Rect, app: &App) {
  let block = Block::default()
    .title(" Complaint ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let Some(view) = app.cursor_record() else {
    f.render_widget(
      Paragraph::new("No records.").style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  };

  let record = &view.record;
  let (label, severity) = match app.view.role {
    Role::Filer => (
      view.status.label.headline(record.reference_type),
      view.status.severity,
    ),
    Role::Reviewer => (
      view.review_status.label.description(),
      view.review_status.severity,
    ),
  };

  let mut lines = vec![
    Line::from(Span::styled(
      record.title.clone(),
      Style::default().add_modifier(Modifier::BOLD),
    )),
    Line::from(Span::styled(
      label,
      Style::default().fg(severity_color(severity)),
    )),
  ];
  if let Some(score) = record.score {
    lines.push(Line::from(format!("Score: {score}")));
  }
  lines.push(Line::from(""));
  match record.complaint_text.as_deref() {
    Some(text) if !text.trim().is_empty() => lines.push(Line::from(text.to_string())),
    _ => lines.push(Line::from(Span::styled(
      "No complaint filed.",
      Style::default().fg(Color::DarkGray),
    ))),
  }

  f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let (mode_label, hints) = match (app.screen, app.view.role) {
    (Screen::Dialog, _) => ("DIALOG", "Type your complaint  Enter send  Esc close"),
    (Screen::RecordList, Role::Filer) => (
      "FILER",
      "↑↓/jk navigate  Enter complain  r reload  q quit",
    ),
    (Screen::RecordList, Role::Reviewer) => (
      "REVIEW",
      "↑↓/jk navigate  a accept  x reject  r reload  q quit",
    ),
  };

  let (text, color) = match app.notices.latest() {
    Some(n) => (
      format!("{}: {n}", n.title()),
      if n.is_success() { Color::Green } else { Color::Red },
    ),
    None if !app.status_msg.is_empty() => (app.status_msg.clone(), Color::Gray),
    None => (hints.to_string(), Color::DarkGray),
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );
  let text_span = Span::styled(format!("  {text}"), Style::default().fg(color));

  f.render_widget(
    Paragraph::new(Line::from(vec![mode_span, text_span]))
      .style(Style::default().bg(Color::Black)),
    area,
  );
}
