//! Application state machine and event dispatcher.

use std::sync::{Arc, Mutex, PoisonError};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use praktikum_core::{
  complaint::{ReferenceType, ReviewDecision},
  lifecycle::{Action, RecordView, Role},
  notify::{Activity, Notification, Notifier},
  record::PraktikumId,
};

use crate::{client::ApiClient, dialog::ComplaintDialog};

// ─── Screen ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
  /// Focus on the record list.
  RecordList,
  /// The complaint dialog is open on top of the list.
  Dialog,
}

// ─── Status line ──────────────────────────────────────────────────────────────

/// Notifier that keeps the latest notification for the status bar.
#[derive(Default)]
pub struct StatusLine(Mutex<Option<Notification>>);

impl StatusLine {
  pub fn latest(&self) -> Option<Notification> {
    self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
  }

  pub fn clear(&self) {
    *self.0.lock().unwrap_or_else(PoisonError::into_inner) = None;
  }
}

impl Notifier for StatusLine {
  fn notify(&self, notification: Notification) {
    *self.0.lock().unwrap_or_else(PoisonError::into_inner) = Some(notification);
  }
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Which practicum, student, and kind of record the app is showing.
#[derive(Debug, Clone)]
pub struct View {
  pub praktikum_id:   PraktikumId,
  pub student:        String,
  pub reference_type: ReferenceType,
  pub role:           Role,
}

/// Top-level application state.
pub struct App {
  pub screen: Screen,

  pub view: View,

  /// Records of the current view, with derived statuses.
  pub records: Vec<RecordView>,

  /// Cursor position within `records`.
  pub list_cursor: usize,

  pub dialog: ComplaintDialog,

  /// One-line message for load errors and hints; notifications take
  /// precedence in the status bar.
  pub status_msg: String,

  pub notices: Arc<StatusLine>,

  pub client: Arc<ApiClient>,
}

impl App {
  pub fn new(client: ApiClient, view: View) -> Self {
    Self {
      screen: Screen::RecordList,
      view,
      records: Vec::new(),
      list_cursor: 0,
      dialog: ComplaintDialog::default(),
      status_msg: String::new(),
      notices: Arc::new(StatusLine::default()),
      client: Arc::new(client),
    }
  }

  // ── Data loading ──────────────────────────────────────────────────────────

  /// Fetch the records of the current view.
  pub async fn load_records(&mut self) -> anyhow::Result<()> {
    self.status_msg = "Loading records…".into();
    let result = self
      .client
      .list_records(
        self.view.praktikum_id,
        &self.view.student,
        self.view.reference_type,
      )
      .await;
    match result {
      Ok(records) => {
        self.records = records;
        self.list_cursor = self.list_cursor.min(self.records.len().saturating_sub(1));
        self.status_msg = String::new();
        Ok(())
      }
      Err(e) => {
        self.status_msg = format!("Error: {e}");
        Err(e)
      }
    }
  }

  pub fn cursor_record(&self) -> Option<&RecordView> { self.records.get(self.list_cursor) }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Ok(false);
    }

    match self.screen {
      Screen::RecordList => self.handle_list_key(key).await,
      Screen::Dialog => {
        self.handle_dialog_key(key).await;
        Ok(true)
      }
    }
  }

  async fn handle_list_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match key.code {
      KeyCode::Char('q') => return Ok(false),
      KeyCode::Down | KeyCode::Char('j') => {
        if self.list_cursor + 1 < self.records.len() {
          self.list_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.list_cursor = self.list_cursor.saturating_sub(1);
      }
      KeyCode::Char('r') => {
        self.notices.clear();
        // A failed reload is reported in the status bar.
        let _ = self.load_records().await;
      }
      KeyCode::Char('t') => {
        self.view.reference_type = match self.view.reference_type {
          ReferenceType::Grading => ReferenceType::Attendance,
          ReferenceType::Attendance => ReferenceType::Grading,
        };
        self.list_cursor = 0;
        let _ = self.load_records().await;
      }
      KeyCode::Enter if self.view.role == Role::Filer => self.open_dialog(),
      KeyCode::Char('a') if self.view.role == Role::Reviewer => {
        self.review(ReviewDecision::Accept).await;
      }
      KeyCode::Char('x') if self.view.role == Role::Reviewer => {
        self.review(ReviewDecision::Reject).await;
      }
      _ => {}
    }
    Ok(true)
  }

  fn open_dialog(&mut self) {
    let Some(view) = self.cursor_record() else { return };
    let record = view.record.clone();
    if self.dialog.open(&record) {
      self.screen = Screen::Dialog;
      self.notices.clear();
    } else {
      self.status_msg = format!("{}: nothing to complain about yet", record.title);
    }
  }

  async fn handle_dialog_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.dialog.close();
        if !self.dialog.is_open() {
          self.screen = Screen::RecordList;
        }
      }
      KeyCode::Enter => self.submit().await,
      KeyCode::Backspace => self.dialog.backspace(),
      KeyCode::Char(c) => self.dialog.input(c),
      _ => {}
    }
  }

  // ── Mutations ─────────────────────────────────────────────────────────────

  async fn submit(&mut self) {
    let submission = match self.dialog.begin_submit() {
      Ok(s) => s,
      Err(e) => {
        self
          .notices
          .notify(Notification::failure(Activity::File, e.to_string()));
        return;
      }
    };

    let result = self
      .client
      .create_complaint(
        submission.key.reference_type,
        submission.key.subject_id,
        &submission.text,
      )
      .await;

    self.dialog.finish_submit(result.is_ok());
    match result {
      Ok(_) => {
        self.notices.notify(Notification::success(Activity::File));
        self.screen = Screen::RecordList;
        let _ = self.load_records().await;
      }
      Err(e) => {
        self
          .notices
          .notify(Notification::failure(Activity::File, e.to_string()));
      }
    }
  }

  async fn review(&mut self, decision: ReviewDecision) {
    let wanted = match decision {
      ReviewDecision::Accept => Action::Accept,
      ReviewDecision::Reject => Action::Reject,
    };
    let Some(view) = self.cursor_record() else { return };
    let (true, Some(id)) = (view.reviewer_actions.contains(&wanted), view.record.complaint_id)
    else {
      self.status_msg = "No open complaint on this record".into();
      return;
    };

    let activity = Activity::Review(decision);
    match self
      .client
      .update_complaint_status(id, decision.target_status())
      .await
    {
      Ok(_) => {
        self.notices.notify(Notification::success(activity));
        let _ = self.load_records().await;
      }
      Err(e) => {
        self
          .notices
          .notify(Notification::failure(activity, e.to_string()));
      }
    }
  }
}
