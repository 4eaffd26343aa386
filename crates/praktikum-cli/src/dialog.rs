//! The complaint dialog as a view model, independent of rendering.

use praktikum_core::{
  ValidationError,
  complaint::MAX_COMPLAINT_CHARS,
  lifecycle::{can_edit, derive_status, validate_filing},
  record::{ComplaintableRecord, RecordKey},
};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
  #[error(transparent)]
  Invalid(#[from] ValidationError),
  #[error("a submission is already in progress")]
  Busy,
}

/// What to send when a submission starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
  pub key:  RecordKey,
  pub text: String,
}

#[derive(Debug, Default)]
pub struct ComplaintDialog {
  record:     Option<ComplaintableRecord>,
  text:       String,
  submitting: bool,
}

impl ComplaintDialog {
  /// Open the dialog for `record`, pre-filled with its complaint text.
  /// Returns `false` and stays closed for records without a grade or
  /// attendance.
  pub fn open(&mut self, record: &ComplaintableRecord) -> bool {
    if !derive_status(record).actionable {
      return false;
    }
    self.text = record.complaint_text.clone().unwrap_or_default();
    self.record = Some(record.clone());
    self.submitting = false;
    true
  }

  pub fn is_open(&self) -> bool { self.record.is_some() }

  pub fn record(&self) -> Option<&ComplaintableRecord> { self.record.as_ref() }

  pub fn text(&self) -> &str { &self.text }

  pub fn is_submitting(&self) -> bool { self.submitting }

  /// Whether typing and submitting are possible right now.
  pub fn editable(&self) -> bool {
    !self.submitting && self.record.as_ref().is_some_and(can_edit)
  }

  pub fn input(&mut self, c: char) {
    if self.editable() && self.text.chars().count() < MAX_COMPLAINT_CHARS {
      self.text.push(c);
    }
  }

  pub fn backspace(&mut self) {
    if self.editable() {
      self.text.pop();
    }
  }

  /// Validate the buffer and mark the dialog as submitting.
  pub fn begin_submit(&mut self) -> Result<Submission, SubmitError> {
    if self.submitting {
      return Err(SubmitError::Busy);
    }
    let record = self.record.as_ref().ok_or(ValidationError::MissingSubject)?;
    validate_filing(record, &self.text)?;
    let key = record.key().ok_or(ValidationError::MissingSubject)?;
    self.submitting = true;
    Ok(Submission { key, text: self.text.clone() })
  }

  /// Settle the outstanding submission. Success closes the dialog and clears
  /// the buffer; failure keeps both so the user can retry.
  pub fn finish_submit(&mut self, succeeded: bool) {
    self.submitting = false;
    if succeeded {
      self.record = None;
      self.text.clear();
    }
  }

  /// Close without submitting. Ignored while a submission is outstanding.
  pub fn close(&mut self) {
    if !self.submitting {
      self.record = None;
      self.text.clear();
    }
  }
}

#[cfg(test)]
mod tests {
  use praktikum_core::complaint::{ComplaintStatus, ReferenceType};

  use super::*;

  fn graded() -> ComplaintableRecord {
    ComplaintableRecord {
      subject_id: Some(10),
      score: Some(70.0),
      ..ComplaintableRecord::empty(ReferenceType::Grading, 1)
    }
  }

  fn with_complaint(status: ComplaintStatus, text: &str) -> ComplaintableRecord {
    ComplaintableRecord {
      complaint_id: Some(5),
      complaint_text: Some(text.to_string()),
      complaint_status: status,
      ..graded()
    }
  }

  fn type_str(dialog: &mut ComplaintDialog, s: &str) {
    s.chars().for_each(|c| dialog.input(c));
  }

  #[test]
  fn refuses_records_without_subject() {
    let mut dialog = ComplaintDialog::default();
    assert!(!dialog.open(&ComplaintableRecord::empty(ReferenceType::Attendance, 3)));
    assert!(!dialog.is_open());
  }

  #[test]
  fn prefills_existing_text() {
    let mut dialog = ComplaintDialog::default();
    assert!(dialog.open(&with_complaint(ComplaintStatus::Open, "wrong grade")));
    assert_eq!(dialog.text(), "wrong grade");
    assert!(dialog.editable());
  }

  #[test]
  fn terminal_complaint_is_read_only() {
    let mut dialog = ComplaintDialog::default();
    assert!(dialog.open(&with_complaint(ComplaintStatus::Closed, "wrong grade")));
    type_str(&mut dialog, "!!");
    dialog.backspace();
    assert_eq!(dialog.text(), "wrong grade");
    assert_eq!(
      dialog.begin_submit(),
      Err(SubmitError::Invalid(ValidationError::Terminal(ComplaintStatus::Closed)))
    );
  }

  #[test]
  fn input_is_capped() {
    let mut dialog = ComplaintDialog::default();
    dialog.open(&graded());
    type_str(&mut dialog, &"x".repeat(MAX_COMPLAINT_CHARS + 20));
    assert_eq!(dialog.text().chars().count(), MAX_COMPLAINT_CHARS);
  }

  #[test]
  fn blank_text_is_not_submitted() {
    let mut dialog = ComplaintDialog::default();
    dialog.open(&graded());
    type_str(&mut dialog, "   ");
    assert_eq!(
      dialog.begin_submit(),
      Err(SubmitError::Invalid(ValidationError::EmptyText))
    );
    assert!(!dialog.is_submitting());
  }

  #[test]
  fn duplicate_submit_is_refused() {
    let mut dialog = ComplaintDialog::default();
    dialog.open(&graded());
    type_str(&mut dialog, "wrong grade");

    let submission = dialog.begin_submit().unwrap();
    assert_eq!(submission.key, RecordKey::new(ReferenceType::Grading, 10));
    assert_eq!(submission.text, "wrong grade");
    assert!(!dialog.editable());
    assert_eq!(dialog.begin_submit(), Err(SubmitError::Busy));

    // Closing mid-flight is ignored too.
    dialog.close();
    assert!(dialog.is_open());
  }

  #[test]
  fn success_closes_and_clears() {
    let mut dialog = ComplaintDialog::default();
    dialog.open(&graded());
    type_str(&mut dialog, "wrong grade");
    dialog.begin_submit().unwrap();
    dialog.finish_submit(true);
    assert!(!dialog.is_open());
    assert!(dialog.text().is_empty());
  }

  #[test]
  fn failure_keeps_text_for_retry() {
    let mut dialog = ComplaintDialog::default();
    dialog.open(&graded());
    type_str(&mut dialog, "wrong grade");
    dialog.begin_submit().unwrap();
    dialog.finish_submit(false);
    assert!(dialog.is_open());
    assert_eq!(dialog.text(), "wrong grade");
    assert!(dialog.begin_submit().is_ok());
  }
}
