//! Complaint lifecycle: pure decision logic over a [`ComplaintableRecord`].
//!
//! Everything here is a function of the record's current fields: the status a
//! filer or reviewer sees, whether the complaint text may still change, which
//! actions are valid next, and which transitions a review may apply.
//!
//! Status derivation is an ordered rule chain: the first predicate that
//! matches decides the label. The order is part of the contract, since several
//! predicates can hold at once (e.g. a closed complaint with blank text).

use serde::{Deserialize, Serialize};

use crate::{
  complaint::{
    ComplaintId, ComplaintStatus, MAX_COMPLAINT_CHARS, ReferenceType,
    ReviewDecision,
  },
  error::{Error, ValidationError},
  record::ComplaintableRecord,
};

// ─── Views ───────────────────────────────────────────────────────────────────

/// Display severity of a status; the client picks a colour from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
  Neutral,
  Informational,
  Warning,
  Success,
  Error,
}

/// The status of a record from the filer's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusLabel {
  NoUnderlyingEvent,
  EligibleToFile,
  ResolvedAccepted,
  ResolvedRejected,
  PendingReview,
}

impl StatusLabel {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::NoUnderlyingEvent => "no underlying event",
      Self::EligibleToFile => "eligible to file",
      Self::ResolvedAccepted => "resolved-accepted",
      Self::ResolvedRejected => "resolved-rejected",
      Self::PendingReview => "pending review",
    }
  }

  pub fn severity(self) -> Severity {
    match self {
      Self::NoUnderlyingEvent => Severity::Neutral,
      Self::EligibleToFile => Severity::Informational,
      Self::ResolvedAccepted => Severity::Success,
      Self::ResolvedRejected => Severity::Error,
      Self::PendingReview => Severity::Warning,
    }
  }

  /// Short badge text for this label on a record of `reference_type`.
  pub fn headline(self, reference_type: ReferenceType) -> &'static str {
    match (self, reference_type) {
      (Self::NoUnderlyingEvent, ReferenceType::Grading) => "No grade yet",
      (Self::NoUnderlyingEvent, ReferenceType::Attendance) => "Not attended",
      (Self::EligibleToFile, _) => "Can complain",
      (Self::ResolvedAccepted, _) => "Complaint resolved",
      (Self::ResolvedRejected, _) => "Complaint rejected",
      (Self::PendingReview, _) => "Complaint sent",
    }
  }
}

/// The status of a record from the reviewer's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewLabel {
  NoComplaint,
  Accepted,
  Rejected,
  AwaitingDecision,
}

impl ReviewLabel {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::NoComplaint => "no complaint",
      Self::Accepted => "accepted",
      Self::Rejected => "rejected",
      Self::AwaitingDecision => "awaiting decision",
    }
  }

  pub fn severity(self) -> Severity {
    match self {
      Self::NoComplaint => Severity::Informational,
      Self::Accepted => Severity::Success,
      Self::Rejected => Severity::Error,
      Self::AwaitingDecision => Severity::Warning,
    }
  }

  /// One-line explanation shown in the reviewer's complaint detail.
  pub fn description(self) -> &'static str {
    match self {
      Self::NoComplaint => "The student has not filed a complaint",
      Self::Accepted => "The complaint was followed up and resolved",
      Self::Rejected => "The complaint was rejected",
      Self::AwaitingDecision => "The complaint is waiting for your decision",
    }
  }
}

/// A derived, display-ready status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusView<L> {
  pub label:      L,
  pub severity:   Severity,
  /// Whether the record's complaint dialog may be opened at all.
  pub actionable: bool,
}

// ─── Rule chains ─────────────────────────────────────────────────────────────

type Rule<L> = (fn(&ComplaintableRecord) -> bool, L);

fn has_no_subject(r: &ComplaintableRecord) -> bool { r.subject_id.is_none() }

fn has_no_complaint(r: &ComplaintableRecord) -> bool {
  r.complaint_id.is_none() || r.trimmed_text().is_empty()
}

fn is_closed(r: &ComplaintableRecord) -> bool {
  r.complaint_status == ComplaintStatus::Closed
}

fn is_rejected(r: &ComplaintableRecord) -> bool {
  r.complaint_status == ComplaintStatus::Rejected
}

fn has_no_complaint_id(r: &ComplaintableRecord) -> bool {
  r.complaint_id.is_none()
}

const FILER_RULES: &[Rule<StatusLabel>] = &[
  (has_no_subject, StatusLabel::NoUnderlyingEvent),
  (has_no_complaint, StatusLabel::EligibleToFile),
  (is_closed, StatusLabel::ResolvedAccepted),
  (is_rejected, StatusLabel::ResolvedRejected),
];

const REVIEWER_RULES: &[Rule<ReviewLabel>] = &[
  (has_no_complaint_id, ReviewLabel::NoComplaint),
  (is_closed, ReviewLabel::Accepted),
  (is_rejected, ReviewLabel::Rejected),
];

fn first_match<L: Copy>(
  rules: &[Rule<L>],
  fallback: L,
  record: &ComplaintableRecord,
) -> L {
  rules
    .iter()
    .find(|(pred, _)| pred(record))
    .map_or(fallback, |(_, label)| *label)
}

// ─── Derivation ──────────────────────────────────────────────────────────────

/// The filer-side status of `record`.
pub fn derive_status(record: &ComplaintableRecord) -> StatusView<StatusLabel> {
  let label = first_match(FILER_RULES, StatusLabel::PendingReview, record);
  StatusView {
    label,
    severity: label.severity(),
    actionable: label != StatusLabel::NoUnderlyingEvent,
  }
}

/// The reviewer-side status of `record`. Reviewers may always open the
/// detail, so the view is always actionable.
pub fn derive_review_status(
  record: &ComplaintableRecord,
) -> StatusView<ReviewLabel> {
  let label = first_match(REVIEWER_RULES, ReviewLabel::AwaitingDecision, record);
  StatusView { label, severity: label.severity(), actionable: true }
}

/// Whether the filer may still change the complaint text.
pub fn can_edit(record: &ComplaintableRecord) -> bool {
  matches!(
    record.effective_status(),
    ComplaintStatus::None | ComplaintStatus::Open
  )
}

// ─── Actions ─────────────────────────────────────────────────────────────────

/// Who is looking at a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  /// The student owning the entry.
  Filer,
  /// Staff deciding on complaints.
  Reviewer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
  File,
  Edit,
  View,
  Accept,
  Reject,
}

/// The actions `role` may take next on `record`.
pub fn next_actions(record: &ComplaintableRecord, role: Role) -> Vec<Action> {
  if record.subject_id.is_none() {
    return Vec::new();
  }
  let status = record.effective_status();
  match (role, status) {
    (Role::Filer, ComplaintStatus::None) => vec![Action::File],
    (Role::Filer, ComplaintStatus::Open) => vec![Action::Edit],
    (Role::Reviewer, ComplaintStatus::None) => Vec::new(),
    (Role::Reviewer, ComplaintStatus::Open) => {
      vec![Action::Accept, Action::Reject]
    }
    (_, ComplaintStatus::Closed | ComplaintStatus::Rejected) => {
      vec![Action::View]
    }
  }
}

// ─── Preconditions and transitions ───────────────────────────────────────────

/// Check everything that must hold before `text` is sent as the complaint for
/// `record`.
pub fn validate_filing(
  record: &ComplaintableRecord,
  text: &str,
) -> Result<(), ValidationError> {
  if record.subject_id.is_none() {
    return Err(ValidationError::MissingSubject);
  }
  if !can_edit(record) {
    return Err(ValidationError::Terminal(record.effective_status()));
  }
  validate_text(text)
}

/// Length and emptiness checks alone, for callers without a record at hand.
pub fn validate_text(text: &str) -> Result<(), ValidationError> {
  if text.trim().is_empty() {
    return Err(ValidationError::EmptyText);
  }
  let len = text.chars().count();
  if len > MAX_COMPLAINT_CHARS {
    return Err(ValidationError::TooLong { len, max: MAX_COMPLAINT_CHARS });
  }
  Ok(())
}

/// The status `decision` moves complaint `complaint_id` to from `current`.
/// Only `open` complaints can be reviewed.
pub fn transition(
  complaint_id: ComplaintId,
  current: ComplaintStatus,
  decision: ReviewDecision,
) -> Result<ComplaintStatus, Error> {
  match current {
    ComplaintStatus::Open => Ok(decision.target_status()),
    from => Err(Error::InvalidTransition { complaint_id, from }),
  }
}

// ─── Record view ─────────────────────────────────────────────────────────────

/// A record bundled with everything derived from it, as served to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordView {
  #[serde(flatten)]
  pub record:           ComplaintableRecord,
  pub status:           StatusView<StatusLabel>,
  pub review_status:    StatusView<ReviewLabel>,
  pub can_edit:         bool,
  pub filer_actions:    Vec<Action>,
  pub reviewer_actions: Vec<Action>,
}

impl RecordView {
  pub fn of(record: ComplaintableRecord) -> Self {
    Self {
      status: derive_status(&record),
      review_status: derive_review_status(&record),
      can_edit: can_edit(&record),
      filer_actions: next_actions(&record, Role::Filer),
      reviewer_actions: next_actions(&record, Role::Reviewer),
      record,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn record(
    subject_id: Option<i64>,
    complaint_id: Option<i64>,
    text: Option<&str>,
    status: ComplaintStatus,
  ) -> ComplaintableRecord {
    ComplaintableRecord {
      subject_id,
      complaint_id,
      complaint_text: text.map(str::to_owned),
      complaint_status: status,
      ..ComplaintableRecord::empty(ReferenceType::Grading, 1)
    }
  }

  const ALL_STATUSES: [ComplaintStatus; 4] = [
    ComplaintStatus::None,
    ComplaintStatus::Open,
    ComplaintStatus::Closed,
    ComplaintStatus::Rejected,
  ];

  // ── derive_status ───────────────────────────────────────────────────────────

  #[test]
  fn missing_subject_wins_over_everything() {
    for status in ALL_STATUSES {
      for complaint_id in [None, Some(5)] {
        for text in [None, Some(""), Some("wrong grade")] {
          let view = derive_status(&record(None, complaint_id, text, status));
          assert_eq!(view.label, StatusLabel::NoUnderlyingEvent);
          assert_eq!(view.severity, Severity::Neutral);
          assert!(!view.actionable);
        }
      }
    }
  }

  #[test]
  fn no_complaint_is_eligible() {
    let view = derive_status(&record(Some(10), None, None, ComplaintStatus::None));
    assert_eq!(view.label, StatusLabel::EligibleToFile);
    assert_eq!(view.severity, Severity::Informational);
    assert!(view.actionable);
  }

  #[test]
  fn blank_text_beats_terminal_status() {
    let r = record(Some(10), Some(5), Some("   "), ComplaintStatus::Closed);
    assert_eq!(derive_status(&r).label, StatusLabel::EligibleToFile);
  }

  #[test]
  fn stale_status_without_complaint_id_is_eligible() {
    let r = record(Some(10), None, Some("text"), ComplaintStatus::Rejected);
    assert_eq!(derive_status(&r).label, StatusLabel::EligibleToFile);
    assert!(can_edit(&r));
  }

  #[test]
  fn terminal_and_pending_labels() {
    let closed = record(Some(10), Some(5), Some("x"), ComplaintStatus::Closed);
    let rejected = record(Some(10), Some(5), Some("x"), ComplaintStatus::Rejected);
    let open = record(Some(10), Some(5), Some("x"), ComplaintStatus::Open);

    assert_eq!(derive_status(&closed).label, StatusLabel::ResolvedAccepted);
    assert_eq!(derive_status(&closed).severity, Severity::Success);
    assert_eq!(derive_status(&rejected).label, StatusLabel::ResolvedRejected);
    assert_eq!(derive_status(&rejected).severity, Severity::Error);
    assert_eq!(derive_status(&open).label, StatusLabel::PendingReview);
    assert_eq!(derive_status(&open).severity, Severity::Warning);
    assert!(derive_status(&closed).actionable);
    assert!(derive_status(&open).actionable);
  }

  #[test]
  fn derive_status_is_repeatable() {
    let r = record(Some(10), Some(5), Some("x"), ComplaintStatus::Open);
    let before = r.clone();
    assert_eq!(derive_status(&r), derive_status(&r));
    assert_eq!(r, before);
  }

  #[test]
  fn headline_depends_on_reference_type() {
    let label = StatusLabel::NoUnderlyingEvent;
    assert_eq!(label.headline(ReferenceType::Grading), "No grade yet");
    assert_eq!(label.headline(ReferenceType::Attendance), "Not attended");
  }

  // ── derive_review_status ────────────────────────────────────────────────────

  #[test]
  fn reviewer_labels() {
    let none = record(Some(10), None, None, ComplaintStatus::None);
    let open = record(Some(10), Some(5), Some("x"), ComplaintStatus::Open);
    let closed = record(Some(10), Some(5), Some("x"), ComplaintStatus::Closed);
    let rejected = record(Some(10), Some(5), Some("x"), ComplaintStatus::Rejected);

    assert_eq!(derive_review_status(&none).label, ReviewLabel::NoComplaint);
    assert_eq!(derive_review_status(&open).label, ReviewLabel::AwaitingDecision);
    assert_eq!(derive_review_status(&closed).label, ReviewLabel::Accepted);
    assert_eq!(derive_review_status(&rejected).label, ReviewLabel::Rejected);
    assert!(derive_review_status(&none).actionable);
  }

  // ── can_edit / next_actions ─────────────────────────────────────────────────

  #[test]
  fn terminal_statuses_are_not_editable() {
    for status in [ComplaintStatus::Closed, ComplaintStatus::Rejected] {
      assert!(!can_edit(&record(Some(10), Some(5), Some("x"), status)));
    }
  }

  #[test]
  fn open_or_absent_complaints_are_editable() {
    assert!(can_edit(&record(Some(10), Some(5), Some("x"), ComplaintStatus::Open)));
    assert!(can_edit(&record(Some(10), None, None, ComplaintStatus::None)));
  }

  #[test]
  fn actions_per_role() {
    let none = record(Some(10), None, None, ComplaintStatus::None);
    let open = record(Some(10), Some(5), Some("x"), ComplaintStatus::Open);
    let closed = record(Some(10), Some(5), Some("x"), ComplaintStatus::Closed);
    let missing = record(None, None, None, ComplaintStatus::None);

    assert_eq!(next_actions(&none, Role::Filer), vec![Action::File]);
    assert!(next_actions(&none, Role::Reviewer).is_empty());
    assert_eq!(next_actions(&open, Role::Filer), vec![Action::Edit]);
    assert_eq!(
      next_actions(&open, Role::Reviewer),
      vec![Action::Accept, Action::Reject]
    );
    assert_eq!(next_actions(&closed, Role::Filer), vec![Action::View]);
    assert_eq!(next_actions(&closed, Role::Reviewer), vec![Action::View]);
    assert!(next_actions(&missing, Role::Filer).is_empty());
    assert!(next_actions(&missing, Role::Reviewer).is_empty());
  }

  // ── validate_filing ─────────────────────────────────────────────────────────

  #[test]
  fn filing_without_subject_is_rejected() {
    let r = record(None, None, None, ComplaintStatus::None);
    assert_eq!(
      validate_filing(&r, "wrong grade"),
      Err(ValidationError::MissingSubject)
    );
  }

  #[test]
  fn filing_length_boundary() {
    let r = record(Some(10), None, None, ComplaintStatus::None);
    assert!(validate_filing(&r, &"a".repeat(500)).is_ok());
    assert_eq!(
      validate_filing(&r, &"a".repeat(501)),
      Err(ValidationError::TooLong { len: 501, max: 500 })
    );
  }

  #[test]
  fn length_counts_characters_not_bytes() {
    assert!(validate_text(&"é".repeat(500)).is_ok());
  }

  #[test]
  fn filing_blank_text_is_rejected() {
    let r = record(Some(10), None, None, ComplaintStatus::None);
    assert_eq!(validate_filing(&r, " \n\t"), Err(ValidationError::EmptyText));
  }

  #[test]
  fn filing_on_terminal_complaint_is_rejected() {
    let r = record(Some(10), Some(5), Some("x"), ComplaintStatus::Rejected);
    assert_eq!(
      validate_filing(&r, "again"),
      Err(ValidationError::Terminal(ComplaintStatus::Rejected))
    );
  }

  // ── transition ──────────────────────────────────────────────────────────────

  #[test]
  fn open_complaints_transition_to_terminal() {
    assert_eq!(
      transition(5, ComplaintStatus::Open, ReviewDecision::Accept).unwrap(),
      ComplaintStatus::Closed
    );
    assert_eq!(
      transition(5, ComplaintStatus::Open, ReviewDecision::Reject).unwrap(),
      ComplaintStatus::Rejected
    );
  }

  #[test]
  fn non_open_complaints_cannot_transition() {
    for from in [
      ComplaintStatus::None,
      ComplaintStatus::Closed,
      ComplaintStatus::Rejected,
    ] {
      let err = transition(5, from, ReviewDecision::Accept).unwrap_err();
      assert!(matches!(
        err,
        Error::InvalidTransition { complaint_id: 5, from: f } if f == from
      ));
    }
  }

  // ── RecordView ──────────────────────────────────────────────────────────────

  #[test]
  fn record_view_serialises_flat() {
    let view = RecordView::of(record(Some(10), Some(5), Some("x"), ComplaintStatus::Open));
    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json["subject_id"], 10);
    assert_eq!(json["complaint_status"], "open");
    assert_eq!(json["status"]["label"], "pending_review");
    assert_eq!(json["review_status"]["label"], "awaiting_decision");
    assert_eq!(json["reviewer_actions"], serde_json::json!(["accept", "reject"]));

    let back: RecordView = serde_json::from_value(json).unwrap();
    assert_eq!(back, view);
  }
}
