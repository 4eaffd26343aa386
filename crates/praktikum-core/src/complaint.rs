//! Complaint types: a student's dispute against a grade or attendance entry.
//!
//! A complaint is attached to exactly one entry, identified by its
//! [`ReferenceType`] and entry id. At most one complaint exists per entry;
//! filing again while it is open rewrites the description.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::EntryId;

pub type ComplaintId = i64;

/// Maximum complaint description length, in Unicode scalar values.
pub const MAX_COMPLAINT_CHARS: usize = 500;

// ─── Reference type ──────────────────────────────────────────────────────────

/// Which kind of entry a complaint (or a slot) belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceType {
  /// A grade posted for a module ("penilaian").
  #[serde(alias = "penilaian")]
  Grading,
  /// A marked attendance for a lab session ("presensi").
  #[serde(alias = "presensi")]
  Attendance,
}

impl ReferenceType {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Grading => "grading",
      Self::Attendance => "attendance",
    }
  }
}

impl fmt::Display for ReferenceType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Status ──────────────────────────────────────────────────────────────────

/// Lifecycle state of a complaint.
///
/// `None` is never stored; it is what a record reports when no complaint has
/// been filed.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ComplaintStatus {
  #[default]
  None,
  Open,
  /// Accepted by the reviewer.
  Closed,
  Rejected,
}

impl ComplaintStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::None => "none",
      Self::Open => "open",
      Self::Closed => "closed",
      Self::Rejected => "rejected",
    }
  }

  /// `closed` and `rejected` have no outgoing transitions.
  pub fn is_terminal(self) -> bool {
    matches!(self, Self::Closed | Self::Rejected)
  }
}

impl fmt::Display for ComplaintStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Review decision ─────────────────────────────────────────────────────────

/// A reviewer's verdict on an open complaint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewDecision {
  Accept,
  Reject,
}

impl ReviewDecision {
  /// The status an open complaint moves to under this decision.
  pub fn target_status(self) -> ComplaintStatus {
    match self {
      Self::Accept => ComplaintStatus::Closed,
      Self::Reject => ComplaintStatus::Rejected,
    }
  }

  /// Inverse of [`Self::target_status`]; `None` for non-terminal statuses.
  pub fn from_target(status: ComplaintStatus) -> Option<Self> {
    match status {
      ComplaintStatus::Closed => Some(Self::Accept),
      ComplaintStatus::Rejected => Some(Self::Reject),
      ComplaintStatus::None | ComplaintStatus::Open => None,
    }
  }
}

// ─── Complaint ───────────────────────────────────────────────────────────────

/// A stored complaint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Complaint {
  pub complaint_id:   ComplaintId,
  pub reference_type: ReferenceType,
  /// The entry this complaint disputes.
  pub reference_id:   EntryId,
  pub description:    String,
  pub status:         ComplaintStatus,
  pub created_at:     DateTime<Utc>,
  pub updated_at:     DateTime<Utc>,
}

/// Input to [`crate::store::ComplaintStore::upsert_complaint`].
/// The status is always `open`; timestamps are set by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComplaint {
  pub reference_type: ReferenceType,
  pub reference_id:   EntryId,
  pub description:    String,
}
