//! Slots, entries, and the complaintable record assembled from them.
//!
//! A slot is a gradeable module or an attendance session. An entry is the
//! grade posted (or attendance marked) for one student in one slot. Records
//! are never stored; they are computed by joining a student's entries and
//! complaints onto every slot of a practicum.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::complaint::{ComplaintId, ComplaintStatus, ReferenceType};

pub type PraktikumId = i64;
pub type SlotId = i64;
pub type EntryId = i64;

// ─── Slot ────────────────────────────────────────────────────────────────────

/// A module (grading) or lab session (attendance) of a practicum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
  pub slot_id:        SlotId,
  pub praktikum_id:   PraktikumId,
  pub reference_type: ReferenceType,
  pub title:          String,
  /// Display order within the practicum.
  pub ordinal:        i64,
}

/// Input to [`crate::store::ComplaintStore::add_slot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSlot {
  pub praktikum_id:   PraktikumId,
  pub reference_type: ReferenceType,
  pub title:          String,
  #[serde(default)]
  pub ordinal:        i64,
}

// ─── Entry ───────────────────────────────────────────────────────────────────

/// A posted grade or a marked attendance. Its id is the `subject_id` of the
/// corresponding [`ComplaintableRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
  pub entry_id:    EntryId,
  pub slot_id:     SlotId,
  /// Student number (NIM).
  pub student:     String,
  /// Only meaningful for grading slots.
  pub score:       Option<f64>,
  pub recorded_at: DateTime<Utc>,
}

/// Input to [`crate::store::ComplaintStore::record_entry`]. Re-posting for the
/// same slot and student replaces the score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEntry {
  pub slot_id: SlotId,
  pub student: String,
  #[serde(default)]
  pub score:   Option<f64>,
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// Identifies an existing record: the reference type plus the entry id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordKey {
  pub reference_type: ReferenceType,
  pub subject_id:     EntryId,
}

impl RecordKey {
  pub fn new(reference_type: ReferenceType, subject_id: EntryId) -> Self {
    Self { reference_type, subject_id }
  }
}

impl fmt::Display for RecordKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} entry {}", self.reference_type, self.subject_id)
  }
}

/// The entity a complaint attaches to, as seen by a filer or reviewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplaintableRecord {
  pub reference_type:   ReferenceType,
  pub slot_id:          SlotId,
  pub title:            String,
  /// `None` until the grade is posted or the attendance is marked.
  pub subject_id:       Option<EntryId>,
  /// Student number of the entry's owner; `None` without an entry.
  #[serde(default)]
  pub student:          Option<String>,
  pub score:            Option<f64>,
  pub complaint_id:     Option<ComplaintId>,
  pub complaint_text:   Option<String>,
  #[serde(default)]
  pub complaint_status: ComplaintStatus,
}

impl ComplaintableRecord {
  /// A record for `slot_id` with no entry and no complaint.
  pub fn empty(reference_type: ReferenceType, slot_id: SlotId) -> Self {
    Self {
      reference_type,
      slot_id,
      title: String::new(),
      subject_id: None,
      student: None,
      score: None,
      complaint_id: None,
      complaint_text: None,
      complaint_status: ComplaintStatus::None,
    }
  }

  pub fn key(&self) -> Option<RecordKey> {
    self
      .subject_id
      .map(|id| RecordKey::new(self.reference_type, id))
  }

  /// The status with the "no complaint id means no complaint" rule applied.
  pub fn effective_status(&self) -> ComplaintStatus {
    if self.complaint_id.is_some() {
      self.complaint_status
    } else {
      ComplaintStatus::None
    }
  }

  /// Complaint text with surrounding whitespace removed; empty when absent.
  pub fn trimmed_text(&self) -> &str {
    self.complaint_text.as_deref().map(str::trim).unwrap_or_default()
  }
}
