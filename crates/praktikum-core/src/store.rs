//! The `ComplaintStore` trait and supporting query and outcome types.
//!
//! The trait is implemented by storage backends (e.g.
//! `praktikum-store-sqlite`). The service and the HTTP layer depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  complaint::{Complaint, ComplaintId, ComplaintStatus, NewComplaint, ReferenceType},
  record::{
    ComplaintableRecord, Entry, NewEntry, NewSlot, PraktikumId, RecordKey, Slot,
  },
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Parameters for [`ComplaintStore::list_records`]: every slot of one
/// practicum and reference type, seen by one student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordQuery {
  pub praktikum_id:   PraktikumId,
  pub student:        String,
  pub reference_type: ReferenceType,
}

/// Parameters for [`ComplaintStore::list_complaints`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComplaintQuery {
  pub status:         Option<ComplaintStatus>,
  pub reference_type: Option<ReferenceType>,
  pub limit:          Option<usize>,
  pub offset:         Option<usize>,
}

// ─── Outcomes ────────────────────────────────────────────────────────────────

/// Result of a conditional complaint write.
#[derive(Debug, Clone, PartialEq)]
pub enum FilingOutcome {
  Created(Complaint),
  /// An open complaint existed and its description was replaced.
  Updated(Complaint),
  /// No entry exists for the referenced record.
  MissingSubject,
  /// The existing complaint is terminal; nothing was written.
  Locked(ComplaintStatus),
}

/// Result of a conditional status transition.
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionOutcome {
  Applied(Complaint),
  NotFound,
  /// The complaint was not open; nothing was written.
  Refused { current: ComplaintStatus },
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a complaint store backend.
///
/// Writes that depend on the current complaint status are conditional: the
/// check and the write happen atomically inside the backend, so a filer and a
/// reviewer racing on the same complaint can never move it out of a terminal
/// state.
pub trait ComplaintStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Slots and entries ─────────────────────────────────────────────────

  /// Create a module or session for a practicum.
  fn add_slot(
    &self,
    input: NewSlot,
  ) -> impl Future<Output = Result<Slot, Self::Error>> + Send + '_;

  /// Post a grade or mark an attendance. Replaces the score if the student
  /// already has an entry for the slot. Returns `None` if the slot does not
  /// exist.
  fn record_entry(
    &self,
    input: NewEntry,
  ) -> impl Future<Output = Result<Option<Entry>, Self::Error>> + Send + '_;

  // ── Records ───────────────────────────────────────────────────────────

  /// One record per slot matching `query`, in slot order. Slots the student
  /// has no entry for yield records without a `subject_id`.
  fn list_records<'a>(
    &'a self,
    query: &'a RecordQuery,
  ) -> impl Future<Output = Result<Vec<ComplaintableRecord>, Self::Error>> + Send + 'a;

  /// The record for an existing entry. Returns `None` if no entry of that
  /// reference type has the given id.
  fn get_record(
    &self,
    key: RecordKey,
  ) -> impl Future<Output = Result<Option<ComplaintableRecord>, Self::Error>> + Send + '_;

  // ── Complaints ────────────────────────────────────────────────────────

  /// Create the complaint for an entry, or replace the description of its
  /// open complaint. Always leaves the complaint `open` when it writes.
  fn upsert_complaint(
    &self,
    input: NewComplaint,
  ) -> impl Future<Output = Result<FilingOutcome, Self::Error>> + Send + '_;

  fn get_complaint(
    &self,
    id: ComplaintId,
  ) -> impl Future<Output = Result<Option<Complaint>, Self::Error>> + Send + '_;

  /// Complaints matching `query`, oldest first.
  fn list_complaints<'a>(
    &'a self,
    query: &'a ComplaintQuery,
  ) -> impl Future<Output = Result<Vec<Complaint>, Self::Error>> + Send + 'a;

  /// Move an `open` complaint to `to`. Any other current status is refused.
  fn transition_complaint(
    &self,
    id: ComplaintId,
    to: ComplaintStatus,
  ) -> impl Future<Output = Result<TransitionOutcome, Self::Error>> + Send + '_;
}
