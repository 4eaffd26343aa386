//! [`ComplaintService`]: filing and reviewing complaints against a store.
//!
//! The service adds three things on top of a bare [`ComplaintStore`]:
//!
//! - lifecycle checks before anything is written,
//! - one notification per file or review attempt,
//! - a per-record in-flight guard, so a second mutation of a record is
//!   refused while the first is still outstanding.
//!
//! Single-record reads go through a bounded cache that every successful
//! mutation invalidates. Listings always hit the store.

use std::{
  collections::{HashMap, HashSet, VecDeque},
  sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::{
  complaint::{Complaint, ComplaintId, NewComplaint, ReviewDecision},
  error::{Error, Result, ValidationError},
  lifecycle,
  notify::{Activity, Notification, Notifier},
  record::{ComplaintableRecord, Entry, NewEntry, NewSlot, RecordKey, Slot, SlotId},
  store::{
    ComplaintQuery, ComplaintStore, FilingOutcome, RecordQuery,
    TransitionOutcome,
  },
};

/// Records kept by default before the oldest are evicted.
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
  m.lock().unwrap_or_else(PoisonError::into_inner)
}

// ─── In-flight guard ─────────────────────────────────────────────────────────

/// Marks a record as being mutated; released on drop.
pub(crate) struct InFlight<'a> {
  set: &'a Mutex<HashSet<RecordKey>>,
  key: RecordKey,
}

impl Drop for InFlight<'_> {
  fn drop(&mut self) { lock(self.set).remove(&self.key); }
}

// ─── Record cache ────────────────────────────────────────────────────────────

/// Insertion-ordered record cache.
///
/// `epoch` moves on every invalidation. A read notes the epoch before going
/// to the store and only fills the cache if it has not moved since, so a
/// row fetched before a concurrent write can never outlive that write.
struct RecordCache {
  entries:  HashMap<RecordKey, ComplaintableRecord>,
  order:    VecDeque<RecordKey>,
  epoch:    u64,
  capacity: usize,
}

impl RecordCache {
  fn new(capacity: usize) -> Self {
    Self {
      entries: HashMap::new(),
      order: VecDeque::new(),
      epoch: 0,
      capacity,
    }
  }

  fn get(&self, key: &RecordKey) -> Option<ComplaintableRecord> {
    self.entries.get(key).cloned()
  }

  fn fill(&mut self, key: RecordKey, record: ComplaintableRecord, seen: u64) {
    if seen != self.epoch || self.capacity == 0 {
      return;
    }
    if self.entries.insert(key, record).is_none() {
      self.order.push_back(key);
    }
    while self.order.len() > self.capacity {
      if let Some(oldest) = self.order.pop_front() {
        self.entries.remove(&oldest);
      }
    }
  }

  fn invalidate(&mut self, key: &RecordKey) {
    self.epoch += 1;
    if self.entries.remove(key).is_some() {
      self.order.retain(|k| k != key);
    }
  }

  fn invalidate_slot(&mut self, slot_id: SlotId) {
    self.epoch += 1;
    self.entries.retain(|_, r| r.slot_id != slot_id);
    let entries = &self.entries;
    self.order.retain(|k| entries.contains_key(k));
  }
}

// ─── Service ─────────────────────────────────────────────────────────────────

/// Result of a successful filing.
#[derive(Debug, Clone, PartialEq)]
pub struct Filing {
  /// The record as it stands after the write.
  pub record:    ComplaintableRecord,
  pub complaint: Complaint,
  /// `true` for a first filing, `false` for a rewrite of an open complaint.
  pub created:   bool,
}

pub struct ComplaintService<S, N> {
  store:     Arc<S>,
  notifier:  N,
  cache:     Mutex<RecordCache>,
  in_flight: Mutex<HashSet<RecordKey>>,
}

impl<S, N> ComplaintService<S, N>
where
  S: ComplaintStore,
  N: Notifier,
{
  pub fn new(store: Arc<S>, notifier: N) -> Self {
    Self {
      store,
      notifier,
      cache: Mutex::new(RecordCache::new(DEFAULT_CACHE_CAPACITY)),
      in_flight: Mutex::new(HashSet::new()),
    }
  }

  /// Keep at most `capacity` records cached; `0` turns the cache off.
  pub fn with_cache_capacity(self, capacity: usize) -> Self {
    lock(&self.cache).capacity = capacity;
    self
  }

  pub fn store(&self) -> &Arc<S> { &self.store }

  pub(crate) fn begin(&self, key: RecordKey) -> Result<InFlight<'_>> {
    if !lock(&self.in_flight).insert(key) {
      return Err(Error::InFlight(key));
    }
    Ok(InFlight { set: &self.in_flight, key })
  }

  fn invalidate(&self, key: RecordKey) { lock(&self.cache).invalidate(&key); }

  // ── Slots and entries ─────────────────────────────────────────────────────

  pub async fn add_slot(&self, input: NewSlot) -> Result<Slot> {
    let slot = self.store.add_slot(input).await.map_err(Error::submission)?;
    tracing::info!(slot_id = slot.slot_id, kind = %slot.reference_type, "slot added");
    Ok(slot)
  }

  /// Post a grade or mark an attendance. Cached records of the slot are
  /// dropped, since their score or subject may have changed.
  pub async fn record_entry(&self, input: NewEntry) -> Result<Entry> {
    let slot_id = input.slot_id;
    let entry = self
      .store
      .record_entry(input)
      .await
      .map_err(Error::submission)?
      .ok_or(Error::SlotNotFound(slot_id))?;
    lock(&self.cache).invalidate_slot(entry.slot_id);
    tracing::info!(entry_id = entry.entry_id, slot_id = entry.slot_id, "entry recorded");
    Ok(entry)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  pub async fn records(
    &self,
    query: &RecordQuery,
  ) -> Result<Vec<ComplaintableRecord>> {
    self.store.list_records(query).await.map_err(Error::store)
  }

  /// A single record, served from the cache when possible.
  pub async fn record(&self, key: RecordKey) -> Result<ComplaintableRecord> {
    let (cached, seen) = {
      let cache = lock(&self.cache);
      (cache.get(&key), cache.epoch)
    };
    if let Some(record) = cached {
      return Ok(record);
    }
    let record = self
      .store
      .get_record(key)
      .await
      .map_err(Error::store)?
      .ok_or(Error::RecordNotFound(key))?;
    lock(&self.cache).fill(key, record.clone(), seen);
    Ok(record)
  }

  pub async fn complaint(&self, id: ComplaintId) -> Result<Complaint> {
    self
      .store
      .get_complaint(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::ComplaintNotFound(id))
  }

  pub async fn complaints(&self, query: &ComplaintQuery) -> Result<Vec<Complaint>> {
    self.store.list_complaints(query).await.map_err(Error::store)
  }

  // ── Filing ────────────────────────────────────────────────────────────────

  /// File (or rewrite) the complaint for `key`. Nothing is written unless
  /// every precondition holds.
  pub async fn file_complaint(&self, key: RecordKey, text: &str) -> Result<Filing> {
    self.file(key, text, None).await
  }

  /// Like [`Self::file_complaint`], but refused with [`Error::NotOwner`]
  /// unless the record belongs to `student`.
  pub async fn file_complaint_as(
    &self,
    student: &str,
    key: RecordKey,
    text: &str,
  ) -> Result<Filing> {
    self.file(key, text, Some(student)).await
  }

  async fn file(
    &self,
    key: RecordKey,
    text: &str,
    owner: Option<&str>,
  ) -> Result<Filing> {
    let result = self.try_file(key, text, owner).await;
    match &result {
      Ok(filing) => {
        tracing::info!(
          %key,
          complaint_id = filing.complaint.complaint_id,
          created = filing.created,
          "complaint filed"
        );
        self.notifier.notify(Notification::success(Activity::File));
      }
      Err(e) => {
        tracing::warn!(%key, error = %e, "complaint not filed");
        self
          .notifier
          .notify(Notification::failure(Activity::File, e.to_string()));
      }
    }
    result
  }

  async fn try_file(
    &self,
    key: RecordKey,
    text: &str,
    owner: Option<&str>,
  ) -> Result<Filing> {
    let _guard = self.begin(key)?;

    // Always validate against the store's state, never the cache.
    let current = self
      .store
      .get_record(key)
      .await
      .map_err(Error::store)?
      .ok_or(ValidationError::MissingSubject)?;
    if let Some(student) = owner
      && current.student.as_deref() != Some(student)
    {
      return Err(Error::NotOwner(key));
    }
    lifecycle::validate_filing(&current, text)?;

    let outcome = self
      .store
      .upsert_complaint(NewComplaint {
        reference_type: key.reference_type,
        reference_id:   key.subject_id,
        description:    text.to_owned(),
      })
      .await
      .map_err(Error::submission)?;

    let (complaint, created) = match outcome {
      FilingOutcome::Created(c) => (c, true),
      FilingOutcome::Updated(c) => (c, false),
      FilingOutcome::MissingSubject => {
        return Err(ValidationError::MissingSubject.into());
      }
      FilingOutcome::Locked(status) => {
        return Err(ValidationError::Terminal(status).into());
      }
    };

    // The write is committed; the result comes from it, not from a re-read.
    self.invalidate(key);
    let record = ComplaintableRecord {
      complaint_id: Some(complaint.complaint_id),
      complaint_text: Some(complaint.description.clone()),
      complaint_status: complaint.status,
      ..current
    };
    Ok(Filing { record, complaint, created })
  }

  // ── Review ────────────────────────────────────────────────────────────────

  /// Accept or reject an open complaint.
  pub async fn review_complaint(
    &self,
    id: ComplaintId,
    decision: ReviewDecision,
  ) -> Result<Complaint> {
    let activity = Activity::Review(decision);
    let result = self.try_review(id, decision).await;
    match &result {
      Ok(c) => {
        tracing::info!(complaint_id = id, status = %c.status, "complaint reviewed");
        self.notifier.notify(Notification::success(activity));
      }
      Err(e) => {
        tracing::warn!(complaint_id = id, error = %e, "complaint review failed");
        self
          .notifier
          .notify(Notification::failure(activity, e.to_string()));
      }
    }
    result
  }

  async fn try_review(
    &self,
    id: ComplaintId,
    decision: ReviewDecision,
  ) -> Result<Complaint> {
    let complaint = self.complaint(id).await?;
    let key = RecordKey::new(complaint.reference_type, complaint.reference_id);
    let _guard = self.begin(key)?;

    let to = lifecycle::transition(id, complaint.status, decision)?;

    match self
      .store
      .transition_complaint(id, to)
      .await
      .map_err(Error::submission)?
    {
      TransitionOutcome::Applied(updated) => {
        self.invalidate(key);
        Ok(updated)
      }
      TransitionOutcome::NotFound => Err(Error::ComplaintNotFound(id)),
      TransitionOutcome::Refused { current } => {
        Err(Error::InvalidTransition { complaint_id: id, from: current })
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::complaint::ReferenceType;

  fn key(id: i64) -> RecordKey { RecordKey::new(ReferenceType::Grading, id) }

  fn record(slot_id: SlotId) -> ComplaintableRecord {
    ComplaintableRecord::empty(ReferenceType::Grading, slot_id)
  }

  #[test]
  fn oldest_record_is_evicted_at_capacity() {
    let mut cache = RecordCache::new(2);
    cache.fill(key(1), record(1), 0);
    cache.fill(key(2), record(1), 0);
    cache.fill(key(3), record(1), 0);

    assert!(cache.get(&key(1)).is_none());
    assert!(cache.get(&key(2)).is_some());
    assert!(cache.get(&key(3)).is_some());
    assert_eq!(cache.order.len(), 2);
  }

  #[test]
  fn refilling_a_key_does_not_grow_the_order() {
    let mut cache = RecordCache::new(2);
    cache.fill(key(1), record(1), 0);
    cache.fill(key(1), record(2), 0);
    assert_eq!(cache.order.len(), 1);
    assert_eq!(cache.get(&key(1)).map(|r| r.slot_id), Some(2));
  }

  #[test]
  fn fill_after_invalidation_is_dropped() {
    let mut cache = RecordCache::new(4);
    let seen = cache.epoch;
    cache.invalidate(&key(1));
    cache.fill(key(1), record(1), seen);
    assert!(cache.get(&key(1)).is_none());

    cache.fill(key(1), record(1), cache.epoch);
    assert!(cache.get(&key(1)).is_some());
  }

  #[test]
  fn slot_invalidation_drops_only_that_slot() {
    let mut cache = RecordCache::new(4);
    cache.fill(key(1), record(7), 0);
    cache.fill(key(2), record(8), 0);
    cache.invalidate_slot(7);

    assert!(cache.get(&key(1)).is_none());
    assert!(cache.get(&key(2)).is_some());
    assert_eq!(cache.order, VecDeque::from([key(2)]));
  }

  #[test]
  fn zero_capacity_caches_nothing() {
    let mut cache = RecordCache::new(0);
    cache.fill(key(1), record(1), 0);
    assert!(cache.entries.is_empty());
  }
}
