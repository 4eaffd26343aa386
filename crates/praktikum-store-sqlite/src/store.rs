//! [`SqliteStore`]: the SQLite implementation of [`ComplaintStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use praktikum_core::{
  complaint::{Complaint, ComplaintId, ComplaintStatus, NewComplaint},
  record::{ComplaintableRecord, Entry, NewEntry, NewSlot, RecordKey, Slot},
  store::{
    ComplaintQuery, ComplaintStore, FilingOutcome, RecordQuery,
    TransitionOutcome,
  },
};

use crate::{
  Error, Result,
  encode::{
    COMPLAINT_COLUMNS, ENTRY_COLUMNS, RawComplaint, RawEntry, RawRecord,
    RawSlot, SLOT_COLUMNS, decode_status, encode_dt, encode_reference_type,
    encode_status,
  },
  schema::SCHEMA,
};

/// Columns of a record: a slot joined with the student's entry and the
/// entry's complaint. Aliases `s`, `e` and `c` must be bound by the query.
const RECORD_COLUMNS: &str = "s.reference_type, s.slot_id, s.title, \
                              e.entry_id, e.score, \
                              c.complaint_id, c.description, c.status, \
                              e.student";

/// Undecoded result of a conditional complaint write.
enum RawFiling {
  Created(RawComplaint),
  Updated(RawComplaint),
  MissingSubject,
  Locked(String),
}

enum RawTransition {
  Applied(RawComplaint),
  NotFound,
  Refused(String),
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A complaint store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests and throwaway servers.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── ComplaintStore impl ─────────────────────────────────────────────────────

impl ComplaintStore for SqliteStore {
  type Error = Error;

  // ── Slots and entries ─────────────────────────────────────────────────────

  async fn add_slot(&self, input: NewSlot) -> Result<Slot> {
    let kind = encode_reference_type(input.reference_type);

    let raw: RawSlot = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          &format!(
            "INSERT INTO slots (praktikum_id, reference_type, title, ordinal)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING {SLOT_COLUMNS}"
          ),
          rusqlite::params![input.praktikum_id, kind, input.title, input.ordinal],
          RawSlot::from_row,
        )?)
      })
      .await?;

    raw.into_slot()
  }

  async fn record_entry(&self, input: NewEntry) -> Result<Option<Entry>> {
    let at_str = encode_dt(Utc::now());

    let raw: Option<RawEntry> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let slot_exists = tx
          .query_row(
            "SELECT 1 FROM slots WHERE slot_id = ?1",
            rusqlite::params![input.slot_id],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if !slot_exists {
          return Ok(None);
        }

        let raw = tx.query_row(
          &format!(
            "INSERT INTO entries (slot_id, student, score, recorded_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (slot_id, student) DO UPDATE
               SET score = excluded.score, recorded_at = excluded.recorded_at
             RETURNING {ENTRY_COLUMNS}"
          ),
          rusqlite::params![input.slot_id, input.student, input.score, at_str],
          RawEntry::from_row,
        )?;
        tx.commit()?;
        Ok(Some(raw))
      })
      .await?;

    raw.map(RawEntry::into_entry).transpose()
  }

  // ── Records ───────────────────────────────────────────────────────────────

  async fn list_records<'a>(
    &'a self,
    query: &'a RecordQuery,
  ) -> Result<Vec<ComplaintableRecord>> {
    let praktikum_id = query.praktikum_id;
    let student = query.student.clone();
    let kind = encode_reference_type(query.reference_type);

    let raws: Vec<RawRecord> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {RECORD_COLUMNS}
           FROM slots s
           LEFT JOIN entries e
             ON e.slot_id = s.slot_id AND e.student = ?2
           LEFT JOIN complaints c
             ON c.reference_type = s.reference_type AND c.reference_id = e.entry_id
           WHERE s.praktikum_id = ?1 AND s.reference_type = ?3
           ORDER BY s.ordinal ASC, s.slot_id ASC"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![praktikum_id, student, kind],
            RawRecord::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRecord::into_record).collect()
  }

  async fn get_record(
    &self,
    key: RecordKey,
  ) -> Result<Option<ComplaintableRecord>> {
    let kind = encode_reference_type(key.reference_type);

    let raw: Option<RawRecord> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {RECORD_COLUMNS}
                 FROM entries e
                 JOIN slots s ON s.slot_id = e.slot_id
                 LEFT JOIN complaints c
                   ON c.reference_type = s.reference_type AND c.reference_id = e.entry_id
                 WHERE e.entry_id = ?1 AND s.reference_type = ?2"
              ),
              rusqlite::params![key.subject_id, kind],
              RawRecord::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawRecord::into_record).transpose()
  }

  // ── Complaints ────────────────────────────────────────────────────────────

  async fn upsert_complaint(&self, input: NewComplaint) -> Result<FilingOutcome> {
    let kind = encode_reference_type(input.reference_type);
    let at_str = encode_dt(Utc::now());

    let raw: RawFiling = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let subject_exists = tx
          .query_row(
            "SELECT 1 FROM entries e JOIN slots s ON s.slot_id = e.slot_id
             WHERE e.entry_id = ?1 AND s.reference_type = ?2",
            rusqlite::params![input.reference_id, kind],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if !subject_exists {
          return Ok(RawFiling::MissingSubject);
        }

        let existing: Option<(i64, String)> = tx
          .query_row(
            "SELECT complaint_id, status FROM complaints
             WHERE reference_type = ?1 AND reference_id = ?2",
            rusqlite::params![kind, input.reference_id],
            |r| Ok((r.get(0)?, r.get(1)?)),
          )
          .optional()?;

        let filing = match existing {
          Some((_, status)) if status != "open" => {
            return Ok(RawFiling::Locked(status));
          }
          Some((complaint_id, _)) => {
            let raw = tx.query_row(
              &format!(
                "UPDATE complaints SET description = ?1, updated_at = ?2
                 WHERE complaint_id = ?3
                 RETURNING {COMPLAINT_COLUMNS}"
              ),
              rusqlite::params![input.description, at_str, complaint_id],
              RawComplaint::from_row,
            )?;
            RawFiling::Updated(raw)
          }
          None => {
            let raw = tx.query_row(
              &format!(
                "INSERT INTO complaints (
                   reference_type, reference_id, description, status,
                   created_at, updated_at
                 ) VALUES (?1, ?2, ?3, 'open', ?4, ?4)
                 RETURNING {COMPLAINT_COLUMNS}"
              ),
              rusqlite::params![kind, input.reference_id, input.description, at_str],
              RawComplaint::from_row,
            )?;
            RawFiling::Created(raw)
          }
        };

        tx.commit()?;
        Ok(filing)
      })
      .await?;

    Ok(match raw {
      RawFiling::Created(c) => FilingOutcome::Created(c.into_complaint()?),
      RawFiling::Updated(c) => FilingOutcome::Updated(c.into_complaint()?),
      RawFiling::MissingSubject => FilingOutcome::MissingSubject,
      RawFiling::Locked(status) => FilingOutcome::Locked(decode_status(&status)?),
    })
  }

  async fn get_complaint(&self, id: ComplaintId) -> Result<Option<Complaint>> {
    let raw: Option<RawComplaint> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {COMPLAINT_COLUMNS} FROM complaints WHERE complaint_id = ?1"
              ),
              rusqlite::params![id],
              RawComplaint::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawComplaint::into_complaint).transpose()
  }

  async fn list_complaints<'a>(
    &'a self,
    query: &'a ComplaintQuery,
  ) -> Result<Vec<Complaint>> {
    let status = query.status.map(encode_status);
    let kind = query.reference_type.map(encode_reference_type);
    // SQLite treats a negative LIMIT as "no limit".
    let limit = query.limit.map_or(-1, |n| n as i64);
    let offset = query.offset.unwrap_or(0) as i64;

    let raws: Vec<RawComplaint> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {COMPLAINT_COLUMNS} FROM complaints
           WHERE (?1 IS NULL OR status = ?1)
             AND (?2 IS NULL OR reference_type = ?2)
           ORDER BY created_at ASC, complaint_id ASC
           LIMIT ?3 OFFSET ?4"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![status, kind, limit, offset],
            RawComplaint::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawComplaint::into_complaint).collect()
  }

  async fn transition_complaint(
    &self,
    id: ComplaintId,
    to: ComplaintStatus,
  ) -> Result<TransitionOutcome> {
    let to_str = encode_status(to);
    let at_str = encode_dt(Utc::now());

    let raw: RawTransition = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let current: Option<String> = tx
          .query_row(
            "SELECT status FROM complaints WHERE complaint_id = ?1",
            rusqlite::params![id],
            |r| r.get(0),
          )
          .optional()?;

        let transition = match current {
          None => return Ok(RawTransition::NotFound),
          Some(status) if status != "open" => RawTransition::Refused(status),
          Some(_) => RawTransition::Applied(tx.query_row(
            &format!(
              "UPDATE complaints SET status = ?1, updated_at = ?2
               WHERE complaint_id = ?3 AND status = 'open'
               RETURNING {COMPLAINT_COLUMNS}"
            ),
            rusqlite::params![to_str, at_str, id],
            RawComplaint::from_row,
          )?),
        };

        tx.commit()?;
        Ok(transition)
      })
      .await?;

    Ok(match raw {
      RawTransition::Applied(c) => TransitionOutcome::Applied(c.into_complaint()?),
      RawTransition::NotFound => TransitionOutcome::NotFound,
      RawTransition::Refused(status) => TransitionOutcome::Refused {
        current: decode_status(&status)?,
      },
    })
  }
}
