//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings. Enumerations are stored as
//! their lowercase names.

use chrono::{DateTime, Utc};
use praktikum_core::{
  complaint::{Complaint, ComplaintStatus, ReferenceType},
  record::{ComplaintableRecord, Entry, Slot},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── ReferenceType ───────────────────────────────────────────────────────────

pub fn encode_reference_type(t: ReferenceType) -> &'static str { t.as_str() }

pub fn decode_reference_type(s: &str) -> Result<ReferenceType> {
  match s {
    "grading" => Ok(ReferenceType::Grading),
    "attendance" => Ok(ReferenceType::Attendance),
    other => Err(Error::UnknownValue {
      column: "reference_type",
      value:  other.to_owned(),
    }),
  }
}

// ─── ComplaintStatus ─────────────────────────────────────────────────────────

/// Only stored statuses are encodable; `none` never reaches a row.
pub fn encode_status(s: ComplaintStatus) -> &'static str { s.as_str() }

pub fn decode_status(s: &str) -> Result<ComplaintStatus> {
  match s {
    "open" => Ok(ComplaintStatus::Open),
    "closed" => Ok(ComplaintStatus::Closed),
    "rejected" => Ok(ComplaintStatus::Rejected),
    other => Err(Error::UnknownValue {
      column: "status",
      value:  other.to_owned(),
    }),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const SLOT_COLUMNS: &str =
  "slot_id, praktikum_id, reference_type, title, ordinal";

pub struct RawSlot {
  pub slot_id:        i64,
  pub praktikum_id:   i64,
  pub reference_type: String,
  pub title:          String,
  pub ordinal:        i64,
}

impl RawSlot {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      slot_id:        row.get(0)?,
      praktikum_id:   row.get(1)?,
      reference_type: row.get(2)?,
      title:          row.get(3)?,
      ordinal:        row.get(4)?,
    })
  }

  pub fn into_slot(self) -> Result<Slot> {
    Ok(Slot {
      slot_id:        self.slot_id,
      praktikum_id:   self.praktikum_id,
      reference_type: decode_reference_type(&self.reference_type)?,
      title:          self.title,
      ordinal:        self.ordinal,
    })
  }
}

pub const ENTRY_COLUMNS: &str =
  "entry_id, slot_id, student, score, recorded_at";

pub struct RawEntry {
  pub entry_id:    i64,
  pub slot_id:     i64,
  pub student:     String,
  pub score:       Option<f64>,
  pub recorded_at: String,
}

impl RawEntry {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      entry_id:    row.get(0)?,
      slot_id:     row.get(1)?,
      student:     row.get(2)?,
      score:       row.get(3)?,
      recorded_at: row.get(4)?,
    })
  }

  pub fn into_entry(self) -> Result<Entry> {
    Ok(Entry {
      entry_id:    self.entry_id,
      slot_id:     self.slot_id,
      student:     self.student,
      score:       self.score,
      recorded_at: decode_dt(&self.recorded_at)?,
    })
  }
}

pub const COMPLAINT_COLUMNS: &str = "complaint_id, reference_type, \
                                     reference_id, description, status, \
                                     created_at, updated_at";

pub struct RawComplaint {
  pub complaint_id:   i64,
  pub reference_type: String,
  pub reference_id:   i64,
  pub description:    String,
  pub status:         String,
  pub created_at:     String,
  pub updated_at:     String,
}

impl RawComplaint {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      complaint_id:   row.get(0)?,
      reference_type: row.get(1)?,
      reference_id:   row.get(2)?,
      description:    row.get(3)?,
      status:         row.get(4)?,
      created_at:     row.get(5)?,
      updated_at:     row.get(6)?,
    })
  }

  pub fn into_complaint(self) -> Result<Complaint> {
    Ok(Complaint {
      complaint_id:   self.complaint_id,
      reference_type: decode_reference_type(&self.reference_type)?,
      reference_id:   self.reference_id,
      description:    self.description,
      status:         decode_status(&self.status)?,
      created_at:     decode_dt(&self.created_at)?,
      updated_at:     decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw columns of a slot joined with an optional entry and complaint.
pub struct RawRecord {
  // slots columns
  pub reference_type: String,
  pub slot_id:        i64,
  pub title:          String,
  // entries join
  pub entry_id:       Option<i64>,
  pub score:          Option<f64>,
  // complaints join
  pub complaint_id:   Option<i64>,
  pub description:    Option<String>,
  pub status:         Option<String>,
  pub student:        Option<String>,
}

impl RawRecord {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      reference_type: row.get(0)?,
      slot_id:        row.get(1)?,
      title:          row.get(2)?,
      entry_id:       row.get(3)?,
      score:          row.get(4)?,
      complaint_id:   row.get(5)?,
      description:    row.get(6)?,
      status:         row.get(7)?,
      student:        row.get(8)?,
    })
  }

  pub fn into_record(self) -> Result<ComplaintableRecord> {
    let complaint_status = self
      .status
      .as_deref()
      .map(decode_status)
      .transpose()?
      .unwrap_or_default();

    Ok(ComplaintableRecord {
      reference_type: decode_reference_type(&self.reference_type)?,
      slot_id: self.slot_id,
      title: self.title,
      subject_id: self.entry_id,
      student: self.student,
      score: self.score,
      complaint_id: self.complaint_id,
      complaint_text: self.description,
      complaint_status,
    })
  }
}
