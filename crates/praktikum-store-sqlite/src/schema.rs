//! SQL schema for the practicum SQLite store.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Modules (grading) and lab sessions (attendance) of a practicum.
CREATE TABLE IF NOT EXISTS slots (
    slot_id        INTEGER PRIMARY KEY AUTOINCREMENT,
    praktikum_id   INTEGER NOT NULL,
    reference_type TEXT    NOT NULL,   -- 'grading' | 'attendance'
    title          TEXT    NOT NULL,
    ordinal        INTEGER NOT NULL DEFAULT 0
);

-- One posted grade or marked attendance per slot and student.
CREATE TABLE IF NOT EXISTS entries (
    entry_id    INTEGER PRIMARY KEY AUTOINCREMENT,
    slot_id     INTEGER NOT NULL REFERENCES slots(slot_id),
    student     TEXT    NOT NULL,
    score       REAL,
    recorded_at TEXT    NOT NULL,      -- RFC 3339 UTC
    UNIQUE (slot_id, student)
);

-- At most one complaint per entry. Rows leave 'open' exactly once.
CREATE TABLE IF NOT EXISTS complaints (
    complaint_id   INTEGER PRIMARY KEY AUTOINCREMENT,
    reference_type TEXT    NOT NULL,
    reference_id   INTEGER NOT NULL REFERENCES entries(entry_id),
    description    TEXT    NOT NULL,
    status         TEXT    NOT NULL DEFAULT 'open',
    created_at     TEXT    NOT NULL,
    updated_at     TEXT    NOT NULL,
    UNIQUE (reference_type, reference_id),
    CHECK  (status IN ('open', 'closed', 'rejected'))
);

CREATE INDEX IF NOT EXISTS slots_praktikum_idx  ON slots(praktikum_id, reference_type);
CREATE INDEX IF NOT EXISTS entries_student_idx  ON entries(student);
CREATE INDEX IF NOT EXISTS complaints_status_idx ON complaints(status);

PRAGMA user_version = 1;
";
