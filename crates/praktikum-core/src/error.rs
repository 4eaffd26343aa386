//! Error types for `praktikum-core`.

use thiserror::Error;

use crate::{
  complaint::{ComplaintId, ComplaintStatus},
  record::{RecordKey, SlotId},
};

/// A local precondition of filing a complaint was violated. Never sent to
/// the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("no grade or attendance exists to complain about")]
  MissingSubject,

  #[error("complaint text is empty")]
  EmptyText,

  #[error("complaint text is {len} characters; at most {max} allowed")]
  TooLong { len: usize, max: usize },

  #[error("complaint is {0} and can no longer be edited")]
  Terminal(ComplaintStatus),
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("validation failed: {0}")]
  Validation(#[from] ValidationError),

  /// The store refused or failed a write.
  #[error("submission failed: {0}")]
  Submission(#[source] Box<dyn std::error::Error + Send + Sync>),

  /// The store failed a read.
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("complaint {complaint_id} is {from}; only open complaints can be reviewed")]
  InvalidTransition {
    complaint_id: ComplaintId,
    from:         ComplaintStatus,
  },

  #[error("complaint not found: {0}")]
  ComplaintNotFound(ComplaintId),

  #[error("slot not found: {0}")]
  SlotNotFound(SlotId),

  #[error("record not found: {0}")]
  RecordNotFound(RecordKey),

  /// A filer acted on a record that belongs to another student.
  #[error("{0} belongs to another student")]
  NotOwner(RecordKey),

  #[error("a change to {0} is already in progress")]
  InFlight(RecordKey),
}

impl Error {
  pub(crate) fn submission<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Submission(Box::new(e))
  }

  pub(crate) fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
