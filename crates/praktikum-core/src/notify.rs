//! The reporting capability through which users learn whether a complaint
//! action went through.
//!
//! Message wording is up to the presentation layer; what the core guarantees
//! is that every file or review attempt produces exactly one notification with
//! a distinct success or failure outcome.

use std::fmt;

use crate::complaint::ReviewDecision;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
  Success,
  Failure,
}

/// What the user attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
  File,
  Review(ReviewDecision),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
  pub outcome:  Outcome,
  pub activity: Activity,
  /// Error text on failure; empty on success.
  pub detail:   String,
}

impl Notification {
  pub fn success(activity: Activity) -> Self {
    Self { outcome: Outcome::Success, activity, detail: String::new() }
  }

  pub fn failure(activity: Activity, detail: impl Into<String>) -> Self {
    Self { outcome: Outcome::Failure, activity, detail: detail.into() }
  }

  pub fn is_success(&self) -> bool { self.outcome == Outcome::Success }

  /// Headline suitable for a toast or status bar.
  pub fn title(&self) -> &'static str {
    match self.outcome {
      Outcome::Success => "Success",
      Outcome::Failure => "Failed",
    }
  }
}

impl fmt::Display for Notification {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let verb = match self.activity {
      Activity::File => "sent",
      Activity::Review(ReviewDecision::Accept) => "accepted",
      Activity::Review(ReviewDecision::Reject) => "rejected",
    };
    match self.outcome {
      Outcome::Success => write!(f, "Complaint {verb}"),
      Outcome::Failure if self.detail.is_empty() => {
        write!(f, "Complaint could not be {verb}")
      }
      Outcome::Failure => {
        write!(f, "Complaint could not be {verb}: {}", self.detail)
      }
    }
  }
}

/// Receives notifications. Implementations must not block.
pub trait Notifier: Send + Sync {
  fn notify(&self, notification: Notification);
}

/// Discards every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl Notifier for Silent {
  fn notify(&self, _: Notification) {}
}

impl<N: Notifier + ?Sized> Notifier for std::sync::Arc<N> {
  fn notify(&self, notification: Notification) {
    (**self).notify(notification);
  }
}
