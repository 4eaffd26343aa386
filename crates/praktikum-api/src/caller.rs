//! Who a request is acting for.
//!
//! The router does no authentication itself. An outer layer that does may
//! insert a [`Caller`] into the request extensions; handlers then keep
//! filers to their own records. Without one, requests are unscoped.

use praktikum_core::lifecycle::Role;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
  pub username: String,
  pub role:     Role,
}

impl Caller {
  /// Reviewers act for everyone; filers only for their own student number.
  pub fn may_act_for(&self, student: &str) -> bool {
    self.role == Role::Reviewer || self.username == student
  }

  /// The student a filing must belong to, if this caller is a filer.
  pub fn filer(&self) -> Option<&str> {
    (self.role == Role::Filer).then_some(self.username.as_str())
  }
}
