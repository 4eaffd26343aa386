//! Complaint lifecycle for practicum grades and attendance.
//!
//! Holds the record and complaint types, status derivation, the store
//! abstraction, and [`ComplaintService`], which files and reviews complaints
//! against any [`store::ComplaintStore`]. No HTTP or SQL lives here.

// Store futures are spelled out with `+ Send` on the trait; impls use
// `async fn`.
#![allow(async_fn_in_trait)]

pub mod complaint;
pub mod error;
pub mod lifecycle;
pub mod modul;
pub mod notify;
pub mod record;
pub mod service;
pub mod store;

pub use error::{Error, Result, ValidationError};
pub use service::{ComplaintService, Filing};
