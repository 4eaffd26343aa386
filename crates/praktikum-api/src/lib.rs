//! JSON REST API for practicum complaints.
//!
//! Exposes an axum [`Router`] backed by a [`ComplaintService`] over any
//! [`praktikum_core::store::ComplaintStore`]. Auth, TLS, and transport
//! concerns are the caller's responsibility; see [`Caller`] for how an auth
//! layer scopes filers to their own records.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", praktikum_api::api_router(state))
//! ```

pub mod caller;
pub mod complaints;
pub mod error;
pub mod modul;
pub mod records;
pub mod slots;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, patch, post},
};
use praktikum_core::{
  ComplaintService, modul::ModulMap, notify::Notifier, store::ComplaintStore,
};

pub use caller::Caller;
pub use error::ApiError;

/// State shared by every API handler.
pub struct ApiState<S, N> {
  pub service: Arc<ComplaintService<S, N>>,
  pub modules: Arc<ModulMap>,
}

impl<S, N> Clone for ApiState<S, N> {
  fn clone(&self) -> Self {
    Self {
      service: self.service.clone(),
      modules: self.modules.clone(),
    }
  }
}

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, N>(state: ApiState<S, N>) -> Router<()>
where
  S: ComplaintStore + 'static,
  N: Notifier + 'static,
{
  Router::new()
    // Records
    .route("/records", get(records::list::<S, N>))
    .route("/records/{reference_type}/{id}", get(records::get_one::<S, N>))
    // Complaints
    .route(
      "/complaints",
      get(complaints::list::<S, N>).post(complaints::create::<S, N>),
    )
    .route("/complaints/{id}", get(complaints::get_one::<S, N>))
    .route("/complaints/{id}/status", patch(complaints::update_status::<S, N>))
    // Slots and entries
    .route("/slots", post(slots::create_slot::<S, N>))
    .route("/entries", post(slots::record_entry::<S, N>))
    // Modules
    .route("/praktikum/{id}/modul", get(modul::redirect::<S, N>))
    .with_state(state)
}

#[cfg(test)]
mod tests;
