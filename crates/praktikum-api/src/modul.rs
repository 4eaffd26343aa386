//! `GET /praktikum/{id}/modul`: resolves a practicum to its module page.

use axum::{
  extract::{Path, State, rejection::PathRejection},
  response::Redirect,
};
use praktikum_core::{notify::Notifier, record::PraktikumId, store::ComplaintStore};

use crate::{ApiState, error::ApiError};

/// Temporary redirect to the practicum's module folder, or to the shared
/// empty page for practicums without one.
pub async fn redirect<S, N>(
  State(state): State<ApiState<S, N>>,
  id: Result<Path<PraktikumId>, PathRejection>,
) -> Result<Redirect, ApiError>
where
  S: ComplaintStore,
  N: Notifier,
{
  let Path(id) = id?;
  Ok(Redirect::temporary(&state.modules.path(id)))
}
