//! Staff endpoints for creating modules and sessions and posting entries.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/slots` | Body: [`NewSlot`]; returns 201 + slot |
//! | `POST` | `/entries` | Body: [`NewEntry`]; replaces an existing score |

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use praktikum_core::{
  notify::Notifier,
  record::{Entry, NewEntry, NewSlot},
  store::ComplaintStore,
};

use crate::{ApiState, error::ApiError};

/// `POST /slots`
pub async fn create_slot<S, N>(
  State(state): State<ApiState<S, N>>,
  body: Result<Json<NewSlot>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ComplaintStore,
  N: Notifier,
{
  let Json(body) = body?;
  if body.title.trim().is_empty() {
    return Err(ApiError::BadRequest("slot title is empty".to_string()));
  }
  let slot = state.service.add_slot(body).await?;
  Ok((StatusCode::CREATED, Json(slot)))
}

/// `POST /entries`: post a grade or mark an attendance.
pub async fn record_entry<S, N>(
  State(state): State<ApiState<S, N>>,
  body: Result<Json<NewEntry>, JsonRejection>,
) -> Result<Json<Entry>, ApiError>
where
  S: ComplaintStore,
  N: Notifier,
{
  let Json(body) = body?;
  Ok(Json(state.service.record_entry(body).await?))
}
