//! Handlers for `/records` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/records` | `?praktikum_id&student&reference_type`, all required |
//! | `GET`  | `/records/{reference_type}/{id}` | Single record by entry id |
//!
//! Both return records wrapped in a [`RecordView`] so clients never derive
//! statuses themselves.

use axum::{
  Extension, Json,
  extract::{
    Path, Query, State,
    rejection::{PathRejection, QueryRejection},
  },
};
use praktikum_core::{
  complaint::ReferenceType,
  lifecycle::RecordView,
  notify::Notifier,
  record::{EntryId, PraktikumId, RecordKey},
  store::{ComplaintStore, RecordQuery},
};
use serde::Deserialize;

use crate::{ApiState, Caller, error::ApiError};

fn foreign(student: &str) -> ApiError {
  ApiError::Forbidden(format!("records of {student} are not yours"))
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub praktikum_id:   PraktikumId,
  /// Student number (NIM).
  pub student:        String,
  pub reference_type: ReferenceType,
}

/// `GET /records?praktikum_id=<id>&student=<nim>&reference_type=<type>`
pub async fn list<S, N>(
  State(state): State<ApiState<S, N>>,
  caller: Option<Extension<Caller>>,
  params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<RecordView>>, ApiError>
where
  S: ComplaintStore,
  N: Notifier,
{
  let Query(params) = params?;
  if let Some(Extension(caller)) = &caller
    && !caller.may_act_for(&params.student)
  {
    return Err(foreign(&params.student));
  }
  let records = state
    .service
    .records(&RecordQuery {
      praktikum_id:   params.praktikum_id,
      student:        params.student,
      reference_type: params.reference_type,
    })
    .await?;
  Ok(Json(records.into_iter().map(RecordView::of).collect()))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /records/{reference_type}/{id}`
pub async fn get_one<S, N>(
  State(state): State<ApiState<S, N>>,
  caller: Option<Extension<Caller>>,
  path: Result<Path<(ReferenceType, EntryId)>, PathRejection>,
) -> Result<Json<RecordView>, ApiError>
where
  S: ComplaintStore,
  N: Notifier,
{
  let Path((reference_type, id)) = path?;
  let record = state
    .service
    .record(RecordKey::new(reference_type, id))
    .await?;
  if let Some(Extension(caller)) = &caller {
    let owner = record.student.as_deref().unwrap_or_default();
    if !caller.may_act_for(owner) {
      return Err(foreign(owner));
    }
  }
  Ok(Json(RecordView::of(record)))
}
