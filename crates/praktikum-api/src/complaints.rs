//! Handlers for `/complaints` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/complaints` | Optional `status`, `reference_type`, `limit`, `offset` |
//! | `GET`   | `/complaints/{id}` | 404 if not found |
//! | `POST`  | `/complaints` | Body: [`CreateBody`]; 201 on first filing, 200 on rewrite |
//! | `PATCH` | `/complaints/{id}/status` | Body: `{"status":"closed"\|"rejected"}` |

use axum::{
  Extension, Json,
  extract::{
    Path, Query, State,
    rejection::{JsonRejection, PathRejection, QueryRejection},
  },
  http::StatusCode,
  response::IntoResponse,
};
use praktikum_core::{
  complaint::{Complaint, ComplaintId, ComplaintStatus, ReferenceType, ReviewDecision},
  notify::Notifier,
  record::{EntryId, RecordKey},
  store::{ComplaintQuery, ComplaintStore},
};
use serde::Deserialize;

use crate::{ApiState, Caller, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub status:         Option<ComplaintStatus>,
  pub reference_type: Option<ReferenceType>,
  pub limit:          Option<usize>,
  pub offset:         Option<usize>,
}

/// `GET /complaints[?status=<status>][&reference_type=<type>]`
pub async fn list<S, N>(
  State(state): State<ApiState<S, N>>,
  params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<Complaint>>, ApiError>
where
  S: ComplaintStore,
  N: Notifier,
{
  let Query(params) = params?;
  let complaints = state
    .service
    .complaints(&ComplaintQuery {
      status:         params.status,
      reference_type: params.reference_type,
      limit:          params.limit,
      offset:         params.offset,
    })
    .await?;
  Ok(Json(complaints))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /complaints/{id}`
pub async fn get_one<S, N>(
  State(state): State<ApiState<S, N>>,
  id: Result<Path<ComplaintId>, PathRejection>,
) -> Result<Json<Complaint>, ApiError>
where
  S: ComplaintStore,
  N: Notifier,
{
  let Path(id) = id?;
  Ok(Json(state.service.complaint(id).await?))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /complaints`.
#[derive(Debug, Deserialize)]
pub struct CreateBody {
  /// `grading` or `attendance`; `penilaian` and `presensi` are accepted too.
  pub reference_type: ReferenceType,
  pub reference_id:   EntryId,
  pub description:    String,
  /// Complaints are always filed `open`; any other value is refused.
  pub status:         Option<ComplaintStatus>,
}

/// `POST /complaints`: files a new complaint or rewrites an open one. A
/// filer [`Caller`] may only file on their own records.
pub async fn create<S, N>(
  State(state): State<ApiState<S, N>>,
  caller: Option<Extension<Caller>>,
  body: Result<Json<CreateBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ComplaintStore,
  N: Notifier,
{
  let Json(body) = body?;
  if body.status.is_some_and(|s| s != ComplaintStatus::Open) {
    return Err(ApiError::BadRequest(
      "complaints can only be filed with status \"open\"".to_string(),
    ));
  }

  let key = RecordKey::new(body.reference_type, body.reference_id);
  let filer = caller.as_ref().and_then(|Extension(c)| c.filer());
  let filing = match filer {
    Some(student) => {
      state
        .service
        .file_complaint_as(student, key, &body.description)
        .await?
    }
    None => state.service.file_complaint(key, &body.description).await?,
  };

  let status = if filing.created {
    StatusCode::CREATED
  } else {
    StatusCode::OK
  };
  Ok((status, Json(filing.complaint)))
}

// ─── Review ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StatusBody {
  pub status: ComplaintStatus,
}

/// `PATCH /complaints/{id}/status`. Body `{"status":"closed"}` to accept,
/// `{"status":"rejected"}` to reject.
pub async fn update_status<S, N>(
  State(state): State<ApiState<S, N>>,
  id: Result<Path<ComplaintId>, PathRejection>,
  body: Result<Json<StatusBody>, JsonRejection>,
) -> Result<Json<Complaint>, ApiError>
where
  S: ComplaintStore,
  N: Notifier,
{
  let Path(id) = id?;
  let Json(body) = body?;
  let decision = ReviewDecision::from_target(body.status).ok_or_else(|| {
    ApiError::BadRequest(format!(
      "status must be \"closed\" or \"rejected\", got {:?}",
      body.status.as_str()
    ))
  })?;
  Ok(Json(state.service.review_complaint(id, decision).await?))
}
