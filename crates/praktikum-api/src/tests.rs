//! Router tests against an in-memory SQLite store.

use std::sync::Arc;

use axum::{
  Extension, Router,
  body::Body,
  http::{Request, StatusCode, header},
  response::Response,
};
use praktikum_core::{
  ComplaintService,
  lifecycle::Role,
  modul::ModulMap,
  notify::Silent,
};
use praktikum_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::{ApiState, Caller, api_router};

async fn app() -> Router {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let service = ComplaintService::new(Arc::new(store), Silent);
  api_router(ApiState {
    service: Arc::new(service),
    modules: Arc::new(ModulMap::default()),
  })
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Response {
  let mut builder = Request::builder().method(method).uri(uri);
  let body = match body {
    Some(v) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(v.to_string())
    }
    None => Body::empty(),
  };
  app.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
}

async fn json_body(resp: Response) -> Value {
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
    .await
    .unwrap();
  serde_json::from_slice(&bytes).unwrap()
}

/// A grading slot for practicum 5 with a posted grade for "A11". Returns the
/// entry id.
async fn seed(app: &Router) -> i64 {
  let slot = json_body(
    send(
      app,
      "POST",
      "/slots",
      Some(json!({
        "praktikum_id": 5,
        "reference_type": "grading",
        "title": "Modul 1",
        "ordinal": 1,
      })),
    )
    .await,
  )
  .await;
  let entry = json_body(
    send(
      app,
      "POST",
      "/entries",
      Some(json!({ "slot_id": slot["slot_id"], "student": "A11", "score": 70.0 })),
    )
    .await,
  )
  .await;
  entry["entry_id"].as_i64().unwrap()
}

async fn file(app: &Router, entry_id: i64, text: &str) -> Response {
  send(
    app,
    "POST",
    "/complaints",
    Some(json!({
      "reference_type": "penilaian",
      "reference_id": entry_id,
      "description": text,
      "status": "open",
    })),
  )
  .await
}

// ─── Records ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn listing_includes_derived_status() {
  let app = app().await;
  seed(&app).await;

  let resp = send(
    &app,
    "GET",
    "/records?praktikum_id=5&student=A11&reference_type=grading",
    None,
  )
  .await;
  assert_eq!(resp.status(), StatusCode::OK);
  let records = json_body(resp).await;
  assert_eq!(records.as_array().unwrap().len(), 1);
  assert_eq!(records[0]["status"]["label"], "eligible_to_file");
  assert_eq!(records[0]["can_edit"], true);
  assert_eq!(records[0]["filer_actions"], json!(["file"]));
}

#[tokio::test]
async fn listing_without_student_is_bad_request() {
  let app = app().await;
  let resp = send(&app, "GET", "/records?praktikum_id=5", None).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  assert!(json_body(resp).await["error"].is_string());
}

#[tokio::test]
async fn unknown_record_is_not_found() {
  let app = app().await;
  let resp = send(&app, "GET", "/records/attendance/99", None).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ─── Caller scope ────────────────────────────────────────────────────────────

fn acting_as(app: &Router, username: &str, role: Role) -> Router {
  app.clone().layer(Extension(Caller { username: username.into(), role }))
}

#[tokio::test]
async fn filer_is_kept_to_own_records() {
  let app = app().await;
  let entry_id = seed(&app).await;
  let other = acting_as(&app, "B22", Role::Filer);

  let resp = file(&other, entry_id, "not my grade").await;
  assert_eq!(resp.status(), StatusCode::FORBIDDEN);
  let resp = send(&other, "GET", &format!("/records/grading/{entry_id}"), None).await;
  assert_eq!(resp.status(), StatusCode::FORBIDDEN);
  let listing = "/records?praktikum_id=5&student=A11&reference_type=grading";
  let resp = send(&other, "GET", listing, None).await;
  assert_eq!(resp.status(), StatusCode::FORBIDDEN);

  // Nothing was filed by the refused request.
  let record = json_body(
    send(&app, "GET", &format!("/records/grading/{entry_id}"), None).await,
  )
  .await;
  assert_eq!(record["status"]["label"], "eligible_to_file");

  let owner = acting_as(&app, "A11", Role::Filer);
  assert_eq!(send(&owner, "GET", listing, None).await.status(), StatusCode::OK);
  assert_eq!(
    file(&owner, entry_id, "wrong grade").await.status(),
    StatusCode::CREATED
  );

  let reviewer = acting_as(&app, "asisten", Role::Reviewer);
  assert_eq!(send(&reviewer, "GET", listing, None).await.status(), StatusCode::OK);
}

// ─── Filing ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn filing_returns_created_then_ok() {
  let app = app().await;
  let entry_id = seed(&app).await;

  let first = file(&app, entry_id, "wrong grade").await;
  assert_eq!(first.status(), StatusCode::CREATED);
  let complaint = json_body(first).await;
  assert_eq!(complaint["status"], "open");
  assert_eq!(complaint["reference_type"], "grading");

  let second = file(&app, entry_id, "still wrong").await;
  assert_eq!(second.status(), StatusCode::OK);
  assert_eq!(json_body(second).await["description"], "still wrong");

  let record = json_body(
    send(&app, "GET", &format!("/records/grading/{entry_id}"), None).await,
  )
  .await;
  assert_eq!(record["status"]["label"], "pending_review");
  assert_eq!(record["complaint_text"], "still wrong");
}

#[tokio::test]
async fn overlong_text_is_unprocessable() {
  let app = app().await;
  let entry_id = seed(&app).await;

  let resp = file(&app, entry_id, &"x".repeat(501)).await;
  assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

  let resp = file(&app, entry_id, "   ").await;
  assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn filing_with_non_open_status_is_bad_request() {
  let app = app().await;
  let entry_id = seed(&app).await;
  let resp = send(
    &app,
    "POST",
    "/complaints",
    Some(json!({
      "reference_type": "grading",
      "reference_id": entry_id,
      "description": "text",
      "status": "closed",
    })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
  let app = app().await;
  let resp = send(&app, "POST", "/complaints", Some(json!({ "reference_id": 1 }))).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ─── Review ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn review_then_second_review_conflicts() {
  let app = app().await;
  let entry_id = seed(&app).await;
  let id = json_body(file(&app, entry_id, "wrong grade").await).await["complaint_id"]
    .as_i64()
    .unwrap();

  let resp = send(
    &app,
    "PATCH",
    &format!("/complaints/{id}/status"),
    Some(json!({ "status": "rejected" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(json_body(resp).await["status"], "rejected");

  let resp = send(
    &app,
    "PATCH",
    &format!("/complaints/{id}/status"),
    Some(json!({ "status": "closed" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::CONFLICT);

  // The filer can no longer edit.
  let resp = file(&app, entry_id, "please").await;
  assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

  let queue = json_body(send(&app, "GET", "/complaints?status=open", None).await).await;
  assert!(queue.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn reopening_is_bad_request() {
  let app = app().await;
  let entry_id = seed(&app).await;
  let id = json_body(file(&app, entry_id, "wrong grade").await).await["complaint_id"]
    .as_i64()
    .unwrap();

  let resp = send(
    &app,
    "PATCH",
    &format!("/complaints/{id}/status"),
    Some(json!({ "status": "open" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reviewing_unknown_complaint_is_not_found() {
  let app = app().await;
  let resp = send(
    &app,
    "PATCH",
    "/complaints/404/status",
    Some(json!({ "status": "closed" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ─── Entries and modules ─────────────────────────────────────────────────────

#[tokio::test]
async fn entry_for_unknown_slot_is_not_found() {
  let app = app().await;
  let resp = send(
    &app,
    "POST",
    "/entries",
    Some(json!({ "slot_id": 9, "student": "A11" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn modul_redirects_to_folder() {
  let app = app().await;

  let resp = send(&app, "GET", "/praktikum/7/modul", None).await;
  assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
  assert_eq!(resp.headers()[header::LOCATION], "/praktikum/7/modul/prak-pjk");

  let resp = send(&app, "GET", "/praktikum/3/modul", None).await;
  assert_eq!(resp.headers()[header::LOCATION], "/praktikum/3/modul/empty_modul");
}
