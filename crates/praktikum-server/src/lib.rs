//! HTTP server for practicum complaints.
//!
//! Mounts the JSON API under `/api`, behind HTTP Basic auth with per-role
//! checks, and logs every request through `tower-http`'s trace layer.

pub mod auth;
pub mod error;
pub mod notify;

pub use error::Error;

use std::{collections::HashMap, path::PathBuf, sync::Arc};

use axum::{Router, middleware};
use praktikum_api::ApiState;
use praktikum_core::{
  ComplaintService, modul::ModulMap, notify::Notifier, store::ComplaintStore,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::{Account, AuthConfig};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `PRAKTIKUM_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  pub store_path: PathBuf,
  #[serde(default)]
  pub accounts:   Vec<Account>,
  /// Module folder overrides, keyed by practicum id.
  #[serde(default)]
  pub modules:    HashMap<String, String>,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8080 }

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through the router and the auth middleware.
pub struct AppState<S, N> {
  pub service: Arc<ComplaintService<S, N>>,
  pub modules: Arc<ModulMap>,
  pub auth:    Arc<AuthConfig>,
}

impl<S, N> Clone for AppState<S, N> {
  fn clone(&self) -> Self {
    Self {
      service: self.service.clone(),
      modules: self.modules.clone(),
      auth:    self.auth.clone(),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the server's axum [`Router`].
pub fn router<S, N>(state: AppState<S, N>) -> Router
where
  S: ComplaintStore + 'static,
  N: Notifier + 'static,
{
  let api = praktikum_api::api_router(ApiState {
    service: state.service.clone(),
    modules: state.modules.clone(),
  });

  Router::new()
    .nest("/api", api)
    .layer(middleware::from_fn_with_state(state, auth::authorize::<S, N>))
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use base64::Engine as _;
  use base64::engine::general_purpose::STANDARD as B64;
  use praktikum_core::{lifecycle::Role, notify::Silent};
  use praktikum_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  fn hash(password: &str) -> String {
    let salt = SaltString::generate(&mut rand_core::OsRng);
    Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string()
  }

  async fn make_state() -> AppState<SqliteStore, Silent> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    AppState {
      service: Arc::new(ComplaintService::new(Arc::new(store), Silent)),
      modules: Arc::new(ModulMap::default()),
      auth:    Arc::new(AuthConfig {
        accounts: vec![
          Account {
            username:      "A11".to_string(),
            password_hash: hash("mhs"),
            role:          Role::Filer,
          },
          Account {
            username:      "asisten".to_string(),
            password_hash: hash("ast"),
            role:          Role::Reviewer,
          },
        ],
      }),
    }
  }

  fn auth_header(user: &str, pass: &str) -> String {
    format!("Basic {}", B64.encode(format!("{user}:{pass}")))
  }

  async fn send(
    state: &AppState<SqliteStore, Silent>,
    method: &str,
    uri: &str,
    auth: Option<(&str, &str)>,
    body: Option<Value>,
  ) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some((user, pass)) = auth {
      builder = builder.header(header::AUTHORIZATION, auth_header(user, pass));
    }
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    router(state.clone())
      .oneshot(builder.body(body).unwrap())
      .await
      .unwrap()
  }

  async fn json_body(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  const FILER: Option<(&str, &str)> = Some(("A11", "mhs"));
  const REVIEWER: Option<(&str, &str)> = Some(("asisten", "ast"));

  #[tokio::test]
  async fn unauthenticated_requests_return_401() {
    let state = make_state().await;
    let resp = send(&state, "GET", "/api/complaints", None, None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));
  }

  #[tokio::test]
  async fn filer_cannot_create_slots() {
    let state = make_state().await;
    let resp = send(
      &state,
      "POST",
      "/api/slots",
      FILER,
      Some(json!({ "praktikum_id": 5, "reference_type": "grading", "title": "Modul 1" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
  }

  #[tokio::test]
  async fn filer_cannot_touch_another_students_grade() {
    let state = make_state().await;
    let slot = json_body(
      send(
        &state,
        "POST",
        "/api/slots",
        REVIEWER,
        Some(json!({ "praktikum_id": 5, "reference_type": "grading", "title": "Modul 1" })),
      )
      .await,
    )
    .await;
    let entry = json_body(
      send(
        &state,
        "POST",
        "/api/entries",
        REVIEWER,
        Some(json!({ "slot_id": slot["slot_id"], "student": "B22", "score": 40.0 })),
      )
      .await,
    )
    .await;

    let filing = json!({
      "reference_type": "grading",
      "reference_id": entry["entry_id"],
      "description": "raise it",
    });
    let resp = send(&state, "POST", "/api/complaints", FILER, Some(filing)).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let listing = "/api/records?praktikum_id=5&student=B22&reference_type=grading";
    let resp = send(&state, "GET", listing, FILER, None).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = send(&state, "GET", "/api/complaints", FILER, None).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Reviewers still see every student, and nothing was filed.
    let records = json_body(send(&state, "GET", listing, REVIEWER, None).await).await;
    assert_eq!(records[0]["status"]["label"], "eligible_to_file");
  }

  #[tokio::test]
  async fn full_complaint_flow_across_roles() {
    let state = make_state().await;

    let slot = json_body(
      send(
        &state,
        "POST",
        "/api/slots",
        REVIEWER,
        Some(json!({ "praktikum_id": 5, "reference_type": "attendance", "title": "Sesi 1" })),
      )
      .await,
    )
    .await;
    let entry = json_body(
      send(
        &state,
        "POST",
        "/api/entries",
        REVIEWER,
        Some(json!({ "slot_id": slot["slot_id"], "student": "A11" })),
      )
      .await,
    )
    .await;

    let filing = json!({
      "reference_type": "presensi",
      "reference_id": entry["entry_id"],
      "description": "I was in the lab",
    });

    // Reviewers do not file complaints.
    let resp = send(&state, "POST", "/api/complaints", REVIEWER, Some(filing.clone())).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = send(&state, "POST", "/api/complaints", FILER, Some(filing)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let id = json_body(resp).await["complaint_id"].as_i64().unwrap();

    // Filers do not review.
    let uri = format!("/api/complaints/{id}/status");
    let decision = json!({ "status": "closed" });
    let resp = send(&state, "PATCH", &uri, FILER, Some(decision.clone())).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = send(&state, "PATCH", &uri, REVIEWER, Some(decision)).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let record = json_body(
      send(
        &state,
        "GET",
        &format!("/api/records/attendance/{}", entry["entry_id"]),
        FILER,
        None,
      )
      .await,
    )
    .await;
    assert_eq!(record["status"]["label"], "resolved_accepted");
    assert_eq!(record["can_edit"], false);
  }
}
