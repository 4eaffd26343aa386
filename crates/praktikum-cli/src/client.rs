//! Async HTTP client wrapping the practicum JSON API.

use anyhow::{Context, Result, anyhow};
use praktikum_core::{
  complaint::{Complaint, ComplaintId, ComplaintStatus, ReferenceType},
  lifecycle::RecordView,
  record::{EntryId, PraktikumId},
};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// Connection settings for the practicum API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub username: String,
  pub password: String,
}

/// Async HTTP client for the practicum JSON REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

#[derive(Deserialize)]
struct ErrorBody {
  error: String,
}

/// Turn a non-2xx response into an error carrying the server's message.
async fn check(what: &str, resp: Response) -> Result<Response> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }
  let message = resp
    .json::<ErrorBody>()
    .await
    .map(|b| b.error)
    .unwrap_or_else(|_| status.to_string());
  tracing::warn!(%status, %message, "{what} refused");
  Err(anyhow!("{what} → {status}: {message}"))
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/api{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    if self.config.username.is_empty() {
      req
    } else {
      req.basic_auth(&self.config.username, Some(&self.config.password))
    }
  }

  // ── Records ───────────────────────────────────────────────────────────────

  /// `GET /api/records?praktikum_id=<id>&student=<nim>&reference_type=<type>`
  pub async fn list_records(
    &self,
    praktikum_id: PraktikumId,
    student: &str,
    reference_type: ReferenceType,
  ) -> Result<Vec<RecordView>> {
    let resp = self
      .auth(self.client.get(self.url("/records")))
      .query(&[
        ("praktikum_id", praktikum_id.to_string()),
        ("student", student.to_string()),
        ("reference_type", reference_type.to_string()),
      ])
      .send()
      .await
      .context("GET /records failed")?;

    check("GET /records", resp)
      .await?
      .json()
      .await
      .context("deserialising records")
  }

  // ── Complaints ────────────────────────────────────────────────────────────

  /// `POST /api/complaints`: file or rewrite a complaint.
  pub async fn create_complaint(
    &self,
    reference_type: ReferenceType,
    reference_id: EntryId,
    description: &str,
  ) -> Result<Complaint> {
    tracing::info!(%reference_type, reference_id, "filing complaint");
    let resp = self
      .auth(self.client.post(self.url("/complaints")))
      .json(&json!({
        "reference_type": reference_type,
        "reference_id": reference_id,
        "description": description,
        "status": ComplaintStatus::Open,
      }))
      .send()
      .await
      .context("POST /complaints failed")?;

    check("POST /complaints", resp)
      .await?
      .json()
      .await
      .context("deserialising complaint")
  }

  /// `PATCH /api/complaints/<id>/status`
  pub async fn update_complaint_status(
    &self,
    complaint_id: ComplaintId,
    status: ComplaintStatus,
  ) -> Result<Complaint> {
    let path = format!("/complaints/{complaint_id}/status");
    tracing::info!(complaint_id, %status, "reviewing complaint");
    let resp = self
      .auth(self.client.patch(self.url(&path)))
      .json(&json!({ "status": status }))
      .send()
      .await
      .with_context(|| format!("PATCH {path} failed"))?;

    check(&format!("PATCH {path}"), resp)
      .await?
      .json()
      .await
      .context("deserialising complaint")
  }
}
