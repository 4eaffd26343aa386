//! HTTP Basic-auth verification and role checks.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  extract::{Request, State},
  http::{HeaderMap, Method},
  middleware::Next,
  response::{IntoResponse, Response},
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use praktikum_api::Caller;
use praktikum_core::{lifecycle::Role, notify::Notifier, store::ComplaintStore};
use serde::Deserialize;

use crate::{AppState, error::Error};

/// One login accepted by this server instance.
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
  pub role:          Role,
}

#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
  pub accounts: Vec<Account>,
}

/// Verify credentials directly from headers and return the account the
/// request acts for.
pub fn verify_auth(headers: &HeaderMap, config: &AuthConfig) -> Result<Caller, Error> {
  let header_val = headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(Error::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(Error::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| Error::Unauthorized)?;
  let creds   = std::str::from_utf8(&decoded).map_err(|_| Error::Unauthorized)?;

  let (username, password) = creds.split_once(':').ok_or(Error::Unauthorized)?;

  let account = config
    .accounts
    .iter()
    .find(|a| a.username == username)
    .ok_or(Error::Unauthorized)?;

  let parsed_hash = PasswordHash::new(&account.password_hash)
    .map_err(|_| Error::Unauthorized)?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| Error::Unauthorized)?;

  Ok(Caller {
    username: account.username.clone(),
    role:     account.role,
  })
}

/// The role a request needs beyond being authenticated, if any. `path` is
/// the full request path including the `/api` prefix.
///
/// Record reads are open to both roles; the API itself keeps filers to their
/// own student number via the [`Caller`] extension.
pub fn required_role(method: &Method, path: &str) -> Option<Role> {
  let path = path.strip_prefix("/api")?.trim_end_matches('/');
  let segments: Vec<&str> = path.split('/').skip(1).collect();

  match (method, segments.as_slice()) {
    (&Method::POST, ["complaints"]) => Some(Role::Filer),
    (&Method::GET, ["complaints"] | ["complaints", _]) => Some(Role::Reviewer),
    (&Method::PATCH, ["complaints", _, "status"]) => Some(Role::Reviewer),
    (&Method::POST, ["slots"] | ["entries"]) => Some(Role::Reviewer),
    _ => None,
  }
}

/// Middleware: authenticate every request, enforce [`required_role`], and
/// hand the [`Caller`] on to the API handlers.
pub async fn authorize<S, N>(
  State(state): State<AppState<S, N>>,
  mut req: Request,
  next: Next,
) -> Response
where
  S: ComplaintStore + 'static,
  N: Notifier + 'static,
{
  let caller = match verify_auth(req.headers(), &state.auth) {
    Ok(c) => c,
    Err(e) => return e.into_response(),
  };

  if let Some(role) = required_role(req.method(), req.uri().path())
    && caller.role != role
  {
    tracing::debug!(user = %caller.username, ?role, "role check failed");
    return Error::Forbidden(role).into_response();
  }

  req.extensions_mut().insert(caller);
  next.run(req).await
}
