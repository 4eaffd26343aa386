//! Error types and axum `IntoResponse` implementation for the auth layer.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use praktikum_core::lifecycle::Role;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unauthorized")]
  Unauthorized,
  #[error("this action requires the {0:?} role")]
  Forbidden(Role),
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let message = self.to_string();
    match self {
      Error::Unauthorized => {
        let mut res =
          (StatusCode::UNAUTHORIZED, Json(json!({ "error": message })))
            .into_response();
        res.headers_mut().insert(
          header::WWW_AUTHENTICATE,
          HeaderValue::from_static("Basic realm=\"praktikum\""),
        );
        res
      }
      Error::Forbidden(_) => {
        (StatusCode::FORBIDDEN, Json(json!({ "error": message })))
          .into_response()
      }
    }
  }
}
