use reqwest::{Method, StatusCode};
use thiserror::Error;

/// Failure of a call to the record service.
///
/// This is the only error kind the client surfaces; callers turn it into a
/// notification rather than propagating it.
#[derive(Debug, Error)]
pub enum TransportError {
  #[error("invalid service url '{url}': {source}")]
  InvalidUrl {
    url: String,
    #[source]
    source: url::ParseError,
  },

  #[error("failed to build http client: {0}")]
  Client(#[source] reqwest::Error),

  #[error("failed to encode request body for {method} {url}: {source}")]
  Encode {
    method: Method,
    url: String,
    #[source]
    source: serde_json::Error,
  },

  #[error("{method} {url} failed: {source}")]
  Request {
    method: Method,
    url: String,
    #[source]
    source: reqwest::Error,
  },

  #[error("{method} {url} returned {status}")]
  Status {
    method: Method,
    url: String,
    status: StatusCode,
  },

  #[error("failed to decode response from {method} {url}: {source}")]
  Decode {
    method: Method,
    url: String,
    #[source]
    source: reqwest::Error,
  },
}

impl TransportError {
  /// HTTP status returned by the service, if the call got that far
  pub fn status(&self) -> Option<StatusCode> {
    match self {
      Self::Status { status, .. } => Some(*status),
      _ => None,
    }
  }
}
