//! Error type for `spurpoint-aprs`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Connection failure or timeout. The request URL (which carries the API
  /// key) is stripped before the error is stored.
  #[error("request failed: {0}")]
  Transport(reqwest::Error),

  #[error("aprs.fi answered with HTTP {0}")]
  Status(reqwest::StatusCode),

  #[error("malformed response: {0}")]
  Malformed(#[from] serde_json::Error),

  /// The provider answered `"result": "fail"`, e.g. for an unknown API key.
  #[error("aprs.fi reported a failure: {0}")]
  Provider(String),

  #[error("invalid message entry: {0}")]
  InvalidEntry(String),
}

impl From<reqwest::Error> for Error {
  fn from(err: reqwest::Error) -> Self { Self::Transport(err.without_url()) }
}

impl From<Error> for spurpoint_core::Error {
  fn from(err: Error) -> Self {
    match err {
      Error::Transport(_) | Error::Status(_) => Self::Network(err.to_string()),
      Error::Malformed(_) | Error::Provider(_) | Error::InvalidEntry(_) => {
        Self::Protocol(err.to_string())
      }
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
