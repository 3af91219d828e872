//! Error taxonomy shared by every SpurPoint operation.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Bad caller input, e.g. an empty callsign or a missing API key. Raised
  /// before any network or store access.
  #[error("validation error: {0}")]
  Validation(String),

  /// Transport failure, timeout, or a non-success HTTP status.
  #[error("network error: {0}")]
  Network(String),

  /// The provider answered, but not with something we can read.
  #[error("protocol error: {0}")]
  Protocol(String),

  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("message not found: {0}")]
  NotFound(i64),
}

impl Error {
  /// Box a backend error into [`Error::Storage`].
  pub fn storage<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Storage(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
