//! The `MessageSource` trait and the validated request it consumes.
//!
//! A source performs exactly one remote call per [`MessageSource::fetch`] and
//! returns the provider's messages untouched: no deduplication, no
//! persistence.

use std::{fmt, future::Future};

use crate::{Error, Result, message::Candidate};

// ─── Request ─────────────────────────────────────────────────────────────────

/// A callsign/API-key pair that has passed input validation.
///
/// The only way to build one is [`FetchRequest::new`], so a source never sees
/// an empty callsign or key.
#[derive(Clone, PartialEq, Eq)]
pub struct FetchRequest {
  callsign: String,
  api_key:  String,
}

impl FetchRequest {
  /// Validate and normalise the operator's input.
  ///
  /// The callsign is trimmed and upper-cased; both fields must be non-empty
  /// afterwards.
  pub fn new(callsign: &str, api_key: &str) -> Result<Self> {
    let callsign = callsign.trim().to_uppercase();
    if callsign.is_empty() {
      return Err(Error::Validation("a callsign is required".into()));
    }

    let api_key = api_key.trim();
    if api_key.is_empty() {
      return Err(Error::Validation("APRS API key is missing".into()));
    }

    Ok(Self { callsign, api_key: api_key.to_owned() })
  }

  pub fn callsign(&self) -> &str { &self.callsign }

  pub fn api_key(&self) -> &str { &self.api_key }
}

impl fmt::Debug for FetchRequest {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("FetchRequest")
      .field("callsign", &self.callsign)
      .field("api_key", &"<redacted>")
      .finish()
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a remote provider of APRS messages.
pub trait MessageSource: Send + Sync {
  /// Backend error; must map onto the [`Error::Network`] /
  /// [`Error::Protocol`] taxonomy.
  type Error: std::error::Error + Into<Error> + Send + Sync + 'static;

  /// Retrieve every message the provider currently holds for
  /// `request.callsign()`, in provider order.
  fn fetch<'a>(
    &'a self,
    request: &'a FetchRequest,
  ) -> impl Future<Output = Result<Vec<Candidate>, Self::Error>> + Send + 'a;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn callsign_is_trimmed_and_uppercased() {
    let req = FetchRequest::new("  n0call-5 ", "key").unwrap();
    assert_eq!(req.callsign(), "N0CALL-5");
    assert_eq!(req.api_key(), "key");
  }

  #[test]
  fn blank_callsign_is_rejected() {
    let err = FetchRequest::new("   ", "key").unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
  }

  #[test]
  fn empty_api_key_is_rejected() {
    let err = FetchRequest::new("N0CALL", "").unwrap_err();
    assert!(matches!(err, Error::Validation(ref m) if m.contains("API key")));
  }

  #[test]
  fn debug_output_hides_api_key() {
    let req = FetchRequest::new("N0CALL", "super-secret").unwrap();
    let dbg = format!("{req:?}");
    assert!(dbg.contains("N0CALL"));
    assert!(!dbg.contains("super-secret"));
  }
}
