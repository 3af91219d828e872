//! Async HTTP client for the aprs.fi message API.

use std::time::Duration;

use reqwest::Client;
use spurpoint_core::{
  fetch::{FetchRequest, MessageSource},
  message::Candidate,
};

use crate::{Result, wire::parse_response};

pub const DEFAULT_BASE_URL: &str = "https://api.aprs.fi";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for the aprs.fi API.
#[derive(Debug, Clone)]
pub struct AprsConfig {
  /// Scheme and host, e.g. `https://api.aprs.fi`.
  pub base_url: String,
  /// Whole-request timeout; expiry surfaces as a transport error.
  pub timeout:  Duration,
}

/// Async HTTP client for aprs.fi.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct AprsClient {
  client: Client,
  config: AprsConfig,
}

impl AprsClient {
  pub fn new(config: AprsConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(config.timeout)
      .user_agent(concat!("spurpoint/", env!("CARGO_PKG_VERSION")))
      .build()?;
    Ok(Self { client, config })
  }

  fn url(&self) -> String {
    format!("{}/api/get", self.config.base_url.trim_end_matches('/'))
  }

  /// `GET /api/get?what=msg&dst=<callsign>&apikey=<key>&format=json`
  pub async fn get_messages(&self, request: &FetchRequest) -> Result<Vec<Candidate>> {
    let resp = self
      .client
      .get(self.url())
      .query(&[
        ("what", "msg"),
        ("dst", request.callsign()),
        ("apikey", request.api_key()),
        ("format", "json"),
      ])
      .send()
      .await?;

    let status = resp.status();
    if !status.is_success() {
      tracing::warn!(%status, callsign = request.callsign(), "aprs.fi request rejected");
      return Err(crate::Error::Status(status));
    }

    let body = resp.text().await?;
    let candidates = parse_response(&body)?;
    tracing::debug!(
      callsign = request.callsign(),
      entries = candidates.len(),
      "aprs.fi response parsed"
    );
    Ok(candidates)
  }
}

impl MessageSource for AprsClient {
  type Error = crate::Error;

  async fn fetch(&self, request: &FetchRequest) -> Result<Vec<Candidate>> {
    self.get_messages(request).await
  }
}
