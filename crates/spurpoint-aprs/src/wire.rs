//! Wire types for the aprs.fi `what=msg` JSON response.
//!
//! ```json
//! {"command":"get","result":"ok","what":"msg","found":1,
//!  "entries":[{"messageid":"93475","time":"1741270079",
//!              "srccall":"KD0XYZ-7","dst":"N0CALL","message":"QSL?"}]}
//! ```

use serde::Deserialize;
use spurpoint_core::message::Candidate;

use crate::{Error, Result};

#[derive(Deserialize)]
struct MessageResponse {
  #[serde(default)]
  result:      Option<String>,
  #[serde(default)]
  description: Option<String>,
  /// Absent when the provider holds nothing for the callsign.
  #[serde(default)]
  entries:     Option<Vec<RawEntry>>,
}

#[derive(Deserialize)]
struct RawEntry {
  messageid: Scalar,
  time:      Scalar,
  srccall:   String,
  message:   String,
}

/// aprs.fi encodes numbers as strings; accept bare integers too.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
  Text(String),
  Number(i64),
}

impl Scalar {
  fn into_string(self) -> String {
    match self {
      Self::Text(s) => s,
      Self::Number(n) => n.to_string(),
    }
  }
}

impl RawEntry {
  fn into_candidate(self) -> Result<Candidate> {
    let external_id = self.messageid.into_string();

    let unix_timestamp = match self.time {
      Scalar::Number(n) => n,
      Scalar::Text(s) => s.trim().parse().map_err(|_| {
        Error::InvalidEntry(format!("message {external_id} has a non-numeric time {s:?}"))
      })?,
    };

    Ok(Candidate {
      external_id,
      unix_timestamp,
      source_callsign: self.srccall,
      body: self.message,
    })
  }
}

/// Parse a response body into candidates, preserving provider order.
pub fn parse_response(body: &str) -> Result<Vec<Candidate>> {
  let response: MessageResponse = serde_json::from_str(body)?;

  if response.result.as_deref() == Some("fail") {
    return Err(Error::Provider(
      response
        .description
        .unwrap_or_else(|| "no description given".into()),
    ));
  }

  response
    .entries
    .unwrap_or_default()
    .into_iter()
    .map(RawEntry::into_candidate)
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_entries_in_order() {
    let body = r#"{
      "command": "get", "result": "ok", "what": "msg", "found": 2,
      "entries": [
        {"messageid": "93475", "time": "1741270079", "srccall": "KD0XYZ-7",
         "dst": "N0CALL", "message": "QSL?"},
        {"messageid": "93476", "time": 1741270200, "srccall": "W1AW",
         "dst": "N0CALL", "message": "73"}
      ]
    }"#;

    let candidates = parse_response(body).unwrap();
    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].external_id, "93475");
    assert_eq!(candidates[0].unix_timestamp, 1_741_270_079);
    assert_eq!(candidates[0].source_callsign, "KD0XYZ-7");
    assert_eq!(candidates[0].body, "QSL?");
    assert_eq!(candidates[1].unix_timestamp, 1_741_270_200);
  }

  #[test]
  fn missing_entries_is_empty() {
    let candidates = parse_response(r#"{"result":"ok","found":0}"#).unwrap();
    assert!(candidates.is_empty());
  }

  #[test]
  fn provider_failure_is_reported() {
    let err = parse_response(r#"{"result":"fail","description":"authentication failed: wrong API key"}"#)
      .unwrap_err();
    assert!(matches!(err, Error::Provider(ref d) if d.contains("wrong API key")));
  }

  #[test]
  fn missing_required_field_is_malformed() {
    let err = parse_response(r#"{"entries":[{"messageid":"1","time":"1","srccall":"X"}]}"#)
      .unwrap_err();
    assert!(matches!(err, Error::Malformed(_)));
  }

  #[test]
  fn non_numeric_time_is_invalid() {
    let err = parse_response(
      r#"{"entries":[{"messageid":"1","time":"noon","srccall":"X","message":"m"}]}"#,
    )
    .unwrap_err();
    assert!(matches!(err, Error::InvalidEntry(_)));
  }

  #[test]
  fn not_json_is_malformed() {
    assert!(matches!(parse_response("<html>"), Err(Error::Malformed(_))));
  }
}
