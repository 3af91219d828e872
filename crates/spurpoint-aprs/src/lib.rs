//! aprs.fi client for SpurPoint.
//!
//! Implements [`spurpoint_core::fetch::MessageSource`] over the aprs.fi
//! `get?what=msg` endpoint. One call per fetch; no paging, no retries.

mod client;
mod wire;

pub mod error;

pub use client::{AprsClient, AprsConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use error::{Error, Result};
pub use wire::parse_response;
