//! Core types and trait definitions for SpurPoint APRS messaging.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! SQLite store and the aprs.fi client plug in through [`store::MessageStore`]
//! and [`fetch::MessageSource`]; [`service::MessageService`] ties them
//! together into the operations an operator surface calls.

pub mod error;
pub mod fetch;
pub mod message;
pub mod service;
pub mod store;

pub use error::{Error, Result};
