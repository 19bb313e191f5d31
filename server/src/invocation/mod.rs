//! Custom-handler invocation envelope
//!
//! This module provides:
//! - `InvokeRequest` / `InvokeResponse` wire types exchanged with the host
//! - `decode_embedded` for binding payloads delivered as JSON-encoded strings
//! - `unwrap_payload` which recovers a typed route payload from a request body
//! - `invocation_id` for correlating logs with the host's invocation

mod embedded;
mod headers;
mod types;

pub use embedded::{VALUE_KEY, decode_embedded, encode_embedded, unwrap_payload};
pub use headers::{INVOCATION_ID_HEADER, invocation_id};
pub use types::{InvocationError, InvokeRequest, InvokeResponse};
