//! Lightweight trigger handlers
//!
//! Diagnostic routes the host can invoke without touching blob storage:
//! - `/api/SimpleHttpTrigger` echoes request details into the log
//! - `/QueueTrigger` unwraps a queue message into a `User`

pub mod routes;
mod types;

pub use routes::{ECHO_BODY, trigger_routes};
pub use types::User;
