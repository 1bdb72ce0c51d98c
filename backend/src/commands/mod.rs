//! Commands Layer
//!
//! Handlers that bridge the surrounding application to the backend.

mod list_cmd;

pub use list_cmd::*;
