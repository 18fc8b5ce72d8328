//! Web interface module
//!
//! Exposes a record store over HTTP/JSON so it can be driven from outside
//! the process during testing. Values travel base64-encoded.
//!
//! Keys are taken from the rest of the path after `/records/`, so keys
//! containing `/` are reachable. The empty key is valid for the store but
//! has no URL here.

mod handlers;
mod server;

pub use handlers::{AddRequest, ApiError, RecordResponse, UpdateRequest, VersionResponse};
pub use server::{router, run_web_server};
