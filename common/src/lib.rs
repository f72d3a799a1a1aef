//! Cross-cutting primitives shared by every crate in the workspace.
//!
//! - **error**: `ErrorLocation` for call-site capture in error values
//! - **redacted_token**: secret strings that never leak through logs

pub mod error;
pub mod redacted_token;

pub use error::error_location::ErrorLocation;
pub use error::redact_error::RedactError;
pub use redacted_token::RedactedToken;
