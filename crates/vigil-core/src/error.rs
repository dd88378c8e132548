//! Error types for `vigil-core`.

use thiserror::Error;

/// Message shown when a verification form is missing required fields.
pub const INCOMPLETE_VERIFICATION: &str = "Please fill in all required fields";

#[derive(Debug, Error)]
pub enum Error {
  /// A form failed local validation; the message is user-facing.
  #[error("{0}")]
  Validation(String),

  #[error("{INCOMPLETE_VERIFICATION}")]
  IncompleteVerification,

  #[error("malformed token: {0}")]
  MalformedToken(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
