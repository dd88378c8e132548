//! Error type for `vigil-client`.
//!
//! Every variant's `Display` is the message a user should see.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
  /// Rejected locally before any request was made.
  #[error("{0}")]
  Validation(String),

  /// The server answered with a non-success status.
  #[error("{message}")]
  Http { status: u16, message: String },

  /// The request never produced a response.
  #[error("Unable to reach the server. Please check your connection.")]
  Network(#[source] reqwest::Error),

  /// A 401 on an authenticated request. Local credentials have been cleared.
  #[error("Session expired. Please log in again.")]
  SessionExpired,

  #[error("Not logged in. Run `vigil login` first.")]
  NotAuthenticated,

  #[error("No authentication token received")]
  MissingToken,

  #[error("unexpected response from server: {0}")]
  Decode(String),

  #[error("credential storage error: {0}")]
  Credentials(#[from] std::io::Error),

  #[error("failed to build HTTP client: {0}")]
  Setup(#[source] reqwest::Error),
}

impl ClientError {
  pub fn status(&self) -> Option<u16> {
    match self {
      Self::Http { status, .. } => Some(*status),
      Self::SessionExpired => Some(401),
      _ => None,
    }
  }
}

impl From<vigil_core::Error> for ClientError {
  fn from(e: vigil_core::Error) -> Self {
    match e {
      vigil_core::Error::Serialization(e) => Self::Decode(e.to_string()),
      other => Self::Validation(other.to_string()),
    }
  }
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;
