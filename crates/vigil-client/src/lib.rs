//! Async client for the Vigil alert REST API.
//!
//! [`ApiClient`] owns the bearer-token lifecycle and talks HTTP. Higher-level
//! state ([`AlertCollection`], [`VerificationWorkflow`]) depends only on the
//! [`AlertApi`] trait so it can be driven by a fake in tests.

mod alerts;
mod users;

pub mod api;
pub mod client;
pub mod collection;
pub mod credentials;
pub mod error;
pub mod verification;

pub use alerts::Submitted;
pub use api::AlertApi;
pub use client::{ApiClient, ApiConfig, Credentials, DEFAULT_BASE_URL};
pub use collection::AlertCollection;
pub use credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore, Session};
pub use error::{ClientError, Result};
pub use verification::VerificationWorkflow;

#[cfg(test)]
mod tests;
