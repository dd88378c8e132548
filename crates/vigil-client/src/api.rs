//! The `AlertApi` trait: the seam between alert state and transport.
//!
//! [`AlertCollection`](crate::AlertCollection) and
//! [`VerificationWorkflow`](crate::VerificationWorkflow) depend on this
//! abstraction, not on [`ApiClient`] directly.

use std::future::Future;

use vigil_core::{
  alert::Alert,
  verification::{VerificationForm, VerificationToken},
};

use crate::{ApiClient, Result};

pub trait AlertApi: Send + Sync {
  /// Fetch every alert visible to the current session.
  fn list_alerts(&self) -> impl Future<Output = Result<Vec<Alert>>> + Send + '_;

  /// Permanently delete an alert.
  fn delete_alert(&self, id: u64) -> impl Future<Output = Result<()>> + Send + '_;

  /// Request a fresh single-use verification token for `alert_id`.
  fn generate_verification_token(
    &self,
    alert_id: u64,
  ) -> impl Future<Output = Result<VerificationToken>> + Send + '_;

  /// Submit a completed verification form against `token`.
  fn verify_alert<'a>(
    &'a self,
    token: &'a VerificationToken,
    form: &'a VerificationForm,
  ) -> impl Future<Output = Result<()>> + Send + 'a;
}

impl AlertApi for ApiClient {
  fn list_alerts(&self) -> impl Future<Output = Result<Vec<Alert>>> + Send + '_ {
    ApiClient::list_alerts(self)
  }

  fn delete_alert(&self, id: u64) -> impl Future<Output = Result<()>> + Send + '_ {
    ApiClient::delete_alert(self, id)
  }

  fn generate_verification_token(
    &self,
    alert_id: u64,
  ) -> impl Future<Output = Result<VerificationToken>> + Send + '_ {
    ApiClient::generate_verification_token(self, alert_id)
  }

  fn verify_alert<'a>(
    &'a self,
    token: &'a VerificationToken,
    form: &'a VerificationForm,
  ) -> impl Future<Output = Result<()>> + Send + 'a {
    ApiClient::verify_alert(self, token, form)
  }
}
