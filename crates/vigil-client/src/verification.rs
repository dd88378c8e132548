//! Driver for one alert-verification dialog.

use vigil_core::verification::{VerificationForm, VerificationState, classify_token_error};

use crate::{AlertApi, ClientError, Result};

/// Walks one alert through `Idle → TokenRequested → TokenReady → Submitting →
/// Verified | Failed`.
///
/// Both outcomes are terminal; calling [`open`](Self::open) again starts over
/// with a fresh token.
pub struct VerificationWorkflow<'a, A: AlertApi> {
  api:      &'a A,
  alert_id: u64,
  state:    VerificationState,
}

impl<'a, A: AlertApi> VerificationWorkflow<'a, A> {
  pub fn new(api: &'a A, alert_id: u64) -> Self {
    Self { api, alert_id, state: VerificationState::Idle }
  }

  pub fn alert_id(&self) -> u64 { self.alert_id }

  pub fn state(&self) -> &VerificationState { &self.state }

  /// Request a verification token. Called as soon as the dialog opens.
  pub async fn open(&mut self) -> &VerificationState {
    self.state = VerificationState::TokenRequested;
    tracing::debug!(alert_id = self.alert_id, "requesting verification token");

    self.state = match self.api.generate_verification_token(self.alert_id).await {
      Ok(token) => VerificationState::TokenReady(token),
      Err(e) => {
        let message = classify_token_error(&e.to_string());
        tracing::warn!(alert_id = self.alert_id, "verification token request failed: {e}");
        VerificationState::Failed(message)
      }
    };
    &self.state
  }

  /// Submit `form` with the token obtained by [`open`](Self::open).
  ///
  /// An incomplete form is rejected locally and leaves the state unchanged.
  pub async fn submit(&mut self, form: &VerificationForm) -> Result<()> {
    form.validate()?;

    let token = match &self.state {
      VerificationState::TokenReady(token) => token.clone(),
      state if state.is_terminal() => {
        return Err(ClientError::Validation(
          "This verification has finished. Reopen the verification dialog to start again.".into(),
        ));
      }
      _ => {
        return Err(ClientError::Validation(
          "Verification token is not ready. Reopen the verification dialog.".into(),
        ));
      }
    };

    self.state = VerificationState::Submitting;
    match self.api.verify_alert(&token, form).await {
      Ok(()) => {
        self.state = VerificationState::Verified;
        Ok(())
      }
      Err(e) => {
        self.state = VerificationState::Failed(e.to_string());
        Err(e)
      }
    }
  }
}
