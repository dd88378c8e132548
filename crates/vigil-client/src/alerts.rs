//! `/alerts` endpoints.

use reqwest::Method;
use serde::Deserialize;
use vigil_core::{
  alert::{Alert, AlertUpdate, NewAlert},
  verification::{VerificationForm, VerificationToken},
};

use crate::{
  ApiClient, ClientError, Result,
  client::{Listing, Single, read_json},
};

/// Acknowledgement of a public alert submission.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Submitted {
  #[serde(default, alias = "alertId", alias = "insertId")]
  pub id:      Option<u64>,
  #[serde(default)]
  pub message: Option<String>,
}

#[derive(Deserialize)]
struct TokenBody {
  #[serde(default)]
  token: Option<String>,
}

impl ApiClient {
  /// `GET /alerts`
  pub async fn list_alerts(&self) -> Result<Vec<Alert>> {
    let resp = self.send_authenticated(self.request(Method::GET, "/alerts")).await?;
    let listing: Listing<Alert> = read_json(resp).await?;
    let alerts = listing.into_vec();
    tracing::debug!(count = alerts.len(), "fetched alerts");
    Ok(alerts)
  }

  /// `GET /alerts/{id}`
  pub async fn get_alert(&self, id: u64) -> Result<Alert> {
    let resp = self
      .send_authenticated(self.request(Method::GET, &format!("/alerts/{id}")))
      .await?;
    let alert: Single<Alert> = read_json(resp).await?;
    Ok(alert.into_inner())
  }

  /// `POST /alerts/create`, the public reporting form. No credentials are
  /// sent.
  pub async fn create_alert(&self, alert: &NewAlert) -> Result<Submitted> {
    alert.validate()?;
    let resp = self
      .send_public(self.request(Method::POST, "/alerts/create").json(alert))
      .await?;
    // Some deployments answer 201 with an empty body.
    let bytes = resp.bytes().await.map_err(ClientError::Network)?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
      return Ok(Submitted::default());
    }
    serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
  }

  /// `PUT /alerts/{id}`
  pub async fn update_alert(&self, id: u64, update: &AlertUpdate) -> Result<()> {
    if update.is_empty() {
      return Err(ClientError::Validation("Nothing to update".into()));
    }
    self
      .send_authenticated(self.request(Method::PUT, &format!("/alerts/{id}")).json(update))
      .await?;
    tracing::info!(alert_id = id, "alert updated");
    Ok(())
  }

  /// `DELETE /alerts/{id}`. This is a hard delete.
  pub async fn delete_alert(&self, id: u64) -> Result<()> {
    self
      .send_authenticated(self.request(Method::DELETE, &format!("/alerts/{id}")))
      .await?;
    tracing::info!(alert_id = id, "alert deleted");
    Ok(())
  }

  /// `POST /alerts/{id}/generate-token`
  pub async fn generate_verification_token(&self, alert_id: u64) -> Result<VerificationToken> {
    let resp = self
      .send_authenticated(
        self.request(Method::POST, &format!("/alerts/{alert_id}/generate-token")),
      )
      .await?;
    let body: Single<TokenBody> = read_json(resp).await?;
    let token = body
      .into_inner()
      .token
      .filter(|t| !t.trim().is_empty())
      .ok_or_else(|| ClientError::Decode("no verification token in response".into()))?;
    Ok(VerificationToken { token, alert_id })
  }

  /// `POST /alerts/verify/{token}`. Incomplete forms are rejected before any
  /// request is made.
  pub async fn verify_alert(&self, token: &VerificationToken, form: &VerificationForm) -> Result<()> {
    form.validate()?;
    self
      .send_authenticated(
        self
          .request_with_segment(Method::POST, "/alerts/verify", &token.token)?
          .json(form),
      )
      .await?;
    tracing::info!(alert_id = token.alert_id, "alert verified");
    Ok(())
  }
}
