//! Two-phase alert verification: obtain a one-time token, then submit the
//! completed verification form against it.

use serde::{Deserialize, Serialize};

use crate::{Error, Result, alert::ClinicalStatus};

/// Substring of the backend error raised when its token table predates the
/// `created_at` column.
const MISSING_CREATED_AT: &str = "Unknown column 'created_at'";

/// Message shown in place of [`MISSING_CREATED_AT`] errors.
pub const DATABASE_CONFIGURATION_ERROR: &str = "Database configuration error: the \
  verification service is misconfigured. Please contact the system administrator.";

/// A single-use credential scoped to one alert. The server may reject it if it
/// has gone stale; the client never inspects it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationToken {
  pub token:    String,
  pub alert_id: u64,
}

impl std::fmt::Debug for VerificationToken {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("VerificationToken")
      .field("token", &"<redacted>")
      .field("alert_id", &self.alert_id)
      .finish()
  }
}

// ─── Form ────────────────────────────────────────────────────────────────────

/// Body of `POST /alerts/verify/{token}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationForm {
  pub status:            Option<ClinicalStatus>,
  #[serde(default)]
  pub cif_no:            String,
  #[serde(default)]
  pub person_reporting:  String,
  #[serde(default)]
  pub contact_number:    String,
  #[serde(default)]
  pub source_of_alert:   String,
  #[serde(default)]
  pub alert_case_name:   String,
  #[serde(default)]
  pub alert_case_age:    String,
  #[serde(default)]
  pub alert_case_sex:    String,
  #[serde(default)]
  pub history:           String,
  #[serde(default)]
  pub verified_by:       String,

  #[serde(default, skip_serializing_if = "Option::is_none", rename = "alertCaseDistrict")]
  pub district:          Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none", rename = "alertCaseSubcounty")]
  pub subcounty:         Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none", rename = "alertCaseParish")]
  pub parish:            Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none", rename = "alertCaseVillage")]
  pub village:           Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub symptoms:          Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub verification_date: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub verification_time: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub response:          Option<String>,
}

impl VerificationForm {
  /// Every required field must be non-blank. Checked before any request is
  /// made.
  pub fn validate(&self) -> Result<()> {
    let required = [
      &self.cif_no,
      &self.person_reporting,
      &self.contact_number,
      &self.source_of_alert,
      &self.alert_case_name,
      &self.alert_case_age,
      &self.alert_case_sex,
      &self.history,
      &self.verified_by,
    ];
    if self.status.is_none() || required.iter().any(|f| f.trim().is_empty()) {
      return Err(Error::IncompleteVerification);
    }
    Ok(())
  }
}

// ─── State machine ───────────────────────────────────────────────────────────

/// Progress of one verification dialog.
///
/// ```text
/// Idle → TokenRequested → TokenReady → Submitting → Verified
///              ↓                            ↓
///            Failed                       Failed
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum VerificationState {
  #[default]
  Idle,
  TokenRequested,
  TokenReady(VerificationToken),
  Submitting,
  Verified,
  Failed(String),
}

impl VerificationState {
  pub fn is_terminal(&self) -> bool {
    matches!(self, Self::Verified | Self::Failed(_))
  }

  /// Whether the form should be shown (a token is in hand).
  pub fn form_visible(&self) -> bool { matches!(self, Self::TokenReady(_)) }

  pub fn token(&self) -> Option<&VerificationToken> {
    match self {
      Self::TokenReady(token) => Some(token),
      _ => None,
    }
  }
}

/// Map a token-request failure to the message shown to the user.
pub fn classify_token_error(raw: &str) -> String {
  if raw.contains(MISSING_CREATED_AT) {
    DATABASE_CONFIGURATION_ERROR.to_string()
  } else {
    raw.to_string()
  }
}
