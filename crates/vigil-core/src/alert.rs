//! Alert records, the unit of surveillance reporting.
//!
//! An alert carries two independent status axes: the clinical [`ClinicalStatus`]
//! of the case and the workflow flag `is_verified`. Verification only ever
//! moves `is_verified` from `false` to `true`.

use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumString};

use crate::{Error, Result};

// ─── Status ──────────────────────────────────────────────────────────────────

/// Clinical outcome of the reported case.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum ClinicalStatus {
  Alive,
  Dead,
  #[default]
  Unknown,
}

// ─── Alert ───────────────────────────────────────────────────────────────────

/// An alert as served by `GET /alerts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
  pub id:                u64,
  /// Report date; either `YYYY-MM-DD` or a full ISO-8601 timestamp.
  #[serde(default)]
  pub date:              String,
  #[serde(default)]
  pub time:              String,
  #[serde(default)]
  pub person_reporting:  String,
  #[serde(default)]
  pub contact_number:    String,
  #[serde(default)]
  pub source_of_alert:   String,
  #[serde(default)]
  pub alert_case_name:   String,
  #[serde(default, deserialize_with = "lenient_age")]
  pub alert_case_age:    Option<u32>,
  #[serde(default)]
  pub alert_case_sex:    String,
  #[serde(default, rename = "alertCaseDistrict")]
  pub district:          String,
  #[serde(default, rename = "alertCaseSubcounty")]
  pub subcounty:         String,
  #[serde(default, rename = "alertCaseParish")]
  pub parish:            String,
  #[serde(default, rename = "alertCaseVillage")]
  pub village:           String,
  #[serde(default)]
  pub history:           String,
  /// Symptom names stored as a single delimited string.
  #[serde(default)]
  pub symptoms:          String,
  #[serde(default)]
  pub status:            ClinicalStatus,
  #[serde(default)]
  pub is_verified:       bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub cif_no:            Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub verified_by:       Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub verification_date: Option<String>,
}

impl Alert {
  /// The individual symptoms, split on `,` or `;`.
  pub fn symptom_list(&self) -> Vec<&str> {
    split_symptoms(&self.symptoms)
  }

  /// The report date truncated to `YYYY-MM-DD`.
  pub fn calendar_day(&self) -> &str {
    calendar_day(&self.date)
  }
}

/// Truncate a date or timestamp string to its calendar-day prefix.
///
/// `"2024-05-01T10:22:00.000Z"` and `"2024-05-01 10:22"` both become
/// `"2024-05-01"`; a bare date is returned unchanged.
pub fn calendar_day(raw: &str) -> &str {
  let raw = raw.trim();
  match raw.find(['T', ' ']) {
    Some(idx) => &raw[..idx],
    None => raw,
  }
}

fn split_symptoms(raw: &str) -> Vec<&str> {
  raw
    .split([',', ';'])
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .collect()
}

/// The API has served ages both as numbers and as numeric strings.
fn lenient_age<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
  D: Deserializer<'de>,
{
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum Raw {
    Number(u32),
    Text(String),
  }

  Ok(match Option::<Raw>::deserialize(deserializer)? {
    Some(Raw::Number(n)) => Some(n),
    Some(Raw::Text(s)) => s.trim().parse().ok(),
    None => None,
  })
}

// ─── NewAlert ────────────────────────────────────────────────────────────────

/// Body of the public `POST /alerts/create` submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAlert {
  pub date:             String,
  #[serde(default)]
  pub time:             String,
  pub person_reporting: String,
  pub contact_number:   String,
  #[serde(default)]
  pub source_of_alert:  String,
  pub alert_case_name:  String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub alert_case_age:   Option<u32>,
  #[serde(default)]
  pub alert_case_sex:   String,
  #[serde(rename = "alertCaseDistrict")]
  pub district:         String,
  #[serde(default, rename = "alertCaseSubcounty")]
  pub subcounty:        String,
  #[serde(default, rename = "alertCaseParish")]
  pub parish:           String,
  #[serde(default, rename = "alertCaseVillage")]
  pub village:          String,
  #[serde(default)]
  pub history:          String,
  #[serde(default)]
  pub symptoms:         String,
  #[serde(default)]
  pub status:           ClinicalStatus,
}

impl NewAlert {
  /// Store `symptoms` in the delimited wire form.
  pub fn set_symptoms<S: AsRef<str>>(&mut self, symptoms: &[S]) {
    self.symptoms = symptoms
      .iter()
      .map(|s| s.as_ref().trim())
      .filter(|s| !s.is_empty())
      .collect::<Vec<_>>()
      .join(", ");
  }

  /// Check the fields a public submission cannot omit.
  pub fn validate(&self) -> Result<()> {
    let required = [
      ("date", &self.date),
      ("person reporting", &self.person_reporting),
      ("contact number", &self.contact_number),
      ("district", &self.district),
      ("case name", &self.alert_case_name),
    ];
    let missing: Vec<&str> = required
      .iter()
      .filter(|(_, value)| value.trim().is_empty())
      .map(|(name, _)| *name)
      .collect();

    if missing.is_empty() {
      Ok(())
    } else {
      Err(Error::Validation(format!(
        "Missing required fields: {}",
        missing.join(", ")
      )))
    }
  }
}

// ─── AlertUpdate ─────────────────────────────────────────────────────────────

/// Partial update for `PUT /alerts/{id}`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertUpdate {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub date:             Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub time:             Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub person_reporting: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub contact_number:   Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub source_of_alert:  Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub alert_case_name:  Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub alert_case_age:   Option<u32>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub alert_case_sex:   Option<String>,
  #[serde(default, rename = "alertCaseDistrict", skip_serializing_if = "Option::is_none")]
  pub district:         Option<String>,
  #[serde(default, rename = "alertCaseSubcounty", skip_serializing_if = "Option::is_none")]
  pub subcounty:        Option<String>,
  #[serde(default, rename = "alertCaseParish", skip_serializing_if = "Option::is_none")]
  pub parish:           Option<String>,
  #[serde(default, rename = "alertCaseVillage", skip_serializing_if = "Option::is_none")]
  pub village:          Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub history:          Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub symptoms:         Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub status:           Option<ClinicalStatus>,
}

impl AlertUpdate {
  pub fn is_empty(&self) -> bool { *self == Self::default() }
}
