//! In-memory alert filtering.
//!
//! All filtering happens client-side over a fetched snapshot; the server is
//! never asked to filter.

use crate::alert::{Alert, calendar_day};

/// Active filter dimensions. `None` means the dimension matches everything.
///
/// Every active dimension is an exact string match, so a status value no
/// alert carries (`"Suspected"`, `"alive"`) matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertFilter {
  pub status:   Option<String>,
  pub district: Option<String>,
  pub source:   Option<String>,
  /// Calendar day; compared after truncating both sides to `YYYY-MM-DD`.
  pub date:     Option<String>,
}

/// `""` and `"all"` are the UI's "no filter" sentinels.
fn active(raw: &str) -> Option<String> {
  let raw = raw.trim();
  if raw.is_empty() || raw.eq_ignore_ascii_case("all") {
    None
  } else {
    Some(raw.to_string())
  }
}

impl AlertFilter {
  /// Build a filter from raw select-box values.
  pub fn from_raw(status: &str, district: &str, source: &str, date: &str) -> Self {
    Self {
      status:   active(status),
      district: active(district),
      source:   active(source),
      date:     active(date).map(|d| calendar_day(&d).to_string()),
    }
  }

  pub fn is_empty(&self) -> bool { *self == Self::default() }

  pub fn matches(&self, alert: &Alert) -> bool {
    if let Some(status) = &self.status
      && alert.status.to_string() != *status
    {
      return false;
    }
    if let Some(district) = &self.district
      && alert.district != *district
    {
      return false;
    }
    if let Some(source) = &self.source
      && alert.source_of_alert != *source
    {
      return false;
    }
    if let Some(date) = &self.date
      && alert.calendar_day() != calendar_day(date)
    {
      return false;
    }
    true
  }

  /// The matching alerts, in their original order.
  pub fn apply<'a>(&self, alerts: &'a [Alert]) -> Vec<&'a Alert> {
    alerts.iter().filter(|a| self.matches(a)).collect()
  }
}
