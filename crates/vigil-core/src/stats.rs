//! Aggregate counts derived from an alert snapshot.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::alert::{Alert, ClinicalStatus};

/// Dashboard counters. Always recomputed from the full list; never cached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AlertStats {
  pub total:            usize,
  pub alive:            usize,
  pub dead:             usize,
  pub unknown:          usize,
  pub verified:         usize,
  pub unverified:       usize,
  pub today_total:      usize,
  pub today_verified:   usize,
  pub today_unverified: usize,
  pub by_district:      BTreeMap<String, usize>,
}

impl AlertStats {
  /// Count `alerts`, treating those whose calendar day equals `today` as
  /// today's reports.
  pub fn compute(alerts: &[Alert], today: NaiveDate) -> Self {
    let today = today.format("%Y-%m-%d").to_string();
    let mut stats = Self { total: alerts.len(), ..Self::default() };

    for alert in alerts {
      match alert.status {
        ClinicalStatus::Alive => stats.alive += 1,
        ClinicalStatus::Dead => stats.dead += 1,
        ClinicalStatus::Unknown => stats.unknown += 1,
      }

      if alert.is_verified {
        stats.verified += 1;
      } else {
        stats.unverified += 1;
      }

      if alert.calendar_day() == today {
        stats.today_total += 1;
        if alert.is_verified {
          stats.today_verified += 1;
        } else {
          stats.today_unverified += 1;
        }
      }

      let district = alert.district.trim();
      if !district.is_empty() {
        *stats.by_district.entry(district.to_string()).or_default() += 1;
      }
    }

    stats
  }
}
