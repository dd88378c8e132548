//! The fetched alert snapshot and the views derived from it.
//!
//! The list is fetched once per [`refresh`](AlertCollection::refresh); all
//! filtering and counting happens in memory over that snapshot.

use chrono::{Local, NaiveDate};
use vigil_core::{alert::Alert, filter::AlertFilter, stats::AlertStats};

use crate::{AlertApi, Result};

#[derive(Debug, Default)]
pub struct AlertCollection {
  alerts: Vec<Alert>,
  error:  Option<String>,
}

impl AlertCollection {
  pub fn new() -> Self { Self::default() }

  pub fn alerts(&self) -> &[Alert] { &self.alerts }

  /// The message from the last failed refresh, if any.
  pub fn error(&self) -> Option<&str> { self.error.as_deref() }

  /// Replace the snapshot with the server's current list.
  ///
  /// On failure the list is left empty and the error message is kept for
  /// display. There is no automatic retry.
  pub async fn refresh<A: AlertApi>(&mut self, api: &A) -> Result<()> {
    self.error = None;
    match api.list_alerts().await {
      Ok(alerts) => {
        self.alerts = alerts;
        Ok(())
      }
      Err(e) => {
        tracing::warn!("failed to fetch alerts: {e}");
        self.alerts.clear();
        self.error = Some(e.to_string());
        Err(e)
      }
    }
  }

  pub fn get(&self, id: u64) -> Option<&Alert> { self.alerts.iter().find(|a| a.id == id) }

  pub fn filtered(&self, filter: &AlertFilter) -> Vec<&Alert> { filter.apply(&self.alerts) }

  pub fn stats(&self, today: NaiveDate) -> AlertStats { AlertStats::compute(&self.alerts, today) }

  /// [`stats`](Self::stats) against the local calendar day.
  pub fn stats_now(&self) -> AlertStats { self.stats(Local::now().date_naive()) }

  /// Delete on the server, then drop the alert from the snapshot.
  ///
  /// If the server call fails the snapshot is untouched and the error is
  /// returned for display.
  pub async fn delete<A: AlertApi>(&mut self, api: &A, id: u64) -> Result<()> {
    api.delete_alert(id).await?;
    if let Some(pos) = self.alerts.iter().position(|a| a.id == id) {
      self.alerts.remove(pos);
    }
    Ok(())
  }
}
