//! CSV export of an alert list.
//!
//! One header row followed by exactly one row per alert, joined with `\n`.

use chrono::NaiveDate;

use crate::alert::Alert;

const HEADER: [&str; 18] = [
  "Alert ID",
  "Date",
  "Time",
  "Status",
  "Verified",
  "Person Reporting",
  "Contact Number",
  "Source",
  "Case Name",
  "Age",
  "Sex",
  "District",
  "Subcounty",
  "Parish",
  "Village",
  "Symptoms",
  "History",
  "Verified By",
];

/// Display form of an alert id, e.g. `ALT007`.
pub fn alert_code(id: u64) -> String { format!("ALT{id:03}") }

/// Default download name for an export made on `today`.
pub fn export_file_name(today: NaiveDate) -> String {
  format!("alerts_export_{}.csv", today.format("%Y-%m-%d"))
}

/// Render `alerts` as CSV.
pub fn to_csv(alerts: &[&Alert]) -> String {
  let mut lines = Vec::with_capacity(alerts.len() + 1);
  lines.push(HEADER.join(","));

  for alert in alerts {
    let age = alert.alert_case_age.map(|a| a.to_string()).unwrap_or_default();
    let fields = [
      alert_code(alert.id),
      alert.calendar_day().to_string(),
      alert.time.clone(),
      alert.status.to_string(),
      if alert.is_verified { "Yes" } else { "No" }.to_string(),
      alert.person_reporting.clone(),
      alert.contact_number.clone(),
      alert.source_of_alert.clone(),
      alert.alert_case_name.clone(),
      age,
      alert.alert_case_sex.clone(),
      alert.district.clone(),
      alert.subcounty.clone(),
      alert.parish.clone(),
      alert.village.clone(),
      alert.symptom_list().join("; "),
      alert.history.clone(),
      alert.verified_by.clone().unwrap_or_default(),
    ];
    lines.push(
      fields
        .iter()
        .map(|f| escape(f))
        .collect::<Vec<_>>()
        .join(","),
    );
  }

  lines.join("\n")
}

/// Quote a field if it would otherwise break the row structure.
fn escape(field: &str) -> String {
  if field.contains([',', '"', '\n', '\r']) {
    format!("\"{}\"", field.replace('"', "\"\""))
  } else {
    field.to_string()
  }
}
