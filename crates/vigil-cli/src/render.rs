//! Plain-text rendering for terminal output.

use std::fmt::Write as _;

use vigil_core::{alert::Alert, export::alert_code, stats::AlertStats, user::User};

fn clip(s: &str, width: usize) -> String {
  if s.chars().count() <= width {
    s.to_string()
  } else {
    let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
  }
}

pub fn alert_table(alerts: &[&Alert]) -> String {
  let mut out = format!(
    "{:<8} {:<10} {:<8} {:<4} {:<14} {:<22} {:<18}\n",
    "ID", "DATE", "STATUS", "VER", "DISTRICT", "CASE", "REPORTER"
  );
  for alert in alerts {
    let _ = writeln!(
      out,
      "{:<8} {:<10} {:<8} {:<4} {:<14} {:<22} {:<18}",
      alert_code(alert.id),
      alert.calendar_day(),
      alert.status.to_string(),
      if alert.is_verified { "yes" } else { "no" },
      clip(&alert.district, 14),
      clip(&alert.alert_case_name, 22),
      clip(&alert.person_reporting, 18),
    );
  }
  let _ = write!(out, "{} alert(s)", alerts.len());
  out
}

pub fn alert_detail(alert: &Alert) -> String {
  let mut out = String::new();
  let location = [&alert.village, &alert.parish, &alert.subcounty, &alert.district]
    .into_iter()
    .filter(|s| !s.trim().is_empty())
    .map(String::as_str)
    .collect::<Vec<_>>()
    .join(", ");
  let age = alert.alert_case_age.map(|a| a.to_string()).unwrap_or_else(|| "?".into());

  let _ = writeln!(out, "{}  {} {}", alert_code(alert.id), alert.calendar_day(), alert.time);
  let _ = writeln!(out, "  status:    {}", alert.status);
  let _ = writeln!(out, "  verified:  {}", if alert.is_verified { "yes" } else { "no" });
  let _ = writeln!(out, "  case:      {} ({age}, {})", alert.alert_case_name, alert.alert_case_sex);
  let _ = writeln!(out, "  location:  {location}");
  let _ = writeln!(out, "  reporter:  {} <{}>", alert.person_reporting, alert.contact_number);
  let _ = writeln!(out, "  source:    {}", alert.source_of_alert);
  let _ = writeln!(out, "  symptoms:  {}", alert.symptom_list().join(", "));
  let _ = write!(out, "  history:   {}", alert.history);
  out
}

pub fn stats(stats: &AlertStats) -> String {
  let mut out = String::new();
  let _ = writeln!(out, "Total alerts     {}", stats.total);
  let _ = writeln!(out, "  alive          {}", stats.alive);
  let _ = writeln!(out, "  dead           {}", stats.dead);
  let _ = writeln!(out, "  unknown        {}", stats.unknown);
  let _ = writeln!(out, "Verified         {}", stats.verified);
  let _ = writeln!(out, "Unverified       {}", stats.unverified);
  let _ = writeln!(
    out,
    "Today            {} ({} verified, {} pending)",
    stats.today_total, stats.today_verified, stats.today_unverified
  );
  if !stats.by_district.is_empty() {
    let _ = writeln!(out, "By district");
    for (district, count) in &stats.by_district {
      let _ = writeln!(out, "  {district:<16} {count}");
    }
  }
  out.trim_end().to_string()
}

pub fn user_table(users: &[User]) -> String {
  let mut out = format!(
    "{:<6} {:<24} {:<16} {:<12} {:<20}\n",
    "ID", "NAME", "USERNAME", "LEVEL", "AFFILIATION"
  );
  for user in users {
    let _ = writeln!(
      out,
      "{:<6} {:<24} {:<16} {:<12} {:<20}",
      user.id,
      clip(&user.display_name(), 24),
      clip(&user.username, 16),
      user.level.badge(),
      clip(&user.affiliation, 20),
    );
  }
  let _ = write!(out, "{} user(s)", users.len());
  out
}
