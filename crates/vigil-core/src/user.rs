//! User accounts as exposed by the `/users` endpoints.
//!
//! The access level is used for display only; authorisation is enforced by
//! the server.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{Error, Result};

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
pub enum AccessLevel {
  Admin,
  District,
  #[serde(rename = "REOC")]
  #[strum(serialize = "REOC")]
  Reoc,
  #[default]
  Viewer,
}

impl AccessLevel {
  /// Short label used when listing users.
  pub fn badge(&self) -> &'static str {
    match self {
      Self::Admin => "[ADMIN]",
      Self::District => "[DISTRICT]",
      Self::Reoc => "[REOC]",
      Self::Viewer => "[VIEWER]",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub id:          u64,
  #[serde(default)]
  pub first_name:  String,
  #[serde(default)]
  pub last_name:   String,
  #[serde(default)]
  pub email:       String,
  #[serde(default)]
  pub username:    String,
  #[serde(default)]
  pub affiliation: String,
  #[serde(default)]
  pub user_type:   String,
  #[serde(default)]
  pub level:       AccessLevel,
}

impl User {
  pub fn display_name(&self) -> String {
    let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
    let full = full.trim();
    if full.is_empty() {
      self.username.clone()
    } else {
      full.to_string()
    }
  }
}

/// Body of `POST /users/create`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
  pub first_name:  String,
  pub last_name:   String,
  pub email:       String,
  pub username:    String,
  pub password:    String,
  #[serde(default)]
  pub affiliation: String,
  #[serde(default)]
  pub user_type:   String,
  #[serde(default)]
  pub level:       AccessLevel,
}

impl NewUser {
  pub fn validate(&self) -> Result<()> {
    if self.username.trim().is_empty() || self.email.trim().is_empty() {
      return Err(Error::Validation("Username and email are required".into()));
    }
    if !self.email.contains('@') {
      return Err(Error::Validation("Please enter a valid email address".into()));
    }
    if self.password.len() < 6 {
      return Err(Error::Validation(
        "Password must be at least 6 characters".into(),
      ));
    }
    Ok(())
  }
}

/// Partial update for `PUT /users/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub first_name:  Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub last_name:   Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub email:       Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub affiliation: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub user_type:   Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub level:       Option<AccessLevel>,
}
