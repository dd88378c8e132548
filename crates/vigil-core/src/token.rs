//! Local inspection of the bearer token issued by `POST /login`.
//!
//! The token is a JWT. Its header and claims are decoded; the signature is the
//! server's business and is never checked here.

use chrono::{DateTime, Utc};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::Deserialize;

use crate::{Error, Result};

/// The claims the client cares about. Unknown claims are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TokenClaims {
  /// Expiry, seconds since the Unix epoch.
  pub exp: Option<i64>,
  /// Issued-at, seconds since the Unix epoch.
  pub iat: Option<i64>,
  pub sub: Option<serde_json::Value>,
}

impl TokenClaims {
  pub fn expires_at(&self) -> Option<DateTime<Utc>> {
    self.exp.and_then(|exp| DateTime::from_timestamp(exp, 0))
  }
}

/// Header and payload are parsed; signature, expiry and audience are not
/// checked. Expiry is judged by [`is_token_live`] against a caller clock.
fn inspection_only() -> Validation {
  let mut validation = Validation::default();
  validation.insecure_disable_signature_validation();
  validation.validate_exp = false;
  validation.validate_nbf = false;
  validation.validate_aud = false;
  validation.required_spec_claims.clear();
  validation
}

/// Decode the claims of `token` without verifying it.
pub fn decode_claims(token: &str) -> Result<TokenClaims> {
  let data = decode::<TokenClaims>(
    token.trim(),
    &DecodingKey::from_secret(&[]),
    &inspection_only(),
  )
  .map_err(|e| Error::MalformedToken(e.to_string()))?;
  Ok(data.claims)
}

/// Whether `token` is well-formed and its `exp` lies strictly after `now`.
pub fn is_token_live(token: &str, now: DateTime<Utc>) -> bool {
  match decode_claims(token) {
    Ok(claims) => claims.exp.is_some_and(|exp| exp > now.timestamp()),
    Err(_) => false,
  }
}
