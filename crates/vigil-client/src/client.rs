//! HTTP plumbing: base URL, bearer auth, session lifecycle and error mapping.

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use vigil_core::{token, user::User};

use crate::{ClientError, CredentialStore, Result, Session};

/// Used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8089/api/v1";

/// Connection settings for the alert API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub timeout:  Duration,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: DEFAULT_BASE_URL.to_string(),
      timeout:  Duration::from_secs(30),
    }
  }
}

/// Body of `POST /login`.
#[derive(Clone, Serialize)]
pub struct Credentials {
  pub username: String,
  pub password: String,
}

#[derive(Deserialize)]
struct LoginResponse {
  #[serde(default)]
  token: Option<String>,
  #[serde(default)]
  user:  Option<User>,
}

#[derive(Deserialize)]
struct ErrorBody {
  #[serde(default)]
  message: Option<String>,
  #[serde(default)]
  error:   Option<String>,
}

/// Collection endpoints have answered with a bare array and with several
/// wrapper objects over time.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum Listing<T> {
  Bare(Vec<T>),
  Data { data: Vec<T> },
  Alerts { alerts: Vec<T> },
  Users { users: Vec<T> },
}

impl<T> Listing<T> {
  pub(crate) fn into_vec(self) -> Vec<T> {
    match self {
      Self::Bare(items)
      | Self::Data { data: items }
      | Self::Alerts { alerts: items }
      | Self::Users { users: items } => items,
    }
  }
}

/// A single resource, bare or wrapped in `{"data": ...}`.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum Single<T> {
  Data { data: T },
  Bare(T),
}

impl<T> Single<T> {
  pub(crate) fn into_inner(self) -> T {
    match self {
      Self::Data { data } | Self::Bare(data) => data,
    }
  }
}

type SessionExpiredHook = Arc<dyn Fn() + Send + Sync>;

/// Async HTTP client for the alert REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] and credential store are
/// shared.
#[derive(Clone)]
pub struct ApiClient {
  http:               Client,
  config:             ApiConfig,
  credentials:        Arc<dyn CredentialStore>,
  on_session_expired: Option<SessionExpiredHook>,
}

impl ApiClient {
  pub fn new(config: ApiConfig, credentials: Arc<dyn CredentialStore>) -> Result<Self> {
    let http = Client::builder()
      .timeout(config.timeout)
      .build()
      .map_err(ClientError::Setup)?;
    Ok(Self {
      http,
      config,
      credentials,
      on_session_expired: None,
    })
  }

  /// Run `hook` whenever an authenticated request comes back 401, after the
  /// stored session has been cleared.
  pub fn on_session_expired(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
    self.on_session_expired = Some(Arc::new(hook));
    self
  }

  pub fn base_url(&self) -> &str { self.config.base_url.trim_end_matches('/') }

  pub(crate) fn url(&self, path: &str) -> String { format!("{}{}", self.base_url(), path) }

  // ── Session ───────────────────────────────────────────────────────────────

  pub fn token(&self) -> Result<Option<String>> {
    Ok(self.credentials.load()?.map(|s| s.token))
  }

  pub fn current_user(&self) -> Result<Option<User>> {
    Ok(self.credentials.load()?.and_then(|s| s.user))
  }

  /// Whether a stored token exists and has not expired. Never contacts the
  /// server.
  pub fn is_authenticated(&self) -> bool {
    match self.token() {
      Ok(Some(token)) => token::is_token_live(&token, Utc::now()),
      Ok(None) => false,
      Err(e) => {
        tracing::warn!("could not read stored session: {e}");
        false
      }
    }
  }

  /// `POST /login`. Persists the returned session on success.
  pub async fn login(&self, credentials: &Credentials) -> Result<Session> {
    let resp = self
      .http
      .post(self.url("/login"))
      .json(credentials)
      .send()
      .await
      .map_err(ClientError::Network)?;

    let status = resp.status();
    if !status.is_success() {
      let message = match status {
        StatusCode::UNAUTHORIZED => "Invalid username or password".to_string(),
        StatusCode::FORBIDDEN => "Access denied".to_string(),
        s if s.is_server_error() => "Server error. Please try again later.".to_string(),
        _ => server_message(resp).await,
      };
      tracing::debug!(status = status.as_u16(), "login rejected");
      return Err(ClientError::Http { status: status.as_u16(), message });
    }

    let body: LoginResponse = read_json(resp).await?;
    let token = body
      .token
      .filter(|t| !t.trim().is_empty())
      .ok_or(ClientError::MissingToken)?;

    let session = Session { token, user: body.user };
    self.credentials.save(&session)?;
    tracing::info!(user = ?session.user.as_ref().map(|u| &u.username), "logged in");
    Ok(session)
  }

  /// Tell the server we are leaving, then clear local credentials.
  ///
  /// The server call is best-effort: its failure is logged and otherwise
  /// ignored. The only error returned is a failure to clear local storage.
  pub async fn logout(&self) -> Result<()> {
    match self.token() {
      Ok(Some(token)) => {
        let sent = self
          .http
          .post(self.url("/users/logout"))
          .bearer_auth(&token)
          .send()
          .await;
        match sent {
          Ok(resp) if resp.status().is_success() => tracing::debug!("server acknowledged logout"),
          Ok(resp) => tracing::warn!(status = resp.status().as_u16(), "logout rejected by server"),
          Err(e) => tracing::warn!("logout request failed: {e}"),
        }
      }
      Ok(None) => {}
      Err(e) => tracing::warn!("could not read stored session during logout: {e}"),
    }
    self.credentials.clear()
  }

  // ── Requests ──────────────────────────────────────────────────────────────

  pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
    self.http.request(method, self.url(path))
  }

  /// Like [`request`](Self::request), with `segment` appended as a single
  /// percent-encoded path segment.
  pub(crate) fn request_with_segment(
    &self,
    method: Method,
    path: &str,
    segment: &str,
  ) -> Result<RequestBuilder> {
    let invalid = || ClientError::Validation(format!("Invalid API base URL: {}", self.base_url()));
    let mut url = Url::parse(&self.url(path)).map_err(|_| invalid())?;
    url.path_segments_mut().map_err(|()| invalid())?.push(segment);
    Ok(self.http.request(method, url))
  }

  /// Attach the bearer token and send. A 401 clears the session and yields
  /// [`ClientError::SessionExpired`]; other failures map to
  /// [`ClientError::Http`] or [`ClientError::Network`].
  pub(crate) async fn send_authenticated(&self, req: RequestBuilder) -> Result<Response> {
    let token = self.token()?.ok_or(ClientError::NotAuthenticated)?;
    let resp = req
      .bearer_auth(token)
      .send()
      .await
      .map_err(ClientError::Network)?;

    if resp.status() == StatusCode::UNAUTHORIZED {
      self.expire_session();
      return Err(ClientError::SessionExpired);
    }
    ensure_success(resp).await
  }

  /// Send without credentials (public endpoints).
  pub(crate) async fn send_public(&self, req: RequestBuilder) -> Result<Response> {
    let resp = req.send().await.map_err(ClientError::Network)?;
    ensure_success(resp).await
  }

  fn expire_session(&self) {
    tracing::warn!("session expired; clearing stored credentials");
    if let Err(e) = self.credentials.clear() {
      tracing::error!("failed to clear stored credentials: {e}");
    }
    if let Some(hook) = &self.on_session_expired {
      hook();
    }
  }
}

async fn ensure_success(resp: Response) -> Result<Response> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }
  let message = server_message(resp).await;
  tracing::debug!(status = status.as_u16(), %message, "request failed");
  Err(ClientError::Http { status: status.as_u16(), message })
}

/// Best human-readable message from an error response.
async fn server_message(resp: Response) -> String {
  let status = resp.status();
  let body = resp.text().await.unwrap_or_default();
  message_from_body(status, &body)
}

fn message_from_body(status: StatusCode, body: &str) -> String {
  if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body)
    && let Some(message) = parsed.message.or(parsed.error)
    && !message.trim().is_empty()
  {
    return message;
  }

  let body = body.trim();
  if !body.is_empty() && !body.starts_with('<') && !body.starts_with('{') && body.len() <= 200 {
    return body.to_string();
  }

  match status.canonical_reason() {
    Some(reason) => format!("Request failed: {} {reason}", status.as_u16()),
    None => format!("Request failed with status {}", status.as_u16()),
  }
}

pub(crate) async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T> {
  let bytes = resp.bytes().await.map_err(ClientError::Network)?;
  serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
}
