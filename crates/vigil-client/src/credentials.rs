//! Durable storage for the login session.
//!
//! The CLI keeps the session in a JSON file between invocations; tests use
//! the in-memory store.

use std::{
  fs,
  io::{ErrorKind, Write},
  path::{Path, PathBuf},
  sync::Mutex,
};

use serde::{Deserialize, Serialize};
use vigil_core::user::User;

use crate::Result;

/// What `POST /login` leaves behind.
#[derive(Clone, Serialize, Deserialize)]
pub struct Session {
  pub token: String,
  #[serde(default)]
  pub user:  Option<User>,
}

impl std::fmt::Debug for Session {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Session")
      .field("token", &"<redacted>")
      .field("user", &self.user)
      .finish()
  }
}

/// Where the client keeps its session between requests.
pub trait CredentialStore: Send + Sync {
  fn load(&self) -> Result<Option<Session>>;

  fn save(&self, session: &Session) -> Result<()>;

  /// Remove any stored session. Clearing an empty store succeeds.
  fn clear(&self) -> Result<()>;
}

// ─── File ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct FileCredentialStore {
  path: PathBuf,
}

impl FileCredentialStore {
  pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

  pub fn path(&self) -> &Path { &self.path }
}

impl CredentialStore for FileCredentialStore {
  fn load(&self) -> Result<Option<Session>> {
    let raw = match fs::read_to_string(&self.path) {
      Ok(raw) => raw,
      Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
      Err(e) => return Err(e.into()),
    };
    match serde_json::from_str(&raw) {
      Ok(session) => Ok(Some(session)),
      Err(e) => {
        tracing::warn!(path = %self.path.display(), "ignoring unreadable session file: {e}");
        Ok(None)
      }
    }
  }

  fn save(&self, session: &Session) -> Result<()> {
    if let Some(parent) = self.path.parent()
      && !parent.as_os_str().is_empty()
    {
      fs::create_dir_all(parent)?;
    }
    let raw = serde_json::to_string_pretty(session)
      .map_err(|e| crate::ClientError::Decode(e.to_string()))?;
    let mut file = owner_only(fs::OpenOptions::new().write(true).create(true).truncate(true))
      .open(&self.path)?;
    file.write_all(raw.as_bytes())?;
    restrict_to_owner(&self.path)?;
    Ok(())
  }

  fn clear(&self) -> Result<()> {
    match fs::remove_file(&self.path) {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
      Err(e) => Err(e.into()),
    }
  }
}

/// New session files are created `0600`; the token is a bearer credential.
#[cfg(unix)]
fn owner_only(options: &mut fs::OpenOptions) -> &mut fs::OpenOptions {
  use std::os::unix::fs::OpenOptionsExt;
  options.mode(0o600)
}

#[cfg(not(unix))]
fn owner_only(options: &mut fs::OpenOptions) -> &mut fs::OpenOptions { options }

/// `mode` only applies on creation, so tighten files left by older versions.
#[cfg(unix)]
fn restrict_to_owner(path: &Path) -> std::io::Result<()> {
  use std::os::unix::fs::PermissionsExt;
  let mode = fs::metadata(path)?.permissions().mode();
  if mode & 0o077 != 0 {
    fs::set_permissions(path, fs::Permissions::from_mode(mode & 0o700))?;
  }
  Ok(())
}

#[cfg(not(unix))]
fn restrict_to_owner(_path: &Path) -> std::io::Result<()> { Ok(()) }

// ─── Memory ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
  inner: Mutex<Option<Session>>,
}

impl MemoryCredentialStore {
  pub fn new() -> Self { Self::default() }

  pub fn with_session(session: Session) -> Self {
    Self { inner: Mutex::new(Some(session)) }
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, Option<Session>> {
    self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
  }
}

impl CredentialStore for MemoryCredentialStore {
  fn load(&self) -> Result<Option<Session>> { Ok(self.lock().clone()) }

  fn save(&self, session: &Session) -> Result<()> {
    *self.lock() = Some(session.clone());
    Ok(())
  }

  fn clear(&self) -> Result<()> {
    *self.lock() = None;
    Ok(())
  }
}
