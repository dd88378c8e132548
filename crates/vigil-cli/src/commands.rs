//! Command execution.

use std::{
  fs,
  io::{self, BufRead, Write},
  path::Path,
  sync::Arc,
};

use anyhow::{Context, Result, bail};
use chrono::Local;
use serde::de::DeserializeOwned;
use vigil_client::{
  AlertCollection, ApiClient, Credentials, FileCredentialStore, VerificationWorkflow,
};
use vigil_core::{
  alert::{AlertUpdate, NewAlert},
  export::{alert_code, export_file_name, to_csv},
  filter::AlertFilter,
  token::decode_claims,
  user::{NewUser, UserUpdate},
  verification::{VerificationForm, VerificationState},
};

use crate::{AlertCommand, Command, FilterArgs, UserCommand, render, settings::Settings};

pub async fn run(settings: &Settings, command: Command) -> Result<()> {
  let store = Arc::new(FileCredentialStore::new(settings.session_path()));
  let api = ApiClient::new(settings.api_config(), store)?
    .on_session_expired(|| eprintln!("Run `vigil login` to sign in again."));

  match command {
    Command::Login { username, password } => login(&api, username, password).await,
    Command::Logout => {
      api.logout().await?;
      println!("Logged out.");
      Ok(())
    }
    Command::Status => status(&api),
    Command::Alerts(cmd) => alerts(&api, cmd).await,
    Command::Users(cmd) => users(&api, cmd).await,
  }
}

// ─── Session ──────────────────────────────────────────────────────────────────

async fn login(api: &ApiClient, username: Option<String>, password: Option<String>) -> Result<()> {
  let username = match username {
    Some(u) => u,
    None => prompt("Username: ")?,
  };
  let password = match password {
    Some(p) => p,
    None => prompt("Password: ")?,
  };
  if username.trim().is_empty() || password.is_empty() {
    bail!("Username and password are required");
  }

  let session = api.login(&Credentials { username, password }).await?;
  match &session.user {
    Some(user) => println!("Logged in as {} {}", user.display_name(), user.level.badge()),
    None => println!("Logged in."),
  }
  Ok(())
}

fn status(api: &ApiClient) -> Result<()> {
  let Some(token) = api.token()? else {
    println!("Not logged in.");
    return Ok(());
  };

  if let Some(user) = api.current_user()? {
    println!(
      "{} ({}) {}, {}",
      user.display_name(),
      user.username,
      user.level.badge(),
      user.affiliation
    );
  }
  match decode_claims(&token).ok().and_then(|c| c.expires_at()) {
    Some(exp) if api.is_authenticated() => println!("Session valid until {exp}"),
    Some(exp) => println!("Session expired at {exp}"),
    None => println!("Stored token is unreadable; please log in again."),
  }
  Ok(())
}

/// Read a line from stdin after printing `label`.
fn prompt(label: &str) -> Result<String> {
  print!("{label}");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line.trim_end_matches(['\n', '\r']).to_string())
}

fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
  let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
  serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

// ─── Alerts ───────────────────────────────────────────────────────────────────

fn filter_from(args: &FilterArgs) -> AlertFilter {
  AlertFilter::from_raw(&args.status, &args.district, &args.source, &args.date)
}

async fn load(api: &ApiClient) -> Result<AlertCollection> {
  let mut collection = AlertCollection::new();
  collection.refresh(api).await?;
  Ok(collection)
}

async fn alerts(api: &ApiClient, cmd: AlertCommand) -> Result<()> {
  match cmd {
    AlertCommand::List { filter, json } => {
      let collection = load(api).await?;
      let found = collection.filtered(&filter_from(&filter));
      if json {
        println!("{}", serde_json::to_string_pretty(&found)?);
      } else {
        println!("{}", render::alert_table(&found));
      }
    }

    AlertCommand::Show { id } => {
      let alert = api.get_alert(id).await?;
      println!("{}", render::alert_detail(&alert));
    }

    AlertCommand::Stats { json } => {
      let stats = load(api).await?.stats_now();
      if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
      } else {
        println!("{}", render::stats(&stats));
      }
    }

    AlertCommand::Export { filter, out } => {
      let collection = load(api).await?;
      let found = collection.filtered(&filter_from(&filter));
      let path = out.unwrap_or_else(|| export_file_name(Local::now().date_naive()).into());
      fs::write(&path, to_csv(&found)).with_context(|| format!("writing {}", path.display()))?;
      println!("Exported {} alert(s) to {}", found.len(), path.display());
    }

    AlertCommand::Report { file } => {
      let alert: NewAlert = read_json_file(&file)?;
      let submitted = api.create_alert(&alert).await?;
      match submitted.id {
        Some(id) => println!("Alert submitted as {}", alert_code(id)),
        None => println!("Alert submitted."),
      }
    }

    AlertCommand::Update { id, file } => {
      let update: AlertUpdate = read_json_file(&file)?;
      api.update_alert(id, &update).await?;
      println!("Updated {}", alert_code(id));
    }

    AlertCommand::Delete { id } => {
      let mut collection = load(api).await?;
      if collection.get(id).is_none() {
        bail!("{} is not in the current alert list", alert_code(id));
      }
      collection.delete(api, id).await?;
      println!("Deleted {}", alert_code(id));
    }

    AlertCommand::Verify { id, file } => {
      let form: VerificationForm = read_json_file(&file)?;
      let mut flow = VerificationWorkflow::new(api, id);
      if let VerificationState::Failed(message) = flow.open().await {
        bail!("{message}");
      }
      flow.submit(&form).await?;
      println!("Verified {}", alert_code(id));
    }
  }
  Ok(())
}

// ─── Users ────────────────────────────────────────────────────────────────────

async fn users(api: &ApiClient, cmd: UserCommand) -> Result<()> {
  match cmd {
    UserCommand::List => {
      let users = api.list_users().await?;
      println!("{}", render::user_table(&users));
    }
    UserCommand::Create { file } => {
      let user: NewUser = read_json_file(&file)?;
      api.create_user(&user).await?;
      println!("Created user {}", user.username);
    }
    UserCommand::Update { id, file } => {
      let update: UserUpdate = read_json_file(&file)?;
      api.update_user(id, &update).await?;
      println!("Updated user {id}");
    }
    UserCommand::Delete { id } => {
      api.delete_user(id).await?;
      println!("Deleted user {id}");
    }
  }
  Ok(())
}
