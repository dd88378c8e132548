//! Behaviour tests for the client, the alert collection and the verification
//! workflow.
//!
//! HTTP behaviour runs against an in-process axum server bound to an
//! ephemeral port; collection and workflow semantics run against `FakeApi`.

use std::sync::{
  Arc, Mutex,
  atomic::{AtomicBool, AtomicUsize, Ordering},
};

use axum::{
  Json, Router,
  extract::{Path, State},
  http::{HeaderMap, StatusCode, header},
  response::{IntoResponse, Response},
  routing::{delete, get, post},
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::NaiveDate;
use serde_json::json;
use vigil_core::{
  alert::{Alert, ClinicalStatus, NewAlert},
  error::INCOMPLETE_VERIFICATION,
  filter::AlertFilter,
  verification::{
    DATABASE_CONFIGURATION_ERROR, VerificationForm, VerificationState, VerificationToken,
  },
};

use crate::{
  AlertApi, AlertCollection, ApiClient, ApiConfig, ClientError, CredentialStore, Credentials,
  MemoryCredentialStore, Result, Session, VerificationWorkflow,
};

// ─── Fixtures ────────────────────────────────────────────────────────────────

fn jwt(exp: i64) -> String {
  let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
  let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":1,"exp":{exp}}}"#));
  format!("{header}.{payload}.c2ln")
}

/// Expires in 2100.
fn live_token() -> String { jwt(4_102_444_800) }

fn alert(id: u64, status: &str) -> Alert {
  serde_json::from_value(json!({
    "id": id,
    "status": status,
    "date": "2024-05-01",
    "alertCaseDistrict": "Gulu",
  }))
  .unwrap()
}

fn complete_form() -> VerificationForm {
  VerificationForm {
    status: Some(ClinicalStatus::Alive),
    cif_no: "CIF-1".into(),
    person_reporting: "Jane".into(),
    contact_number: "0700000000".into(),
    source_of_alert: "Community".into(),
    alert_case_name: "Case A".into(),
    alert_case_age: "30".into(),
    alert_case_sex: "Male".into(),
    history: "Fever".into(),
    verified_by: "Dr. Opio".into(),
    ..VerificationForm::default()
  }
}

fn public_alert() -> NewAlert {
  NewAlert {
    date: "2024-05-01".into(),
    person_reporting: "Jane".into(),
    contact_number: "0700000000".into(),
    district: "Gulu".into(),
    alert_case_name: "Case A".into(),
    ..NewAlert::default()
  }
}

// ─── Fake server ─────────────────────────────────────────────────────────────

#[derive(Default)]
struct Server {
  logouts:         AtomicUsize,
  verifications:   AtomicUsize,
  deletes:         AtomicUsize,
  public_had_auth: AtomicBool,
  verified_token:  Mutex<Option<String>>,
}

fn authorized(headers: &HeaderMap) -> bool {
  headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .is_some_and(|v| v == format!("Bearer {}", live_token()))
}

fn unauthorized() -> Response {
  (StatusCode::UNAUTHORIZED, Json(json!({ "message": "jwt expired" }))).into_response()
}

async fn login(Json(body): Json<serde_json::Value>) -> Response {
  match body["username"].as_str().unwrap_or_default() {
    "ops" => Json(json!({
      "token": live_token(),
      "user": { "id": 1, "username": "ops", "level": "Admin" },
    }))
    .into_response(),
    "blocked" => StatusCode::FORBIDDEN.into_response(),
    "crash" => (StatusCode::INTERNAL_SERVER_ERROR, "stack trace").into_response(),
    "pending" => (
      StatusCode::IM_A_TEAPOT,
      Json(json!({ "message": "Account pending approval" })),
    )
      .into_response(),
    "tokenless" => Json(json!({ "message": "welcome" })).into_response(),
    _ => (StatusCode::UNAUTHORIZED, Json(json!({ "message": "bad creds" }))).into_response(),
  }
}

async fn logout(State(server): State<Arc<Server>>) -> StatusCode {
  server.logouts.fetch_add(1, Ordering::SeqCst);
  StatusCode::OK
}

async fn list_alerts(headers: HeaderMap) -> Response {
  if !authorized(&headers) {
    return unauthorized();
  }
  Json(json!({
    "data": [
      { "id": 1, "status": "Alive", "date": "2024-05-01", "isVerified": false },
      { "id": 2, "status": "Dead", "date": "2024-05-02T10:00:00Z", "isVerified": true },
    ]
  }))
  .into_response()
}

async fn create_alert(State(server): State<Arc<Server>>, headers: HeaderMap) -> Response {
  server
    .public_had_auth
    .store(headers.contains_key(header::AUTHORIZATION), Ordering::SeqCst);
  (StatusCode::CREATED, Json(json!({ "alertId": 10, "message": "created" }))).into_response()
}

async fn delete_alert(
  State(server): State<Arc<Server>>,
  headers: HeaderMap,
  Path(id): Path<u64>,
) -> Response {
  if !authorized(&headers) {
    return unauthorized();
  }
  server.deletes.fetch_add(1, Ordering::SeqCst);
  if id == 999 {
    return (StatusCode::NOT_FOUND, Json(json!({ "message": "Alert not found" }))).into_response();
  }
  StatusCode::OK.into_response()
}

async fn generate_token(headers: HeaderMap, Path(id): Path<u64>) -> Response {
  if !authorized(&headers) {
    return unauthorized();
  }
  if id == 13 {
    return (
      StatusCode::INTERNAL_SERVER_ERROR,
      Json(json!({ "message": "ER_BAD_FIELD_ERROR: Unknown column 'created_at' in 'field list'" })),
    )
      .into_response();
  }
  Json(json!({ "token": format!("tok-{id}") })).into_response()
}

async fn verify(
  State(server): State<Arc<Server>>,
  headers: HeaderMap,
  Path(token): Path<String>,
  Json(body): Json<serde_json::Value>,
) -> Response {
  if !authorized(&headers) {
    return unauthorized();
  }
  if !token.starts_with("tok-") || body["cifNo"].as_str().unwrap_or_default().is_empty() {
    return (StatusCode::BAD_REQUEST, Json(json!({ "error": "Invalid token" }))).into_response();
  }
  server.verifications.fetch_add(1, Ordering::SeqCst);
  *server.verified_token.lock().unwrap() = Some(token);
  Json(json!({ "message": "verified" })).into_response()
}

async fn spawn(server: Arc<Server>) -> String {
  let app = Router::new()
    .route("/api/v1/login", post(login))
    .route("/api/v1/users/logout", post(logout))
    .route("/api/v1/alerts", get(list_alerts))
    .route("/api/v1/alerts/create", post(create_alert))
    .route("/api/v1/alerts/{id}", delete(delete_alert))
    .route("/api/v1/alerts/{id}/generate-token", post(generate_token))
    .route("/api/v1/alerts/verify/{token}", post(verify))
    .with_state(server);

  let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  tokio::spawn(async move {
    axum::serve(listener, app).await.unwrap();
  });
  format!("http://{addr}/api/v1")
}

/// A base URL nothing is listening on.
async fn dead_url() -> String {
  let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  drop(listener);
  format!("http://{addr}/api/v1")
}

fn client(base_url: String, store: Arc<MemoryCredentialStore>) -> ApiClient {
  ApiClient::new(ApiConfig { base_url, ..ApiConfig::default() }, store).unwrap()
}

fn logged_in_store(token: String) -> Arc<MemoryCredentialStore> {
  Arc::new(MemoryCredentialStore::with_session(Session { token, user: None }))
}

fn creds(username: &str) -> Credentials {
  Credentials { username: username.into(), password: "secret".into() }
}

// ─── Login / logout ──────────────────────────────────────────────────────────

#[tokio::test]
async fn login_persists_session() {
  let base = spawn(Arc::default()).await;
  let store = Arc::new(MemoryCredentialStore::new());
  let api = client(base, store.clone());

  assert!(!api.is_authenticated());
  let session = api.login(&creds("ops")).await.unwrap();

  assert_eq!(session.token, live_token());
  assert_eq!(store.load().unwrap().unwrap().token, live_token());
  assert_eq!(api.current_user().unwrap().unwrap().username, "ops");
  assert!(api.is_authenticated());
}

#[tokio::test]
async fn login_maps_status_codes_to_messages() {
  let base = spawn(Arc::default()).await;
  let api = client(base, Arc::new(MemoryCredentialStore::new()));

  let cases = [
    ("intruder", 401, "Invalid username or password"),
    ("blocked", 403, "Access denied"),
    ("crash", 500, "Server error. Please try again later."),
    ("pending", 418, "Account pending approval"),
  ];
  for (user, status, message) in cases {
    let err = api.login(&creds(user)).await.unwrap_err();
    assert_eq!(err.status(), Some(status), "{user}");
    assert_eq!(err.to_string(), message, "{user}");
  }
  assert!(api.token().unwrap().is_none());
}

#[tokio::test]
async fn login_without_token_stores_nothing() {
  let base = spawn(Arc::default()).await;
  let store = Arc::new(MemoryCredentialStore::new());
  let api = client(base, store.clone());

  let err = api.login(&creds("tokenless")).await.unwrap_err();
  assert!(matches!(err, ClientError::MissingToken));
  assert_eq!(err.to_string(), "No authentication token received");
  assert!(store.load().unwrap().is_none());
}

#[tokio::test]
async fn logout_notifies_server_and_clears() {
  let server = Arc::new(Server::default());
  let base = spawn(server.clone()).await;
  let api = client(base, logged_in_store(live_token()));

  api.logout().await.unwrap();
  assert_eq!(server.logouts.load(Ordering::SeqCst), 1);
  assert!(api.token().unwrap().is_none());
}

#[tokio::test]
async fn logout_clears_even_when_server_is_unreachable() {
  let api = client(dead_url().await, logged_in_store(live_token()));
  api.logout().await.unwrap();
  assert!(api.token().unwrap().is_none());
  assert!(!api.is_authenticated());
}

#[tokio::test]
async fn expired_token_is_not_authenticated() {
  let api = client(dead_url().await, logged_in_store(jwt(1)));
  assert!(!api.is_authenticated());

  let api = client(dead_url().await, logged_in_store("not-a-jwt".into()));
  assert!(!api.is_authenticated());
}

// ─── Authenticated requests ──────────────────────────────────────────────────

#[tokio::test]
async fn list_alerts_sends_bearer_and_unwraps_envelope() {
  let base = spawn(Arc::default()).await;
  let api = client(base, logged_in_store(live_token()));

  let alerts = api.list_alerts().await.unwrap();
  assert_eq!(alerts.len(), 2);
  assert_eq!(alerts[1].status, ClinicalStatus::Dead);
  assert!(alerts[1].is_verified);
}

#[tokio::test]
async fn unauthorized_response_expires_session() {
  let base = spawn(Arc::default()).await;
  let store = logged_in_store(jwt(4_102_444_800 - 1));
  let fired = Arc::new(AtomicBool::new(false));
  let hook_flag = fired.clone();
  let api = client(base, store.clone())
    .on_session_expired(move || hook_flag.store(true, Ordering::SeqCst));

  let err = api.list_alerts().await.unwrap_err();
  assert!(matches!(err, ClientError::SessionExpired));
  assert_eq!(err.to_string(), "Session expired. Please log in again.");
  assert!(store.load().unwrap().is_none());
  assert!(fired.load(Ordering::SeqCst));
}

#[tokio::test]
async fn no_session_means_no_request() {
  let api = client(dead_url().await, Arc::new(MemoryCredentialStore::new()));
  assert!(matches!(api.list_alerts().await, Err(ClientError::NotAuthenticated)));
}

#[tokio::test]
async fn connection_failure_is_a_network_error() {
  let api = client(dead_url().await, logged_in_store(live_token()));
  let err = api.list_alerts().await.unwrap_err();
  assert!(matches!(err, ClientError::Network(_)));
  assert_eq!(
    err.to_string(),
    "Unable to reach the server. Please check your connection."
  );
}

#[tokio::test]
async fn public_submission_carries_no_credentials() {
  let server = Arc::new(Server::default());
  let base = spawn(server.clone()).await;
  let api = client(base, logged_in_store(live_token()));

  let submitted: crate::Submitted = api.create_alert(&public_alert()).await.unwrap();
  assert_eq!(submitted.id, Some(10));
  assert!(!server.public_had_auth.load(Ordering::SeqCst));
}

#[tokio::test]
async fn invalid_public_submission_is_rejected_locally() {
  let api = client(dead_url().await, Arc::new(MemoryCredentialStore::new()));
  let err = api.create_alert(&NewAlert::default()).await.unwrap_err();
  assert!(matches!(err, ClientError::Validation(_)));
}

// ─── Verification over HTTP ──────────────────────────────────────────────────

#[tokio::test]
async fn verification_round_trip() {
  let server = Arc::new(Server::default());
  let base = spawn(server.clone()).await;
  let api = client(base, logged_in_store(live_token()));

  let mut flow = VerificationWorkflow::new(&api, 5);
  let state = flow.open().await.clone();
  assert_eq!(
    state,
    VerificationState::TokenReady(VerificationToken { token: "tok-5".into(), alert_id: 5 })
  );

  flow.submit(&complete_form()).await.unwrap();
  assert_eq!(flow.state(), &VerificationState::Verified);
  assert_eq!(server.verifications.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn verification_token_is_sent_as_one_path_segment() {
  let server = Arc::new(Server::default());
  let base = spawn(server.clone()).await;
  let api = client(base, logged_in_store(live_token()));

  let token = VerificationToken { token: "tok-a/b?c#d".into(), alert_id: 5 };
  api.verify_alert(&token, &complete_form()).await.unwrap();
  assert_eq!(server.verified_token.lock().unwrap().as_deref(), Some("tok-a/b?c#d"));
}

#[tokio::test]
async fn created_at_defect_is_classified() {
  let base = spawn(Arc::default()).await;
  let api = client(base, logged_in_store(live_token()));

  let mut flow = VerificationWorkflow::new(&api, 13);
  assert_eq!(
    flow.open().await,
    &VerificationState::Failed(DATABASE_CONFIGURATION_ERROR.to_string())
  );
}

#[tokio::test]
async fn incomplete_verification_never_reaches_server() {
  let server = Arc::new(Server::default());
  let base = spawn(server.clone()).await;
  let api = client(base, logged_in_store(live_token()));

  let token = VerificationToken { token: "tok-5".into(), alert_id: 5 };
  let err = api
    .verify_alert(&token, &VerificationForm::default())
    .await
    .unwrap_err();
  assert_eq!(err.to_string(), INCOMPLETE_VERIFICATION);
  assert_eq!(server.verifications.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failed_delete_over_http_leaves_collection_unchanged() {
  let server = Arc::new(Server::default());
  let base = spawn(server.clone()).await;
  let api = client(base, logged_in_store(live_token()));

  let mut collection = AlertCollection::new();
  collection.refresh(&api).await.unwrap();
  let before = collection.alerts().to_vec();

  let err = collection.delete(&api, 999).await.unwrap_err();
  assert_eq!(err.to_string(), "Alert not found");
  assert_eq!(collection.alerts(), before.as_slice());

  collection.delete(&api, 1).await.unwrap();
  assert_eq!(collection.alerts().len(), 1);
  assert_eq!(server.deletes.load(Ordering::SeqCst), 2);
}

// ─── Fake API ────────────────────────────────────────────────────────────────

#[derive(Default)]
struct FakeApi {
  alerts:        Vec<Alert>,
  fail_list:     bool,
  fail_delete:   bool,
  token_error:   Option<String>,
  fail_verify:   bool,
  deletes:       AtomicUsize,
  tokens_issued: AtomicUsize,
  submissions:   Mutex<Vec<String>>,
}

fn server_error(message: &str) -> ClientError {
  ClientError::Http { status: 500, message: message.into() }
}

impl AlertApi for FakeApi {
  async fn list_alerts(&self) -> Result<Vec<Alert>> {
    if self.fail_list {
      return Err(server_error("Failed to fetch alerts"));
    }
    Ok(self.alerts.clone())
  }

  async fn delete_alert(&self, _id: u64) -> Result<()> {
    self.deletes.fetch_add(1, Ordering::SeqCst);
    if self.fail_delete {
      return Err(server_error("Delete failed"));
    }
    Ok(())
  }

  async fn generate_verification_token(&self, alert_id: u64) -> Result<VerificationToken> {
    if let Some(message) = &self.token_error {
      return Err(server_error(message));
    }
    let n = self.tokens_issued.fetch_add(1, Ordering::SeqCst) + 1;
    Ok(VerificationToken { token: format!("fake-{n}"), alert_id })
  }

  async fn verify_alert<'a>(
    &'a self,
    token: &'a VerificationToken,
    _form: &'a VerificationForm,
  ) -> Result<()> {
    self
      .submissions
      .lock()
      .unwrap()
      .push(token.token.clone());
    if self.fail_verify {
      return Err(server_error("Token already used"));
    }
    Ok(())
  }
}

// ─── Collection ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn refresh_then_count() {
  let api = FakeApi {
    alerts: vec![alert(1, "Alive"), alert(2, "Dead")],
    ..FakeApi::default()
  };
  let mut collection = AlertCollection::new();
  collection.refresh(&api).await.unwrap();

  let stats = collection.stats(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
  assert_eq!((stats.alive, stats.dead, stats.unknown, stats.total), (1, 1, 0, 2));
  assert_eq!(stats.today_total, 2);
  assert!(collection.error().is_none());
}

#[tokio::test]
async fn failed_refresh_empties_list_and_keeps_message() {
  let good = FakeApi { alerts: vec![alert(1, "Alive")], ..FakeApi::default() };
  let bad = FakeApi { fail_list: true, ..FakeApi::default() };

  let mut collection = AlertCollection::new();
  collection.refresh(&good).await.unwrap();
  assert_eq!(collection.alerts().len(), 1);

  assert!(collection.refresh(&bad).await.is_err());
  assert!(collection.alerts().is_empty());
  assert_eq!(collection.error(), Some("Failed to fetch alerts"));
}

#[tokio::test]
async fn delete_removes_exactly_one_after_success() {
  let api = FakeApi {
    alerts: vec![alert(1, "Alive"), alert(2, "Dead"), alert(3, "Unknown")],
    ..FakeApi::default()
  };
  let mut collection = AlertCollection::new();
  collection.refresh(&api).await.unwrap();

  collection.delete(&api, 2).await.unwrap();
  let ids: Vec<u64> = collection.alerts().iter().map(|a| a.id).collect();
  assert_eq!(ids, [1, 3]);
}

#[tokio::test]
async fn failed_delete_leaves_list_untouched() {
  let api = FakeApi {
    alerts: vec![alert(1, "Alive"), alert(2, "Dead")],
    fail_delete: true,
    ..FakeApi::default()
  };
  let mut collection = AlertCollection::new();
  collection.refresh(&api).await.unwrap();
  let before = collection.alerts().to_vec();

  let err = collection.delete(&api, 1).await.unwrap_err();
  assert_eq!(err.to_string(), "Delete failed");
  assert_eq!(collection.alerts(), before.as_slice());
  assert_eq!(api.deletes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn filtered_view_reads_the_snapshot() {
  let api = FakeApi {
    alerts: vec![alert(1, "Alive"), alert(2, "Dead"), alert(3, "Alive")],
    ..FakeApi::default()
  };
  let mut collection = AlertCollection::new();
  collection.refresh(&api).await.unwrap();

  let alive = collection.filtered(&AlertFilter::from_raw("Alive", "all", "", ""));
  assert_eq!(alive.iter().map(|a| a.id).collect::<Vec<_>>(), [1, 3]);
  assert_eq!(collection.filtered(&AlertFilter::default()).len(), 3);
  assert_eq!(collection.get(2).map(|a| a.status), Some(ClinicalStatus::Dead));
}

// ─── Workflow ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn incomplete_form_never_submits() {
  let api = FakeApi::default();
  let mut flow = VerificationWorkflow::new(&api, 4);
  assert!(flow.open().await.form_visible());

  let err = flow.submit(&VerificationForm::default()).await.unwrap_err();
  assert_eq!(err.to_string(), "Please fill in all required fields");
  assert!(api.submissions.lock().unwrap().is_empty());
  // Still ready for a corrected submission.
  assert!(flow.state().form_visible());
}

#[tokio::test]
async fn submit_before_token_is_rejected() {
  let api = FakeApi::default();
  let mut flow = VerificationWorkflow::new(&api, 4);
  assert!(flow.submit(&complete_form()).await.is_err());
  assert_eq!(flow.state(), &VerificationState::Idle);
  assert!(api.submissions.lock().unwrap().is_empty());
}

#[tokio::test]
async fn raw_token_errors_pass_through() {
  let api = FakeApi { token_error: Some("Alert not found".into()), ..FakeApi::default() };
  let mut flow = VerificationWorkflow::new(&api, 4);
  assert_eq!(flow.open().await, &VerificationState::Failed("Alert not found".into()));
}

#[tokio::test]
async fn failed_submission_is_terminal_until_reopened() {
  let api = FakeApi { fail_verify: true, ..FakeApi::default() };
  let mut flow = VerificationWorkflow::new(&api, 4);
  flow.open().await;

  let err = flow.submit(&complete_form()).await.unwrap_err();
  assert_eq!(err.to_string(), "Token already used");
  assert_eq!(flow.state(), &VerificationState::Failed("Token already used".into()));
  let again = flow.submit(&complete_form()).await.unwrap_err();
  assert!(again.to_string().starts_with("This verification has finished"), "{again}");
  assert_eq!(api.submissions.lock().unwrap().len(), 1);

  // Reopening requests a fresh token.
  let state = flow.open().await.clone();
  assert_eq!(state.token().map(|t| t.token.as_str()), Some("fake-2"));
}
