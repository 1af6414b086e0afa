//! Integration test support for the lab site client.
//!
//! [`FakeSupabase`] is a small axum server on an ephemeral port that speaks
//! the slice of the Supabase HTTP API the client uses: `PostgREST` table
//! reads, inserts and deletes, Storage uploads, and the PKCE token and
//! logout endpoints. Every request is recorded so tests can assert on
//! methods, paths, query strings, headers and bodies.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p labsite-integration-tests
//! ```

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::Router;
use axum::body::{Body, Bytes};
use axum::extract::{Path, Query, Request, State};
use axum::http::{HeaderMap, Method, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use labsite_client::config::SupabaseConfig;
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::oneshot;
use url::Url;

/// Anon key the fake expects on every request.
pub const ANON_KEY: &str = "test-anon-key";

/// One request as the fake received it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RecordedRequest {
    /// Header value as text, if present.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Body parsed as JSON.
    ///
    /// # Panics
    ///
    /// Panics if the body is not JSON.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

/// An uploaded object.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

struct Failure {
    method: Method,
    path_prefix: String,
    status: StatusCode,
    body: Value,
}

#[derive(Default)]
struct FakeState {
    tables: HashMap<String, Vec<Value>>,
    objects: HashMap<String, StoredObject>,
    requests: Vec<RecordedRequest>,
    auth_codes: HashMap<String, String>,
    failures: Vec<Failure>,
    next_id: i64,
}

type Shared = Arc<Mutex<FakeState>>;

#[allow(clippy::unwrap_used)]
fn lock(state: &Shared) -> MutexGuard<'_, FakeState> {
    state.lock().unwrap()
}

/// A fake Supabase project served on `127.0.0.1:<ephemeral port>`.
pub struct FakeSupabase {
    addr: SocketAddr,
    state: Shared,
    shutdown: Option<oneshot::Sender<()>>,
}

impl FakeSupabase {
    /// Start the fake server.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    #[allow(clippy::unwrap_used)]
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(FakeState {
            next_id: 100,
            ..FakeState::default()
        }));

        let app = Router::new()
            .route(
                "/rest/v1/{table}",
                get(select_rows).post(insert_rows).delete(delete_rows),
            )
            .route("/storage/v1/object/{bucket}/{*key}", post(upload_object))
            .route("/auth/v1/token", post(exchange_token))
            .route("/auth/v1/logout", post(logout))
            .layer(middleware::from_fn_with_state(state.clone(), record))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown, rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = rx.await;
                })
                .await
        });

        Self {
            addr,
            state,
            shutdown: Some(shutdown),
        }
    }

    /// Project URL of the fake.
    ///
    /// # Panics
    ///
    /// Never in practice; the address is always a valid URL.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn url(&self) -> Url {
        Url::parse(&format!("http://{}", self.addr)).unwrap()
    }

    /// Client configuration pointing at the fake.
    #[must_use]
    pub fn config(&self) -> SupabaseConfig {
        SupabaseConfig {
            url: self.url(),
            anon_key: SecretString::from(ANON_KEY),
            image_bucket: "images".to_string(),
        }
    }

    pub fn seed(&self, table: &str, rows: Vec<Value>) {
        lock(&self.state).tables.insert(table.to_string(), rows);
    }

    #[must_use]
    pub fn rows(&self, table: &str) -> Vec<Value> {
        lock(&self.state)
            .tables
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    #[must_use]
    pub fn object(&self, bucket_key: &str) -> Option<StoredObject> {
        lock(&self.state).objects.get(bucket_key).cloned()
    }

    #[must_use]
    pub fn object_count(&self) -> usize {
        lock(&self.state).objects.len()
    }

    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.state).requests.clone()
    }

    pub fn clear_requests(&self) {
        lock(&self.state).requests.clear();
    }

    /// Accept `code` at the token endpoint as a sign-in for `email`.
    pub fn issue_auth_code(&self, code: &str, email: &str) {
        lock(&self.state)
            .auth_codes
            .insert(code.to_string(), email.to_string());
    }

    /// Reject requests whose method matches and whose path starts with
    /// `path_prefix`, answering `status` with `body`.
    pub fn fail(&self, method: Method, path_prefix: &str, status: StatusCode, body: Value) {
        lock(&self.state).failures.push(Failure {
            method,
            path_prefix: path_prefix.to_string(),
            status,
            body,
        });
    }
}

impl Drop for FakeSupabase {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Record the request, then apply any configured failure.
#[allow(clippy::unwrap_used)]
async fn record(State(state): State<Shared>, request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();

    let failure = {
        let mut state = lock(&state);
        state.requests.push(RecordedRequest {
            method: parts.method.clone(),
            path: parts.uri.path().to_string(),
            query: parts.uri.query().map(str::to_string),
            headers: parts.headers.clone(),
            body: bytes.clone(),
        });
        state
            .failures
            .iter()
            .find(|f| f.method == parts.method && parts.uri.path().starts_with(&f.path_prefix))
            .map(|f| (f.status, f.body.clone()))
    };

    if let Some((status, body)) = failure {
        return (status, axum::Json(body)).into_response();
    }

    if parts.headers.get("apikey").and_then(|v| v.to_str().ok()) != Some(ANON_KEY) {
        return (
            StatusCode::UNAUTHORIZED,
            axum::Json(json!({"message": "Invalid API key"})),
        )
            .into_response();
    }

    next.run(Request::from_parts(parts, Body::from(bytes)))
        .await
}

fn sort_rows(rows: &mut [Value], order: &str) {
    let (column, direction) = order.split_once('.').unwrap_or((order, "asc"));
    rows.sort_by(|a, b| {
        let ord = match (&a[column], &b[column]) {
            (Value::Number(x), Value::Number(y)) => x
                .as_i64()
                .unwrap_or_default()
                .cmp(&y.as_i64().unwrap_or_default()),
            (Value::String(x), Value::String(y)) => x.cmp(y),
            _ => std::cmp::Ordering::Equal,
        };
        if direction == "desc" { ord.reverse() } else { ord }
    });
}

async fn select_rows(
    State(state): State<Shared>,
    Path(table): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let mut rows = lock(&state).tables.get(&table).cloned().unwrap_or_default();
    if let Some(order) = query.get("order") {
        sort_rows(&mut rows, order);
    }
    axum::Json(rows).into_response()
}

async fn insert_rows(
    State(state): State<Shared>,
    Path(table): Path<String>,
    axum::Json(rows): axum::Json<Vec<Value>>,
) -> Response {
    let mut state = lock(&state);
    let mut inserted = Vec::with_capacity(rows.len());
    for mut row in rows {
        state.next_id += 1;
        row["id"] = Value::from(state.next_id);
        inserted.push(row.clone());
        state.tables.entry(table.clone()).or_default().push(row);
    }
    (StatusCode::CREATED, axum::Json(inserted)).into_response()
}

async fn delete_rows(
    State(state): State<Shared>,
    Path(table): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let Some(id) = query
        .get("id")
        .and_then(|f| f.strip_prefix("eq."))
        .and_then(|id| id.parse::<i64>().ok())
    else {
        return (
            StatusCode::BAD_REQUEST,
            axum::Json(json!({"message": "DELETE requires a filter"})),
        )
            .into_response();
    };

    if let Some(rows) = lock(&state).tables.get_mut(&table) {
        rows.retain(|row| row["id"].as_i64() != Some(id));
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn upload_object(
    State(state): State<Shared>,
    Path((bucket, key)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = format!("{bucket}/{key}");
    let mut state = lock(&state);
    if state.objects.contains_key(&path) {
        return (
            StatusCode::CONFLICT,
            axum::Json(json!({"statusCode": "409", "error": "Duplicate", "message": "The resource already exists"})),
        )
            .into_response();
    }
    state.objects.insert(
        path.clone(),
        StoredObject {
            content_type: headers
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            bytes: body,
        },
    );
    axum::Json(json!({"Key": path})).into_response()
}

#[derive(Deserialize)]
struct TokenRequest {
    auth_code: String,
    code_verifier: String,
}

async fn exchange_token(
    State(state): State<Shared>,
    axum::Json(request): axum::Json<TokenRequest>,
) -> Response {
    let email = lock(&state).auth_codes.remove(&request.auth_code);
    match email {
        Some(email) if !request.code_verifier.is_empty() => axum::Json(json!({
            "access_token": format!("session-token-for-{email}"),
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "refresh-token",
            "user": {"email": email},
        }))
        .into_response(),
        _ => (
            StatusCode::BAD_REQUEST,
            axum::Json(json!({
                "error": "invalid_grant",
                "error_description": "invalid flow state, no valid flow state found"
            })),
        )
            .into_response(),
    }
}

async fn logout() -> StatusCode {
    StatusCode::NO_CONTENT
}
