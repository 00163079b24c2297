//! In-process stand-in for the redirect service a load run targets
//!
//! `POST /admin/tokens` issues a token for the posted `target` and
//! `GET /{token}` answers with a 307 to that target. [`Mode`] switches the
//! service into the failure shapes the load generator has to cope with.

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value as JsonValue};
use shortload_config::ShortloadConfig;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

pub const TARGET_URL: &str = "http://example.com/landing";

/// How the stand-in behaves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// 201 with a token, then 307 redirects
    Healthy,
    /// Every creation answers 500
    RejectCreation,
    /// Every `n`-th creation (1-based) answers 500
    RejectEvery(u64),
    /// 201 without a `token` field
    OmitToken,
    /// Tokens resolve with 200 instead of redirecting
    ServeDirectly,
}

#[derive(Default)]
struct Counters {
    creations: AtomicU64,
    redirects: AtomicU64,
    misses: AtomicU64,
}

struct ServiceState {
    mode: Mode,
    tokens: Mutex<HashMap<String, String>>,
    counters: Counters,
}

pub struct RedirectService {
    addr: SocketAddr,
    state: Arc<ServiceState>,
    handle: JoinHandle<()>,
}

impl RedirectService {
    pub async fn start(mode: Mode) -> Result<Self> {
        let state = Arc::new(ServiceState {
            mode,
            tokens: Mutex::new(HashMap::new()),
            counters: Counters::default(),
        });

        let app = Router::new()
            .route("/admin/tokens", post(create_token))
            .route("/{token}", get(follow_token))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "Stand-in service stopped");
            }
        });

        Ok(Self {
            addr,
            state,
            handle,
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn admin_endpoint(&self) -> String {
        format!("{}/admin/tokens", self.base_url())
    }

    /// Configuration pointing a run at this service
    pub fn config(&self) -> ShortloadConfig {
        let mut config = ShortloadConfig::default();
        config.target.admin_endpoint = self.admin_endpoint();
        config.target.redirect_base_url = self.base_url();
        config.target.target_url = TARGET_URL.to_string();
        config
    }

    /// POSTs received on the admin endpoint
    pub fn creation_requests(&self) -> u64 {
        self.state.counters.creations.load(Ordering::SeqCst)
    }

    /// Tokens actually issued
    pub fn issued(&self) -> usize {
        self.state.tokens.lock().map(|t| t.len()).unwrap_or_default()
    }

    /// GETs that hit an issued token
    pub fn redirects(&self) -> u64 {
        self.state.counters.redirects.load(Ordering::SeqCst)
    }

    /// GETs for tokens that were never issued
    pub fn misses(&self) -> u64 {
        self.state.counters.misses.load(Ordering::SeqCst)
    }

    /// Distinct redirect targets requested so far
    pub fn targets(&self) -> Vec<String> {
        let mut targets: Vec<String> = self
            .state
            .tokens
            .lock()
            .map(|t| t.values().cloned().collect())
            .unwrap_or_default();
        targets.sort();
        targets.dedup();
        targets
    }
}

impl Drop for RedirectService {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn create_token(
    State(state): State<Arc<ServiceState>>,
    Json(body): Json<JsonValue>,
) -> Response {
    let seq = state.counters.creations.fetch_add(1, Ordering::SeqCst) + 1;

    let Some(target) = body.get("target").and_then(JsonValue::as_str) else {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": "target is required"})))
            .into_response();
    };

    match state.mode {
        Mode::RejectCreation => return StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        Mode::RejectEvery(n) if n > 0 && seq % n == 0 => {
            return StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
        Mode::OmitToken => {
            return (StatusCode::CREATED, Json(json!({"target": target}))).into_response()
        }
        _ => {}
    }

    let token = format!("t{:06}", seq);
    if let Ok(mut tokens) = state.tokens.lock() {
        tokens.insert(token.clone(), target.to_string());
    }

    (
        StatusCode::CREATED,
        Json(json!({"token": token, "target": target})),
    )
        .into_response()
}

async fn follow_token(
    State(state): State<Arc<ServiceState>>,
    Path(token): Path<String>,
) -> Response {
    let target = state
        .tokens
        .lock()
        .ok()
        .and_then(|tokens| tokens.get(&token).cloned());

    let Some(target) = target else {
        state.counters.misses.fetch_add(1, Ordering::SeqCst);
        return StatusCode::NOT_FOUND.into_response();
    };

    state.counters.redirects.fetch_add(1, Ordering::SeqCst);
    match state.mode {
        Mode::ServeDirectly => (StatusCode::OK, target).into_response(),
        _ => (StatusCode::TEMPORARY_REDIRECT, [(header::LOCATION, target)]).into_response(),
    }
}

/// Route test logs through the test writer; safe to call from every test
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("shortload_core=debug,warn")
        .with_test_writer()
        .try_init();
}
