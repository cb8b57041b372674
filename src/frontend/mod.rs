//! HTTP front-end.
//!
//! Routes:
//! - `GET /` search page, start page, or a 302 for bangs and shortcuts
//! - `GET /answer?q=` the instant answer as JSON
//! - `GET /autocomplete?q=` suggestion JSON
//! - `GET /opensearch.xml`

mod render;

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::{ConnectInfo, Query, State};
use axum::http::{Extensions, HeaderMap, StatusCode, header};
use axum::response::{Html, IntoResponse, Json, Response};
use axum::routing::get;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::JiveConfig;
use crate::error::{JiveError, Result};
use crate::language::LanguageMatcher;
use crate::orchestrator::{Orchestrator, Outcome, Template};
use crate::query::{Output, QueryContext, RequestMeta, SearchParams};

// ---------------------------------------------------------------------------
// Shared application state
// ---------------------------------------------------------------------------

/// Shared state for axum handlers.
#[derive(Clone)]
pub struct AppState {
    orchestrator: Orchestrator,
    matcher: Arc<LanguageMatcher>,
    default_number: usize,
    budget: Duration,
    /// Absolute base URL advertised in `/opensearch.xml`.
    base_url: String,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator, config: &JiveConfig, base_url: &str) -> Self {
        Self {
            orchestrator,
            matcher: Arc::new(LanguageMatcher::new(&config.languages)),
            default_number: config.search.default_number,
            budget: config.search.deadline(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    fn context(&self, params: &SearchParams, headers: &HeaderMap, extensions: &Extensions) -> QueryContext {
        QueryContext::from_params(
            params,
            request_meta(headers, extensions),
            &self.matcher,
            self.default_number,
            self.budget,
        )
    }
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: String,
    pub message: String,
}

impl IntoResponse for JiveError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::BadRequest(_) => {
                debug!(error = %self, "bad request");
                StatusCode::BAD_REQUEST
            }
            _ => {
                info!(error = %self, kind = self.kind(), "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = ErrorResponse {
            error: ErrorBody {
                kind: self.kind().to_owned(),
                message: self.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Frontend
// ---------------------------------------------------------------------------

/// All routes over `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handle_search))
        .route("/answer", get(handle_answer))
        .route("/autocomplete", get(handle_autocomplete))
        .route("/opensearch.xml", get(handle_opensearch))
        .with_state(state)
}

/// The running HTTP server.
pub struct Frontend {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl Frontend {
    /// Bind `{server.host}:{server.port}` (port `0` auto-assigns) and serve
    /// in a background task.
    ///
    /// # Errors
    ///
    /// Returns an error if the TCP listener cannot bind.
    pub async fn start(orchestrator: Orchestrator, config: &JiveConfig) -> Result<Self> {
        let bind_addr = format!("{}:{}", config.server.host, config.server.port);
        let listener = TcpListener::bind(&bind_addr)
            .await
            .map_err(|e| JiveError::Config(format!("bind {bind_addr} failed: {e}")))?;
        let addr = listener.local_addr()?;

        let state = AppState::new(orchestrator, config, &format!("http://{addr}"));
        let app = router(state).into_make_service_with_connect_info::<SocketAddr>();

        info!("jive listening on http://{addr}");

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("server error: {e}");
            }
        });

        Ok(Self { addr, handle })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Abort the server task.
    pub fn shutdown(&self) {
        self.handle.abort();
    }
}

impl Drop for Frontend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// The caller's address: the first `X-Forwarded-For` hop, else the peer.
fn client_ip(headers: &HeaderMap, extensions: &Extensions) -> Option<IpAddr> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|ip| ip.trim().parse().ok());
    forwarded.or_else(|| {
        extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
    })
}

fn header_string(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

fn request_meta(headers: &HeaderMap, extensions: &Extensions) -> RequestMeta {
    RequestMeta {
        accept_language: header_string(headers, header::ACCEPT_LANGUAGE),
        user_agent: header_string(headers, header::USER_AGENT).unwrap_or_default(),
        client_ip: client_ip(headers, extensions),
    }
}

fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_owned())]).into_response()
}

fn require_query(params: &SearchParams) -> Result<()> {
    match params.q.as_deref().map(str::trim) {
        Some(q) if !q.is_empty() => Ok(()),
        _ => Err(JiveError::BadRequest("missing q parameter".into())),
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
    headers: HeaderMap,
    extensions: Extensions,
) -> Response {
    let ctx = state.context(&params, &headers, &extensions);
    let json = ctx.output == Output::Json;

    match state.orchestrator.search(ctx).await {
        Ok(Outcome::Redirect(location)) => found(&location),
        Ok(Outcome::StartPage(start)) if json => Json(start).into_response(),
        Ok(Outcome::StartPage(start)) => Html(render::start_page(&start)).into_response(),
        Ok(Outcome::Page(page)) => match page.template {
            Template::Json => Json(page).into_response(),
            Template::Search | Template::Maps => Html(render::search_page(&page)).into_response(),
        },
        Err(e) => e.into_response(),
    }
}

async fn handle_answer(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
    headers: HeaderMap,
    extensions: Extensions,
) -> Response {
    if let Err(e) = require_query(&params) {
        return e.into_response();
    }
    let ctx = state.context(&params, &headers, &extensions);
    Json(state.orchestrator.answer(&ctx).await).into_response()
}

async fn handle_autocomplete(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Response {
    if let Err(e) = require_query(&params) {
        return e.into_response();
    }
    let q = params.q.unwrap_or_default();
    match state.orchestrator.autocomplete(&q).await {
        Ok(suggestions) => Json(suggestions).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn handle_opensearch(State(state): State<AppState>) -> Response {
    (
        [(header::CONTENT_TYPE, "application/opensearchdescription+xml")],
        render::opensearch(state.orchestrator.brand(), &state.base_url),
    )
        .into_response()
}
