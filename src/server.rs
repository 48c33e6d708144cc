//! HTTP surface for the task board.
//!
//! REST endpoints map one-to-one onto [`Board`] operations, `/api/events`
//! streams change notifications as server-sent events, and every other path
//! falls through to an optional static directory.
//!
//! Document operations touch the filesystem and take a file lock, so they
//! run on the blocking thread pool.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use axum::{
    extract::{FromRequest, Path as UrlPath, Request, State},
    http::{header, HeaderName, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use futures_util::{Stream, StreamExt};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::board::Board;
use crate::config::Config;
use crate::document::{ensure_document, Bootstrap};
use crate::error::{Error, Result};
use crate::watch::{watch_document, DocumentWatcher, ListenerRegistry};

const NO_STORE: &str = "no-store, no-cache, must-revalidate, proxy-revalidate";

/// State shared across HTTP handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub board: Board,
    pub registry: ListenerRegistry,
}

impl AppState {
    pub fn new(board: Board, registry: ListenerRegistry) -> Self {
        Self { board, registry }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Error rendered as `{error}` with 400 for contract violations, 500 otherwise.
#[derive(Debug)]
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_contract_violation() {
            StatusCode::BAD_REQUEST
        } else {
            error!(error = %self.0, "request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

async fn blocking<T>(f: impl FnOnce() -> Result<T> + Send + 'static) -> ApiResult<T>
where
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|err| Error::OperationFailed(format!("worker task failed: {err}")))?
        .map_err(ApiError::from)
}

// ============================================================================
// Request bodies
// ============================================================================

/// JSON body extractor whose rejections render as [`ApiError`].
///
/// A missing `Content-Type`, an empty body or malformed JSON is a bad request.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(request: Request, state: &S) -> ApiResult<Self> {
        match Json::<T>::from_request(request, state).await {
            Ok(Json(body)) => Ok(JsonBody(body)),
            Err(rejection) => Err(Error::InvalidArgument(rejection.body_text()).into()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PropertyRequest {
    pub property: Option<String>,
    pub value: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StatusRequest {
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    pub from_column: Option<String>,
    pub to_column: Option<String>,
}

/// Strings pass through; numbers and booleans are stringified.
fn scalar_value(value: Option<Value>) -> Result<Option<String>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text)),
        Some(Value::Number(number)) => Ok(Some(number.to_string())),
        Some(Value::Bool(flag)) => Ok(Some(flag.to_string())),
        Some(_) => Err(Error::InvalidArgument(
            "value must be a string, number or boolean".to_string(),
        )),
    }
}

// ============================================================================
// Handlers
// ============================================================================

async fn get_master_plan(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let board = state.board.clone();
    let content = blocking(move || board.get_document()).await?;
    Ok(Json(json!({ "content": content })))
}

async fn set_property(
    State(state): State<AppState>,
    UrlPath(id): UrlPath<String>,
    JsonBody(body): JsonBody<PropertyRequest>,
) -> ApiResult<Json<Value>> {
    let property = body.property.unwrap_or_default();
    let value = scalar_value(body.value)?;
    let board = state.board.clone();
    let change =
        blocking(move || board.set_property(&id, &property, value.as_deref())).await?;

    let mut response = json!({
        "success": true,
        "id": change.id,
        "property": change.property,
        "value": change.value,
        "changed": change.changed,
    });
    if !change.changed {
        response["message"] = Value::from("No change needed");
    }
    Ok(Json(response))
}

async fn set_status(
    State(state): State<AppState>,
    UrlPath(id): UrlPath<String>,
    JsonBody(body): JsonBody<StatusRequest>,
) -> ApiResult<Json<Value>> {
    let board = state.board.clone();
    let change = blocking(move || board.set_status(&id, body.status.as_deref())).await?;
    Ok(Json(json!({
        "success": true,
        "id": change.id,
        "status": change.status,
        "changed": change.changed,
    })))
}

async fn move_task(
    State(state): State<AppState>,
    UrlPath(id): UrlPath<String>,
    JsonBody(body): JsonBody<MoveRequest>,
) -> ApiResult<Json<Value>> {
    let board = state.board.clone();
    let change = blocking(move || {
        board.move_task(&id, body.from_column.as_deref(), body.to_column.as_deref())
    })
    .await?;
    Ok(Json(json!({
        "success": true,
        "id": change.id,
        "status": change.to_column,
        "changed": change.changed,
    })))
}

async fn subscribe_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = std::result::Result<Event, axum::Error>>> {
    let stream = state
        .registry
        .subscribe()
        .into_stream()
        .map(|event| Event::default().json_data(event));
    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Disable caching for the page and the document itself.
async fn no_cache(request: Request, next: Next) -> Response {
    let uncached = is_uncached_path(request.uri().path());
    let mut response = next.run(request).await;
    if uncached {
        let headers = response.headers_mut();
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(NO_STORE));
        headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
        headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
        headers.insert(
            HeaderName::from_static("surrogate-control"),
            HeaderValue::from_static("no-store"),
        );
    }
    response
}

fn is_uncached_path(path: &str) -> bool {
    path == "/" || path.ends_with(".html") || path.ends_with(".md")
}

/// Build the application router.
pub fn router(state: AppState, static_dir: Option<PathBuf>) -> Router {
    let app = Router::new()
        .route("/api/master-plan", get(get_master_plan))
        .route("/api/task/{id}", post(set_property))
        .route("/api/task/{id}/status", post(set_status))
        .route("/api/task/{id}/move", post(move_task))
        .route("/api/events", get(subscribe_events))
        .with_state(state);

    let app = match static_dir {
        Some(dir) => app.fallback_service(ServeDir::new(dir)),
        None => app,
    };

    app.layer(middleware::from_fn(no_cache))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

// ============================================================================
// Server lifecycle
// ============================================================================

/// A bound server, ready to run.
pub struct Server {
    listener: TcpListener,
    app: Router,
    bootstrap: Bootstrap,
    watcher: Option<DocumentWatcher>,
}

impl Server {
    /// Bootstrap the document, attach the watcher and bind the listener.
    ///
    /// A watcher that cannot attach is logged and live updates stay off; the
    /// REST endpoints keep working.
    pub async fn bind(root: &Path, config: &Config) -> Result<Self> {
        let board = Board::open(root, config);
        let document = board.store().path().to_path_buf();
        let bootstrap = ensure_document(&document, Some(config.template_path(root).as_path()))?;

        let registry = ListenerRegistry::new();
        let watcher = if config.watch.enabled {
            let quiet = Duration::from_millis(config.watch.debounce_ms);
            match watch_document(&document, quiet, registry.clone()) {
                Ok(watcher) => Some(watcher),
                Err(err) => {
                    warn!(error = %err, "file watcher unavailable; live updates disabled");
                    None
                }
            }
        } else {
            info!("live updates disabled by configuration");
            None
        };

        let app = router(AppState::new(board, registry), config.static_dir(root));
        let listener = TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;

        Ok(Self {
            listener,
            app,
            bootstrap,
            watcher,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn bootstrap(&self) -> Bootstrap {
        self.bootstrap
    }

    pub fn live_updates(&self) -> bool {
        self.watcher.is_some()
    }

    /// Serve until Ctrl-C.
    pub async fn run(self) -> Result<()> {
        let addr = self.listener.local_addr()?;
        info!("planboard listening on http://{}", addr);
        axum::serve(self.listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        info!("planboard stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
