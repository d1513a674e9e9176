//! Development server
//!
//! Serves the overview and topic pages straight from the content root; every
//! request re-reads the markdown, so edits show up on reload. Completion
//! state is kept in the file-backed progress store.

use anyhow::Result;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        Form, Path, Query, State, WebSocketUpgrade,
    },
    http::{header, StatusCode, Uri},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tower_http::trace::TraceLayer;

use crate::content::{ContentLoader, MarkdownRenderer};
use crate::progress::{JsonFileBackend, ProgressStore};
use crate::registry::Registry;
use crate::views::{
    build_overview, build_topic_page, ExpandedDays, Links, PageRenderer, SiteMeta, PROGRESS_JS,
    STYLE_CSS,
};
use crate::StudyTracker;

/// Live reload script injected into HTML pages
const LIVE_RELOAD_SCRIPT: &str = r#"
<script>
(function() {
    var ws = new WebSocket('ws://' + location.host + '/__livereload');
    ws.onmessage = function(msg) {
        if (msg.data === 'reload') {
            location.reload();
        }
    };
    ws.onclose = function() {
        console.log('Live reload disconnected. Attempting to reconnect...');
        setTimeout(function() { location.reload(); }, 1000);
    };
})();
</script>
</body>
"#;

/// Shared server state
pub struct AppState {
    title: String,
    subtitle: String,
    registry: Registry,
    loader: ContentLoader,
    renderer: MarkdownRenderer,
    pages: PageRenderer,
    progress: Mutex<ProgressStore<JsonFileBackend>>,
    links: Links,
    reload_tx: broadcast::Sender<()>,
    live_reload: bool,
}

impl AppState {
    /// Build state for a tracker
    pub fn new(tracker: &StudyTracker, live_reload: bool) -> Result<Self> {
        let (reload_tx, _) = broadcast::channel::<()>(16);

        Ok(Self {
            title: tracker.config.title.clone(),
            subtitle: tracker.config.subtitle.clone(),
            registry: tracker.registry,
            loader: tracker.loader(),
            renderer: tracker.renderer(),
            pages: PageRenderer::new()?,
            progress: Mutex::new(tracker.progress_store()),
            links: Links::default(),
            reload_tx,
            live_reload,
        })
    }

    fn site_meta(&self) -> SiteMeta {
        SiteMeta::new(&self.title, &self.subtitle, &self.links)
    }

    /// Turn a rendered page into a response, injecting live reload if on
    fn page(&self, status: StatusCode, rendered: Result<String>) -> Response {
        match rendered {
            Ok(html) => {
                let html = if self.live_reload {
                    inject_live_reload(&html)
                } else {
                    html
                };
                (status, Html(html)).into_response()
            }
            Err(e) => {
                tracing::error!("Template error: {:#}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
            }
        }
    }

    fn not_found(&self, requested: &str) -> Response {
        let site = self.site_meta();
        self.page(StatusCode::NOT_FOUND, self.pages.not_found(&site, requested))
    }
}

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(overview_handler))
        .route("/topics/:id", get(topic_handler))
        .route("/topics/:id/", get(topic_handler))
        .route("/topics/:id/toggle", post(toggle_handler))
        .route("/api/progress", get(progress_handler))
        .route("/assets/style.css", get(style_handler))
        .route("/assets/progress.js", get(script_handler))
        .route("/__livereload", get(livereload_handler))
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the development server
pub async fn start(
    tracker: &StudyTracker,
    ip: &str,
    port: u16,
    watch: bool,
    open: bool,
) -> Result<()> {
    let state = Arc::new(AppState::new(tracker, watch)?);
    let reload_tx = state.reload_tx.clone();
    let app = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    if watch {
        println!("Live reload enabled. Watching {:?}", tracker.content_root);
    }
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    if watch {
        let content_root = tracker.content_root.clone();
        std::thread::spawn(move || {
            if let Err(e) = watch_and_reload(content_root, reload_tx) {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Watch the content root and tell connected pages to reload
fn watch_and_reload(content_root: PathBuf, reload_tx: broadcast::Sender<()>) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();

    // Debounce so an editor's save burst triggers one reload
    let mut debouncer = new_debouncer(Duration::from_millis(300), tx)?;

    if content_root.exists() {
        debouncer
            .watcher()
            .watch(&content_root, RecursiveMode::Recursive)?;
        tracing::debug!("Watching: {:?}", content_root);
    } else {
        tracing::warn!("Content root {:?} does not exist, not watching", content_root);
        return Ok(());
    }

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let changed: Vec<_> = events
                    .iter()
                    .filter(|e| {
                        let path_str = e.path.to_string_lossy();
                        !path_str.contains(".git")
                            && !path_str.contains(".DS_Store")
                            && !path_str.ends_with('~')
                    })
                    .collect();

                if changed.is_empty() {
                    continue;
                }

                for event in &changed {
                    tracing::info!("Content changed: {}", event.path.display());
                }
                let _ = reload_tx.send(());
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct OverviewQuery {
    /// Expanded day ids; absent means every day is open
    pub open: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ToggleForm {
    #[serde(rename = "return", default)]
    pub return_to: Option<String>,
}

/// Body of `GET /api/progress`
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProgressSummary {
    pub completed: Vec<String>,
    pub completed_count: usize,
    pub total: usize,
    /// Stored ids that no longer exist in the registry
    pub stale: Vec<String>,
}

/// Overview checklist
pub async fn overview_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<OverviewQuery>,
) -> Response {
    let expanded = match query.open.as_deref() {
        Some(value) => ExpandedDays::from_query(value),
        None => ExpandedDays::all(&state.registry),
    };
    let completion = state.progress.lock().await.completed().clone();

    let page = build_overview(&state.registry, &completion, &expanded, true, &state.links);
    let site = state.site_meta();
    state.page(StatusCode::OK, state.pages.overview(&site, &page))
}

/// Topic detail page
pub async fn topic_handler(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    let Some(found) = state.registry.find(&id) else {
        tracing::debug!("Unknown topic requested: {}", id);
        return state.not_found(&format!("/topics/{}/", id));
    };

    let markdown = state.loader.load_async(found.topic.file).await;
    let completed = state.progress.lock().await.is_complete(found.topic.id);

    let page = build_topic_page(
        &state.registry,
        found,
        &markdown,
        &state.renderer,
        Some(completed),
        &state.links,
    );
    let site = state.site_meta();
    state.page(StatusCode::OK, state.pages.topic(&site, &page))
}

/// Flip a topic's completion and go back where the form came from
pub async fn toggle_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Form(form): Form<ToggleForm>,
) -> Response {
    if !state.registry.contains(&id) {
        return state.not_found(&format!("/topics/{}/toggle", id));
    }

    if let Err(e) = state.progress.lock().await.toggle(&id) {
        tracing::error!("Failed to save progress: {}", e);
        return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to save progress").into_response();
    }

    Redirect::to(&safe_return_target(form.return_to.as_deref())).into_response()
}

/// Completion state as JSON
pub async fn progress_handler(State(state): State<Arc<AppState>>) -> Json<ProgressSummary> {
    let store = state.progress.lock().await;
    let completed = store.completed();

    Json(ProgressSummary {
        completed: completed.iter().map(str::to_string).collect(),
        completed_count: completed.len(),
        total: state.registry.len(),
        stale: completed
            .stale_ids(&state.registry)
            .into_iter()
            .map(str::to_string)
            .collect(),
    })
}

async fn style_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLE_CSS,
    )
}

async fn script_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        PROGRESS_JS,
    )
}

async fn fallback_handler(State(state): State<Arc<AppState>>, uri: Uri) -> Response {
    state.not_found(uri.path())
}

/// WebSocket handler for live reload
async fn livereload_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let reload_rx = state.reload_tx.subscribe();
    ws.on_upgrade(move |socket| handle_livereload_socket(socket, reload_rx))
}

/// Handle WebSocket connection for live reload
async fn handle_livereload_socket(mut socket: WebSocket, mut reload_rx: broadcast::Receiver<()>) {
    tracing::debug!("Live reload client connected");

    loop {
        tokio::select! {
            result = reload_rx.recv() => {
                match result {
                    Ok(_) => {
                        if socket.send(Message::Text("reload".to_string())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
        }
    }

    tracing::debug!("Live reload client disconnected");
}

/// Only local absolute paths are followed after a toggle
///
/// Browsers read `/\host` like `//host`, so backslashes are refused too.
fn safe_return_target(target: Option<&str>) -> String {
    match target {
        Some(t) if t.starts_with('/') && !t.starts_with("//") && !t.contains('\\') => {
            t.to_string()
        }
        _ => "/".to_string(),
    }
}

/// Inject live reload script into HTML content
fn inject_live_reload(html: &str) -> String {
    if html.contains("</body>") {
        html.replace("</body>", LIVE_RELOAD_SCRIPT)
    } else {
        format!("{}{}", html, LIVE_RELOAD_SCRIPT)
    }
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}
