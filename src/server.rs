//! HTTP routes for the wiki.
//!
//! | Route              | Behaviour                                               |
//! |--------------------|---------------------------------------------------------|
//! | `GET /`            | 308 to `/view/<front page>`                             |
//! | `GET /index`       | list of every stored page                               |
//! | `GET /view/:title` | rendered page, or 302 to `/edit/:title` if missing      |
//! | `GET /edit/:title` | edit form, empty when the page does not exist yet       |
//! | `POST /save/:title`| store the `body` form field, then 302 to `/view/:title` |
//!
//! Titles must match `^[A-Za-z0-9]+$`; anything else is a 404. Store access runs on the
//! blocking thread pool so a slow disk never stalls the async workers.

use crate::{
    config::WikiConfig,
    error::WikiError,
    links::LinkRenderer,
    page::Page,
    render::PageRenderer,
    store::PageStore,
    template::Templates,
    title::PageTitle,
};
use axum::{
    extract::{ConnectInfo, Form, Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::{future::Future, net::SocketAddr, sync::Arc};
use tower_http::trace::TraceLayer;

/// Everything a request handler needs, shared read-only between requests.
#[derive(Debug)]
pub struct Wiki {
    store: PageStore,
    renderer: PageRenderer,
    front_page: PageTitle,
}

impl Wiki {
    pub fn new(store: PageStore, renderer: PageRenderer, front_page: PageTitle) -> Self {
        Wiki {
            store,
            renderer,
            front_page,
        }
    }

    /// Build the wiki described by `config`, creating the content root if needed.
    pub fn from_config(config: &WikiConfig) -> Result<Wiki, WikiError> {
        let store = PageStore::ensure_root(&config.data_dir)?;
        let templates = match &config.templates_dir {
            Some(dir) => Templates::from_dir(dir)?,
            None => Templates::builtin()?,
        };
        Ok(Wiki::new(
            store,
            PageRenderer::new(templates, LinkRenderer::default()),
            config.front_page()?,
        ))
    }

    pub fn store(&self) -> &PageStore {
        &self.store
    }

    pub fn renderer(&self) -> &PageRenderer {
        &self.renderer
    }

    pub fn front_page(&self) -> &PageTitle {
        &self.front_page
    }
}

/// Client errors carry their message; server errors are logged here and answered with the
/// bare status text, so filesystem details never reach the client.
impl IntoResponse for WikiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
            let reason = status.canonical_reason().unwrap_or("Internal Server Error");
            (status, reason.to_string()).into_response()
        } else {
            (status, self.to_string()).into_response()
        }
    }
}

pub fn router(wiki: Arc<Wiki>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/index", get(index_handler))
        .route("/view/:title", get(view_handler))
        .route("/edit/:title", get(edit_handler))
        .route("/save/:title", post(save_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(wiki)
}

/// Serve `wiki` on `addr` until `shutdown_signal` resolves.
pub async fn serve(
    wiki: Arc<Wiki>,
    addr: SocketAddr,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), WikiError> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Wiki server listening on http://{}", listener.local_addr()?);
    tracing::info!("Serving pages from {}", wiki.store().root().display());

    axum::serve(
        listener,
        router(wiki).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal)
    .await?;

    tracing::info!("Wiki server shut down");
    Ok(())
}

#[derive(Debug, Deserialize)]
struct SaveForm {
    #[serde(default)]
    body: String,
}

/// Logs the start of a request when created and its end when dropped.
struct RequestLog {
    action: &'static str,
    title: PageTitle,
    remote: Option<SocketAddr>,
}

impl RequestLog {
    fn start(
        action: &'static str,
        raw_title: &str,
        remote: Option<ConnectInfo<SocketAddr>>,
    ) -> Result<RequestLog, WikiError> {
        let title: PageTitle = raw_title.parse()?;
        let remote = remote.map(|ConnectInfo(addr)| addr);
        tracing::info!(
            "request started for action '{}' on page '{}' from {:?}",
            action,
            title,
            remote
        );
        Ok(RequestLog {
            action,
            title,
            remote,
        })
    }
}

impl Drop for RequestLog {
    fn drop(&mut self) {
        tracing::info!(
            "request finished for action '{}' on page '{}' from {:?}",
            self.action,
            self.title,
            self.remote
        );
    }
}

async fn blocking<T, F>(work: F) -> Result<T, WikiError>
where
    F: FnOnce() -> Result<T, WikiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| WikiError::Service(format!("store task failed: {err}")))?
}

fn found(location: String) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

async fn root_handler(State(wiki): State<Arc<Wiki>>) -> Redirect {
    Redirect::permanent(&format!("/view/{}", wiki.front_page))
}

async fn index_handler(State(wiki): State<Arc<Wiki>>) -> Result<Html<String>, WikiError> {
    let store = wiki.store.clone();
    let titles = blocking(move || store.titles()).await?;
    Ok(Html(wiki.renderer.index(&titles)?))
}

async fn view_handler(
    State(wiki): State<Arc<Wiki>>,
    Path(raw_title): Path<String>,
    remote: Option<ConnectInfo<SocketAddr>>,
) -> Result<Response, WikiError> {
    let log = RequestLog::start("view", &raw_title, remote)?;
    let store = wiki.store.clone();
    let title = log.title.clone();
    match blocking(move || store.load(&title)).await {
        Ok(page) => Ok(Html(wiki.renderer.view(&page)?).into_response()),
        Err(err) if err.is_not_found() => Ok(found(format!("/edit/{}", log.title))),
        Err(err) => Err(err),
    }
}

async fn edit_handler(
    State(wiki): State<Arc<Wiki>>,
    Path(raw_title): Path<String>,
    remote: Option<ConnectInfo<SocketAddr>>,
) -> Result<Html<String>, WikiError> {
    let log = RequestLog::start("edit", &raw_title, remote)?;
    let store = wiki.store.clone();
    let title = log.title.clone();
    let page = match blocking(move || store.load(&title)).await {
        Ok(page) => page,
        Err(err) if err.is_not_found() => Page::empty(log.title.clone()),
        Err(err) => return Err(err),
    };
    Ok(Html(wiki.renderer.edit(&page)?))
}

async fn save_handler(
    State(wiki): State<Arc<Wiki>>,
    Path(raw_title): Path<String>,
    remote: Option<ConnectInfo<SocketAddr>>,
    Form(form): Form<SaveForm>,
) -> Result<Response, WikiError> {
    let log = RequestLog::start("save", &raw_title, remote)?;
    let store = wiki.store.clone();
    let page = Page::new(log.title.clone(), form.body);
    blocking(move || store.save(&page)).await?;
    Ok(found(format!("/view/{}", log.title)))
}
