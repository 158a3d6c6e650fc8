// src/server/mod.rs
use std::{convert::Infallible, sync::Arc, time::Instant};
use tracing::{error, info, warn};
use warp::{
    http::StatusCode,
    path::FullPath,
    reject::{Reject, Rejection},
    reply::Reply,
    Filter,
};

use crate::dataset::CrimeTable;
use crate::pages::{render_page, LinkStyle, PageSpec};

/// Everything a request needs. Cheap to clone; the table is shared, never mutated.
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<CrimeTable>,
    pub pages: &'static [PageSpec],
    /// Include error details in 500 responses.
    pub debug: bool,
}

impl AppState {
    pub fn new(table: CrimeTable, pages: &'static [PageSpec], debug: bool) -> Self {
        Self {
            table: Arc::new(table),
            pages,
            debug,
        }
    }

    fn page(&self, path: &str) -> Option<&'static PageSpec> {
        let path = match path.trim_end_matches('/') {
            "" => "/",
            p => p,
        };
        self.pages.iter().find(|p| p.path == path)
    }
}

#[derive(Debug)]
struct RenderFailure {
    path: String,
    detail: Option<String>,
}

impl Reject for RenderFailure {}

fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

async fn health_check(state: AppState) -> Result<impl Reply, Rejection> {
    Ok(warp::reply::json(&serde_json::json!({
        "status": "healthy",
        "service": "crimedash",
        "rows": state.table.len(),
    })))
}

async fn lookup_page(
    path: FullPath,
    state: AppState,
) -> Result<(AppState, &'static PageSpec), Rejection> {
    match state.page(path.as_str()) {
        Some(page) => Ok((state, page)),
        None => Err(warp::reject::not_found()),
    }
}

async fn serve_page(state: AppState, page: &'static PageSpec) -> Result<impl Reply, Rejection> {
    let start = Instant::now();
    match render_page(&state.table, state.pages, page, LinkStyle::Routes) {
        Ok(html) => {
            info!(path = page.path, elapsed = ?start.elapsed(), bytes = html.len(), "rendered");
            Ok(warp::reply::html(html))
        }
        Err(e) => {
            error!(path = page.path, "render failed: {}", e);
            Err(warp::reject::custom(RenderFailure {
                path: page.path.to_string(),
                detail: state.debug.then(|| e.to_string()),
            }))
        }
    }
}

async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Page not found".to_string())
    } else if let Some(failure) = err.find::<RenderFailure>() {
        let message = match &failure.detail {
            Some(detail) => format!("Failed to render {}: {}", failure.path, detail),
            None => format!("Failed to render {}", failure.path),
        };
        (StatusCode::INTERNAL_SERVER_ERROR, message)
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_string())
    } else {
        warn!("unhandled rejection: {:?}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        )
    };

    let body = format!(
        "<!DOCTYPE html><html><head><title>{code}</title></head>\
         <body><h1>{code}</h1><p>{message}</p><p><a href=\"/\">Home</a></p></body></html>",
        code = status.as_u16(),
        message = escape_html(&message),
    );
    Ok(warp::reply::with_status(warp::reply::html(body), status))
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// `/health` plus GET/HEAD for each configured page. Unknown paths are 404
/// whatever the method; other methods on a known page are 405.
pub fn routes(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(health_check);

    // resolve the page before checking the method
    let pages = warp::path::full()
        .and(with_state(state))
        .and_then(lookup_page)
        .untuple_one()
        .and(warp::get().or(warp::head()).unify())
        .and_then(serve_page);

    health.or(pages).recover(handle_rejection)
}
