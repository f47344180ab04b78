use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Form, Json,
    body::{Body, Bytes},
    extract::{Path, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use folio_core::{ARCHIVE_MEDIA_TYPE, ARCHIVE_NAME, ArchiveRequest, Converter, MAX_URLS, Storage, build_archive};
use serde_json::json;
use tracing::{debug, error, info};

use crate::page::{PageView, render_page};

const SCRIPT_JS: &str = include_str!("../static/script.js");

#[derive(Clone)]
pub struct AppState {
    pub converter: Arc<Converter>,
    pub storage: Storage,
    pub namespace_sessions: bool,
}

impl AppState {
    pub fn new(converter: Converter, namespace_sessions: bool) -> Self {
        let storage = converter.storage().clone();
        Self { converter: Arc::new(converter), storage, namespace_sessions }
    }
}

/// Positional form fields `url1` to `url5`, missing ones as empty strings.
pub fn submitted_urls(form: &HashMap<String, String>) -> Vec<String> {
    (1..=MAX_URLS)
        .map(|i| form.get(&format!("url{}", i)).cloned().unwrap_or_default())
        .collect()
}

pub async fn index() -> Html<String> {
    Html(render_page(&PageView::default()))
}

pub async fn submit(State(state): State<AppState>, Form(form): Form<HashMap<String, String>>) -> Html<String> {
    let urls = submitted_urls(&form);
    debug!(?urls, "form submitted");

    let report = if state.namespace_sessions {
        let session = uuid::Uuid::new_v4().simple().to_string();
        let converter = state.converter.as_ref().clone().with_namespace(session);
        converter.convert_batch(&urls).await
    } else {
        state.converter.convert_batch(&urls).await
    };

    info!(
        documents = report.documents.len(),
        errors = report.errors.len(),
        "batch finished"
    );

    Html(render_page(&PageView { urls: &urls, documents: &report.documents, errors: &report.errors }))
}

fn archive_error(message: String) -> Response {
    error!(error = %message, "archive request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": message }))).into_response()
}

/// Bundle the requested documents into one ZIP download.
///
/// The body is parsed by hand so that a malformed request is reported with
/// the same JSON error shape as a missing document.
pub async fn zip_pdfs(State(state): State<AppState>, body: Bytes) -> Response {
    let request: ArchiveRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => return archive_error(e.to_string()),
    };

    let storage = state.storage.clone();
    let built = tokio::task::spawn_blocking(move || build_archive(&storage, &request.pdf_urls)).await;

    match built {
        Ok(Ok(bytes)) => (
            [
                (header::CONTENT_TYPE, ARCHIVE_MEDIA_TYPE.to_string()),
                (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", ARCHIVE_NAME)),
            ],
            Body::from(bytes),
        )
            .into_response(),
        Ok(Err(e)) => archive_error(e.to_string()),
        Err(e) => archive_error(e.to_string()),
    }
}

pub async fn download(State(state): State<AppState>, Path(filename): Path<String>) -> Response {
    let storage = state.storage.clone();
    let name = filename.clone();

    match tokio::task::spawn_blocking(move || storage.read(&name)).await {
        Ok(Ok(bytes)) => (
            [
                (header::CONTENT_TYPE, "application/pdf".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", filename.replace('"', "")),
                ),
            ],
            Body::from(bytes),
        )
            .into_response(),
        Ok(Err(e)) => (StatusCode::NOT_FOUND, e.to_string()).into_response(),
        Err(e) => (StatusCode::NOT_FOUND, e.to_string()).into_response(),
    }
}

pub async fn script() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/javascript")], SCRIPT_JS)
}
