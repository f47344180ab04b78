use axum::{
    Router,
    routing::{get, post},
};

use crate::handlers::{AppState, download, index, script, submit, zip_pdfs};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index).post(submit))
        .route("/zip_pdfs", post(zip_pdfs))
        .route("/download/{filename}", get(download))
        .route("/static/script.js", get(script))
        .with_state(state)
}
