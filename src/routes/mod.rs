// HTTP routes: credential check, instance listing, report download

mod http;

use axum::http::header;
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::service::ReportService;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) service: Arc<ReportService>,
}

pub fn app(service: Arc<ReportService>) -> Router {
    let state = AppState { service };
    // Browser callers read the report filename from Content-Disposition.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([header::CONTENT_DISPOSITION]);
    Router::new()
        .route("/", get(http::root_handler)) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/validate-credentials", post(http::validate_credentials_handler)) // POST /validate-credentials
        .route("/instances", post(http::instances_handler)) // POST /instances
        .route("/generate-report", post(http::generate_report_handler)) // POST /generate-report
        .layer(cors)
        .with_state(state)
}
