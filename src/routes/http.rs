// Handlers. Request-level failures become JSON `{error, detail}` bodies.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use super::AppState;
use crate::error::ReportError;
use crate::inventory;
use crate::models::{Credentials, ReportRequest};
use crate::version::{NAME, VERSION, banner};

impl IntoResponse for ReportError {
    fn into_response(self) -> Response {
        let status = match &self {
            ReportError::InvalidRequest(_)
            | ReportError::InvalidFrequency(_)
            | ReportError::EmptySelection
            | ReportError::InvalidInstance { .. } => StatusCode::BAD_REQUEST,
            ReportError::Auth(_) => StatusCode::UNAUTHORIZED,
            ReportError::ProviderUnavailable(_) => StatusCode::BAD_GATEWAY,
            ReportError::Write(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::info!(error = %self, "request rejected");
        }
        let body = Json(serde_json::json!({
            "error": self.kind(),
            "detail": self.to_string(),
        }));
        (status, body).into_response()
    }
}

/// Undecodable bodies share the `{error, detail}` shape of the other 400s.
impl From<JsonRejection> for ReportError {
    fn from(rejection: JsonRejection) -> Self {
        ReportError::InvalidRequest(rejection.body_text())
    }
}

/// GET /: plain-text banner.
pub(super) async fn root_handler() -> String {
    banner()
}

/// GET /version: returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// POST /validate-credentials: 200 when the provider accepts the credentials, 401 otherwise.
pub(super) async fn validate_credentials_handler(
    State(state): State<AppState>,
    credentials: Result<Json<Credentials>, JsonRejection>,
) -> Result<impl IntoResponse, ReportError> {
    let Json(credentials) = credentials?;
    state
        .service
        .provider()
        .validate_credentials(&credentials)
        .await?;
    Ok(Json(serde_json::json!({
        "status": "success",
        "message": "Credentials validated successfully",
    })))
}

/// POST /instances: compute and managed-database instances across all regions.
pub(super) async fn instances_handler(
    State(state): State<AppState>,
    credentials: Result<Json<Credentials>, JsonRejection>,
) -> Result<impl IntoResponse, ReportError> {
    let Json(credentials) = credentials?;
    let listing = inventory::list_instances(state.service.provider().as_ref(), &credentials).await?;
    Ok(Json(listing))
}

/// POST /generate-report: the PDF as an attachment.
pub(super) async fn generate_report_handler(
    State(state): State<AppState>,
    request: Result<Json<ReportRequest>, JsonRejection>,
) -> Result<Response, ReportError> {
    let Json(request) = request?;
    let report = state.service.generate(request).await?;
    let disposition = format!("attachment; filename=\"{}\"", report.filename);
    Ok((
        [
            (header::CONTENT_TYPE, report.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        report.bytes,
    )
        .into_response())
}
