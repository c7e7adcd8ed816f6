//! Axum routes and error-to-status mapping for the submission API.

use adlift_common::AdliftError;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;

use crate::submit::SubmissionService;
use crate::types::{
    CreateAdRequest, CreateBulkAdsRequest, ErrorResponse, HealthResponse, SubmissionResponse,
};

/// Build the API router over a submission service.
pub fn router(service: SubmissionService) -> Router {
    Router::new()
        .route("/api/v1/create_ad", post(create_ad))
        .route("/api/v1/create_bulk_ads", post(create_bulk_ads))
        .route("/api/v1/health", get(health))
        .with_state(service)
}

/// `POST /api/v1/create_ad`
async fn create_ad(
    State(service): State<SubmissionService>,
    Json(request): Json<CreateAdRequest>,
) -> Result<Json<SubmissionResponse>, ApiError> {
    let created = service.create_ad(request)?;
    Ok(Json(SubmissionResponse {
        status: "success".into(),
        message: "Ad created successfully".into(),
        file: created.file.display().to_string(),
    }))
}

/// `POST /api/v1/create_bulk_ads`
async fn create_bulk_ads(
    State(service): State<SubmissionService>,
    Json(request): Json<CreateBulkAdsRequest>,
) -> Result<Json<SubmissionResponse>, ApiError> {
    let created = service.create_bulk_ads(request)?;
    Ok(Json(SubmissionResponse {
        status: "success".into(),
        message: format!("Created {} ads successfully", created.ads_created),
        file: created.file.display().to_string(),
    }))
}

/// `GET /api/v1/health` — fixed healthy status plus current server time.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".into(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Wraps [`AdliftError`] so handlers can use `?` while the transport layer
/// owns the status mapping: client input errors map to `400`, everything
/// else to `500`.
struct ApiError(AdliftError);

impl From<AdliftError> for ApiError {
    fn from(err: AdliftError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            tracing::error!(error = %self.0, "submit.internal_error");
            StatusCode::INTERNAL_SERVER_ERROR
        };
        let body = Json(ErrorResponse {
            error: self.0.to_string(),
        });
        (status, body).into_response()
    }
}
