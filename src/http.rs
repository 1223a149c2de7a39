//! HTTP routes for county lookup and archive download.

use axum::{
    Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::archive;
use crate::error::{ArchiveError, LoadError};
use crate::reference_cache::ReferenceCache;
use crate::types::{ARCHIVE_MIME, CountyZip, DEFAULT_ARCHIVE_NAME};

/// Application state shared across all requests
#[derive(Clone)]
pub struct AppState {
    pub cache: ReferenceCache,
}

/// Build the Axum application with routes and middleware
pub fn build_app(cache: ReferenceCache) -> Router {
    let state = AppState { cache };

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // API routes
        .route("/api/counties", get(list_counties))
        .route("/api/zipcodes", post(lookup_zipcodes))
        .route("/api/export", post(export_archive))
        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

/// Every county identifier available for selection
async fn list_counties(
    State(state): State<AppState>,
) -> Result<Json<CountiesResponse>, ApiError> {
    let table = state.cache.get_or_load().await?;
    Ok(Json(CountiesResponse {
        success: true,
        data: table.counties(),
    }))
}

#[derive(Serialize)]
struct CountiesResponse {
    success: bool,
    data: Vec<String>,
}

#[derive(Deserialize)]
struct SelectionRequest {
    #[serde(default)]
    counties: Vec<String>,
}

impl SelectionRequest {
    fn require_counties(&self) -> Result<&[String], ApiError> {
        if self.counties.is_empty() {
            return Err(ApiError::EmptySelection);
        }
        Ok(&self.counties)
    }
}

/// Zip codes of the selected counties
async fn lookup_zipcodes(
    State(state): State<AppState>,
    Json(request): Json<SelectionRequest>,
) -> Result<Json<LookupResponse>, ApiError> {
    let counties = request.require_counties()?;
    let table = state.cache.get_or_load().await?;

    let data = table.lookup(counties);
    tracing::info!(
        "Looked up {} zip codes for {} counties",
        data.len(),
        counties.len()
    );

    Ok(Json(LookupResponse {
        success: true,
        data,
    }))
}

#[derive(Serialize)]
struct LookupResponse {
    success: bool,
    data: Vec<CountyZip>,
}

/// Zip archive with one CSV per selected county
async fn export_archive(
    State(state): State<AppState>,
    Json(request): Json<SelectionRequest>,
) -> Result<Response, ApiError> {
    let counties = request.require_counties()?;
    let table = state.cache.get_or_load().await?;

    let records = table.filter(counties);
    tracing::info!(
        "Exporting {} zip codes for {} counties",
        records.len(),
        counties.len()
    );

    let bytes = archive::build_archive(&records)?;

    let disposition = format!("attachment; filename=\"{}\"", DEFAULT_ARCHIVE_NAME);
    Ok((
        [
            (header::CONTENT_TYPE, ARCHIVE_MIME.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

/// Why a lookup or export request could not be served
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Please select at least one county")]
    EmptySelection,

    #[error("The application could not load the necessary geo data: {0}")]
    ReferenceUnavailable(#[from] LoadError),

    #[error("Could not build the archive: {0}")]
    Archive(#[from] ArchiveError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::EmptySelection => StatusCode::BAD_REQUEST,
            ApiError::ReferenceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Archive(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        }

        let body = ErrorBody {
            success: false,
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
