use axum::{
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::{header, Method},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::{
    error::AppError,
    services::{
        chart::{ArcSlice, DistributionBucket, InnerDisk},
        session::DashboardSnapshot,
        upload::UploadFile,
    },
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/dashboard/upload", post(upload_file))
        .route("/dashboard/state", get(dashboard_state))
        .route("/dashboard/chart", get(chart_geometry))
        .route("/dashboard/chart.svg", get(chart_svg))
        // File size is only a guideline; the analysis service decides.
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
}

#[derive(Debug, Deserialize)]
pub struct ChartQuery {
    size: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct ChartResponse {
    size: f64,
    legend: Vec<DistributionBucket>,
    slices: Vec<ArcSlice>,
    inner_disk: Option<InnerDisk>,
}

async fn upload_file(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<DashboardSnapshot>, AppError> {
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart field: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::InvalidInput("No filename provided".to_string()))?;
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidInput(format!("Failed to read file data: {}", e)))?;
        file = Some(UploadFile::new(file_name, data)?);
    }

    let file = file.ok_or_else(|| AppError::InvalidInput("No file provided".to_string()))?;
    tracing::info!("Received {} ({} bytes)", file.file_name, file.size());

    let snapshot = state.sessions.upload(file).await?;
    Ok(Json(snapshot.as_ref().clone()))
}

async fn dashboard_state(State(state): State<Arc<AppState>>) -> Json<DashboardSnapshot> {
    Json(state.sessions.snapshot().as_ref().clone())
}

async fn chart_geometry(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ChartQuery>,
) -> Result<Json<ChartResponse>, AppError> {
    let size = chart_size(&state, &query)?;
    let snapshot = state.sessions.snapshot();
    let slices = snapshot.chart_slices(size);
    let inner_disk = (!slices.is_empty()).then(|| crate::services::chart::inner_disk(size));

    Ok(Json(ChartResponse {
        size,
        legend: snapshot.distribution.clone(),
        slices,
        inner_disk,
    }))
}

async fn chart_svg(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ChartQuery>,
) -> Result<impl IntoResponse, AppError> {
    let size = chart_size(&state, &query)?;
    let svg = state.sessions.snapshot().chart_svg(size);
    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg))
}

fn chart_size(state: &AppState, query: &ChartQuery) -> Result<f64, AppError> {
    let size = query.size.unwrap_or(state.config.chart_size);
    if !(size.is_finite() && size > 0.0) {
        return Err(AppError::InvalidInput(format!("Invalid chart size: {}", size)));
    }
    Ok(size)
}
