use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use log::{error, info, warn};
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::config::Config;
use crate::error::IngestError;
use crate::grid::CellValue;
use crate::header::locate_header;
use crate::ingest;
use crate::loader::{self, SourceFormat};
use crate::query::{self, ListQuery};
use crate::record::{Record, RecordSet};
use crate::saving;
use crate::store::RecordStore;
use crate::video::with_normalized_videos;

pub struct AppState {
    pub store: RecordStore,
    pub config: Config,
    /// Held from writing the source file until the store swap, so the stored
    /// file and the served set always come from the same upload
    commit: Mutex<()>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self::with_records(config, RecordSet::default())
    }

    pub fn with_records(config: Config, records: RecordSet) -> Self {
        AppState {
            store: RecordStore::new(records),
            config,
            commit: Mutex::new(()),
        }
    }
}

/// Errors surfaced to HTTP clients as `{"error": "..."}`
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("malformed upload: {0}")]
    BadUpload(String),

    #[error("Server error")]
    Query(#[from] QueryRejection),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Ingest(IngestError::NoFileProvided) | ApiError::BadUpload(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Ingest(IngestError::UnreadableSpreadsheet(_))
            | ApiError::Ingest(IngestError::HeaderNotFound { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Ingest(_) | ApiError::Query(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match &self {
            ApiError::Ingest(IngestError::NoFileProvided) => "No file uploaded".to_string(),
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[derive(Serialize)]
struct ExercisesResponse {
    exercises: Vec<Record>,
    total: usize,
    page: usize,
    #[serde(rename = "totalPages")]
    total_pages: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    message: &'static str,
    count: usize,
    file_name: String,
    saved_as: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReloadResponse {
    success: bool,
    exercises_loaded: usize,
    sample_exercises: Vec<Record>,
}

pub fn router(state: Arc<AppState>) -> Router {
    let static_dir = state.config.static_dir.clone();
    let body_limit = state.config.max_upload_bytes();

    Router::new()
        .route("/", get(serve_index))
        .route("/api/upload", post(upload))
        .route("/api/exercises", get(list_exercises))
        .route("/api/filters", get(list_filters))
        .route("/api/debug/excel", get(debug_excel))
        .route("/api/debug/load-exercises", post(debug_reload))
        .fallback_service(ServeDir::new(static_dir))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = config.bind_addr();
    let state = Arc::new(AppState::new(config));

    info!("Attempting to load exercises from the upload directory...");
    let startup = Arc::clone(&state);
    match tokio::task::spawn_blocking(move || reload_from_disk(&startup)).await? {
        Ok(count) => info!("serving {} exercises", count),
        Err(e) => warn!("starting without exercises: {}", e),
    }

    let app = router(state);
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Re-ingest the stored source file and publish it. Blocking.
pub fn reload_from_disk(state: &AppState) -> Result<usize, IngestError> {
    let dir = &state.config.upload_dir;
    let (path, format) = saving::find_source(dir).ok_or_else(|| {
        error!("No spreadsheet found in {}", dir.display());
        IngestError::NoFileProvided
    })?;
    info!("Found spreadsheet: {}", path.display());

    let bytes = std::fs::read(&path)?;
    let ingested = ingest::ingest(&bytes, format, &state.config.ingest_options()).map_err(|e| {
        error!("Error loading exercises from {}: {}", path.display(), e);
        e
    })?;

    Ok(state.store.replace(ingested.records))
}

async fn serve_index() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}

async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadUpload(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload.xlsx").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadUpload(e.to_string()))?;
        file = Some((file_name, bytes));
    }

    let Some((file_name, bytes)) = file else {
        warn!("upload rejected: no file attached");
        return Err(IngestError::NoFileProvided.into());
    };
    info!("File uploaded: {} ({} bytes)", file_name, bytes.len());

    let format = SourceFormat::from_file_name(&file_name);
    let options = state.config.ingest_options();
    let upload_dir = state.config.upload_dir.clone();

    // Parse first, persist second: a rejected upload leaves both the served
    // set and the stored file untouched.
    let parse_bytes = bytes.clone();
    let ingested = tokio::task::spawn_blocking(move || ingest::ingest(&parse_bytes, format, &options))
        .await
        .map_err(|e| IngestError::ServerFault(e.to_string()))
        .and_then(|r| r)
        .map_err(|e| {
            error!("upload of {} rejected: {}", file_name, e);
            ApiError::from(e)
        })?;

    let _commit = state.commit.lock().await;
    let saved = tokio::task::spawn_blocking(move || saving::save_source(&upload_dir, &bytes, format))
        .await
        .map_err(|e| IngestError::ServerFault(e.to_string()))?
        .map_err(|e| {
            error!("could not store {}: {}", file_name, e);
            ApiError::from(IngestError::from(e))
        })?;

    let count = state.store.replace(ingested.records);
    info!("File saved as: {}", saved.display());

    Ok(Json(UploadResponse {
        message: "File uploaded and processed successfully",
        count,
        file_name,
        saved_as: saved
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
    }))
}

async fn list_exercises(
    State(state): State<Arc<AppState>>,
    params: Result<Query<HashMap<String, String>>, QueryRejection>,
) -> Result<Json<ExercisesResponse>, ApiError> {
    let Query(params) = params.map_err(|e| {
        error!("bad exercises query: {}", e);
        ApiError::from(e)
    })?;

    let query = ListQuery::from_params(&params);
    let set = state.store.get();
    let page = query::list(&set, &query);

    Ok(Json(ExercisesResponse {
        exercises: page.items.into_iter().map(with_normalized_videos).collect(),
        total: page.total,
        page: page.page,
        total_pages: page.total_pages,
    }))
}

async fn list_filters(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(query::facets(&state.store.get()))
}

async fn debug_excel(State(state): State<Arc<AppState>>) -> Response {
    let blocking = Arc::clone(&state);
    let preview = tokio::task::spawn_blocking(move || preview_source(&blocking)).await;

    match preview {
        Ok(Ok(body)) => Json(body).into_response(),
        Ok(Err(e)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Error reading Excel file", "details": e.to_string() })),
        )
            .into_response(),
        Err(e) => ApiError::from(IngestError::ServerFault(e.to_string())).into_response(),
    }
}

fn preview_source(state: &AppState) -> Result<serde_json::Value, IngestError> {
    let dir = &state.config.upload_dir;
    let Some((path, _)) = saving::find_source(dir) else {
        return Ok(json!({
            "error": "Excel file not found",
            "message": "Please upload an exercise spreadsheet first",
            "availableFiles": saving::list_spreadsheets(dir),
        }));
    };

    let loaded = loader::load_grid_from_path(&path)?;
    let options = state.config.ingest_options();
    let header_row = locate_header(&loaded.grid, options.header_scan_rows, options.header_policy);
    let first_rows: Vec<&Vec<CellValue>> = loaded.grid.iter().take(5).collect();
    let set = state.store.get();

    Ok(json!({
        "fileExists": true,
        "file": path.file_name().map(|n| n.to_string_lossy().into_owned()),
        "sheets": loaded.sheet_names,
        "currentSheet": loaded.sheet,
        "totalRows": loaded.grid.len(),
        "firstFewRows": first_rows,
        "headerPolicy": options.header_policy.to_string(),
        "headerRow": header_row.map(|i| i + 1),
        "columns": set.columns,
        "exercisesLoaded": set.len(),
        "loadedAt": set.loaded_at,
        "sampleExercise": set.records.first(),
        "allExercises": set.records.iter().take(5).collect::<Vec<_>>(),
    }))
}

async fn debug_reload(State(state): State<Arc<AppState>>) -> Result<Json<ReloadResponse>, ApiError> {
    let _commit = state.commit.lock().await;
    let blocking = Arc::clone(&state);
    let count = tokio::task::spawn_blocking(move || reload_from_disk(&blocking))
        .await
        .map_err(|e| IngestError::ServerFault(e.to_string()))??;

    let set = state.store.get();
    Ok(Json(ReloadResponse {
        success: true,
        exercises_loaded: count,
        sample_exercises: set.records.iter().take(3).cloned().collect(),
    }))
}
