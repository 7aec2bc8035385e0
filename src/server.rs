// 🌐 HTTP API - REST surface over one shared Registry
//
// The core assumes exactly one mutator, so the registry lives behind a
// single Mutex here. Every handler takes the lock for the whole operation.

use crate::classifier::{StyleToken, TierSummary};
use crate::error::{IntakeError, RegistryError, ReportError};
use crate::formatter::{format_identifier, format_phone, to_storage_form};
use crate::record::{Record, RecordDraft};
use crate::registry::Registry;
use crate::report::{export_registry, format_brl, format_date};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone, Default)]
pub struct AppState {
    registry: Arc<Mutex<Registry>>,
}

impl AppState {
    pub fn new(registry: Registry) -> Self {
        AppState {
            registry: Arc::new(Mutex::new(registry)),
        }
    }

    fn registry(&self) -> Result<MutexGuard<'_, Registry>, AppError> {
        self.registry
            .lock()
            .map_err(|_| AppError::Internal("registry lock poisoned".to_string()))
    }
}

// ============================================================================
// Responses
// ============================================================================

/// API Response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// Record as shown to clients: display forms plus classification
#[derive(Serialize)]
pub struct RecordResponse {
    cpf: String,
    name: String,
    guardian_name: String,
    birth_date: String,
    address: String,
    email: String,
    phone: String,
    income: f64,
    income_display: String,
    tier: &'static str,
    tier_label: &'static str,
    tier_style: StyleToken,
}

impl From<&Record> for RecordResponse {
    fn from(record: &Record) -> Self {
        let label = record.tier_label();
        Self {
            cpf: record.display_identifier(),
            name: record.name.clone(),
            guardian_name: record.guardian_name.clone(),
            birth_date: format_date(&record.birth_date),
            address: record.address.clone(),
            email: record.email.clone(),
            phone: record.display_phone(),
            income: record.income,
            income_display: format_brl(record.income),
            tier: record.tier().as_str(),
            tier_label: label.text,
            tier_style: label.style,
        }
    }
}

#[derive(Serialize)]
pub struct StatsResponse {
    total_records: usize,
    by_tier: TierSummary,
}

#[derive(Deserialize)]
pub struct FormatQuery {
    #[serde(default)]
    value: String,
}

#[derive(Serialize)]
pub struct FormatResponse {
    display: String,
    storage: String,
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Intake(#[from] IntakeError),

    #[error(transparent)]
    NotFound(#[from] RegistryError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error(transparent)]
    Json(#[from] JsonRejection),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Intake(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Report(ReportError::EmptyRegistry) => StatusCode::CONFLICT,
            AppError::Json(rejection) => rejection.status(),
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("{}", self);
        }
        (status, Json(ApiResponse::<()>::err(self.to_string()))).into_response()
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/records - All records in insertion order
async fn list_records(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let registry = state.registry()?;
    let records: Vec<RecordResponse> = registry.all().iter().map(RecordResponse::from).collect();
    Ok(Json(ApiResponse::ok(records)))
}

/// POST /api/records - Register from raw form input
async fn create_record(
    State(state): State<AppState>,
    payload: Result<Json<RecordDraft>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(draft) = payload?;
    let record = draft.to_record()?;
    let response = RecordResponse::from(&record);

    let mut registry = state.registry()?;
    registry.append(record);
    tracing::info!(total = registry.size(), "record registered");

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(response))))
}

/// GET /api/records/:cpf - Lookup, formatted or bare CPF
async fn get_record(
    State(state): State<AppState>,
    Path(cpf): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let registry = state.registry()?;
    let record = registry.lookup(&cpf)?;
    Ok(Json(ApiResponse::ok(RecordResponse::from(record))))
}

/// GET /api/stats - Count per tier
async fn get_stats(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let registry = state.registry()?;
    Ok(Json(ApiResponse::ok(StatsResponse {
        total_records: registry.size(),
        by_tier: TierSummary::from_records(registry.all()),
    })))
}

/// GET /api/format/cpf?value=
async fn format_cpf(Query(query): Query<FormatQuery>) -> impl IntoResponse {
    Json(ApiResponse::ok(FormatResponse {
        display: format_identifier(&query.value),
        storage: to_storage_form(&query.value),
    }))
}

/// GET /api/format/phone?value=
async fn format_phone_handler(Query(query): Query<FormatQuery>) -> impl IntoResponse {
    Json(ApiResponse::ok(FormatResponse {
        display: format_phone(&query.value),
        storage: to_storage_form(&query.value),
    }))
}

/// GET /api/export - Download the report as text
async fn export(State(state): State<AppState>) -> Result<Response, AppError> {
    let registry = state.registry()?;
    let artifact = export_registry(&registry, &chrono::Local::now())?;

    let disposition = format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        artifact.filename,
        urlencoding::encode(&artifact.filename)
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, artifact.mime_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        artifact.contents,
    )
        .into_response())
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/records", get(list_records).post(create_record))
        .route("/records/:cpf", get(get_record))
        .route("/stats", get(get_stats))
        .route("/format/cpf", get(format_cpf))
        .route("/format/phone", get(format_phone_handler))
        .route("/export", get(export))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

// ============================================================================
// TESTS
// ============================================================================
