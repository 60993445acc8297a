use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::booking::Booking;
use crate::export::BookingExport;
use crate::normalizer::{self, NormalizeReport, SourceColumns};
use crate::persistence::{self, PersistenceError};
use crate::pivot::PartitionPivot;

#[derive(Clone)]
pub struct AppState {
    export: Arc<RwLock<BookingExport>>,
    columns: SourceColumns,
}

impl AppState {
    pub fn new(export: BookingExport) -> Self {
        Self::with_columns(export, SourceColumns::default())
    }

    pub fn with_columns(export: BookingExport, columns: SourceColumns) -> Self {
        Self {
            export: Arc::new(RwLock::new(export)),
            columns,
        }
    }

    fn export(&self) -> Arc<RwLock<BookingExport>> {
        self.export.clone()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    Invalid(String),
    Internal(String),
}

impl ApiError {
    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }
}

impl From<polars::prelude::PolarsError> for ApiError {
    fn from(value: polars::prelude::PolarsError) -> Self {
        ApiError::Internal(value.to_string())
    }
}

impl From<PersistenceError> for ApiError {
    fn from(value: PersistenceError) -> Self {
        match value {
            PersistenceError::Schema(_)
            | PersistenceError::Csv(_)
            | PersistenceError::InvalidData(_) => ApiError::Invalid(value.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Invalid(message) => {
                let body = Json(ErrorBody {
                    error: "invalid_request",
                    message,
                });
                (StatusCode::BAD_REQUEST, body).into_response()
            }
            ApiError::Internal(message) => {
                let body = Json(ErrorBody {
                    error: "internal_error",
                    message,
                });
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/export/csv", post(upload_csv))
        .route("/bookings", get(list_bookings).post(replace_bookings))
        .route("/events", get(list_events))
        .route("/pivots", post(generate_pivots))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, export: BookingExport) -> std::io::Result<()> {
    let state = AppState::new(export);
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn upload_csv(
    State(state): State<AppState>,
    body: String,
) -> Result<(StatusCode, Json<NormalizeReport>), ApiError> {
    let export = persistence::read_export(body.as_bytes(), &state.columns)?;
    let report = export.report().clone();
    {
        let shared = state.export();
        let mut guard = shared.write();
        *guard = export;
    }
    Ok((StatusCode::CREATED, Json(report)))
}

async fn replace_bookings(
    State(state): State<AppState>,
    Json(bookings): Json<Vec<Booking>>,
) -> Result<(StatusCode, Json<NormalizeReport>), ApiError> {
    normalizer::validate_bookings(&bookings).map_err(|err| ApiError::invalid(err.to_string()))?;
    let report = NormalizeReport::passthrough(bookings.len());
    let replacement = BookingExport::from_bookings(bookings, report.clone())?;
    {
        let shared = state.export();
        let mut guard = shared.write();
        *guard = replacement;
    }
    Ok((StatusCode::CREATED, Json(report)))
}

async fn list_bookings(State(state): State<AppState>) -> Result<Json<Vec<Booking>>, ApiError> {
    let shared = state.export();
    let bookings = {
        let guard = shared.read();
        guard.bookings()?
    };
    Ok(Json(bookings))
}

async fn list_events(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    let shared = state.export();
    let events = {
        let guard = shared.read();
        guard.event_names()?
    };
    Ok(Json(events))
}

#[derive(Debug, Deserialize)]
struct PivotRequest {
    events: Vec<String>,
}

async fn generate_pivots(
    State(state): State<AppState>,
    Json(request): Json<PivotRequest>,
) -> Result<Json<Vec<PartitionPivot>>, ApiError> {
    let shared = state.export();
    let partitions = {
        let guard = shared.read();
        guard.pivot_partitions(&request.events)?
    };
    Ok(Json(partitions))
}
