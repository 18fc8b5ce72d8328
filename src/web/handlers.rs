//! HTTP handlers for the record API

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::SystemTime;
use sysinfo::System;
use thiserror::Error;
use tracing::debug;

use crate::store::{RecordStorage, StorageError, StoreStats, Version};

/// Shared application state
pub type AppState = Arc<dyn RecordStorage>;

/// Request body for creating a record
#[derive(Debug, Deserialize)]
pub struct AddRequest {
    /// Base64-encoded value
    pub value: String,
}

/// Request body for a compare-and-swap update
#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    /// Base64-encoded value
    pub value: String,
    /// The version the caller last observed
    pub expected_version: Version,
}

/// A record as returned by `GET /records/:key`
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct RecordResponse {
    pub key: String,
    /// Base64-encoded value
    pub value: String,
    pub version: Version,
}

/// The version a record holds after a write
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct VersionResponse {
    pub key: String,
    pub version: Version,
}

/// Error body
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Store and process memory statistics
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub store: StoreStats,
    /// Total system memory in MB
    pub total_memory_mb: f64,
    /// Used system memory in MB
    pub used_memory_mb: f64,
    /// Record data in MB
    pub db_memory_mb: f64,
    /// Whether the store honours the timestamps it is given
    pub tracks_timestamps: bool,
}

/// Errors a handler can answer with
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("value is not valid base64: {0}")]
    InvalidValue(#[from] base64::DecodeError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Storage(StorageError::EntryNotFound) => StatusCode::NOT_FOUND,
            ApiError::Storage(StorageError::EntryAlreadyExists) => StatusCode::CONFLICT,
            ApiError::Storage(StorageError::VersionConflict { .. }) => StatusCode::CONFLICT,
            ApiError::InvalidValue(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

fn decode_value(encoded: &str) -> Result<Bytes, ApiError> {
    Ok(Bytes::from(STANDARD.decode(encoded)?))
}

/// `GET /records/:key`
pub async fn get_record(
    State(store): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<RecordResponse>, ApiError> {
    debug!("GET record '{}'", key);

    let found = store.get(&key)?;
    Ok(Json(RecordResponse {
        value: STANDARD.encode(&found.value),
        version: found.version,
        key,
    }))
}

/// `POST /records/:key`
pub async fn add_record(
    State(store): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<AddRequest>,
) -> Result<(StatusCode, Json<VersionResponse>), ApiError> {
    debug!("ADD record '{}'", key);

    let value = decode_value(&req.value)?;
    store.add(&key, value, SystemTime::now())?;
    Ok((StatusCode::CREATED, Json(VersionResponse { key, version: 0 })))
}

/// `PUT /records/:key`
pub async fn update_record(
    State(store): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<UpdateRequest>,
) -> Result<Json<VersionResponse>, ApiError> {
    debug!(
        "UPDATE record '{}' expecting version {}",
        key, req.expected_version
    );

    let value = decode_value(&req.value)?;
    store.update(&key, value, SystemTime::now(), req.expected_version)?;
    Ok(Json(VersionResponse {
        key,
        version: req.expected_version + 1,
    }))
}

/// `DELETE /records/:key`
pub async fn delete_record(
    State(store): State<AppState>,
    Path(key): Path<String>,
) -> Result<StatusCode, ApiError> {
    debug!("DELETE record '{}'", key);

    store.delete(&key)?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /stats`
pub async fn stats_handler(State(store): State<AppState>) -> impl IntoResponse {
    let mut sys = System::new();
    sys.refresh_memory();

    let total_mem_bytes = sys.total_memory();
    let used_mem_bytes = total_mem_bytes.saturating_sub(sys.available_memory());

    let store_stats = store.stats();

    let stats = StatsResponse {
        store: store_stats,
        total_memory_mb: total_mem_bytes as f64 / 1024.0 / 1024.0,
        used_memory_mb: used_mem_bytes as f64 / 1024.0 / 1024.0,
        db_memory_mb: store_stats.used_memory_bytes as f64 / 1024.0 / 1024.0,
        tracks_timestamps: store.tracks_timestamps(),
    };

    (StatusCode::OK, Json(stats))
}
