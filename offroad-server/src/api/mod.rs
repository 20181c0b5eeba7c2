//! Read-only GeoJSON endpoints.

use std::path::Path;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::{Value, json};

use crate::config::ServerConfig;


pub fn routes(config: Arc<ServerConfig>) -> Router {
    Router::new()
        .route("/offroad_edges/merged", get(merged_offroad_edges))
        .route("/waypoints", get(waypoints))
        .with_state(config)
}

/// Merged GeoJSON of all counties.
async fn merged_offroad_edges(State(config): State<Arc<ServerConfig>>) -> Response {
    serve_geojson(&config.merged_file, "Merged file").await
}

async fn waypoints(State(config): State<Arc<ServerConfig>>) -> Response {
    serve_geojson(&config.waypoints_file, "Waypoints file").await
}

/// Returns the file contents unchanged as a JSON body.
async fn serve_geojson(path: &Path, label: &str) -> Response {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::error!("{label} not found: {}", path.display());
            return error_response(StatusCode::NOT_FOUND, format!("{label} not found"));
        }
        Err(e) => {
            tracing::error!("Failed to read {}: {e}", path.display());
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("{label} could not be read"),
            );
        }
    };

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(value) => {
            tracing::info!("Serving {}", path.display());
            Json(value).into_response()
        }
        Err(e) => {
            tracing::error!("{} is not valid JSON: {e}", path.display());
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("{label} is not valid JSON"),
            )
        }
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
