//! Health check endpoint.

use actix_web::{HttpResponse, web};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: String,
    /// `up`, `down`, or `memory` when running without a database.
    pub store: &'static str,
}

/// GET /health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let response = HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().to_rfc3339(),
        store: store_status(&state).await,
    };

    HttpResponse::Ok().json(response)
}

#[cfg(feature = "postgres")]
async fn store_status(state: &AppState) -> &'static str {
    match &state.db {
        Some(db) if db.ping().await => "up",
        Some(_) => "down",
        None => "memory",
    }
}

#[cfg(not(feature = "postgres"))]
async fn store_status(_state: &AppState) -> &'static str {
    "memory"
}
