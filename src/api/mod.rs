//! HTTP surface: image upload and classification, food lookups, health.

pub mod classify;
pub mod food;
pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::classify::ClassificationOrchestrator;
use crate::food::api::ProductCatalog;
use crate::food::QueryRelaxationLookup;
use crate::upload::UploadStore;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Process-wide handles built once at startup and shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<ClassificationOrchestrator>,
    pub lookup: Arc<QueryRelaxationLookup>,
    pub catalog: Arc<dyn ProductCatalog>,
    pub uploads: UploadStore,
    pub startup_time: DateTime<Utc>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        orchestrator: ClassificationOrchestrator,
        lookup: QueryRelaxationLookup,
        catalog: Arc<dyn ProductCatalog>,
        uploads: UploadStore,
    ) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            lookup: Arc::new(lookup),
            catalog,
            uploads,
            startup_time: Utc::now(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}

/// Create and configure the API router
pub fn build_router(state: AppState) -> Router {
    // Fully permissive CORS, the browser front-end is served from elsewhere
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(3600));

    Router::new()
        .route("/", get(health::home))
        .route("/health", get(health::health_check))
        .route("/upload", post(classify::upload_image))
        .route("/analyze", post(classify::analyze_image))
        .route("/nutrition", get(food::nutrition))
        .route("/recipes", get(food::recipes))
        .route("/barcode/:code", get(food::barcode))
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
        .with_state(state)
}
