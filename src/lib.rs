pub mod api;
pub mod classify;
pub mod config;
pub mod error;
pub mod food;
pub mod models;
pub mod providers;
pub mod upload;

// Re-export commonly used items
pub use api::{build_router, AppState};
pub use classify::{Classification, ClassificationOrchestrator, KeywordConfirmer};
pub use config::AppConfig;
pub use food::QueryRelaxationLookup;
