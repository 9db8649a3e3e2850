use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use grocery_lens::classify::{ClassificationOrchestrator, KeywordConfirmer};
use grocery_lens::food::api::{OpenFoodFactsClient, SpoonacularClient};
use grocery_lens::food::{LookupOutcome, QueryRelaxationLookup};
use grocery_lens::models::ImageHandle;
use grocery_lens::providers::{GoogleVisionProvider, HuggingFaceCaptionProvider};
use grocery_lens::upload::UploadStore;
use grocery_lens::{build_router, AppConfig, AppState};
use serde_json::json;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    #[arg(long, default_value = "5050")]
    port: u16,

    #[arg(long, default_value = "uploads")]
    upload_dir: PathBuf,

    /// Classify a local image, print the result and exit instead of serving
    #[arg(long)]
    image: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = AppConfig::from_env().context("Invalid configuration")?;
    let state = build_state(&config, &args).await?;

    match &args.image {
        Some(path) => run_once(&state, path).await,
        None => run_api_server(state, &args).await,
    }
}

/// Builds every provider and store client once; they are shared by all requests.
async fn build_state(config: &AppConfig, args: &Args) -> Result<AppState> {
    if config.web_entity.api_key.is_none() {
        tracing::warn!("GOOGLE_VISION_API_KEY not set, web-entity stage will always fall through");
    }
    if config.caption.api_key.is_none() {
        tracing::warn!("HUGGINGFACE_API_TOKEN not set, caption stage will always fall through");
    }
    if config.food.spoonacular_api_key.is_none() {
        tracing::warn!("SPOONACULAR_API_KEY not set, nutrition and recipe lookups will fail");
    }

    let orchestrator = ClassificationOrchestrator::new(
        Arc::new(GoogleVisionProvider::new(&config.web_entity)?),
        Arc::new(HuggingFaceCaptionProvider::new(&config.caption)?),
        KeywordConfirmer::new(&config.keywords),
        config.provider_timeout,
    );

    let lookup = QueryRelaxationLookup::new(
        Arc::new(SpoonacularClient::new(&config.food)?),
        config.food.recipe_base_url.clone(),
    );
    let catalog = Arc::new(OpenFoodFactsClient::new(&config.food)?);

    let uploads = UploadStore::new(&args.upload_dir)
        .await
        .with_context(|| format!("Failed to create upload dir {}", args.upload_dir.display()))?;

    Ok(AppState::new(orchestrator, lookup, catalog, uploads).with_max_upload_bytes(config.max_upload_bytes))
}

async fn run_once(state: &AppState, path: &Path) -> Result<()> {
    let classification = state.orchestrator.classify(&ImageHandle::new(path)).await;

    let mut report = json!({ "detected_objects": [classification.display_label()] });
    if let Some(label) = classification.label() {
        let (nutrition, recipes) = tokio::join!(state.lookup.nutrition(label), state.lookup.recipes(label));
        report["nutrition"] = match nutrition? {
            LookupOutcome::Found(record) => json!(record),
            LookupOutcome::NotFound => json!(null),
        };
        report["recipes"] = match recipes? {
            LookupOutcome::Found(records) => json!(records),
            LookupOutcome::NotFound => json!([]),
        };
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn run_api_server(state: AppState, args: &Args) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", args.host, args.port))?;

    let app = build_router(state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
