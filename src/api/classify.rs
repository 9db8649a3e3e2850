use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use serde::Serialize;

use super::food::RecipeView;
use super::AppState;
use crate::classify::Classification;
use crate::error::{ApiError, ApiResult, StoreError, UploadError};
use crate::food::LookupOutcome;
use crate::models::{ImageHandle, NutritionRecord};

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub filename: Option<String>,
    pub detected_objects: Vec<String>,
}

/// Per-section lookup result inside `/analyze`, so one failing store does not
/// hide the other section.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Section<T> {
    Found { data: T },
    NotFound,
    StoreUnreachable { message: String },
}

impl<T> From<Result<LookupOutcome<T>, StoreError>> for Section<T> {
    fn from(result: Result<LookupOutcome<T>, StoreError>) -> Self {
        match result {
            Ok(LookupOutcome::Found(data)) => Section::Found { data },
            Ok(LookupOutcome::NotFound) => Section::NotFound,
            Err(e) => {
                tracing::error!(error = %e, "Record store unreachable");
                Section::StoreUnreachable { message: e.to_string() }
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub filename: Option<String>,
    pub detected_objects: Vec<String>,
    pub matched_keyword: Option<String>,
    pub nutrition: Option<Section<NutritionRecord>>,
    pub recipes: Option<Section<Vec<RecipeView>>>,
}

/// POST /upload
///
/// Stores the `image` part and returns the classification pipeline's answer.
pub async fn upload_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<UploadResponse>> {
    let (filename, image) = receive_image(&state, multipart).await?;
    let classification = state.orchestrator.classify(&image).await;

    Ok(Json(UploadResponse {
        message: "Image received".to_string(),
        filename,
        detected_objects: vec![classification.display_label().to_string()],
    }))
}

/// POST /analyze
///
/// Classification followed by concurrent nutrition and recipe lookups for the
/// confirmed label.
pub async fn analyze_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<AnalyzeResponse>> {
    let (filename, image) = receive_image(&state, multipart).await?;
    let classification = state.orchestrator.classify(&image).await;
    let detected_objects = vec![classification.display_label().to_string()];

    let Classification::Confirmed { label, matched_keyword, .. } = classification else {
        return Ok(Json(AnalyzeResponse {
            filename,
            detected_objects,
            matched_keyword: None,
            nutrition: None,
            recipes: None,
        }));
    };

    let (nutrition, recipes) = tokio::join!(state.lookup.nutrition(&label), state.lookup.recipes(&label));
    let recipes = recipes.map(|outcome| {
        outcome.map(|list| list.into_iter().map(RecipeView::from).collect::<Vec<_>>())
    });

    Ok(Json(AnalyzeResponse {
        filename,
        detected_objects,
        matched_keyword,
        nutrition: Some(nutrition.into()),
        recipes: Some(recipes.into()),
    }))
}

async fn receive_image(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<(Option<String>, ImageHandle)> {
    let multipart = multipart.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let (filename, bytes) = read_image_field(multipart).await?;
    let image = state.uploads.persist(filename.as_deref(), &bytes).await?;
    Ok((filename, image))
}

async fn read_image_field(mut multipart: Multipart) -> ApiResult<(Option<String>, Bytes)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        if field.name() != Some("image") {
            continue;
        }
        let filename = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        return Ok((filename, bytes));
    }

    Err(UploadError::MissingImage.into())
}
