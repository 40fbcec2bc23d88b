//! HTTP handler for image-based mango counting

use axum::{
    extract::{Multipart, State},
    Json,
};
use shared::MangoCountResult;

use crate::error::{AppError, AppResult};
use crate::AppState;

/// Count mangoes in the uploaded `image` field
pub async fn segment_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<MangoCountResult>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        if !content_type.starts_with("image/") {
            return Err(AppError::Validation(
                "Uploaded file must be an image".to_string(),
            ));
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read image: {}", e)))?;
        if data.is_empty() {
            return Err(AppError::Validation("Uploaded image is empty".to_string()));
        }

        let result = state
            .mango_count_service()
            .estimate(&data, &content_type)
            .await;
        return Ok(Json(result));
    }

    Err(AppError::Validation("No image uploaded".to_string()))
}
