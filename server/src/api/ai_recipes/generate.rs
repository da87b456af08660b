use super::response::{
    add_error, body_rejected, generate_and_respond, validation_failed, FieldErrors,
    GenerateRecipeResponse, GenerationFailedResponse, ValidationErrorResponse,
};
use crate::AppState;
use axum::extract::rejection::JsonRejection;
use axum::{extract::State, response::Response, Json};
use kondate_core::types::{GenerationRequest, CATEGORIES};
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateRecipeRequest {
    /// One of 和食, 洋食, 中華, イタリアン, フレンチ, その他
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub save_to_db: bool,
}

impl GenerateRecipeRequest {
    fn category(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if let Some(category) = self.category() {
            if !CATEGORIES.contains(&category) {
                add_error(
                    &mut errors,
                    "category",
                    format!("category must be one of: {}", CATEGORIES.join(", ")),
                );
            }
        }
        errors
    }
}

/// Generate a recipe, optionally for a category
#[utoipa::path(
    post,
    path = "/api/ai-recipes/generate",
    tag = "ai-recipes",
    request_body = GenerateRecipeRequest,
    responses(
        (status = 200, description = "Generated recipe", body = GenerateRecipeResponse),
        (status = 422, description = "Validation failed", body = ValidationErrorResponse),
        (status = 500, description = "Generation failed", body = GenerationFailedResponse)
    )
)]
pub async fn generate_recipe(
    State(ctx): State<AppState>,
    body: Result<Json<GenerateRecipeRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return body_rejected(rejection),
    };

    let errors = request.validate();
    if !errors.is_empty() {
        return validation_failed(errors);
    }

    let generation = GenerationRequest::Basic {
        category: request.category().map(str::to_string),
    };
    generate_and_respond(&ctx, generation, request.save_to_db).await
}
