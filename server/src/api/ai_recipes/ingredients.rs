use super::response::{
    add_error, body_rejected, generate_and_respond, validation_failed, FieldErrors,
    GenerateRecipeResponse, GenerationFailedResponse, ValidationErrorResponse,
};
use crate::AppState;
use axum::extract::rejection::JsonRejection;
use axum::{extract::State, response::Response, Json};
use kondate_core::types::{GenerationRequest, MAX_REQUESTED_INGREDIENTS};
use serde::Deserialize;
use utoipa::ToSchema;

const MAX_INGREDIENT_NAME_CHARS: usize = 100;

#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateByIngredientsRequest {
    /// 1 to 10 ingredient names, all of which the recipe must use
    #[serde(default)]
    pub ingredients: Option<Vec<String>>,
    #[serde(default)]
    pub save_to_db: bool,
}

impl GenerateByIngredientsRequest {
    /// Trimmed ingredient list, or the field errors that reject it.
    fn validate(&self) -> Result<Vec<String>, FieldErrors> {
        let mut errors = FieldErrors::new();

        let Some(ingredients) = &self.ingredients else {
            add_error(&mut errors, "ingredients", "ingredients is required");
            return Err(errors);
        };

        if ingredients.is_empty() || ingredients.len() > MAX_REQUESTED_INGREDIENTS {
            add_error(
                &mut errors,
                "ingredients",
                format!(
                    "ingredients must contain between 1 and {} items",
                    MAX_REQUESTED_INGREDIENTS
                ),
            );
        }

        let mut trimmed = Vec::with_capacity(ingredients.len());
        for (i, name) in ingredients.iter().enumerate() {
            let name = name.trim();
            if name.is_empty() {
                add_error(
                    &mut errors,
                    format!("ingredients.{}", i),
                    "ingredient must not be empty",
                );
            } else if name.chars().count() > MAX_INGREDIENT_NAME_CHARS {
                add_error(
                    &mut errors,
                    format!("ingredients.{}", i),
                    format!(
                        "ingredient may not be longer than {} characters",
                        MAX_INGREDIENT_NAME_CHARS
                    ),
                );
            }
            trimmed.push(name.to_string());
        }

        if errors.is_empty() {
            Ok(trimmed)
        } else {
            Err(errors)
        }
    }
}

/// Generate a recipe that uses every listed ingredient
#[utoipa::path(
    post,
    path = "/api/ai-recipes/generate/ingredients",
    tag = "ai-recipes",
    request_body = GenerateByIngredientsRequest,
    responses(
        (status = 200, description = "Generated recipe", body = GenerateRecipeResponse),
        (status = 422, description = "Validation failed", body = ValidationErrorResponse),
        (status = 500, description = "Generation failed", body = GenerationFailedResponse)
    )
)]
pub async fn generate_by_ingredients(
    State(ctx): State<AppState>,
    body: Result<Json<GenerateByIngredientsRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return body_rejected(rejection),
    };

    let ingredients = match request.validate() {
        Ok(ingredients) => ingredients,
        Err(errors) => return validation_failed(errors),
    };

    generate_and_respond(
        &ctx,
        GenerationRequest::ByIngredients { ingredients },
        request.save_to_db,
    )
    .await
}
