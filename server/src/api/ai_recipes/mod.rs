pub mod constraints;
pub mod generate;
pub mod ingredients;
pub mod response;

use crate::AppState;
use axum::{routing::post, Router};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        generate::generate_recipe,
        ingredients::generate_by_ingredients,
        constraints::generate_with_constraints
    ),
    components(schemas(
        generate::GenerateRecipeRequest,
        ingredients::GenerateByIngredientsRequest,
        constraints::GenerateWithConstraintsRequest,
        response::GenerateRecipeResponse,
        response::ValidationErrorResponse,
        response::GenerationFailedResponse
    ))
)]
pub struct ApiDoc;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate", post(generate::generate_recipe))
        .route("/generate/ingredients", post(ingredients::generate_by_ingredients))
        .route("/generate/constraints", post(constraints::generate_with_constraints))
}
