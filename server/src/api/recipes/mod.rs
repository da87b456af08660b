pub mod get;

use crate::AppState;
use axum::routing::get;
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/recipes endpoints (mounted at /api/recipes)
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}", get(get::get_recipe))
}

#[derive(OpenApi)]
#[openapi(
    paths(get::get_recipe),
    components(schemas(get::RecipeResponse, get::RecipeIngredientResponse))
)]
pub struct ApiDoc;
