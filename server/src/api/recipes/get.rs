use crate::api::ErrorResponse;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use kondate_core::store::{RecipeIngredient, StoredRecipe};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeIngredientResponse {
    pub name: String,
    pub quantity: String,
    pub nutrition_notes: Option<String>,
    pub cooking_method_tips: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeResponse {
    pub id: Uuid,
    pub name: String,
    pub cooking_time: i32,
    pub servings: i32,
    pub calories: i32,
    pub tags: Vec<String>,
    pub category: String,
    pub instructions: Vec<String>,
    /// `manual` or `ai_generated`
    pub source: String,
    pub photo_id: Option<Uuid>,
    pub ingredients: Vec<RecipeIngredientResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<RecipeIngredient> for RecipeIngredientResponse {
    fn from(line: RecipeIngredient) -> Self {
        Self {
            name: line.name,
            quantity: line.quantity,
            nutrition_notes: line.nutrition_notes,
            cooking_method_tips: line.cooking_method_tips,
        }
    }
}

impl From<StoredRecipe> for RecipeResponse {
    fn from(recipe: StoredRecipe) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name,
            cooking_time: recipe.cooking_time,
            servings: recipe.servings,
            calories: recipe.calories,
            tags: recipe.tags,
            category: recipe.category,
            instructions: recipe.instructions,
            source: recipe.source.as_str().to_string(),
            photo_id: recipe.photo_id,
            ingredients: recipe.ingredients.into_iter().map(Into::into).collect(),
            created_at: recipe.created_at,
            updated_at: recipe.updated_at,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Recipe details", body = RecipeResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 500, description = "Failed to fetch recipe", body = ErrorResponse)
    )
)]
pub async fn get_recipe(State(ctx): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    match ctx.store.find_recipe(id) {
        Ok(Some(recipe)) => (StatusCode::OK, Json(RecipeResponse::from(recipe))).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "Recipe not found".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(recipe_id = %id, error = %e, "failed to fetch recipe");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch recipe".to_string(),
                }),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::api;
    use crate::state::test_support::{state_with, LEGACY_REPLY};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use kondate_core::llm::FakeProvider;
    use kondate_core::store::{RecipeDraft, RecipeStore};
    use kondate_core::validate_payload;
    use serde_json::Value;
    use tower::ServiceExt;

    async fn get(app: axum::Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_get_saved_recipe() {
        let (state, store) = state_with(FakeProvider::new(), true);
        let payload = kondate_core::extract_json(LEGACY_REPLY).unwrap();
        let draft = RecipeDraft::from_payload(&validate_payload(&payload).unwrap());
        let saved = store.save_recipe(&draft).unwrap();
        let app = api::router().with_state(state);

        let (status, body) = get(app, &format!("/api/recipes/{}", saved.id)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "豚の生姜焼き");
        assert_eq!(body["source"], "ai_generated");
        assert_eq!(body["ingredients"][0]["name"], "豚ロース");
        assert_eq!(body["ingredients"][1]["quantity"], "1かけ");
        assert_eq!(body["instructions"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_missing_recipe_is_404() {
        let (state, _store) = state_with(FakeProvider::new(), true);
        let app = api::router().with_state(state);

        let (status, body) = get(app, &format!("/api/recipes/{}", uuid::Uuid::new_v4())).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Recipe not found");
    }
}
