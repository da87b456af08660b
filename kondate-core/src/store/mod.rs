//! Recipe persistence.
//!
//! [`RecipeDraft::from_payload`] maps a validated payload to what gets
//! written; a [`RecipeStore`] writes it atomically.

mod memory;

pub use memory::MemoryRecipeStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::image::GeneratedImage;
use crate::types::{IngredientLine, NutritionEntry, RecipePayload, RecipeSource};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Database query failed: {0}")]
    Query(String),

    #[error("Recipe not found: {0}")]
    NotFound(Uuid),
}

/// Everything needed to write one generated recipe.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeDraft {
    pub name: String,
    pub cooking_time: i32,
    pub servings: i32,
    pub calories: i32,
    pub tags: Vec<String>,
    pub category: String,
    pub instructions: Vec<String>,
    pub source: RecipeSource,
    /// In display order; position is the index.
    pub ingredients: Vec<IngredientLine>,
    pub nutrition: Vec<NutritionEntry>,
}

impl RecipeDraft {
    pub fn from_payload(payload: &RecipePayload) -> Self {
        let recipe = payload.recipe();
        Self {
            name: recipe.title.clone(),
            cooking_time: recipe.cooking_time,
            servings: recipe.servings,
            calories: recipe.calories,
            tags: recipe.tags.clone(),
            category: recipe.category.clone(),
            instructions: recipe.instructions.clone(),
            source: RecipeSource::AiGenerated,
            ingredients: payload.ingredients().to_vec(),
            nutrition: payload.nutrition().to_vec(),
        }
    }
}

/// An ingredient attached to a stored recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    pub ingredient_id: Uuid,
    pub name: String,
    pub quantity: String,
    pub nutrition_notes: Option<String>,
    pub cooking_method_tips: Option<String>,
}

/// A stored recipe with its ingredients, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecipe {
    pub id: Uuid,
    pub name: String,
    pub cooking_time: i32,
    pub servings: i32,
    pub calories: i32,
    pub tags: Vec<String>,
    pub category: String,
    pub instructions: Vec<String>,
    pub source: RecipeSource,
    pub photo_id: Option<Uuid>,
    pub ingredients: Vec<RecipeIngredient>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Stored nutrition record for one ingredient name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientNutrition {
    pub ingredient_name: String,
    pub nutrition_facts: serde_json::Value,
    pub health_benefits: serde_json::Value,
    pub cooking_tips: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

/// Storage for generated recipes.
///
/// `save_recipe` is all-or-nothing: the recipe row, its ingredient
/// attachments and the nutrition upserts commit together or not at all.
/// Ingredients are matched by exact name and created when missing.
pub trait RecipeStore: Send + Sync {
    fn save_recipe(&self, draft: &RecipeDraft) -> Result<StoredRecipe, StoreError>;

    /// Soft-deleted recipes are not returned.
    fn find_recipe(&self, id: Uuid) -> Result<Option<StoredRecipe>, StoreError>;

    fn find_nutrition(&self, ingredient_name: &str)
        -> Result<Option<IngredientNutrition>, StoreError>;

    /// Store a photo and link it to the recipe. Returns the photo id.
    fn attach_photo(&self, recipe_id: Uuid, image: &GeneratedImage) -> Result<Uuid, StoreError>;
}
