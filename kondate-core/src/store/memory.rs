//! In-memory recipe store.
//!
//! Each save works on a copy of the state and swaps it in on success, which
//! gives the same all-or-nothing behavior as a database transaction.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;
use uuid::Uuid;

use super::{
    IngredientNutrition, RecipeDraft, RecipeIngredient, RecipeStore, StoreError, StoredRecipe,
};
use crate::image::GeneratedImage;

#[derive(Debug, Clone, Default)]
struct State {
    recipes: HashMap<Uuid, StoredRecipe>,
    /// name -> id
    ingredients: HashMap<String, Uuid>,
    nutrition: HashMap<String, IngredientNutrition>,
    photos: HashMap<Uuid, GeneratedImage>,
}

#[derive(Debug, Default)]
pub struct MemoryRecipeStore {
    state: Mutex<State>,
    /// Saving an ingredient with this name fails, for rollback tests.
    poisoned_ingredient: Option<String>,
}

impl MemoryRecipeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that fails any save touching `ingredient_name`.
    pub fn failing_on_ingredient(ingredient_name: &str) -> Self {
        Self {
            state: Mutex::default(),
            poisoned_ingredient: Some(ingredient_name.to_string()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn recipe_count(&self) -> usize {
        self.lock().recipes.len()
    }

    pub fn ingredient_count(&self) -> usize {
        self.lock().ingredients.len()
    }

    pub fn photo(&self, photo_id: Uuid) -> Option<GeneratedImage> {
        self.lock().photos.get(&photo_id).cloned()
    }
}

impl RecipeStore for MemoryRecipeStore {
    fn save_recipe(&self, draft: &RecipeDraft) -> Result<StoredRecipe, StoreError> {
        let mut guard = self.lock();
        let mut state = guard.clone();
        let now = Utc::now();

        let mut ingredients = Vec::with_capacity(draft.ingredients.len());
        for line in &draft.ingredients {
            if self.poisoned_ingredient.as_deref() == Some(line.name.as_str()) {
                return Err(StoreError::Query(format!(
                    "insert into ingredients failed for {}",
                    line.name
                )));
            }

            let ingredient_id = *state
                .ingredients
                .entry(line.name.clone())
                .or_insert_with(Uuid::new_v4);

            ingredients.push(RecipeIngredient {
                ingredient_id,
                name: line.name.clone(),
                quantity: line.amount.clone(),
                nutrition_notes: line.nutrition_notes.clone(),
                cooking_method_tips: line.cooking_method_tips.clone(),
            });
        }

        for entry in &draft.nutrition {
            state.nutrition.insert(
                entry.ingredient_name.clone(),
                IngredientNutrition {
                    ingredient_name: entry.ingredient_name.clone(),
                    nutrition_facts: entry.nutrition_facts.clone(),
                    health_benefits: entry.health_benefits.clone(),
                    cooking_tips: entry.cooking_tips.clone(),
                    updated_at: now,
                },
            );
        }

        let recipe = StoredRecipe {
            id: Uuid::new_v4(),
            name: draft.name.clone(),
            cooking_time: draft.cooking_time,
            servings: draft.servings,
            calories: draft.calories,
            tags: draft.tags.clone(),
            category: draft.category.clone(),
            instructions: draft.instructions.clone(),
            source: draft.source,
            photo_id: None,
            ingredients,
            created_at: now,
            updated_at: now,
        };
        state.recipes.insert(recipe.id, recipe.clone());

        *guard = state;
        Ok(recipe)
    }

    fn find_recipe(&self, id: Uuid) -> Result<Option<StoredRecipe>, StoreError> {
        Ok(self.lock().recipes.get(&id).cloned())
    }

    fn find_nutrition(
        &self,
        ingredient_name: &str,
    ) -> Result<Option<IngredientNutrition>, StoreError> {
        Ok(self.lock().nutrition.get(ingredient_name).cloned())
    }

    fn attach_photo(&self, recipe_id: Uuid, image: &GeneratedImage) -> Result<Uuid, StoreError> {
        let mut state = self.lock();
        let photo_id = Uuid::new_v4();

        let recipe = state
            .recipes
            .get_mut(&recipe_id)
            .ok_or(StoreError::NotFound(recipe_id))?;
        recipe.photo_id = Some(photo_id);
        recipe.updated_at = Utc::now();

        state.photos.insert(photo_id, image.clone());
        Ok(photo_id)
    }
}
