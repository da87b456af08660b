//! Postgres-backed recipe store.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::upsert::excluded;
use kondate_core::image::GeneratedImage;
use kondate_core::store::{
    IngredientNutrition, RecipeDraft, RecipeIngredient, RecipeStore, StoreError, StoredRecipe,
};
use kondate_core::types::RecipeSource;
use uuid::Uuid;

use crate::db::DbPool;
use crate::models::{
    self, NewIngredient, NewIngredientNutrition, NewPhoto, NewRecipe, NewRecipeIngredient,
};
use crate::schema::{ingredient_nutritions, ingredients, photos, recipe_ingredients, recipes};

pub struct PgRecipeStore {
    pool: DbPool,
}

impl PgRecipeStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<PooledConnection<ConnectionManager<PgConnection>>, StoreError> {
        self.pool
            .get()
            .map_err(|e| StoreError::Connection(e.to_string()))
    }
}

fn query_error(e: diesel::result::Error) -> StoreError {
    StoreError::Query(e.to_string())
}

fn to_nullable(values: &[String]) -> Vec<Option<String>> {
    values.iter().cloned().map(Some).collect()
}

fn load_recipe(conn: &mut PgConnection, id: Uuid) -> QueryResult<Option<StoredRecipe>> {
    let Some(recipe) = recipes::table
        .filter(recipes::id.eq(id))
        .filter(recipes::deleted_at.is_null())
        .select(models::Recipe::as_select())
        .first(conn)
        .optional()?
    else {
        return Ok(None);
    };

    let lines: Vec<(models::RecipeIngredient, String)> = recipe_ingredients::table
        .inner_join(ingredients::table)
        .filter(recipe_ingredients::recipe_id.eq(id))
        .order(recipe_ingredients::position.asc())
        .select((models::RecipeIngredient::as_select(), ingredients::name))
        .load(conn)?;

    Ok(Some(StoredRecipe {
        id: recipe.id,
        name: recipe.name,
        cooking_time: recipe.cooking_time,
        servings: recipe.servings,
        calories: recipe.calories,
        tags: recipe.tags.into_iter().flatten().collect(),
        category: recipe.category,
        instructions: recipe.instructions.into_iter().flatten().collect(),
        source: recipe.source.parse().unwrap_or(RecipeSource::Manual),
        photo_id: recipe.photo_id,
        ingredients: lines
            .into_iter()
            .map(|(line, name)| RecipeIngredient {
                ingredient_id: line.ingredient_id,
                name,
                quantity: line.quantity,
                nutrition_notes: line.nutrition_notes,
                cooking_method_tips: line.cooking_method_tips,
            })
            .collect(),
        created_at: recipe.created_at,
        updated_at: recipe.updated_at,
    }))
}

/// Exact-name lookup, creating the ingredient when missing.
fn ingredient_id(conn: &mut PgConnection, name: &str) -> QueryResult<Uuid> {
    diesel::insert_into(ingredients::table)
        .values(NewIngredient { name })
        .on_conflict(ingredients::name)
        .do_nothing()
        .execute(conn)?;

    ingredients::table
        .filter(ingredients::name.eq(name))
        .select(ingredients::id)
        .first(conn)
}

impl RecipeStore for PgRecipeStore {
    fn save_recipe(&self, draft: &RecipeDraft) -> Result<StoredRecipe, StoreError> {
        let mut conn = self.conn()?;

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            let recipe_id: Uuid = diesel::insert_into(recipes::table)
                .values(NewRecipe {
                    name: &draft.name,
                    cooking_time: draft.cooking_time,
                    servings: draft.servings,
                    calories: draft.calories,
                    tags: to_nullable(&draft.tags),
                    category: &draft.category,
                    instructions: to_nullable(&draft.instructions),
                    source: draft.source.as_str(),
                })
                .returning(recipes::id)
                .get_result(conn)?;

            for (position, line) in draft.ingredients.iter().enumerate() {
                let ingredient_id = ingredient_id(conn, &line.name)?;

                diesel::insert_into(recipe_ingredients::table)
                    .values(NewRecipeIngredient {
                        recipe_id,
                        ingredient_id,
                        position: position as i32,
                        quantity: &line.amount,
                        nutrition_notes: line.nutrition_notes.as_deref(),
                        cooking_method_tips: line.cooking_method_tips.as_deref(),
                    })
                    .execute(conn)?;
            }

            for entry in &draft.nutrition {
                diesel::insert_into(ingredient_nutritions::table)
                    .values(NewIngredientNutrition {
                        ingredient_name: &entry.ingredient_name,
                        nutrition_facts: entry.nutrition_facts.clone(),
                        health_benefits: entry.health_benefits.clone(),
                        cooking_tips: entry.cooking_tips.clone(),
                    })
                    .on_conflict(ingredient_nutritions::ingredient_name)
                    .do_update()
                    .set((
                        ingredient_nutritions::nutrition_facts
                            .eq(excluded(ingredient_nutritions::nutrition_facts)),
                        ingredient_nutritions::health_benefits
                            .eq(excluded(ingredient_nutritions::health_benefits)),
                        ingredient_nutritions::cooking_tips
                            .eq(excluded(ingredient_nutritions::cooking_tips)),
                        ingredient_nutritions::updated_at.eq(Utc::now()),
                        ingredient_nutritions::deleted_at.eq(None::<DateTime<Utc>>),
                    ))
                    .execute(conn)?;
            }

            load_recipe(conn, recipe_id)?.ok_or(diesel::result::Error::NotFound)
        })
        .map_err(query_error)
    }

    fn find_recipe(&self, id: Uuid) -> Result<Option<StoredRecipe>, StoreError> {
        let mut conn = self.conn()?;
        load_recipe(&mut conn, id).map_err(query_error)
    }

    fn find_nutrition(
        &self,
        ingredient_name: &str,
    ) -> Result<Option<IngredientNutrition>, StoreError> {
        let mut conn = self.conn()?;

        let row = ingredient_nutritions::table
            .filter(ingredient_nutritions::ingredient_name.eq(ingredient_name))
            .filter(ingredient_nutritions::deleted_at.is_null())
            .select(models::IngredientNutrition::as_select())
            .first(&mut conn)
            .optional()
            .map_err(query_error)?;

        Ok(row.map(|row| IngredientNutrition {
            ingredient_name: row.ingredient_name,
            nutrition_facts: row.nutrition_facts,
            health_benefits: row.health_benefits,
            cooking_tips: row.cooking_tips,
            updated_at: row.updated_at,
        }))
    }

    fn attach_photo(&self, recipe_id: Uuid, image: &GeneratedImage) -> Result<Uuid, StoreError> {
        let mut conn = self.conn()?;

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            let photo_id: Uuid = diesel::insert_into(photos::table)
                .values(NewPhoto {
                    content_type: &image.content_type,
                    data: &image.data,
                    source_url: Some(image.source_url.as_str()),
                })
                .returning(photos::id)
                .get_result(conn)?;

            let updated = diesel::update(
                recipes::table
                    .filter(recipes::id.eq(recipe_id))
                    .filter(recipes::deleted_at.is_null()),
            )
            .set((
                recipes::photo_id.eq(photo_id),
                recipes::updated_at.eq(Utc::now()),
            ))
            .execute(conn)?;

            if updated == 0 {
                return Err(diesel::result::Error::NotFound);
            }
            Ok(photo_id)
        })
        .map_err(|e| match e {
            diesel::result::Error::NotFound => StoreError::NotFound(recipe_id),
            other => query_error(other),
        })
    }
}
