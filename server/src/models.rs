use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = crate::schema::recipes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Recipe {
    pub id: Uuid,
    pub name: String,
    pub cooking_time: i32,
    pub servings: i32,
    pub calories: i32,
    pub tags: Vec<Option<String>>,
    pub category: String,
    pub instructions: Vec<Option<String>>,
    pub source: String,
    pub photo_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::recipes)]
pub struct NewRecipe<'a> {
    pub name: &'a str,
    pub cooking_time: i32,
    pub servings: i32,
    pub calories: i32,
    pub tags: Vec<Option<String>>,
    pub category: &'a str,
    pub instructions: Vec<Option<String>>,
    pub source: &'a str,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::ingredients)]
pub struct NewIngredient<'a> {
    pub name: &'a str,
}

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = crate::schema::recipe_ingredients)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RecipeIngredient {
    pub ingredient_id: Uuid,
    pub quantity: String,
    pub nutrition_notes: Option<String>,
    pub cooking_method_tips: Option<String>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::recipe_ingredients)]
pub struct NewRecipeIngredient<'a> {
    pub recipe_id: Uuid,
    pub ingredient_id: Uuid,
    pub position: i32,
    pub quantity: &'a str,
    pub nutrition_notes: Option<&'a str>,
    pub cooking_method_tips: Option<&'a str>,
}

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = crate::schema::ingredient_nutritions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct IngredientNutrition {
    pub ingredient_name: String,
    pub nutrition_facts: serde_json::Value,
    pub health_benefits: serde_json::Value,
    pub cooking_tips: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::ingredient_nutritions)]
pub struct NewIngredientNutrition<'a> {
    pub ingredient_name: &'a str,
    pub nutrition_facts: serde_json::Value,
    pub health_benefits: serde_json::Value,
    pub cooking_tips: serde_json::Value,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::photos)]
pub struct NewPhoto<'a> {
    pub content_type: &'a str,
    pub data: &'a [u8],
    pub source_url: Option<&'a str>,
}
