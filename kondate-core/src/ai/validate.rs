//! Validation of generated recipe payloads.
//!
//! Two payload shapes are accepted. A top-level `recipe` key selects the
//! nested shape (`recipe` + optional `recipe_ingredients` and
//! `nutrition_master`); anything else is read as the flat shape with inline
//! `ingredients`. Checks run in a fixed order and the first violation wins.

use std::ops::RangeInclusive;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::types::{IngredientLine, NutritionEntry, RecipeFields, RecipePayload};

pub const COOKING_TIME_MINUTES: RangeInclusive<i64> = 5..=120;
pub const SERVINGS: RangeInclusive<i64> = 1..=6;
pub const CALORIES: RangeInclusive<i64> = 50..=1500;
pub const INGREDIENT_COUNT: RangeInclusive<usize> = 2..=15;
pub const INSTRUCTION_COUNT: RangeInclusive<usize> = 3..=15;

/// Character limits of the columns these strings are stored in.
pub const MAX_NAME_CHARS: usize = 255;
pub const MAX_CATEGORY_CHARS: usize = 100;

const RECIPE_FIELDS: &[&str] = &[
    "title",
    "cooking_time",
    "servings",
    "calories",
    "tags",
    "category",
    "instructions",
];

const LEGACY_FIELDS: &[&str] = &[
    "title",
    "cooking_time",
    "servings",
    "calories",
    "tags",
    "category",
    "ingredients",
    "instructions",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid {field}: must be a number")]
    NotNumeric { field: String },

    #[error("Invalid {field}: must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("Invalid {field}: must be an array with {min}-{max} items (got {actual})")]
    InvalidCount {
        field: String,
        min: usize,
        max: usize,
        actual: usize,
    },

    #[error("Invalid {field}: expected {expected}")]
    InvalidType {
        field: String,
        expected: &'static str,
    },

    #[error("Invalid {field}: may not be longer than {max} characters")]
    TooLong { field: String, max: usize },
}

impl ValidationError {
    /// The payload field the violation is about.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::MissingField(field)
            | ValidationError::NotNumeric { field }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::InvalidCount { field, .. }
            | ValidationError::InvalidType { field, .. }
            | ValidationError::TooLong { field, .. } => field,
        }
    }
}

fn invalid_type(field: impl Into<String>, expected: &'static str) -> ValidationError {
    ValidationError::InvalidType {
        field: field.into(),
        expected,
    }
}

fn bounded_len(
    field: impl Into<String>,
    value: String,
    max: usize,
) -> Result<String, ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.into(),
            max,
        });
    }
    Ok(value)
}

/// Present and not null.
fn require<'a>(object: &'a Map<String, Value>, field: &str) -> Result<&'a Value, ValidationError> {
    match object.get(field) {
        None | Some(Value::Null) => Err(ValidationError::MissingField(field.to_string())),
        Some(value) => Ok(value),
    }
}

/// Accepts JSON numbers and numeric strings; rounds after the bound check.
fn bounded_number(
    object: &Map<String, Value>,
    field: &str,
    range: &RangeInclusive<i64>,
) -> Result<i32, ValidationError> {
    let number = match require(object, field)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
    .ok_or_else(|| ValidationError::NotNumeric {
        field: field.to_string(),
    })?;

    if number < *range.start() as f64 || number > *range.end() as f64 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: *range.start(),
            max: *range.end(),
        });
    }

    Ok(number.round() as i32)
}

fn bounded_array<'a>(
    field: &str,
    value: &'a Value,
    range: &RangeInclusive<usize>,
) -> Result<&'a [Value], ValidationError> {
    let items = value
        .as_array()
        .ok_or_else(|| invalid_type(field, "array"))?;

    if !range.contains(&items.len()) {
        return Err(ValidationError::InvalidCount {
            field: field.to_string(),
            min: *range.start(),
            max: *range.end(),
            actual: items.len(),
        });
    }

    Ok(items)
}

fn string_field(
    object: &Map<String, Value>,
    field: &str,
    max_chars: usize,
) -> Result<String, ValidationError> {
    let value = require(object, field)?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| invalid_type(field, "string"))?;
    bounded_len(field, value, max_chars)
}

fn string_list(field: &str, items: &[Value]) -> Result<Vec<String>, ValidationError> {
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| invalid_type(field, "array of strings"))
        })
        .collect()
}

fn optional_string(
    object: &Map<String, Value>,
    field: &str,
    path: &str,
) -> Result<Option<String>, ValidationError> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(invalid_type(format!("{path}.{field}"), "string")),
    }
}

struct Quantities {
    cooking_time: i32,
    servings: i32,
    calories: i32,
}

fn quantities(object: &Map<String, Value>) -> Result<Quantities, ValidationError> {
    Ok(Quantities {
        cooking_time: bounded_number(object, "cooking_time", &COOKING_TIME_MINUTES)?,
        servings: bounded_number(object, "servings", &SERVINGS)?,
        calories: bounded_number(object, "calories", &CALORIES)?,
    })
}

fn recipe_fields(
    object: &Map<String, Value>,
    quantities: Quantities,
    instructions: &[Value],
) -> Result<RecipeFields, ValidationError> {
    let tags = require(object, "tags")?
        .as_array()
        .ok_or_else(|| invalid_type("tags", "array of strings"))?;

    Ok(RecipeFields {
        title: string_field(object, "title", MAX_NAME_CHARS)?,
        cooking_time: quantities.cooking_time,
        servings: quantities.servings,
        calories: quantities.calories,
        tags: string_list("tags", tags)?,
        category: string_field(object, "category", MAX_CATEGORY_CHARS)?,
        instructions: string_list("instructions", instructions)?,
    })
}

fn ingredient_lines(
    field: &str,
    items: &[Value],
    with_notes: bool,
) -> Result<Vec<IngredientLine>, ValidationError> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let path = format!("{field}[{i}]");
            let object = item.as_object().ok_or_else(|| invalid_type(&path, "object"))?;

            let name = match object.get("name") {
                None | Some(Value::Null) => {
                    return Err(ValidationError::MissingField(format!("{path}.name")))
                }
                Some(Value::String(s)) => s.clone(),
                Some(_) => return Err(invalid_type(format!("{path}.name"), "string")),
            };
            let amount = match object.get("amount") {
                None | Some(Value::Null) => {
                    return Err(ValidationError::MissingField(format!("{path}.amount")))
                }
                Some(Value::String(s)) => s.clone(),
                Some(Value::Number(n)) => n.to_string(),
                Some(_) => return Err(invalid_type(format!("{path}.amount"), "string")),
            };

            let (nutrition_notes, cooking_method_tips) = if with_notes {
                (
                    optional_string(object, "nutrition_notes", &path)?,
                    optional_string(object, "cooking_method_tips", &path)?,
                )
            } else {
                (None, None)
            };

            Ok(IngredientLine {
                name: bounded_len(format!("{path}.name"), name, MAX_NAME_CHARS)?,
                amount: bounded_len(format!("{path}.amount"), amount, MAX_NAME_CHARS)?,
                nutrition_notes,
                cooking_method_tips,
            })
        })
        .collect()
}

fn nutrition_entries(value: Option<&Value>) -> Result<Vec<NutritionEntry>, ValidationError> {
    let items = match value {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(invalid_type("nutrition_master", "array")),
    };

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let path = format!("nutrition_master[{i}]");
            let object = item.as_object().ok_or_else(|| invalid_type(&path, "object"))?;
            let ingredient_name = match object.get("ingredient_name") {
                Some(Value::String(s)) if !s.is_empty() => s.clone(),
                Some(Value::String(_)) | None | Some(Value::Null) => {
                    return Err(ValidationError::MissingField(format!(
                        "{path}.ingredient_name"
                    )))
                }
                Some(_) => {
                    return Err(invalid_type(format!("{path}.ingredient_name"), "string"))
                }
            };
            let document = |key: &str| object.get(key).cloned().unwrap_or(Value::Null);

            Ok(NutritionEntry {
                ingredient_name: bounded_len(
                    format!("{path}.ingredient_name"),
                    ingredient_name,
                    MAX_NAME_CHARS,
                )?,
                nutrition_facts: document("nutrition_facts"),
                health_benefits: document("health_benefits"),
                cooking_tips: document("cooking_tips"),
            })
        })
        .collect()
}

fn validate_legacy(root: &Map<String, Value>) -> Result<RecipePayload, ValidationError> {
    for field in LEGACY_FIELDS {
        require(root, field)?;
    }

    let quantities = quantities(root)?;
    let ingredients = bounded_array("ingredients", &root["ingredients"], &INGREDIENT_COUNT)?;
    let instructions = bounded_array("instructions", &root["instructions"], &INSTRUCTION_COUNT)?;

    Ok(RecipePayload::Legacy {
        recipe: recipe_fields(root, quantities, instructions)?,
        ingredients: ingredient_lines("ingredients", ingredients, false)?,
    })
}

fn validate_structured(root: &Map<String, Value>) -> Result<RecipePayload, ValidationError> {
    let recipe = require(root, "recipe")?
        .as_object()
        .ok_or_else(|| invalid_type("recipe", "object"))?;

    for field in RECIPE_FIELDS {
        require(recipe, field)?;
    }

    let quantities = quantities(recipe)?;
    let ingredients = match root.get("recipe_ingredients") {
        None | Some(Value::Null) => &[][..],
        Some(value) => bounded_array("recipe_ingredients", value, &INGREDIENT_COUNT)?,
    };
    let instructions = bounded_array("instructions", &recipe["instructions"], &INSTRUCTION_COUNT)?;

    Ok(RecipePayload::Structured {
        recipe: recipe_fields(recipe, quantities, instructions)?,
        recipe_ingredients: ingredient_lines("recipe_ingredients", ingredients, true)?,
        nutrition_master: nutrition_entries(root.get("nutrition_master"))?,
    })
}

/// Validate a parsed model payload and normalize it into a [`RecipePayload`].
pub fn validate_payload(payload: &Value) -> Result<RecipePayload, ValidationError> {
    let root = payload
        .as_object()
        .ok_or_else(|| invalid_type("payload", "object"))?;

    if root.contains_key("recipe") {
        validate_structured(root)
    } else {
        validate_legacy(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn legacy() -> Value {
        json!({
            "title": "テストレシピ",
            "cooking_time": 30,
            "servings": 2,
            "calories": 400,
            "tags": ["時短", "簡単"],
            "category": "和食",
            "ingredients": [
                {"name": "鶏肉", "amount": "300g"},
                {"name": "玉ねぎ", "amount": "1個"}
            ],
            "instructions": ["手順1", "手順2", "手順3"]
        })
    }

    fn structured() -> Value {
        json!({
            "recipe": {
                "title": "鮭のホイル焼き",
                "cooking_time": "25",
                "servings": 2,
                "calories": 320,
                "tags": ["ヘルシー"],
                "category": "和食",
                "instructions": ["包む", "焼く", "盛り付ける"]
            },
            "recipe_ingredients": [
                {"name": "鮭", "amount": "2切れ", "nutrition_notes": "良質なたんぱく質", "cooking_method_tips": "皮目から"},
                {"name": "しめじ", "amount": "1パック"}
            ],
            "nutrition_master": [
                {
                    "ingredient_name": "鮭",
                    "nutrition_facts": {"calories_per_100g": 133, "protein": 22.3},
                    "health_benefits": ["DHA"],
                    "cooking_tips": ["焼きすぎない"]
                }
            ]
        })
    }

    fn with(mut payload: Value, field: &str, value: Value) -> Value {
        payload[field] = value;
        payload
    }

    fn items(n: usize) -> Value {
        Value::Array(
            (0..n)
                .map(|i| json!({"name": format!("材料{i}"), "amount": "適量"}))
                .collect(),
        )
    }

    fn steps(n: usize) -> Value {
        Value::Array((0..n).map(|i| json!(format!("手順{i}"))).collect())
    }

    #[test]
    fn test_valid_legacy_payload() {
        let payload = validate_payload(&legacy()).unwrap();
        assert!(!payload.is_structured());
        assert_eq!(payload.recipe().title, "テストレシピ");
        assert_eq!(payload.ingredients().len(), 2);
        assert_eq!(payload.ingredients()[0].amount, "300g");
        assert!(payload.nutrition().is_empty());
    }

    #[test]
    fn test_valid_structured_payload() {
        let payload = validate_payload(&structured()).unwrap();
        assert!(payload.is_structured());
        assert_eq!(payload.recipe().cooking_time, 25);
        assert_eq!(
            payload.ingredients()[0].nutrition_notes.as_deref(),
            Some("良質なたんぱく質")
        );
        assert_eq!(payload.ingredients()[1].cooking_method_tips, None);
        assert_eq!(payload.nutrition()[0].ingredient_name, "鮭");
    }

    #[test]
    fn test_structured_without_recipe_ingredients_is_valid() {
        let mut payload = structured();
        payload.as_object_mut().unwrap().remove("recipe_ingredients");
        payload.as_object_mut().unwrap().remove("nutrition_master");

        let payload = validate_payload(&payload).unwrap();
        assert!(payload.ingredients().is_empty());
    }

    #[test]
    fn test_structured_does_not_require_inline_ingredients() {
        let payload = structured();
        assert!(payload.get("ingredients").is_none());
        assert!(validate_payload(&payload).is_ok());
    }

    #[test]
    fn test_legacy_ignores_note_fields() {
        let payload = with(
            legacy(),
            "ingredients",
            json!([
                {"name": "鶏肉", "amount": "300g", "nutrition_notes": "x"},
                {"name": "玉ねぎ", "amount": "1個"}
            ]),
        );
        let payload = validate_payload(&payload).unwrap();
        assert_eq!(payload.ingredients()[0].nutrition_notes, None);
    }

    #[test]
    fn test_missing_field() {
        let mut payload = legacy();
        payload.as_object_mut().unwrap().remove("servings");
        assert_eq!(
            validate_payload(&payload),
            Err(ValidationError::MissingField("servings".to_string()))
        );

        let payload = with(legacy(), "title", Value::Null);
        assert_eq!(
            validate_payload(&payload).unwrap_err().field(),
            "title"
        );
    }

    #[test]
    fn test_missing_field_reported_before_range() {
        let mut payload = with(legacy(), "cooking_time", json!(500));
        payload.as_object_mut().unwrap().remove("instructions");
        assert_eq!(
            validate_payload(&payload),
            Err(ValidationError::MissingField("instructions".to_string()))
        );
    }

    #[test]
    fn test_cooking_time_boundaries() {
        for ok in [5, 120] {
            assert!(validate_payload(&with(legacy(), "cooking_time", json!(ok))).is_ok());
        }
        for bad in [4, 121] {
            let err = validate_payload(&with(legacy(), "cooking_time", json!(bad))).unwrap_err();
            assert_eq!(
                err,
                ValidationError::OutOfRange {
                    field: "cooking_time".to_string(),
                    min: 5,
                    max: 120
                }
            );
        }
    }

    #[test]
    fn test_servings_boundaries() {
        for ok in [1, 6] {
            assert!(validate_payload(&with(legacy(), "servings", json!(ok))).is_ok());
        }
        for bad in [0, 7] {
            let err = validate_payload(&with(legacy(), "servings", json!(bad))).unwrap_err();
            assert_eq!(err.field(), "servings");
        }
    }

    #[test]
    fn test_calories_boundaries() {
        for ok in [50, 1500] {
            assert!(validate_payload(&with(legacy(), "calories", json!(ok))).is_ok());
        }
        for bad in [49, 1501] {
            let err = validate_payload(&with(legacy(), "calories", json!(bad))).unwrap_err();
            assert_eq!(err.field(), "calories");
        }
    }

    #[test]
    fn test_ingredient_count_boundaries() {
        for ok in [2, 15] {
            assert!(validate_payload(&with(legacy(), "ingredients", items(ok))).is_ok());
        }
        for bad in [1, 16] {
            let err = validate_payload(&with(legacy(), "ingredients", items(bad))).unwrap_err();
            assert!(matches!(
                err,
                ValidationError::InvalidCount { ref field, actual, .. } if field == "ingredients" && actual == bad
            ));
        }
    }

    #[test]
    fn test_recipe_ingredient_count_applies_to_nested_shape() {
        let payload = with(structured(), "recipe_ingredients", items(16));
        assert_eq!(
            validate_payload(&payload).unwrap_err().field(),
            "recipe_ingredients"
        );
    }

    #[test]
    fn test_instruction_count_boundaries() {
        for ok in [3, 15] {
            assert!(validate_payload(&with(legacy(), "instructions", steps(ok))).is_ok());
        }
        for bad in [2, 16] {
            let err = validate_payload(&with(legacy(), "instructions", steps(bad))).unwrap_err();
            assert_eq!(err.field(), "instructions");
        }
    }

    #[test]
    fn test_numeric_strings_accepted() {
        let payload = with(legacy(), "calories", json!(" 450 "));
        assert_eq!(validate_payload(&payload).unwrap().recipe().calories, 450);

        let payload = with(legacy(), "cooking_time", json!(12.6));
        assert_eq!(validate_payload(&payload).unwrap().recipe().cooking_time, 13);
    }

    #[test]
    fn test_non_numeric_rejected() {
        for bad in [json!("30分"), json!(true), json!([30]), json!("NaN")] {
            let err = validate_payload(&with(legacy(), "cooking_time", bad)).unwrap_err();
            assert_eq!(
                err,
                ValidationError::NotNumeric {
                    field: "cooking_time".to_string()
                }
            );
        }
    }

    #[test]
    fn test_out_of_range_message_mentions_field() {
        let err = validate_payload(&with(legacy(), "cooking_time", json!(200))).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid cooking_time: must be between 5 and 120"
        );
    }

    #[test]
    fn test_ingredient_without_name() {
        let payload = with(
            legacy(),
            "ingredients",
            json!([{"amount": "1個"}, {"name": "卵", "amount": 2}]),
        );
        assert_eq!(
            validate_payload(&payload),
            Err(ValidationError::MissingField("ingredients[0].name".to_string()))
        );
    }

    #[test]
    fn test_numeric_amount_is_stringified() {
        let payload = with(
            legacy(),
            "ingredients",
            json!([{"name": "卵", "amount": 2}, {"name": "牛乳", "amount": "200ml"}]),
        );
        assert_eq!(validate_payload(&payload).unwrap().ingredients()[0].amount, "2");
    }

    #[test]
    fn test_tags_must_be_strings() {
        let err = validate_payload(&with(legacy(), "tags", json!(["時短", 3]))).unwrap_err();
        assert_eq!(err.field(), "tags");
    }

    #[test]
    fn test_non_object_payload() {
        assert_eq!(validate_payload(&json!([1, 2])).unwrap_err().field(), "payload");
    }

    #[test]
    fn test_nested_recipe_must_be_object() {
        let payload = json!({"recipe": "カレー"});
        assert_eq!(validate_payload(&payload).unwrap_err().field(), "recipe");
    }

    #[test]
    fn test_nutrition_entry_requires_name() {
        let payload = with(
            structured(),
            "nutrition_master",
            json!([{"nutrition_facts": {}}]),
        );
        assert_eq!(
            validate_payload(&payload).unwrap_err().field(),
            "nutrition_master[0].ingredient_name"
        );
    }

    #[test]
    fn test_string_lengths_fit_their_columns() {
        let title = "あ".repeat(MAX_NAME_CHARS);
        assert!(validate_payload(&with(legacy(), "title", json!(title))).is_ok());

        let err = validate_payload(&with(legacy(), "title", json!(format!("{title}あ"))))
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::TooLong {
                field: "title".to_string(),
                max: MAX_NAME_CHARS
            }
        );

        let category = "x".repeat(MAX_CATEGORY_CHARS + 1);
        let err = validate_payload(&with(legacy(), "category", json!(category))).unwrap_err();
        assert_eq!(err.field(), "category");
    }

    #[test]
    fn test_ingredient_amount_length_bounded() {
        let payload = with(
            legacy(),
            "ingredients",
            json!([
                {"name": "鶏肉", "amount": "g".repeat(MAX_NAME_CHARS + 1)},
                {"name": "玉ねぎ", "amount": "1個"}
            ]),
        );
        assert_eq!(
            validate_payload(&payload).unwrap_err().field(),
            "ingredients[0].amount"
        );
    }
}
