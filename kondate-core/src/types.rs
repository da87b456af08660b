use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Categories offered by the generation endpoints.
pub const CATEGORIES: &[&str] = &["和食", "洋食", "中華", "イタリアン", "フレンチ", "その他"];

/// Tag vocabulary accepted as generation constraints.
pub const TAGS: &[&str] = &[
    "時短",
    "節約",
    "ヘルシー",
    "簡単",
    "ボリューム",
    "おつまみ",
    "デザート",
];

/// Difficulty levels accepted as generation constraints.
pub const DIFFICULTIES: &[&str] = &["簡単", "普通", "難しい"];

/// Maximum number of ingredients a caller may ask the model to use.
pub const MAX_REQUESTED_INGREDIENTS: usize = 10;

/// Prompt template variant.
///
/// `Pro` asks the model for the nested payload shape with per-ingredient
/// nutrition analysis; `Standard` asks for the flat legacy shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[default]
    Standard,
    Pro,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Standard => "standard",
            Tier::Pro => "pro",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Tier::Standard),
            "pro" => Ok(Tier::Pro),
            other => Err(format!("unknown tier: {other}")),
        }
    }
}

/// Optional rules for constraint-mode generation.
///
/// Field order is part of the cache key (the struct is hashed in its JSON
/// form), so don't reorder fields casually.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
}

impl Constraints {
    pub fn is_empty(&self) -> bool {
        self.max_time.is_none()
            && self.tags.as_ref().is_none_or(|t| t.is_empty())
            && self.difficulty.as_ref().is_none_or(|d| d.is_empty())
    }
}

/// One generation request. Exactly one mode per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationRequest {
    Basic { category: Option<String> },
    ByIngredients { ingredients: Vec<String> },
    WithConstraints(Constraints),
}

impl GenerationRequest {
    /// Short mode name, used for cache namespaces and logs.
    pub fn mode_name(&self) -> &'static str {
        match self {
            GenerationRequest::Basic { .. } => "basic",
            GenerationRequest::ByIngredients { .. } => "ingredients",
            GenerationRequest::WithConstraints(_) => "constraints",
        }
    }
}

/// Where a stored recipe came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipeSource {
    Manual,
    AiGenerated,
}

impl RecipeSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecipeSource::Manual => "manual",
            RecipeSource::AiGenerated => "ai_generated",
        }
    }
}

impl FromStr for RecipeSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(RecipeSource::Manual),
            "ai_generated" => Ok(RecipeSource::AiGenerated),
            other => Err(format!("unknown recipe source: {other}")),
        }
    }
}

/// Typed recipe fields shared by both payload shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeFields {
    pub title: String,
    pub cooking_time: i32,
    pub servings: i32,
    pub calories: i32,
    pub tags: Vec<String>,
    pub category: String,
    pub instructions: Vec<String>,
}

/// One ingredient line of a generated recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientLine {
    pub name: String,
    pub amount: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutrition_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooking_method_tips: Option<String>,
}

/// Nutrition record for one ingredient, as supplied by the pro template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionEntry {
    pub ingredient_name: String,
    pub nutrition_facts: serde_json::Value,
    pub health_benefits: serde_json::Value,
    pub cooking_tips: serde_json::Value,
}

/// A generated payload that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub enum RecipePayload {
    /// Flat shape with inline `ingredients`.
    Legacy {
        recipe: RecipeFields,
        ingredients: Vec<IngredientLine>,
    },
    /// Nested shape: `recipe`, optional `recipe_ingredients` and `nutrition_master`.
    Structured {
        recipe: RecipeFields,
        recipe_ingredients: Vec<IngredientLine>,
        nutrition_master: Vec<NutritionEntry>,
    },
}

impl RecipePayload {
    pub fn recipe(&self) -> &RecipeFields {
        match self {
            RecipePayload::Legacy { recipe, .. } | RecipePayload::Structured { recipe, .. } => {
                recipe
            }
        }
    }

    pub fn ingredients(&self) -> &[IngredientLine] {
        match self {
            RecipePayload::Legacy { ingredients, .. } => ingredients,
            RecipePayload::Structured {
                recipe_ingredients, ..
            } => recipe_ingredients,
        }
    }

    pub fn nutrition(&self) -> &[NutritionEntry] {
        match self {
            RecipePayload::Legacy { .. } => &[],
            RecipePayload::Structured {
                nutrition_master, ..
            } => nutrition_master,
        }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, RecipePayload::Structured { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_parses_case_insensitively() {
        assert_eq!("PRO".parse::<Tier>().unwrap(), Tier::Pro);
        assert_eq!(" standard ".parse::<Tier>().unwrap(), Tier::Standard);
        assert!("premium".parse::<Tier>().is_err());
    }

    #[test]
    fn empty_constraints_serialize_to_empty_object() {
        let json = serde_json::to_string(&Constraints::default()).unwrap();
        assert_eq!(json, "{}");
        assert!(Constraints::default().is_empty());
    }

    #[test]
    fn constraints_with_empty_tag_list_are_empty() {
        let constraints = Constraints {
            tags: Some(vec![]),
            ..Default::default()
        };
        assert!(constraints.is_empty());
    }
}
