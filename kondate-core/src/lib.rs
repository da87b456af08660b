pub mod ai;
pub mod error;
pub mod image;
pub mod llm;
pub mod store;
pub mod types;

pub use ai::{
    extract_json, validate_payload, ConfigError, GeneratorConfig, ParseError, RecipeGenerator,
    ValidationError,
};
pub use error::GenerateError;
pub use image::{validate_image, GeneratedImage, ImageError, ImageGenerator, MAX_FILE_SIZE};
pub use store::{MemoryRecipeStore, RecipeDraft, RecipeStore, StoreError, StoredRecipe};
pub use types::{
    Constraints, GenerationRequest, IngredientLine, NutritionEntry, RecipeFields, RecipePayload,
    RecipeSource, Tier, CATEGORIES, DIFFICULTIES, TAGS,
};
