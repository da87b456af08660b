//! AI recipe generation.
//!
//! This module provides:
//! - `RecipeGenerator`, which composes prompt building, the provider call,
//!   JSON extraction, caching, validation and persistence
//! - `ResponseCache`, a disk cache of parsed payloads with per-mode TTLs
//! - `GeneratorConfig`, loaded from environment variables
//! - Prompt templates for recipe text and recipe photos
//!
//! # Example
//!
//! ```ignore
//! use kondate_core::ai::{GeneratorConfig, RecipeGenerator};
//! use kondate_core::store::MemoryRecipeStore;
//! use std::sync::Arc;
//!
//! let generator = RecipeGenerator::from_config(GeneratorConfig::from_env()?)?;
//! let payload = generator.generate_basic_recipe(Some("和食")).await?;
//! let store = Arc::new(MemoryRecipeStore::new());
//! let recipe = generator.save_recipe(store, &payload).await?;
//! println!("Saved {}", recipe.name);
//! ```

mod cache;
mod config;
mod generator;
mod parse;
pub mod prompts;
mod validate;

pub use cache::{CacheKey, CacheStats, CachedPayload, ResponseCache};
pub use config::{ConfigError, GeneratorConfig, ImageConfig};
pub use generator::RecipeGenerator;
pub use parse::{extract_json, ParseError};
pub use validate::{
    validate_payload, ValidationError, CALORIES, COOKING_TIME_MINUTES, INGREDIENT_COUNT,
    INSTRUCTION_COUNT, SERVINGS,
};
