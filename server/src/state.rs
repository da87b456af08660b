use kondate_core::ai::RecipeGenerator;
use kondate_core::store::RecipeStore;
use std::sync::Arc;

/// Everything handlers need.
pub struct AppContext {
    pub generator: RecipeGenerator,
    pub store: Arc<dyn RecipeStore>,
    /// Include underlying error text in 500 responses.
    pub show_error_details: bool,
}

/// Application state shared across all handlers
pub type AppState = Arc<AppContext>;

#[cfg(test)]
pub mod test_support {
    use super::*;
    use kondate_core::ai::ResponseCache;
    use kondate_core::llm::{FakeProvider, LlmProvider};
    use kondate_core::store::MemoryRecipeStore;
    use kondate_core::types::Tier;
    use std::time::Duration;

    pub const LEGACY_REPLY: &str = r#"レシピを作成しました。
{
  "title": "豚の生姜焼き",
  "cooking_time": 20,
  "servings": 2,
  "calories": 520,
  "tags": ["時短"],
  "category": "和食",
  "ingredients": [
    {"name": "豚ロース", "amount": "250g"},
    {"name": "生姜", "amount": "1かけ"}
  ],
  "instructions": ["タレを作る", "豚肉を焼く", "タレを絡める"]
}"#;

    pub fn state_with(
        provider: FakeProvider,
        show_error_details: bool,
    ) -> (AppState, Arc<MemoryRecipeStore>) {
        state_with_provider(Box::new(provider), show_error_details)
    }

    pub fn state_with_provider(
        provider: Box<dyn LlmProvider>,
        show_error_details: bool,
    ) -> (AppState, Arc<MemoryRecipeStore>) {
        let store = Arc::new(MemoryRecipeStore::new());
        let generator = RecipeGenerator::new(
            provider,
            ResponseCache::disabled(),
            Tier::Standard,
            Duration::from_secs(3600),
        );
        let state = Arc::new(AppContext {
            generator,
            store: store.clone(),
            show_error_details,
        });
        (state, store)
    }
}
