//! Recipe generation orchestrator.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::cache::{CacheKey, ResponseCache};
use super::config::GeneratorConfig;
use super::parse::extract_json;
use super::prompts::{build_prompt, render_photo_prompt};
use super::validate::validate_payload;
use crate::error::GenerateError;
use crate::image::{generate_best_effort, FalImageGenerator, ImageGenerator};
use crate::llm::{GeminiProvider, LlmProvider, RetryingProvider};
use crate::store::{RecipeDraft, RecipeStore, StoredRecipe};
use crate::types::{Constraints, GenerationRequest, Tier, MAX_REQUESTED_INGREDIENTS};

/// Generates recipes with a generative text model and saves them.
///
/// `generate_*` return the parsed but unvalidated payload so callers can
/// show it before deciding to save; `save_recipe` always validates.
#[derive(Debug)]
pub struct RecipeGenerator {
    provider: Box<dyn LlmProvider>,
    cache: ResponseCache,
    tier: Tier,
    cache_ttl: Duration,
    images: Option<Arc<dyn ImageGenerator>>,
    image_grace: Duration,
}

impl RecipeGenerator {
    /// Build a generator from a configuration: Gemini behind a retrying
    /// wrapper, a disk cache, and an image generator when configured.
    pub fn from_config(config: GeneratorConfig) -> Result<Self, GenerateError> {
        config.validate()?;

        let gemini = GeminiProvider::new(
            config.api_key.unwrap_or_default(),
            config.model,
            config.base_url,
            config.sampling,
            config.timeout,
        )?;
        let provider = RetryingProvider::new(Box::new(gemini), config.max_retries);

        let cache = match config.cache_dir {
            Some(dir) => ResponseCache::new(dir),
            None => ResponseCache::disabled(),
        };

        let mut generator = Self::new(Box::new(provider), cache, config.tier, config.cache_ttl);

        if let Some(image_config) = config.image {
            let grace = image_config.grace;
            match FalImageGenerator::new(image_config) {
                Ok(images) => generator = generator.with_image_generator(Arc::new(images), grace),
                Err(e) => tracing::warn!(error = %e, "image generation disabled"),
            }
        }

        Ok(generator)
    }

    pub fn new(
        provider: Box<dyn LlmProvider>,
        cache: ResponseCache,
        tier: Tier,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            provider,
            cache,
            tier,
            cache_ttl,
            images: None,
            image_grace: Duration::ZERO,
        }
    }

    /// Generate a photo for each saved recipe, waiting up to `grace` for it.
    pub fn with_image_generator(mut self, images: Arc<dyn ImageGenerator>, grace: Duration) -> Self {
        self.images = Some(images);
        self.image_grace = grace;
        self
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }

    fn ttl_for(&self, request: &GenerationRequest) -> Duration {
        match request {
            GenerationRequest::Basic { .. } => self.cache_ttl,
            GenerationRequest::ByIngredients { .. } => self.cache_ttl / 6,
            GenerationRequest::WithConstraints(_) => self.cache_ttl / 2,
        }
    }

    /// Generate a recipe for any request mode.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<Value, GenerateError> {
        if let GenerationRequest::ByIngredients { ingredients } = request {
            if ingredients.is_empty() || ingredients.len() > MAX_REQUESTED_INGREDIENTS {
                return Err(GenerateError::InvalidRequest(format!(
                    "between 1 and {} ingredients are required, got {}",
                    MAX_REQUESTED_INGREDIENTS,
                    ingredients.len()
                )));
            }
        }

        let key = CacheKey::for_request(request, self.tier, self.provider.model_name());
        if let Some(cached) = self.cache.get(&key, self.ttl_for(request)) {
            tracing::debug!(mode = key.mode, hash = %key.input_hash, "recipe cache hit");
            return Ok(cached.payload);
        }

        let prompt = build_prompt(request, self.tier);
        tracing::info!(
            mode = request.mode_name(),
            tier = %self.tier,
            prompt_length = prompt.len(),
            "generating recipe"
        );

        let reply = self.provider.complete(&prompt).await?;
        let payload = extract_json(&reply)?;

        if let Err(e) = self.cache.put(&key, &payload, self.provider.model_name()) {
            tracing::warn!(hash = %key.input_hash, error = %e, "failed to cache generated recipe");
        }

        Ok(payload)
    }

    pub async fn generate_basic_recipe(&self, category: Option<&str>) -> Result<Value, GenerateError> {
        self.generate(&GenerationRequest::Basic {
            category: category.map(str::to_string),
        })
        .await
    }

    pub async fn generate_recipe_by_ingredients(
        &self,
        ingredients: &[String],
    ) -> Result<Value, GenerateError> {
        self.generate(&GenerationRequest::ByIngredients {
            ingredients: ingredients.to_vec(),
        })
        .await
    }

    pub async fn generate_recipe_with_constraints(
        &self,
        constraints: &Constraints,
    ) -> Result<Value, GenerateError> {
        self.generate(&GenerationRequest::WithConstraints(constraints.clone()))
            .await
    }

    /// Validate a payload and store it as a recipe.
    ///
    /// When an image generator is configured, photo generation starts before
    /// the write. The photo is attached by a background task as soon as it is
    /// ready; the returned recipe carries it only if that happened within the
    /// grace period. A failed write cancels the photo. Photo failures never
    /// fail the save.
    pub async fn save_recipe(
        &self,
        store: Arc<dyn RecipeStore>,
        payload: &Value,
    ) -> Result<StoredRecipe, GenerateError> {
        let validated = validate_payload(payload)?;
        let draft = RecipeDraft::from_payload(&validated);

        let photo = self.images.as_ref().map(|images| {
            let prompt = render_photo_prompt(&draft.name, &draft.category);
            PhotoTask::spawn(Arc::clone(images), Arc::clone(&store), prompt)
        });

        let mut recipe = match store.save_recipe(&draft) {
            Ok(recipe) => recipe,
            Err(e) => {
                if let Some(photo) = photo {
                    photo.handle.abort();
                }
                return Err(e.into());
            }
        };
        tracing::info!(
            recipe_id = %recipe.id,
            ingredients = recipe.ingredients.len(),
            nutrition_entries = draft.nutrition.len(),
            structured = validated.is_structured(),
            "saved generated recipe"
        );

        if let Some(photo) = photo {
            // The task may already have given up on the photo.
            let _ = photo.recipe_id.send(recipe.id);
            recipe.photo_id = self.wait_for_photo(photo.handle).await;
        }

        Ok(recipe)
    }

    async fn wait_for_photo(&self, handle: JoinHandle<Option<Uuid>>) -> Option<Uuid> {
        match tokio::time::timeout(self.image_grace, handle).await {
            Ok(Ok(photo_id)) => photo_id,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "recipe photo task failed");
                None
            }
            Err(_) => {
                tracing::debug!(
                    grace_ms = self.image_grace.as_millis() as u64,
                    "recipe photo not ready, attaching in background"
                );
                None
            }
        }
    }
}

/// Photo generation running alongside a recipe write.
struct PhotoTask {
    handle: JoinHandle<Option<Uuid>>,
    recipe_id: oneshot::Sender<Uuid>,
}

impl PhotoTask {
    /// The task attaches the photo once the recipe id arrives. Dropping the
    /// sender without sending discards the photo.
    fn spawn(
        images: Arc<dyn ImageGenerator>,
        store: Arc<dyn RecipeStore>,
        prompt: String,
    ) -> Self {
        let (recipe_id, recipe_rx) = oneshot::channel();
        let handle = tokio::spawn(async move {
            let image = generate_best_effort(images.as_ref(), &prompt).await?;
            let recipe_id = recipe_rx.await.ok()?;
            match store.attach_photo(recipe_id, &image) {
                Ok(photo_id) => {
                    tracing::debug!(%recipe_id, %photo_id, "attached recipe photo");
                    Some(photo_id)
                }
                Err(e) => {
                    tracing::warn!(%recipe_id, error = %e, "failed to attach recipe photo");
                    None
                }
            }
        });
        Self { handle, recipe_id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::{GeneratedImage, ImageError};
    use crate::llm::FakeProvider;
    use crate::store::MemoryRecipeStore;
    use crate::types::RecipeSource;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    const HOUR: Duration = Duration::from_secs(3600);

    fn legacy_payload() -> Value {
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

    fn structured_payload(protein: f64) -> Value {
        json!({
            "recipe": {
                "title": "鮭のムニエル",
                "cooking_time": 20,
                "servings": 2,
                "calories": 380,
                "tags": ["ヘルシー"],
                "category": "洋食",
                "instructions": ["下味をつける", "粉をはたく", "焼く"]
            },
            "recipe_ingredients": [
                {"name": "鮭", "amount": "2切れ", "nutrition_notes": "たんぱく質源", "cooking_method_tips": "皮目から焼く"},
                {"name": "バター", "amount": "10g"}
            ],
            "nutrition_master": [
                {"ingredient_name": "鮭", "nutrition_facts": {"protein": protein}, "health_benefits": ["DHA"], "cooking_tips": ["焼きすぎない"]}
            ]
        })
    }

    fn generator(provider: Arc<FakeProvider>, dir: &TempDir) -> RecipeGenerator {
        RecipeGenerator::new(
            Box::new(provider),
            ResponseCache::new(dir.path().to_path_buf()),
            Tier::Standard,
            HOUR,
        )
    }

    fn reply() -> String {
        format!("こちらがレシピです。\n{}\n", legacy_payload())
    }

    #[derive(Debug, Default)]
    struct CountingImages {
        delay: Duration,
        started: AtomicUsize,
        finished: AtomicUsize,
    }

    impl CountingImages {
        fn with_delay(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                delay,
                ..Default::default()
            })
        }
    }

    #[async_trait]
    impl ImageGenerator for CountingImages {
        async fn generate(&self, _prompt: &str) -> Result<GeneratedImage, ImageError> {
            self.started.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.finished.fetch_add(1, Ordering::SeqCst);
            Ok(GeneratedImage {
                data: vec![0x89, b'P', b'N', b'G'],
                content_type: "image/png".to_string(),
                source_url: "https://cdn.example/photo.png".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_generate_returns_parsed_payload() {
        let dir = TempDir::new().unwrap();
        let provider = Arc::new(FakeProvider::new().with_default_response(&reply()));
        let generator = generator(provider, &dir);

        let payload = generator.generate_basic_recipe(Some("和食")).await.unwrap();
        assert_eq!(payload, legacy_payload());
    }

    #[tokio::test]
    async fn test_repeat_basic_request_served_from_cache() {
        let dir = TempDir::new().unwrap();
        let provider = Arc::new(FakeProvider::new().with_default_response(&reply()));
        let generator = generator(Arc::clone(&provider), &dir);

        let first = generator.generate_basic_recipe(Some("和食")).await.unwrap();
        let second = generator.generate_basic_recipe(Some("和食")).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(provider.call_count(), 1);

        generator.generate_basic_recipe(Some("中華")).await.unwrap();
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn test_ingredient_order_shares_cache_entry() {
        let dir = TempDir::new().unwrap();
        let provider = Arc::new(FakeProvider::new().with_default_response(&reply()));
        let generator = generator(Arc::clone(&provider), &dir);

        generator
            .generate_recipe_by_ingredients(&["鶏肉".to_string(), "玉ねぎ".to_string()])
            .await
            .unwrap();
        generator
            .generate_recipe_by_ingredients(&["玉ねぎ".to_string(), "鶏肉".to_string()])
            .await
            .unwrap();

        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_parse_failure_is_not_cached() {
        let dir = TempDir::new().unwrap();
        let provider = Arc::new(
            FakeProvider::new().with_default_response("申し訳ありませんが、生成できません。"),
        );
        let generator = generator(Arc::clone(&provider), &dir);

        let err = generator.generate_basic_recipe(None).await.unwrap_err();
        assert!(matches!(err, GenerateError::Parse(_)));

        let err = generator.generate_basic_recipe(None).await.unwrap_err();
        assert!(matches!(err, GenerateError::Parse(_)));
        assert_eq!(provider.call_count(), 2);
        assert_eq!(generator.cache.stats().cached_payloads, 0);
    }

    #[tokio::test]
    async fn test_ingredient_list_bounds_checked_before_upstream() {
        let dir = TempDir::new().unwrap();
        let provider = Arc::new(FakeProvider::new().with_default_response(&reply()));
        let generator = generator(Arc::clone(&provider), &dir);

        let err = generator.generate_recipe_by_ingredients(&[]).await.unwrap_err();
        assert!(matches!(err, GenerateError::InvalidRequest(_)));

        let eleven: Vec<String> = (0..11).map(|i| format!("食材{i}")).collect();
        let err = generator
            .generate_recipe_by_ingredients(&eleven)
            .await
            .unwrap_err();
        assert!(matches!(err, GenerateError::InvalidRequest(_)));

        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_constraints_prompt_reaches_provider() {
        let dir = TempDir::new().unwrap();
        let provider = Arc::new(FakeProvider::with_response("15分以内", &reply()));
        let generator = generator(Arc::clone(&provider), &dir);

        let constraints = Constraints {
            max_time: Some(15),
            ..Default::default()
        };
        assert!(generator
            .generate_recipe_with_constraints(&constraints)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_upstream_failure_surfaces_as_generation_error() {
        let generator = RecipeGenerator::new(
            Box::new(FakeProvider::new()),
            ResponseCache::disabled(),
            Tier::Standard,
            HOUR,
        );
        let err = generator.generate_basic_recipe(None).await.unwrap_err();
        assert!(matches!(err, GenerateError::Generation(_)));
    }

    #[test]
    fn test_from_config_requires_key() {
        let config = GeneratorConfig {
            cache_dir: None,
            ..Default::default()
        };
        assert!(matches!(
            RecipeGenerator::from_config(config.clone()),
            Err(GenerateError::Configuration(_))
        ));
        assert!(RecipeGenerator::from_config(config.with_test_mode(true)).is_ok());
    }

    #[test]
    fn test_reports_tier_and_model() {
        let generator = RecipeGenerator::new(
            Box::new(FakeProvider::new()),
            ResponseCache::disabled(),
            Tier::Pro,
            HOUR,
        );
        assert_eq!(generator.tier(), Tier::Pro);
        assert_eq!(generator.model_name(), "fake-model");
    }

    #[test]
    fn test_ttl_per_mode() {
        let generator = RecipeGenerator::new(
            Box::new(FakeProvider::new()),
            ResponseCache::disabled(),
            Tier::Standard,
            HOUR,
        );
        assert_eq!(
            generator.ttl_for(&GenerationRequest::Basic { category: None }),
            HOUR
        );
        assert_eq!(
            generator.ttl_for(&GenerationRequest::ByIngredients {
                ingredients: vec![]
            }),
            Duration::from_secs(600)
        );
        assert_eq!(
            generator.ttl_for(&GenerationRequest::WithConstraints(Constraints::default())),
            Duration::from_secs(1800)
        );
    }

    #[tokio::test]
    async fn test_save_legacy_payload() {
        let dir = TempDir::new().unwrap();
        let generator = generator(Arc::new(FakeProvider::new()), &dir);
        let store = Arc::new(MemoryRecipeStore::new());

        let recipe = generator
            .save_recipe(store.clone(), &legacy_payload())
            .await
            .unwrap();

        assert_eq!(recipe.name, "テストレシピ");
        assert_eq!(recipe.source, RecipeSource::AiGenerated);
        assert_eq!(recipe.ingredients.len(), 2);
        assert_eq!(recipe.ingredients[0].name, "鶏肉");
        assert_eq!(recipe.ingredients[0].quantity, "300g");
        assert_eq!(recipe.ingredients[1].quantity, "1個");
        assert_eq!(recipe.photo_id, None);
        assert_eq!(store.find_recipe(recipe.id).unwrap(), Some(recipe));
    }

    #[tokio::test]
    async fn test_invalid_payload_is_not_saved() {
        let dir = TempDir::new().unwrap();
        let generator = generator(Arc::new(FakeProvider::new()), &dir);
        let store = Arc::new(MemoryRecipeStore::new());

        let mut payload = legacy_payload();
        payload["cooking_time"] = json!(200);

        let err = generator.save_recipe(store.clone(), &payload).await.unwrap_err();
        match err {
            GenerateError::Validation(e) => assert_eq!(e.field(), "cooking_time"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.recipe_count(), 0);
        assert_eq!(store.ingredient_count(), 0);
    }

    #[tokio::test]
    async fn test_save_structured_payload_upserts_nutrition() {
        let dir = TempDir::new().unwrap();
        let generator = generator(Arc::new(FakeProvider::new()), &dir);
        let store = Arc::new(MemoryRecipeStore::new());

        let recipe = generator
            .save_recipe(store.clone(), &structured_payload(20.0))
            .await
            .unwrap();
        assert_eq!(
            recipe.ingredients[0].nutrition_notes.as_deref(),
            Some("たんぱく質源")
        );
        assert_eq!(
            recipe.ingredients[0].cooking_method_tips.as_deref(),
            Some("皮目から焼く")
        );

        generator
            .save_recipe(store.clone(), &structured_payload(22.3))
            .await
            .unwrap();

        let nutrition = store.find_nutrition("鮭").unwrap().unwrap();
        assert_eq!(nutrition.nutrition_facts, json!({"protein": 22.3}));
        assert_eq!(store.recipe_count(), 2);
        assert_eq!(store.ingredient_count(), 2);
    }

    #[tokio::test]
    async fn test_store_failure_rolls_back() {
        let dir = TempDir::new().unwrap();
        let generator = generator(Arc::new(FakeProvider::new()), &dir);
        let store = Arc::new(MemoryRecipeStore::failing_on_ingredient("玉ねぎ"));

        let err = generator
            .save_recipe(store.clone(), &legacy_payload())
            .await
            .unwrap_err();

        assert!(matches!(err, GenerateError::Storage(_)));
        assert_eq!(store.recipe_count(), 0);
    }

    #[tokio::test]
    async fn test_photo_attached_when_ready_in_time() {
        let dir = TempDir::new().unwrap();
        let generator = generator(Arc::new(FakeProvider::new()), &dir).with_image_generator(
            CountingImages::with_delay(Duration::ZERO),
            Duration::from_secs(5),
        );
        let store = Arc::new(MemoryRecipeStore::new());

        let recipe = generator
            .save_recipe(store.clone(), &legacy_payload())
            .await
            .unwrap();

        let photo_id = recipe.photo_id.expect("photo should be attached");
        assert_eq!(store.photo(photo_id).unwrap().content_type, "image/png");
        assert_eq!(
            store.find_recipe(recipe.id).unwrap().unwrap().photo_id,
            Some(photo_id)
        );
    }

    #[tokio::test]
    async fn test_photo_attached_after_save_without_grace() {
        let dir = TempDir::new().unwrap();
        let images = CountingImages::with_delay(Duration::ZERO);
        let generator = generator(Arc::new(FakeProvider::new()), &dir)
            .with_image_generator(images.clone(), Duration::ZERO);
        let store = Arc::new(MemoryRecipeStore::new());

        let recipe = generator
            .save_recipe(store.clone(), &legacy_payload())
            .await
            .unwrap();

        let mut photo_id = None;
        for _ in 0..100 {
            photo_id = store.find_recipe(recipe.id).unwrap().unwrap().photo_id;
            if photo_id.is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        let photo_id = photo_id.expect("photo should be attached in the background");
        assert!(store.photo(photo_id).is_some());
        assert_eq!(images.started.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_photo_does_not_block_save() {
        let dir = TempDir::new().unwrap();
        let generator = generator(Arc::new(FakeProvider::new()), &dir).with_image_generator(
            CountingImages::with_delay(Duration::from_secs(60)),
            Duration::from_millis(100),
        );
        let store = Arc::new(MemoryRecipeStore::new());

        let recipe = generator
            .save_recipe(store.clone(), &legacy_payload())
            .await
            .unwrap();

        assert_eq!(recipe.photo_id, None);
        assert_eq!(store.recipe_count(), 1);

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert!(store
            .find_recipe(recipe.id)
            .unwrap()
            .unwrap()
            .photo_id
            .is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_failure_cancels_photo() {
        let dir = TempDir::new().unwrap();
        let images = CountingImages::with_delay(Duration::from_secs(1));
        let generator = generator(Arc::new(FakeProvider::new()), &dir)
            .with_image_generator(images.clone(), Duration::from_secs(5));
        let store = Arc::new(MemoryRecipeStore::failing_on_ingredient("玉ねぎ"));

        let err = generator
            .save_recipe(store.clone(), &legacy_payload())
            .await
            .unwrap_err();
        assert!(matches!(err, GenerateError::Storage(_)));

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(images.finished.load(Ordering::SeqCst), 0);
        assert_eq!(store.recipe_count(), 0);
    }
}
