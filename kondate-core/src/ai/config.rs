//! Generator configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::llm::SamplingParams;
use crate::types::Tier;

/// Default Gemini API base URL.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model to use.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-lite";

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;

/// Default image generation endpoint.
pub const DEFAULT_IMAGE_URL: &str = "https://fal.run/fal-ai/flux/dev";
pub const DEFAULT_IMAGE_TIMEOUT_SECS: u64 = 60;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },
}

/// Image generation settings. Present only when an image API key is set.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageConfig {
    pub api_key: String,
    pub endpoint: String,
    pub image_size: String,
    pub num_inference_steps: u32,
    pub guidance_scale: f32,
    pub enable_safety_checker: bool,
    pub safety_tolerance: String,
    pub timeout: Duration,
    /// How long a save waits for the image after the recipe is stored.
    pub grace: Duration,
}

impl ImageConfig {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            endpoint: DEFAULT_IMAGE_URL.to_string(),
            image_size: "landscape_4_3".to_string(),
            num_inference_steps: 28,
            guidance_scale: 3.5,
            enable_safety_checker: true,
            safety_tolerance: "2".to_string(),
            timeout: Duration::from_secs(DEFAULT_IMAGE_TIMEOUT_SECS),
            grace: Duration::ZERO,
        }
    }
}

/// Recipe generator configuration.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Gemini API key. Only optional in test mode.
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    /// Total attempts per generation, including the first.
    pub max_retries: u32,
    /// Per-call HTTP timeout.
    pub timeout: Duration,
    /// Base TTL; ingredient requests use a sixth, constraint requests half.
    pub cache_ttl: Duration,
    /// `None` disables the response cache.
    pub cache_dir: Option<PathBuf>,
    pub tier: Tier,
    pub sampling: SamplingParams,
    pub image: Option<ImageConfig>,
    /// Allows constructing a generator without an API key.
    pub test_mode: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            cache_dir: Some(Self::default_cache_dir()),
            tier: Tier::Standard,
            sampling: SamplingParams::for_tier(Tier::Standard),
            image: None,
            test_mode: false,
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                name: name.to_string(),
                value,
            }),
        Err(_) => Ok(None),
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl GeneratorConfig {
    /// Load configuration from environment variables.
    ///
    /// - `GEMINI_API_KEY`: API key (required unless test mode is enabled later)
    /// - `GEMINI_MODEL`: Model name (default: "gemini-2.5-flash-lite")
    /// - `GEMINI_BASE_URL`: API base URL
    /// - `GEMINI_TEMPERATURE`, `GEMINI_TOP_K`, `GEMINI_TOP_P`, `GEMINI_MAX_OUTPUT_TOKENS`
    /// - `AI_RECIPE_MAX_RETRIES`: Attempts per generation (default: 3)
    /// - `AI_RECIPE_TIMEOUT`: Per-call timeout in seconds (default: 30)
    /// - `AI_RECIPE_CACHE_TTL`: Base cache TTL in seconds (default: 3600)
    /// - `AI_RECIPE_CACHE_DIR`: Cache directory, or "none" to disable (default: "~/.kondate/ai-cache")
    /// - `AI_RECIPE_TIER`: "standard" or "pro" (default: "standard")
    /// - `IMAGE_API_KEY`: Enables image generation
    /// - `IMAGE_API_URL`, `IMAGE_TIMEOUT` (seconds), `IMAGE_GRACE_MS`
    ///
    /// Nothing is checked for completeness here; see [`GeneratorConfig::validate`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let tier = match non_empty_var("AI_RECIPE_TIER") {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                name: "AI_RECIPE_TIER".to_string(),
                value,
            })?,
            None => defaults.tier,
        };

        let base_sampling = SamplingParams::for_tier(tier);
        let sampling = SamplingParams {
            temperature: parse_var("GEMINI_TEMPERATURE")?.unwrap_or(base_sampling.temperature),
            top_k: parse_var("GEMINI_TOP_K")?.unwrap_or(base_sampling.top_k),
            top_p: parse_var("GEMINI_TOP_P")?.unwrap_or(base_sampling.top_p),
            max_output_tokens: parse_var("GEMINI_MAX_OUTPUT_TOKENS")?
                .unwrap_or(base_sampling.max_output_tokens),
        };

        let cache_dir = match non_empty_var("AI_RECIPE_CACHE_DIR") {
            Some(dir) if dir == "none" => None,
            Some(dir) => Some(PathBuf::from(dir)),
            None => defaults.cache_dir,
        };

        let image = match non_empty_var("IMAGE_API_KEY") {
            Some(api_key) => {
                let mut image = ImageConfig::new(api_key);
                if let Some(endpoint) = non_empty_var("IMAGE_API_URL") {
                    image.endpoint = endpoint;
                }
                if let Some(secs) = parse_var::<u64>("IMAGE_TIMEOUT")? {
                    image.timeout = Duration::from_secs(secs);
                }
                if let Some(ms) = parse_var::<u64>("IMAGE_GRACE_MS")? {
                    image.grace = Duration::from_millis(ms);
                }
                Some(image)
            }
            None => None,
        };

        Ok(Self {
            api_key: non_empty_var("GEMINI_API_KEY"),
            model: non_empty_var("GEMINI_MODEL").unwrap_or(defaults.model),
            base_url: non_empty_var("GEMINI_BASE_URL").unwrap_or(defaults.base_url),
            max_retries: parse_var("AI_RECIPE_MAX_RETRIES")?.unwrap_or(defaults.max_retries),
            timeout: parse_var("AI_RECIPE_TIMEOUT")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            cache_ttl: parse_var("AI_RECIPE_CACHE_TTL")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.cache_ttl),
            cache_dir,
            tier,
            sampling,
            image,
            test_mode: false,
        })
    }

    /// Allow a missing API key (tests, offline tooling).
    pub fn with_test_mode(mut self, test_mode: bool) -> Self {
        self.test_mode = test_mode;
        self
    }

    /// Check the configuration is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.is_none() && !self.test_mode {
            return Err(ConfigError::MissingEnvVar("GEMINI_API_KEY".to_string()));
        }
        if self.max_retries == 0 {
            return Err(ConfigError::InvalidValue {
                name: "AI_RECIPE_MAX_RETRIES".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    /// Get the default cache directory: ~/.kondate/ai-cache
    pub fn default_cache_dir() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".kondate").join("ai-cache"))
            .unwrap_or_else(|| PathBuf::from("data/ai-cache"))
    }
}
