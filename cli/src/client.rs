use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::time::Duration;
use uuid::Uuid;

/// Which generation endpoint to call, with its inputs.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerateCall {
    Basic {
        category: Option<String>,
    },
    Ingredients {
        ingredients: Vec<String>,
    },
    Constraints {
        max_time: Option<u32>,
        tags: Vec<String>,
    },
}

impl GenerateCall {
    pub fn path(&self) -> &'static str {
        match self {
            GenerateCall::Basic { .. } => "/api/ai-recipes/generate",
            GenerateCall::Ingredients { .. } => "/api/ai-recipes/generate/ingredients",
            GenerateCall::Constraints { .. } => "/api/ai-recipes/generate/constraints",
        }
    }

    pub fn body(&self, save_to_db: bool) -> Value {
        match self {
            GenerateCall::Basic { category } => json!({
                "category": category,
                "save_to_db": save_to_db,
            }),
            GenerateCall::Ingredients { ingredients } => json!({
                "ingredients": ingredients,
                "save_to_db": save_to_db,
            }),
            GenerateCall::Constraints { max_time, tags } => {
                let mut body = json!({ "save_to_db": save_to_db });
                if let Some(max_time) = max_time {
                    body["max_time"] = json!(max_time);
                }
                if !tags.is_empty() {
                    body["tags"] = json!(tags);
                }
                body
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Generated {
    pub data: Value,
    #[serde(default)]
    pub saved_recipe_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
struct FailureBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    errors: BTreeMap<String, Vec<String>>,
}

impl FailureBody {
    fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(message) = &self.message {
            parts.push(message.clone());
        }
        if let Some(error) = &self.error {
            parts.push(error.clone());
        }
        for (field, messages) in &self.errors {
            parts.push(format!("{}: {}", field, messages.join("; ")));
        }
        parts.join(" | ")
    }
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(server: &str) -> Result<Self> {
        // Generation retries upstream, so allow well past the server's own timeout.
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(180))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: server.trim_end_matches('/').to_string(),
        })
    }

    pub async fn generate(&self, call: &GenerateCall, save_to_db: bool) -> Result<Generated> {
        let url = format!("{}{}", self.base_url, call.path());
        let response = self
            .http
            .post(&url)
            .json(&call.body(save_to_db))
            .send()
            .await
            .with_context(|| format!("Failed to reach {}", url))?;

        let status = response.status();
        let text = response.text().await.context("Failed to read response")?;

        if !status.is_success() {
            let detail = serde_json::from_str::<FailureBody>(&text)
                .map(|body| body.describe())
                .unwrap_or(text);
            bail!("HTTP {}: {}", status.as_u16(), detail);
        }

        serde_json::from_str(&text).context("Unexpected response body")
    }
}
