use super::response::{
    add_error, body_rejected, generate_and_respond, validation_failed, FieldErrors,
    GenerateRecipeResponse, GenerationFailedResponse, ValidationErrorResponse,
};
use crate::AppState;
use axum::extract::rejection::JsonRejection;
use axum::{extract::State, response::Response, Json};
use kondate_core::types::{Constraints, GenerationRequest, DIFFICULTIES, TAGS};
use serde::Deserialize;
use utoipa::ToSchema;

const MIN_TIME: i64 = 5;
const MAX_TIME: i64 = 120;
const MAX_TAGS: usize = 5;

#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateWithConstraintsRequest {
    /// Upper bound on cooking time, in minutes (5-120)
    #[serde(default)]
    pub max_time: Option<i64>,
    /// Up to 5 of 時短, 節約, ヘルシー, 簡単, ボリューム, おつまみ, デザート
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    /// One of 簡単, 普通, 難しい
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub save_to_db: bool,
}

impl GenerateWithConstraintsRequest {
    fn validate(&self) -> Result<Constraints, FieldErrors> {
        let mut errors = FieldErrors::new();

        let max_time = match self.max_time {
            Some(t) if !(MIN_TIME..=MAX_TIME).contains(&t) => {
                add_error(
                    &mut errors,
                    "max_time",
                    format!("max_time must be between {} and {}", MIN_TIME, MAX_TIME),
                );
                None
            }
            Some(t) => u32::try_from(t).ok(),
            None => None,
        };

        if let Some(tags) = &self.tags {
            if tags.len() > MAX_TAGS {
                add_error(
                    &mut errors,
                    "tags",
                    format!("tags may not have more than {} items", MAX_TAGS),
                );
            }
            for (i, tag) in tags.iter().enumerate() {
                if !TAGS.contains(&tag.as_str()) {
                    add_error(
                        &mut errors,
                        format!("tags.{}", i),
                        format!("tag must be one of: {}", TAGS.join(", ")),
                    );
                }
            }
        }

        let difficulty = self
            .difficulty
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty());
        if let Some(difficulty) = difficulty {
            if !DIFFICULTIES.contains(&difficulty) {
                add_error(
                    &mut errors,
                    "difficulty",
                    format!("difficulty must be one of: {}", DIFFICULTIES.join(", ")),
                );
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Constraints {
            max_time,
            tags: self.tags.clone().filter(|t| !t.is_empty()),
            difficulty: difficulty.map(str::to_string),
        })
    }
}

/// Generate a recipe under time, tag, and difficulty constraints
#[utoipa::path(
    post,
    path = "/api/ai-recipes/generate/constraints",
    tag = "ai-recipes",
    request_body = GenerateWithConstraintsRequest,
    responses(
        (status = 200, description = "Generated recipe", body = GenerateRecipeResponse),
        (status = 422, description = "Validation failed", body = ValidationErrorResponse),
        (status = 500, description = "Generation failed", body = GenerationFailedResponse)
    )
)]
pub async fn generate_with_constraints(
    State(ctx): State<AppState>,
    body: Result<Json<GenerateWithConstraintsRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return body_rejected(rejection),
    };

    let constraints = match request.validate() {
        Ok(constraints) => constraints,
        Err(errors) => return validation_failed(errors),
    };

    generate_and_respond(
        &ctx,
        GenerationRequest::WithConstraints(constraints),
        request.save_to_db,
    )
    .await
}
