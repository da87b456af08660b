//! Response envelope shared by the generation endpoints.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use kondate_core::error::GenerateError;
use kondate_core::types::GenerationRequest;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::state::AppContext;

/// Field name -> messages.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

pub fn add_error(errors: &mut FieldErrors, field: impl Into<String>, message: impl Into<String>) {
    errors.entry(field.into()).or_default().push(message.into());
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GenerateRecipeResponse {
    pub success: bool,
    /// The generated payload, in whichever shape the model produced.
    #[schema(value_type = Object)]
    pub data: serde_json::Value,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_recipe_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ValidationErrorResponse {
    pub success: bool,
    pub message: String,
    pub errors: FieldErrors,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GenerationFailedResponse {
    pub success: bool,
    pub message: String,
    /// Underlying error; omitted in production.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn validation_failed(errors: FieldErrors) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ValidationErrorResponse {
            success: false,
            message: "Validation failed".to_string(),
            errors,
        }),
    )
        .into_response()
}

/// Malformed or mistyped request bodies get the same envelope as rule failures.
pub fn body_rejected(rejection: JsonRejection) -> Response {
    let mut errors = FieldErrors::new();
    add_error(&mut errors, "body", rejection.body_text());
    validation_failed(errors)
}

fn generation_failed(ctx: &AppContext, error: GenerateError) -> Response {
    match error {
        GenerateError::Validation(e) => {
            let mut errors = FieldErrors::new();
            add_error(&mut errors, e.field(), e.to_string());
            validation_failed(errors)
        }
        GenerateError::InvalidRequest(message) => {
            let mut errors = FieldErrors::new();
            add_error(&mut errors, "request", message);
            validation_failed(errors)
        }
        other => {
            tracing::error!(error = %other, "recipe generation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(GenerationFailedResponse {
                    success: false,
                    message: "Failed to generate recipe".to_string(),
                    error: ctx.show_error_details.then(|| other.to_string()),
                }),
            )
                .into_response()
        }
    }
}

/// Generate, optionally save, and wrap the result in the envelope.
pub async fn generate_and_respond(
    ctx: &AppContext,
    request: GenerationRequest,
    save_to_db: bool,
) -> Response {
    let data = match ctx.generator.generate(&request).await {
        Ok(data) => data,
        Err(e) => return generation_failed(ctx, e),
    };

    let saved_recipe_id = if save_to_db {
        match ctx.generator.save_recipe(Arc::clone(&ctx.store), &data).await {
            Ok(recipe) => Some(recipe.id),
            Err(e) => return generation_failed(ctx, e),
        }
    } else {
        None
    };

    let message = if saved_recipe_id.is_some() {
        "Recipe generated and saved"
    } else {
        "Recipe generated"
    };

    (
        StatusCode::OK,
        Json(GenerateRecipeResponse {
            success: true,
            data,
            message: message.to_string(),
            saved_recipe_id,
        }),
    )
        .into_response()
}
