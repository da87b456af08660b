use crate::client::{ApiClient, GenerateCall};
use anyhow::{bail, Result};
use kondate_core::validate_payload;
use serde_json::Value;
use std::time::Duration;

const DELAY_BETWEEN_GENERATIONS: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub count: u32,
    pub category: Option<String>,
    pub ingredients: Vec<String>,
    pub tags: Vec<String>,
    pub max_time: Option<u32>,
    pub dry_run: bool,
}

impl GenerateOptions {
    /// Ingredients win over constraints, constraints over a plain category.
    pub fn call(&self) -> GenerateCall {
        let ingredients: Vec<String> = self
            .ingredients
            .iter()
            .map(|i| i.trim().to_string())
            .filter(|i| !i.is_empty())
            .collect();

        if !ingredients.is_empty() {
            GenerateCall::Ingredients { ingredients }
        } else if !self.tags.is_empty() || self.max_time.is_some() {
            GenerateCall::Constraints {
                max_time: self.max_time,
                tags: self.tags.clone(),
            }
        } else {
            GenerateCall::Basic {
                category: self.category.clone(),
            }
        }
    }
}

pub async fn generate(server: &str, options: &GenerateOptions) -> Result<()> {
    let client = ApiClient::new(server)?;
    let call = options.call();
    let save = !options.dry_run;

    println!("Recipe Generation Starting");
    println!("==========================");
    println!("Endpoint: {}", call.path());
    println!("Count: {}", options.count);
    if options.dry_run {
        println!("Dry run: recipes will not be saved");
    }
    println!();

    let mut succeeded = 0;
    let mut failed = 0;

    for i in 0..options.count {
        let progress = format!("[{}/{}]", i + 1, options.count);

        match client.generate(&call, save).await {
            Ok(generated) => {
                succeeded += 1;
                match generated.saved_recipe_id {
                    Some(id) => println!("{} {} (saved as {})", progress, title_of(&generated.data), id),
                    None => println!("{} {}", progress, title_of(&generated.data)),
                }
                if options.dry_run {
                    print_recipe(&generated.data);
                }
            }
            Err(e) => {
                failed += 1;
                println!("{} Failed: {:#}", progress, e);
            }
        }

        if i + 1 < options.count {
            tokio::time::sleep(DELAY_BETWEEN_GENERATIONS).await;
        }
    }

    println!();
    println!("Results");
    println!("=======");
    println!("Succeeded: {}", succeeded);
    println!("Failed: {}", failed);

    if succeeded == 0 {
        bail!("No recipes were generated");
    }
    Ok(())
}

fn title_of(data: &Value) -> String {
    data.get("recipe")
        .unwrap_or(data)
        .get("title")
        .and_then(Value::as_str)
        .unwrap_or("(untitled)")
        .to_string()
}

/// Print a readable summary, or the raw payload when it fails validation.
fn print_recipe(data: &Value) {
    let payload = match validate_payload(data) {
        Ok(payload) => payload,
        Err(e) => {
            println!("  Warning: generated recipe is invalid: {}", e);
            if let Ok(pretty) = serde_json::to_string_pretty(data) {
                println!("{}", pretty);
            }
            return;
        }
    };

    let recipe = payload.recipe();
    println!("  Category: {}", recipe.category);
    println!(
        "  Time: {} min | Servings: {} | Calories: {} kcal",
        recipe.cooking_time, recipe.servings, recipe.calories
    );
    if !recipe.tags.is_empty() {
        println!("  Tags: {}", recipe.tags.join(", "));
    }
    println!("  Ingredients:");
    for line in payload.ingredients() {
        println!("    - {} {}", line.name, line.amount);
    }
    println!("  Instructions:");
    for (n, step) in recipe.instructions.iter().enumerate() {
        println!("    {}. {}", n + 1, step);
    }
    if !payload.nutrition().is_empty() {
        println!("  Nutrition entries: {}", payload.nutrition().len());
    }
    println!();
}
