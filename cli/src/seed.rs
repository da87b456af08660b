use crate::client::{ApiClient, GenerateCall};
use anyhow::{bail, Result};
use std::time::Duration;

/// Recipes generated per category.
pub const SEED_PLAN: &[(&str, u32)] = &[
    ("和食", 12),
    ("洋食", 12),
    ("中華", 10),
    ("イタリアン", 8),
    ("その他", 8),
];

pub fn total_planned() -> u32 {
    SEED_PLAN.iter().map(|(_, count)| count).sum()
}

pub async fn seed(server: &str, delay: Duration) -> Result<()> {
    let client = ApiClient::new(server)?;

    println!("Seeding {} AI-generated recipes...", total_planned());

    let mut saved = 0;
    let mut failed = 0;

    for (category, count) in SEED_PLAN {
        println!();
        println!("{} ({} recipes)", category, count);

        let call = GenerateCall::Basic {
            category: Some(category.to_string()),
        };

        for i in 0..*count {
            match client.generate(&call, true).await {
                Ok(generated) => match generated.saved_recipe_id {
                    Some(id) => {
                        saved += 1;
                        println!("  [{}/{}] saved {}", i + 1, count, id);
                    }
                    None => {
                        failed += 1;
                        println!("  [{}/{}] generated but not saved", i + 1, count);
                    }
                },
                Err(e) => {
                    failed += 1;
                    println!("  [{}/{}] Warning: {:#}", i + 1, count, e);
                }
            }

            tokio::time::sleep(delay).await;
        }
    }

    println!();
    println!("Seeded {} recipes ({} failed)", saved, failed);

    if saved == 0 {
        bail!("No recipes were seeded");
    }
    Ok(())
}
