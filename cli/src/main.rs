mod client;
mod generate;
mod seed;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "kondate")]
#[command(about = "Kondate CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate recipes through the server
    Generate {
        /// Server URL (default: http://localhost:3000)
        #[arg(long, env = "KONDATE_SERVER", default_value = "http://localhost:3000")]
        server: String,
        /// Number of recipes to generate
        #[arg(long, default_value_t = 1)]
        count: u32,
        /// Cuisine category (和食, 洋食, 中華, イタリアン, フレンチ, その他)
        #[arg(long)]
        category: Option<String>,
        /// Comma-separated ingredients the recipe must use
        #[arg(long, value_delimiter = ',')]
        ingredients: Vec<String>,
        /// Comma-separated tags
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
        /// Maximum cooking time in minutes
        #[arg(long)]
        max_time: Option<u32>,
        /// Print recipes instead of saving them
        #[arg(long)]
        dry_run: bool,
    },
    /// Fill the database with generated recipes for each category
    Seed {
        /// Server URL (default: http://localhost:3000)
        #[arg(long, env = "KONDATE_SERVER", default_value = "http://localhost:3000")]
        server: String,
        /// Pause between generations, in milliseconds
        #[arg(long, default_value_t = 500)]
        delay_ms: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            server,
            count,
            category,
            ingredients,
            tags,
            max_time,
            dry_run,
        } => {
            let options = generate::GenerateOptions {
                count,
                category,
                ingredients,
                tags,
                max_time,
                dry_run,
            };
            tracing::debug!(?options, "starting generation");
            generate::generate(&server, &options).await?;
        }
        Commands::Seed { server, delay_ms } => {
            seed::seed(&server, Duration::from_millis(delay_ms)).await?;
        }
    }

    Ok(())
}
