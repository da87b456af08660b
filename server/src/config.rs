use anyhow::Context;
use std::env;
use std::net::SocketAddr;

/// Server settings from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    /// `APP_ENV`; "production" hides error details from API responses.
    pub environment: String,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse()
            .context("BIND_ADDR must be a socket address")?;

        let environment = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());

        Ok(Self {
            database_url,
            bind_addr,
            environment,
        })
    }

    pub fn show_error_details(&self) -> bool {
        self.environment != "production"
    }
}
