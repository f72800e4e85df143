use crate::service::OwnerScoping;
use anyhow::{Context, Result};

/// Which [`crate::store::LinkStore`] backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Sqlite,
    Memory,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite connection string, e.g. "sqlite:./tinylink.db"
    pub database_url: String,

    /// `sqlite` (default) or `memory`. The memory store loses everything on
    /// restart.
    pub store: StoreBackend,

    /// Host to bind the HTTP server to, e.g. "0.0.0.0"
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Per-owner links with 1–20 char custom codes, or one shared namespace
    /// with 6–8 char codes.
    pub owner_scoping: OwnerScoping,
}

impl AppConfig {
    /// Load configuration from environment variables (populated by dotenvy before this is called).
    pub fn from_env() -> Result<Self> {
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse::<u16>()
            .context("PORT must be a valid port number (1–65535)")?;

        let store = match std::env::var("LINK_STORE")
            .unwrap_or_else(|_| "sqlite".into())
            .to_ascii_lowercase()
            .as_str()
        {
            "sqlite" => StoreBackend::Sqlite,
            "memory" => StoreBackend::Memory,
            other => anyhow::bail!("LINK_STORE must be 'sqlite' or 'memory', got '{other}'"),
        };

        let owner_scoping = std::env::var("OWNER_SCOPING")
            .unwrap_or_else(|_| "enabled".into())
            .parse::<OwnerScoping>()
            .map_err(anyhow::Error::msg)
            .context("OWNER_SCOPING is invalid")?;

        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:./tinylink.db".into()),
            store,
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port,
            owner_scoping,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
