use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

/// Server settings read from the environment at startup.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub skip_migrations: bool,
    pub discord_webhook_url: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            database_max_connections: env_parse("DATABASE_MAX_CONNECTIONS", 30),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()
                .context("PORT must be a valid port number")?,
            allowed_origins: parse_origins(
                &env::var("ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| "http://localhost:3000,http://localhost:4200".to_string()),
            ),
            skip_migrations: env_flag("SKIP_MIGRATIONS", false),
            discord_webhook_url: env::var("DISCORD_WEBHOOK_URL")
                .ok()
                .filter(|v| !v.is_empty()),
        })
    }
}

/// Where uploaded blobs land and how they are addressed publicly.
#[derive(Clone, Debug)]
pub struct UploadConfig {
    pub dir: PathBuf,
    pub public_base_url: String,
    pub max_bytes: usize,
}

impl UploadConfig {
    pub const DEFAULT_MAX_BYTES: usize = 5 * 1024 * 1024;

    pub fn from_env() -> Self {
        Self {
            dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("uploads")),
            public_base_url: env::var("PUBLIC_UPLOAD_BASE_URL")
                .unwrap_or_else(|_| "/uploads".to_string()),
            max_bytes: env_parse("UPLOAD_MAX_BYTES", Self::DEFAULT_MAX_BYTES),
        }
    }
}

pub(crate) fn env_flag(key: &str, default: bool) -> bool {
    env::var(key)
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(default)
}

pub(crate) fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|o| o.trim().trim_end_matches('/').to_string())
        .filter(|o| !o.is_empty())
        .collect()
}
