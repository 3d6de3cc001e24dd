use anyhow::{Context, Result};
use std::env;

use crate::config::{env_flag, env_parse};

#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub access_token_expiration_minutes: u64,
    pub cookie_name: String,
    pub cookie_domain: Option<String>,
    pub cookie_secure: bool,
    pub password_reset_expiration_minutes: i64,
}

impl AuthConfig {
    pub fn from_env() -> Result<Self> {
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        if jwt_secret.trim().is_empty() {
            anyhow::bail!("JWT_SECRET must not be empty");
        }

        Ok(Self {
            jwt_secret,
            access_token_expiration_minutes: env_parse("ACCESS_TOKEN_EXPIRATION_MINUTES", 720),
            cookie_name: env::var("AUTH_COOKIE_NAME").unwrap_or_else(|_| "jwt".to_string()),
            cookie_domain: env::var("COOKIE_DOMAIN").ok().filter(|d| !d.is_empty()),
            cookie_secure: env_flag("COOKIE_SECURE", true),
            password_reset_expiration_minutes: env_parse("PASSWORD_RESET_EXPIRATION_MINUTES", 60),
        })
    }

    pub fn access_token_max_age_secs(&self) -> u64 {
        self.access_token_expiration_minutes * 60
    }
}
