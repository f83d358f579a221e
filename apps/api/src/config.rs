use anyhow::{Context, Result};

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub max_upload_bytes: usize,
    pub smtp: SmtpConfig,
}

/// Outgoing mail settings.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    /// Implicit TLS when true (port 465), opportunistic STARTTLS otherwise (port 587).
    pub secure: bool,
    pub username: String,
    pub password: String,
    pub from: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            max_upload_bytes: match std::env::var("MAX_UPLOAD_BYTES") {
                Ok(v) => v
                    .parse::<usize>()
                    .context("MAX_UPLOAD_BYTES must be a byte count")?,
                Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
            },
            smtp: SmtpConfig::from_env()?,
        })
    }
}

impl SmtpConfig {
    fn from_env() -> Result<Self> {
        let username = require_env("SMTP_USER")?;
        Ok(SmtpConfig {
            host: require_env("SMTP_HOST")?,
            port: std::env::var("SMTP_PORT")
                .unwrap_or_else(|_| "465".to_string())
                .parse::<u16>()
                .context("SMTP_PORT must be a valid port number")?,
            secure: parse_secure(std::env::var("SMTP_SECURE").ok().as_deref()),
            password: require_env("SMTP_PASS")?,
            from: std::env::var("FROM_EMAIL")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| username.clone()),
            username,
        })
    }
}

/// Only the literal string `false` turns implicit TLS off.
fn parse_secure(raw: Option<&str>) -> bool {
    raw != Some("false")
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
