use anyhow::{Context, Result};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    // Backend selection
    pub backend: String,

    // Embedded runtime
    pub glossary_path: String,
    pub acquire_timeout: Option<Duration>,

    // Languages
    pub source_lang: String,
    pub target_lang: String,

    // Dispatcher
    pub retry_max_attempts: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            backend: lookup("TRNIST_BACKEND").unwrap_or_else(|| "api".to_string()),

            glossary_path: lookup("TRNIST_GLOSSARY_PATH")
                .unwrap_or_else(|| "glossary.json".to_string()),
            acquire_timeout: lookup("TRNIST_ACQUIRE_TIMEOUT_MS")
                .map(|v| {
                    v.parse::<u64>()
                        .with_context(|| format!("TRNIST_ACQUIRE_TIMEOUT_MS is not a number: {}", v))
                })
                .transpose()?
                .map(Duration::from_millis),

            source_lang: lookup("TRNIST_SOURCE_LANG").unwrap_or_else(|| "en".to_string()),
            target_lang: lookup("TRNIST_TARGET_LANG").context("TRNIST_TARGET_LANG not set")?,

            retry_max_attempts: lookup("TRNIST_RETRY_MAX_ATTEMPTS")
                .map(|v| {
                    v.parse::<u32>()
                        .with_context(|| format!("TRNIST_RETRY_MAX_ATTEMPTS is not a number: {}", v))
                })
                .transpose()?
                .unwrap_or(1),
        })
    }
}
