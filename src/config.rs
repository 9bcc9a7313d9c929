use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;

use crate::sources::KNOWN_SOURCES;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub scheduler: SchedulerConfig,
    pub sources: SourcesConfig,
    pub discord: DiscordConfig,
    pub translation: TranslationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:alerts.db".to_string(),
            max_connections: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Seconds between poll cycles.
    pub check_interval_secs: u64,
    /// Cap on concurrent adapter calls per cycle.
    pub max_concurrent_fetches: usize,
    /// Upper bound on a single adapter call.
    pub fetch_timeout_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: 60,
            max_concurrent_fetches: 4,
            fetch_timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Source identifiers to poll; see `sources::KNOWN_SOURCES`.
    pub enabled: Vec<String>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            enabled: KNOWN_SOURCES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DiscordConfig {
    /// Bot token; falls back to the BOT_TOKEN environment variable.
    pub bot_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    pub enabled: bool,
    pub source_lang: String,
    pub target_lang: String,
    pub timeout_secs: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            source_lang: "ja".to_string(),
            target_lang: "en".to_string(),
            timeout_secs: 10,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            // Optional configuration files; defaults cover a bare environment
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(File::with_name("config/local").required(false))
            // Environment overrides, e.g. ZENWATCH__SCHEDULER__CHECK_INTERVAL_SECS
            .add_source(Environment::with_prefix("ZENWATCH").separator("__"))
            .build()?;

        let mut config: AppConfig = s.try_deserialize()?;

        // Bot token fallback kept compatible with the original deployment
        if config.discord.bot_token.is_none() {
            config.discord.bot_token = env::var("BOT_TOKEN").ok();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.max_connections == 0 {
            return Err(ConfigError::Message(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        if self.scheduler.check_interval_secs == 0 {
            return Err(ConfigError::Message(
                "scheduler.check_interval_secs must be greater than 0".into(),
            ));
        }

        if self.scheduler.max_concurrent_fetches == 0 {
            return Err(ConfigError::Message(
                "scheduler.max_concurrent_fetches must be greater than 0".into(),
            ));
        }

        if self.scheduler.fetch_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "scheduler.fetch_timeout_secs must be greater than 0".into(),
            ));
        }

        if self.sources.enabled.is_empty() {
            return Err(ConfigError::Message(
                "sources.enabled must name at least one source".into(),
            ));
        }

        for source in &self.sources.enabled {
            if !KNOWN_SOURCES.contains(&source.as_str()) {
                return Err(ConfigError::Message(format!(
                    "unknown source \"{source}\" in sources.enabled (known: {})",
                    KNOWN_SOURCES.join(", ")
                )));
            }
        }

        if self.translation.enabled
            && (self.translation.source_lang.is_empty() || self.translation.target_lang.is_empty())
        {
            return Err(ConfigError::Message(
                "translation languages must not be empty".into(),
            ));
        }

        Ok(())
    }
}
