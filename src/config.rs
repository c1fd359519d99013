use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

use crate::models::ScoringRubric;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub source: SourceSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceSettings {
    pub supabase_url: Option<String>,
    pub supabase_key: Option<String>,
    pub database_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
}

impl SourceSettings {
    /// Per-query timeout, clamped to at least one second
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            supabase_url: None,
            supabase_key: None,
            database_url: None,
            timeout_secs: default_timeout_secs(),
            max_connections: None,
            min_connections: None,
        }
    }
}

fn default_timeout_secs() -> u64 { 15 }

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringSettings {
    #[serde(default = "default_age_points")]
    pub age_points: f64,
    #[serde(default = "default_income_points")]
    pub income_points: f64,
    #[serde(default = "default_education_points")]
    pub education_points: f64,
    #[serde(default = "default_industry_points")]
    pub industry_points: f64,
    #[serde(default = "default_business_bonus_points")]
    pub business_bonus_points: f64,
    #[serde(default = "default_business_threshold")]
    pub business_threshold: f64,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            age_points: default_age_points(),
            income_points: default_income_points(),
            education_points: default_education_points(),
            industry_points: default_industry_points(),
            business_bonus_points: default_business_bonus_points(),
            business_threshold: default_business_threshold(),
        }
    }
}

impl From<&ScoringSettings> for ScoringRubric {
    fn from(settings: &ScoringSettings) -> Self {
        ScoringRubric {
            age_points: settings.age_points,
            income_points: settings.income_points,
            education_points: settings.education_points,
            industry_points: settings.industry_points,
            business_bonus_points: settings.business_bonus_points,
            business_threshold: settings.business_threshold,
            ..ScoringRubric::default()
        }
    }
}

fn default_age_points() -> f64 { 25.0 }
fn default_income_points() -> f64 { 30.0 }
fn default_education_points() -> f64 { 20.0 }
fn default_industry_points() -> f64 { 15.0 }
fn default_business_bonus_points() -> f64 { 10.0 }
fn default_business_threshold() -> f64 { 7.5 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with PROSPECTIFY_)
    /// 5. Plain `SUPABASE_URL`, `SUPABASE_ANON_KEY` and `DATABASE_URL`
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            // Add default config file
            .add_source(File::with_name("config/default").required(false))
            // Add local config file (for development overrides)
            .add_source(File::with_name("config/local").required(false))
            // e.g., PROSPECTIFY__SOURCE__TIMEOUT_SECS -> source.timeout_secs
            .add_source(
                Environment::with_prefix("PROSPECTIFY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings = apply_env_overrides(settings)?;

        settings.try_deserialize()
    }

    pub fn rubric(&self) -> ScoringRubric {
        ScoringRubric::from(&self.scoring)
    }
}

/// Apply the conventional Supabase/Postgres environment variables
///
/// These are the names the front end already uses, so a shared `.env`
/// configures both.
fn apply_env_overrides(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let overrides = [
        ("source.supabase_url", env::var("SUPABASE_URL").ok()),
        ("source.supabase_key", env::var("SUPABASE_ANON_KEY").ok()),
        ("source.database_url", env::var("DATABASE_URL").ok()),
    ];

    let mut builder = Config::builder().add_source(settings);
    for (key, value) in overrides {
        if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
            builder = builder.set_override(key, value)?;
        }
    }

    builder.build()
}
