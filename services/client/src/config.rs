//! services/client/src/config.rs
//!
//! Defines the client's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use chunk_view_core::truncation::DEFAULT_LINES_TO_SHOW;
use chunk_view_core::{ChunkViewSettings, ContentTruncationPolicy, ImageRangeResolver};
use tracing::Level;
use uuid::Uuid;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub api_base_url: String,
    pub dataset_id: Uuid,
    pub api_key: Option<String>,
    pub image_range_start_key: Option<String>,
    pub image_range_end_key: Option<String>,
    pub lines_to_show: usize,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to keep tests hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // Blank optional values count as unset.
        let optional = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let required = |name: &str| {
            optional(name).ok_or_else(|| ConfigError::MissingVar(name.to_string()))
        };

        // --- Service Settings ---
        let api_base_url = required("API_BASE_URL")?.trim_end_matches('/').to_string();
        if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue(
                "API_BASE_URL".to_string(),
                format!("'{}' is not an http(s) URL", api_base_url),
            ));
        }

        let dataset_str = required("DATASET_ID")?;
        let dataset_id = Uuid::parse_str(dataset_str.trim()).map_err(|e| {
            ConfigError::InvalidValue("DATASET_ID".to_string(), e.to_string())
        })?;

        let api_key = optional("API_KEY");

        // --- View Settings ---
        let image_range_start_key = optional("IMAGE_RANGE_START_KEY");
        let image_range_end_key = optional("IMAGE_RANGE_END_KEY");

        let lines_to_show = match optional("LINES_TO_SHOW") {
            Some(raw) => raw.trim().parse::<usize>().map_err(|_| {
                ConfigError::InvalidValue(
                    "LINES_TO_SHOW".to_string(),
                    format!("'{}' is not a whole number", raw),
                )
            })?,
            None => DEFAULT_LINES_TO_SHOW,
        };

        let log_level_str = optional("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            api_base_url,
            dataset_id,
            api_key,
            image_range_start_key,
            image_range_end_key,
            lines_to_show,
            log_level,
        })
    }

    /// The per-row settings every chunk view is built with.
    pub fn view_settings(&self) -> ChunkViewSettings {
        ChunkViewSettings {
            truncation: ContentTruncationPolicy::new(self.lines_to_show),
            image_range: ImageRangeResolver::new(
                self.image_range_start_key.clone(),
                self.image_range_end_key.clone(),
            ),
        }
    }
}
