//! Client configuration parsed from environment variables.

use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TEMPLATE_PATH: &str = "sample_template.xlsx";

/// Errors produced while building an [`ApiConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid base URL: {0} (expected http:// or https://)")]
    InvalidBaseUrl(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Backend origin with any trailing `/` removed.
    pub base_url: String,
    /// Where the downloaded spreadsheet template is written.
    pub template_path: PathBuf,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_BASE_URL.to_owned(), template_path: PathBuf::from(DEFAULT_TEMPLATE_PATH) }
    }
}

impl ApiConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `ROSTER_BASE_URL`: default `http://localhost:8000`
    /// - `ROSTER_TEMPLATE_PATH`: default `sample_template.xlsx`
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not an http(s) origin.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = std::env::var("ROSTER_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_owned());
        let template_path = std::env::var("ROSTER_TEMPLATE_PATH")
            .map_or_else(|_| PathBuf::from(DEFAULT_TEMPLATE_PATH), PathBuf::from);
        Self::default()
            .with_base_url(&base_url)
            .map(|config| Self { template_path, ..config })
    }

    /// Replace the base origin, normalizing the trailing slash.
    ///
    /// # Errors
    ///
    /// Returns an error if `raw` is not an http(s) origin.
    pub fn with_base_url(self, raw: &str) -> Result<Self, ConfigError> {
        let base_url = parse_base_url(raw)?;
        Ok(Self { base_url, ..self })
    }
}

fn parse_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let has_host = ["http://", "https://"]
        .iter()
        .any(|scheme| trimmed.strip_prefix(scheme).is_some_and(|rest| !rest.is_empty()));
    if !has_host {
        return Err(ConfigError::InvalidBaseUrl(raw.to_owned()));
    }
    Ok(trimmed.to_owned())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
