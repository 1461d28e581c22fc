//! Configuration types for apiary

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{ApiaryError, Result};

/// How a capture failure discovered mid-extraction is handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Log the failure and keep whatever was captured so far
    #[default]
    Log,
    /// Abort the capture and surface the error to the call site
    Propagate,
}

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Title rendered at the top of the HTML document
    pub title: String,
    /// Output path for the rendered HTML document
    #[serde(default = "default_html_path")]
    pub html_path: PathBuf,
    /// Output path for the JSON snapshot; defaults to `html_path` + ".json"
    #[serde(default)]
    pub json_path: Option<PathBuf>,
    /// Custom handlebars template; defaults to the compiled-in template
    #[serde(default)]
    pub template_path: Option<PathBuf>,
    /// Capture behaviour for the middleware layer
    #[serde(default)]
    pub capture: CaptureConfig,
}

fn default_html_path() -> PathBuf {
    PathBuf::from("apidoc.html")
}

/// Capture configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Request header names excluded from capture
    #[serde(default)]
    pub suppressed_request_headers: Vec<String>,
    /// Response header names excluded from capture
    #[serde(default)]
    pub suppressed_response_headers: Vec<String>,
    /// What to do when a capture step fails mid-exchange
    #[serde(default)]
    pub on_failure: FailurePolicy,
}

impl Config {
    /// Create a configuration with default paths and capture settings
    #[must_use]
    pub fn new(title: impl Into<String>, html_path: impl Into<PathBuf>) -> Self {
        Self {
            title: title.into(),
            html_path: html_path.into(),
            json_path: None,
            template_path: None,
            capture: CaptureConfig::default(),
        }
    }

    /// Load configuration from TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ApiaryError::Config(format!("Failed to read config file: {e}")))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ApiaryError::Config(format!("Failed to parse config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns error if configuration is invalid
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(ApiaryError::Config(
                "document title cannot be empty".to_string(),
            ));
        }

        if self.html_path.as_os_str().is_empty() {
            return Err(ApiaryError::Config(
                "html_path cannot be empty".to_string(),
            ));
        }

        if let Some(template_path) = &self.template_path {
            if !template_path.exists() {
                return Err(ApiaryError::Config(format!(
                    "template does not exist: {}",
                    template_path.display()
                )));
            }
        }

        Ok(())
    }

    /// The JSON snapshot path, derived from the HTML path when unset
    #[must_use]
    pub fn json_path(&self) -> PathBuf {
        self.json_path.clone().unwrap_or_else(|| {
            let mut path = self.html_path.as_os_str().to_os_string();
            path.push(".json");
            PathBuf::from(path)
        })
    }
}
