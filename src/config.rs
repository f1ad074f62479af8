//! Configuration management for imagescript
//!
//! Settings are loaded from environment variables with sensible defaults.
//!
//! # Environment Variables
//!
//! - `IMAGESCRIPT_CONTEXTS_ROOT`: Root of the staging directories - default: ".dockercontexts"
//! - `IMAGESCRIPT_MANIFEST_NAME`: File name of the synthesized manifest - default: "Dockerfile"
//! - `IMAGESCRIPT_BUILD_TOOL`: Program invoked as `<tool> build -t <name> <dir>` - default: "docker"
//! - `IMAGESCRIPT_CAPTURE_OUTPUT`: Capture build tool output instead of streaming it - default: "false"
//! - `IMAGESCRIPT_LOG_LEVEL`: Logging level - default: "info"
//!
//! # Example
//!
//! ```no_run
//! use imagescript::ImageScriptConfig;
//!
//! let config = ImageScriptConfig::default();
//! config.validate().expect("Invalid configuration");
//! println!("{}", config);
//! ```

use serde::Serialize;
use std::env;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Default values for configuration
pub const DEFAULT_CONTEXTS_ROOT: &str = ".dockercontexts";
pub const DEFAULT_MANIFEST_NAME: &str = "Dockerfile";
pub const DEFAULT_BUILD_TOOL: &str = "docker";
const DEFAULT_CAPTURE_OUTPUT: bool = false;
const DEFAULT_LOG_LEVEL: &str = "info";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Main configuration structure for imagescript
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageScriptConfig {
    /// Directory under which each built image gets its staging directory
    pub contexts_root: PathBuf,

    /// File name of the manifest written into the staging directory
    pub manifest_name: String,

    /// External build tool program
    pub build_tool: String,

    /// Capture the build tool's output and attach it to failures
    pub capture_output: bool,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for ImageScriptConfig {
    /// Loads configuration from `IMAGESCRIPT_*` environment variables,
    /// falling back to defaults for anything unset
    fn default() -> Self {
        let contexts_root = env::var("IMAGESCRIPT_CONTEXTS_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONTEXTS_ROOT));

        let manifest_name = env::var("IMAGESCRIPT_MANIFEST_NAME")
            .unwrap_or_else(|_| DEFAULT_MANIFEST_NAME.to_string());

        let build_tool =
            env::var("IMAGESCRIPT_BUILD_TOOL").unwrap_or_else(|_| DEFAULT_BUILD_TOOL.to_string());

        let capture_output = env::var("IMAGESCRIPT_CAPTURE_OUTPUT")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(DEFAULT_CAPTURE_OUTPUT);

        let log_level = env::var("IMAGESCRIPT_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        Self {
            contexts_root,
            manifest_name,
            build_tool,
            capture_output,
            log_level,
        }
    }
}

impl ImageScriptConfig {
    /// Built-in defaults, ignoring the environment
    pub fn builtin() -> Self {
        Self {
            contexts_root: PathBuf::from(DEFAULT_CONTEXTS_ROOT),
            manifest_name: DEFAULT_MANIFEST_NAME.to_string(),
            build_tool: DEFAULT_BUILD_TOOL.to_string(),
            capture_output: DEFAULT_CAPTURE_OUTPUT,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }

    pub fn with_contexts_root(mut self, contexts_root: impl Into<PathBuf>) -> Self {
        self.contexts_root = contexts_root.into();
        self
    }

    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if any validation fails
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.contexts_root.as_os_str().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Contexts root must not be empty".to_string(),
            ));
        }

        if self.manifest_name.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Manifest name must not be empty".to_string(),
            ));
        }
        if self.manifest_name.contains(['/', '\\']) {
            return Err(ConfigError::ValidationFailed(format!(
                "Manifest name must be a plain file name: {}",
                self.manifest_name
            )));
        }

        if self.build_tool.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Build tool must not be empty".to_string(),
            ));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }
}

impl fmt::Display for ImageScriptConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ImageScript Configuration:")?;
        writeln!(f, "  Contexts Root: {}", self.contexts_root.display())?;
        writeln!(f, "  Manifest Name: {}", self.manifest_name)?;
        writeln!(f, "  Build Tool: {}", self.build_tool)?;
        writeln!(f, "  Capture Output: {}", self.capture_output)?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        Ok(())
    }
}
