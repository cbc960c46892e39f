//! Server configuration.
//!
//! Configuration is read from `ATELIER_`-prefixed environment variables,
//! falling back to defaults suitable for local development.

use std::path::PathBuf;

use atelier_core::{Error, Result};

/// CORS configuration for browser clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsConfig {
    /// Allowed origins. Empty disables CORS; a single `"*"` allows any.
    pub allowed_origins: Vec<String>,
    /// Preflight cache duration in seconds.
    pub max_age_seconds: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            max_age_seconds: 3600,
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// HTTP listen port.
    pub http_port: u16,
    /// Root directory holding the manifest and the documents directory.
    pub projects_root: PathBuf,
    /// Directory with the admin dashboard assets, served at `/admin` when set.
    pub admin_ui_dir: Option<PathBuf>,
    /// Debug mode: pretty logs instead of JSON.
    pub debug: bool,
    /// CORS settings.
    pub cors: CorsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_port: 5174,
            projects_root: PathBuf::from("public/projects"),
            admin_ui_dir: None,
            debug: false,
            cors: CorsConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `ATELIER_HTTP_PORT`: listen port (default 5174)
    /// - `ATELIER_PROJECTS_ROOT`: projects root directory
    /// - `ATELIER_ADMIN_UI_DIR`: admin dashboard asset directory
    /// - `ATELIER_DEBUG`: `true`/`false`
    /// - `ATELIER_CORS_ALLOWED_ORIGINS`: comma-separated origin list
    /// - `ATELIER_CORS_MAX_AGE_SECONDS`: preflight cache duration
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but fails to parse.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(port) = env_u16("ATELIER_HTTP_PORT")? {
            config.http_port = port;
        }
        if let Some(root) = env_string("ATELIER_PROJECTS_ROOT") {
            config.projects_root = PathBuf::from(root);
        }
        if let Some(dir) = env_string("ATELIER_ADMIN_UI_DIR") {
            config.admin_ui_dir = Some(PathBuf::from(dir));
        }
        if let Some(debug) = env_bool("ATELIER_DEBUG")? {
            config.debug = debug;
        }
        if let Some(origins) = env_string("ATELIER_CORS_ALLOWED_ORIGINS") {
            config.cors.allowed_origins = parse_cors_allowed_origins(&origins);
        }
        if let Some(max_age) = env_u64("ATELIER_CORS_MAX_AGE_SECONDS")? {
            config.cors.max_age_seconds = max_age;
        }

        Ok(config)
    }
}

fn env_string(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => None,
    }
}

fn env_u16(name: &str) -> Result<Option<u16>> {
    env_string(name)
        .map(|value| {
            value
                .parse()
                .map_err(|_| Error::InvalidInput(format!("{name} must be a port number: {value}")))
        })
        .transpose()
}

fn env_u64(name: &str) -> Result<Option<u64>> {
    env_string(name)
        .map(|value| {
            value
                .parse()
                .map_err(|_| Error::InvalidInput(format!("{name} must be an integer: {value}")))
        })
        .transpose()
}

fn env_bool(name: &str) -> Result<Option<bool>> {
    env_string(name)
        .map(|value| match value.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(Error::InvalidInput(format!(
                "{name} must be true or false: {value}"
            ))),
        })
        .transpose()
}

fn parse_cors_allowed_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_local_development() {
        let config = Config::default();
        assert_eq!(config.http_port, 5174);
        assert_eq!(config.projects_root, PathBuf::from("public/projects"));
        assert!(config.admin_ui_dir.is_none());
        assert!(!config.debug);
    }

    #[test]
    fn cors_origins_parse_from_comma_list() {
        assert_eq!(
            parse_cors_allowed_origins("http://localhost:5173, https://studio.example.com ,"),
            vec!["http://localhost:5173", "https://studio.example.com"]
        );
        assert!(parse_cors_allowed_origins(" , ").is_empty());
    }
}
