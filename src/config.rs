//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// GCP project ID
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Frontend URL for CORS
    pub frontend_url: String,
    /// Path to the service account key file (used by the export tool)
    pub credentials_path: PathBuf,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            frontend_url: "http://localhost:5173".to_string(),
            credentials_path: PathBuf::from("serviceAccountKey.json"),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file is honored if present (local development).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            credentials_path: env::var("GOOGLE_APPLICATION_CREDENTIALS")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("serviceAccountKey.json")),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test because the process environment is shared between tests.
    #[test]
    fn test_config_from_env() {
        env::set_var("GCP_PROJECT_ID", "planazo-test");
        env::set_var("PORT", "9090");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.gcp_project_id, "planazo-test");
        assert_eq!(config.port, 9090);
        assert_eq!(
            config.credentials_path,
            PathBuf::from("serviceAccountKey.json")
        );

        env::set_var("PORT", "not-a-port");
        let config = Config::from_env().expect("Config should load");
        assert_eq!(config.port, 8080, "bad PORT falls back to default");

        env::remove_var("GCP_PROJECT_ID");
        env::remove_var("PORT");
    }
}
