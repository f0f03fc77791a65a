//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `CORKBOARD_CONFIG`
//! environment variable.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `CORKBOARD_` override YAML values
//! 3. **DATABASE_URL** - Special case: overrides `database_url` if set
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `CORKBOARD_AUTH__TOKEN_VALIDITY=12h` sets the `auth.token_validity` field.

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::Error;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "CORKBOARD_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    /// Useful for CI/CD pipelines to catch config errors before deployment.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// This is the root configuration structure loaded from YAML and environment variables.
/// All fields have sensible defaults defined in the `Default` implementation, except
/// `database_url` and `auth.secret_key` which must be provided for the server to start.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// PostgreSQL connection URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,
    /// Authentication configuration
    pub auth: AuthConfig,
    /// Cross-origin request configuration
    pub cors: CorsConfig,
    /// Uploaded image storage configuration
    pub uploads: UploadsConfig,
    /// Optional initial admin account, created (or re-keyed) on startup
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin: Option<InitialAdminConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            database_url: None,
            auth: AuthConfig::default(),
            cors: CorsConfig::default(),
            uploads: UploadsConfig::default(),
            admin: None,
        }
    }
}

/// Authentication settings: the process-wide signing secret and token lifetime.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// Secret key used to sign and verify bearer tokens. Loaded once at
    /// startup; rotation invalidates all outstanding tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
    /// How long issued tokens stay valid (e.g., "1day", "12h")
    #[serde(with = "humantime_serde")]
    pub token_validity: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: None,
            token_validity: Duration::from_secs(24 * 60 * 60),
        }
    }
}

/// CORS settings applied to the whole router.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins. "*" allows any origin (only valid without credentials).
    pub allowed_origins: Vec<String>,
    /// Whether to allow credentialed requests
    pub allow_credentials: bool,
    /// Optional Access-Control-Max-Age, in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_age: Option<u64>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
            allow_credentials: false,
            max_age: None,
        }
    }
}

/// Where uploaded profile images land and how big they may be.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadsConfig {
    /// Directory where uploaded images are stored. Served at `/images`.
    pub dir: String,
    /// Maximum accepted image size in bytes
    pub max_image_size: u64,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            dir: "uploads".to_string(),
            max_image_size: 5 * 1024 * 1024,
        }
    }
}

/// Initial admin account bootstrapped at startup (idempotent).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct InitialAdminConfig {
    pub username: String,
    pub password: String,
    #[serde(default = "default_admin_fullname")]
    pub fullname: String,
}

fn default_admin_fullname() -> String {
    "Administrator".to_string()
}

impl Config {
    /// Load configuration from the YAML file and environment overrides.
    pub fn load(args: &Args) -> Result<Self, Error> {
        let mut figment = Figment::new()
            .merge(Yaml::file(&args.config))
            .merge(Env::prefixed("CORKBOARD_").split("__"));

        // DATABASE_URL is the conventional deployment override
        if let Ok(url) = std::env::var("DATABASE_URL") {
            figment = figment.merge(("database_url", url));
        }

        let config: Config = figment.extract().map_err(|e| Error::BadRequest {
            message: format!("Invalid configuration: {e}"),
        })?;

        Ok(config)
    }

    /// The database URL, required for startup.
    pub fn require_database_url(&self) -> Result<&str, Error> {
        self.database_url.as_deref().ok_or_else(|| Error::BadRequest {
            message: "database_url is required (set it in config.yaml or via DATABASE_URL)".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_args(path: &str) -> Args {
        Args {
            config: path.to_string(),
            validate: false,
        }
    }

    #[test]
    fn test_defaults_without_config_file() {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            let config = Config::load(&test_args("missing.yaml")).expect("load");
            assert_eq!(config.host, "0.0.0.0");
            assert_eq!(config.port, 8000);
            assert_eq!(config.auth.token_validity, Duration::from_secs(86400));
            assert!(config.database_url.is_none());
            assert!(config.require_database_url().is_err());
            Ok(())
        });
    }

    #[test]
    fn test_yaml_with_env_overrides() {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file(
                "config.yaml",
                r#"
                port: 9000
                database_url: postgres://localhost/corkboard
                auth:
                  secret_key: file-secret
                  token_validity: 1day
                "#,
            )?;
            jail.set_env("CORKBOARD_PORT", "9100");
            jail.set_env("CORKBOARD_AUTH__TOKEN_VALIDITY", "12h");

            let config = Config::load(&test_args("config.yaml")).expect("load");
            assert_eq!(config.port, 9100);
            assert_eq!(config.auth.secret_key.as_deref(), Some("file-secret"));
            assert_eq!(config.auth.token_validity, Duration::from_secs(12 * 3600));
            Ok(())
        });
    }

    #[test]
    fn test_database_url_env_takes_precedence() {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file("config.yaml", "database_url: postgres://file/db")?;
            jail.set_env("DATABASE_URL", "postgres://env/db");

            let config = Config::load(&test_args("config.yaml")).expect("load");
            assert_eq!(config.require_database_url().unwrap(), "postgres://env/db");
            Ok(())
        });
    }
}
