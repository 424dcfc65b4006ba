use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::DEFAULT_FORBIDDEN_MESSAGE;

lazy_static! {
    static ref ENV_VAR_PATTERN: Regex =
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}").unwrap();
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    #[serde(default)]
    pub gate: GateConfig,
    #[serde(default)]
    pub admin: SurfaceConfig,
    #[serde(default)]
    pub hook: SurfaceConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BackendConfig {
    /// `database` or `memory`
    #[serde(rename = "type")]
    pub backend_type: String,
    pub database: Option<DatabaseConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    /// `sqlite` or `postgresql`
    #[serde(rename = "type")]
    pub db_type: String,
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout: u64,
}

fn default_max_connections() -> u32 {
    10
}

fn default_connection_timeout() -> u64 {
    30
}

/// How a registration candidate is compared against the stored allow-list
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CandidateComparison {
    /// Compare the candidate exactly as the host delivered it. Stored entries
    /// are lower-cased, so `A@Example.com` will not match `a@example.com`.
    Exact,
    /// Canonicalize the candidate the same way stored entries were before
    /// comparing.
    #[default]
    Canonical,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GateConfig {
    #[serde(default)]
    pub comparison: CandidateComparison,
    /// Message shown to the user when registration is blocked
    #[serde(default = "default_forbidden_message")]
    pub message: String,
}

fn default_forbidden_message() -> String {
    DEFAULT_FORBIDDEN_MESSAGE.to_string()
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            comparison: CandidateComparison::default(),
            message: default_forbidden_message(),
        }
    }
}

/// Settings for one HTTP surface (admin pages or the registration hook)
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct SurfaceConfig {
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AuthConfig {
    /// `unauthenticated`, `bearer` or `basic`
    #[serde(rename = "type")]
    pub auth_type: String,
    pub token: Option<String>,
    pub basic: Option<BasicAuthConfig>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::unauthenticated()
    }
}

impl AuthConfig {
    pub fn unauthenticated() -> Self {
        Self {
            auth_type: "unauthenticated".to_string(),
            token: None,
            basic: None,
        }
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            auth_type: "bearer".to_string(),
            token: Some(token.into()),
            basic: None,
        }
    }

    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            auth_type: "basic".to_string(),
            token: None,
            basic: Some(BasicAuthConfig {
                username: username.into(),
                password: password.into(),
            }),
        }
    }

    fn validate(&self, surface: &str) -> Result<(), String> {
        match self.auth_type.as_str() {
            "unauthenticated" => Ok(()),
            "bearer" if self.token.as_deref().is_some_and(|t| !t.is_empty()) => Ok(()),
            "bearer" => Err(format!("{} auth type 'bearer' requires a token", surface)),
            "basic" if self.basic.is_some() => Ok(()),
            "basic" => Err(format!(
                "{} auth type 'basic' requires basic credentials",
                surface
            )),
            other => Err(format!("{} auth type '{}' is not supported", surface, other)),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BasicAuthConfig {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_access_log")]
    pub access_log: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_access_log() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            access_log: default_access_log(),
        }
    }
}

impl AppConfig {
    /// Load configuration from YAML file
    pub fn load_from_file<P: AsRef<Path>>(config_path: P) -> Result<Self, String> {
        let path = config_path.as_ref();

        if !path.exists() {
            return Err(format!("Configuration file not found: {}", path.display()));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {}", path.display(), e))?;

        let expanded_content = Self::expand_env_vars(&content)?;

        let app_config: AppConfig = serde_yaml::from_str(&expanded_content)
            .map_err(|e| format!("Failed to parse config file {}: {}", path.display(), e))?;

        app_config.validate()?;

        Ok(app_config)
    }

    /// In-memory SQLite, no authentication, canonical comparison
    pub fn default_config() -> Self {
        AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            backend: BackendConfig {
                backend_type: "database".to_string(),
                database: Some(DatabaseConfig {
                    db_type: "sqlite".to_string(),
                    url: ":memory:".to_string(),
                    max_connections: 1,
                    connection_timeout: default_connection_timeout(),
                }),
            },
            gate: GateConfig::default(),
            admin: SurfaceConfig::default(),
            hook: SurfaceConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        match self.backend.backend_type.as_str() {
            "memory" => {}
            "database" => {
                let database = self.backend.database.as_ref().ok_or(
                    "Database configuration is required when backend type is 'database'",
                )?;
                if database.db_type != "sqlite" && database.db_type != "postgresql" {
                    return Err(format!("Unsupported database type: {}", database.db_type));
                }
            }
            other => return Err(format!("Unsupported backend type: {}", other)),
        }

        if self.gate.message.trim().is_empty() {
            return Err("gate.message cannot be empty".to_string());
        }

        self.admin.auth.validate("admin")?;
        self.hook.auth.validate("hook")?;

        Ok(())
    }

    /// Expand environment variables in format ${VAR_NAME} or ${VAR_NAME:-default}
    fn expand_env_vars(content: &str) -> Result<String, String> {
        let mut expanded = String::with_capacity(content.len());
        let mut last = 0;

        for caps in ENV_VAR_PATTERN.captures_iter(content) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let var_name = &caps[1];

            let value = match std::env::var(var_name) {
                Ok(val) => val,
                Err(_) => match caps.get(2) {
                    Some(default) => default.as_str().to_string(),
                    None => {
                        return Err(format!(
                            "Environment variable {} not found and no default provided",
                            var_name
                        ))
                    }
                },
            };

            expanded.push_str(&content[last..whole.start()]);
            expanded.push_str(&value);
            last = whole.end();
        }

        expanded.push_str(&content[last..]);
        Ok(expanded)
    }
}
